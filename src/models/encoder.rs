//! Categorical encoders.
//!
//! Both encoders carry one fitted vocabulary per column and refuse values
//! outside it instead of emitting an all-zero row.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::CategoricalEncoder;
use crate::error::ModelError;
use crate::record::CATEGORICAL_COLUMNS;

/// On-disk encoder, tagged by `"type"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EncoderArtifact {
    OneHot(OneHotEncoder),
    Ordinal(OrdinalEncoder),
}

impl CategoricalEncoder for EncoderArtifact {
    fn n_columns(&self) -> usize {
        match self {
            Self::OneHot(e) => e.n_columns(),
            Self::Ordinal(e) => e.n_columns(),
        }
    }

    fn output_width(&self) -> usize {
        match self {
            Self::OneHot(e) => e.output_width(),
            Self::Ordinal(e) => e.output_width(),
        }
    }

    fn transform(&self, values: &[i64]) -> Result<Array1<f64>, ModelError> {
        match self {
            Self::OneHot(e) => e.transform(values),
            Self::Ordinal(e) => e.transform(values),
        }
    }
}

fn column_name(names: &[String], idx: usize) -> String {
    names
        .get(idx)
        .cloned()
        .or_else(|| CATEGORICAL_COLUMNS.get(idx).map(|s| s.to_string()))
        .unwrap_or_else(|| format!("column {idx}"))
}

/// Position of each value within its column's vocabulary.
fn positions(
    categories: &[Vec<i64>],
    names: &[String],
    values: &[i64],
) -> Result<Vec<usize>, ModelError> {
    if values.len() != categories.len() {
        return Err(ModelError::ShapeMismatch { expected: categories.len(), got: values.len() });
    }
    categories
        .iter()
        .zip(values)
        .enumerate()
        .map(|(idx, (vocab, value))| {
            vocab.iter().position(|c| c == value).ok_or_else(|| ModelError::UnseenCategory {
                column: column_name(names, idx),
                value: *value,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotEncoder {
    pub categories: Vec<Vec<i64>>,
    #[serde(default)]
    pub feature_names: Vec<String>,
}

impl CategoricalEncoder for OneHotEncoder {
    fn n_columns(&self) -> usize {
        self.categories.len()
    }

    fn output_width(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    fn transform(&self, values: &[i64]) -> Result<Array1<f64>, ModelError> {
        let hits = positions(&self.categories, &self.feature_names, values)?;
        let mut out = Array1::zeros(self.output_width());
        let mut offset = 0;
        for (vocab, hit) in self.categories.iter().zip(hits) {
            out[offset + hit] = 1.0;
            offset += vocab.len();
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdinalEncoder {
    pub categories: Vec<Vec<i64>>,
    #[serde(default)]
    pub feature_names: Vec<String>,
}

impl CategoricalEncoder for OrdinalEncoder {
    fn n_columns(&self) -> usize {
        self.categories.len()
    }

    fn output_width(&self) -> usize {
        self.categories.len()
    }

    fn transform(&self, values: &[i64]) -> Result<Array1<f64>, ModelError> {
        let hits = positions(&self.categories, &self.feature_names, values)?;
        Ok(hits.into_iter().map(|h| h as f64).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vec<Vec<i64>> {
        vec![vec![0, 1, 2, 3], vec![0, 1, 2], vec![1, 2, 3]]
    }

    #[test]
    fn test_one_hot_layout_follows_column_order() {
        let enc = OneHotEncoder { categories: vocab(), feature_names: Vec::new() };
        assert_eq!(enc.output_width(), 10);

        let out = enc.transform(&[3, 0, 1]).unwrap();
        let expected = [0., 0., 0., 1., 1., 0., 0., 1., 0., 0.];
        assert_eq!(out.to_vec(), expected.to_vec());
    }

    #[test]
    fn test_ordinal_indices() {
        let enc = OrdinalEncoder { categories: vocab(), feature_names: Vec::new() };
        assert_eq!(enc.transform(&[2, 1, 3]).unwrap().to_vec(), vec![2.0, 1.0, 2.0]);
    }

    #[test]
    fn test_unseen_value_names_column() {
        let enc = OneHotEncoder { categories: vocab(), feature_names: Vec::new() };
        let err = enc.transform(&[1, 1, 0]).unwrap_err();
        assert_eq!(err, ModelError::UnseenCategory { column: "thal".to_string(), value: 0 });

        let named = OrdinalEncoder {
            categories: vocab(),
            feature_names: vec!["chest_pain".into(), "st_slope".into(), "thalassemia".into()],
        };
        let err = named.transform(&[7, 1, 1]).unwrap_err();
        assert_eq!(err, ModelError::UnseenCategory { column: "chest_pain".to_string(), value: 7 });
    }

    #[test]
    fn test_artifact_tagging_and_width_mismatch() {
        let json = r#"{"type":"one_hot","categories":[[0,1],[5]]}"#;
        let enc: EncoderArtifact = serde_json::from_str(json).unwrap();
        assert_eq!(enc.n_columns(), 2);
        assert_eq!(enc.output_width(), 3);
        assert_eq!(
            enc.transform(&[1, 5, 9]).unwrap_err(),
            ModelError::ShapeMismatch { expected: 2, got: 3 }
        );
    }
}
