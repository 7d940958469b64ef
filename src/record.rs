//! Patient Record
//!
//! The 13-field input schema and the validating parse that turns a loosely
//! typed JSON body into a `PatientRecord`. Two body shapes are accepted:
//! named fields, or `{"values": [...]}` in column order.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::ops::RangeInclusive;

use crate::error::PredictError;

/// Columns that go through the learned encoder.
pub const CATEGORICAL_COLUMNS: [&str; 3] = ["cp", "slope", "thal"];

/// Columns that pass through unchanged, in declared order.
pub const NUMERIC_COLUMNS: [&str; 10] = [
    "age", "sex", "trestbps", "chol", "fbs", "restecg", "thalach", "exang", "oldpeak", "ca",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldType {
    Int,
    Float,
}

struct Field {
    name: &'static str,
    ty: FieldType,
    /// Coded fields outside the encoded partition. `cp`, `slope` and `thal`
    /// are left to the encoder's vocabulary.
    domain: Option<RangeInclusive<i64>>,
}

const fn field(name: &'static str, ty: FieldType) -> Field {
    Field { name, ty, domain: None }
}

const fn coded(name: &'static str, lo: i64, hi: i64) -> Field {
    Field { name, ty: FieldType::Int, domain: Some(RangeInclusive::new(lo, hi)) }
}

/// Column order the model was trained on.
static SCHEMA: [Field; 13] = [
    field("age", FieldType::Int),
    coded("sex", 0, 1),
    field("cp", FieldType::Int),
    field("trestbps", FieldType::Int),
    field("chol", FieldType::Int),
    coded("fbs", 0, 1),
    coded("restecg", 0, 2),
    field("thalach", FieldType::Int),
    coded("exang", 0, 1),
    field("oldpeak", FieldType::Float),
    field("slope", FieldType::Int),
    coded("ca", 0, 3),
    field("thal", FieldType::Int),
];

/// Field names in the order of `SCHEMA`.
pub fn feature_columns() -> impl Iterator<Item = &'static str> {
    SCHEMA.iter().map(|f| f.name)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub age: i64,
    pub sex: i64,
    pub cp: i64,
    pub trestbps: i64,
    pub chol: i64,
    pub fbs: i64,
    pub restecg: i64,
    pub thalach: i64,
    pub exang: i64,
    pub oldpeak: f64,
    pub slope: i64,
    pub ca: i64,
    pub thal: i64,
}

#[derive(Debug, Clone, Copy)]
enum Scalar {
    Int(i64),
    Float(f64),
}

impl Scalar {
    fn int(self) -> i64 {
        match self {
            Scalar::Int(v) => v,
            Scalar::Float(v) => v as i64,
        }
    }

    fn float(self) -> f64 {
        match self {
            Scalar::Int(v) => v as f64,
            Scalar::Float(v) => v,
        }
    }
}

impl PatientRecord {
    /// Parse either accepted body shape.
    pub fn from_json(body: &Value) -> Result<Self, PredictError> {
        match body {
            Value::Object(map) => match map.get("values") {
                Some(Value::Array(values)) => Self::from_values(values),
                Some(_) => Err(PredictError::invalid(
                    vec!["values".to_string()],
                    "'values' must be a list of 13 numbers",
                )),
                None => Self::from_fields(map),
            },
            _ => Err(PredictError::invalid(
                Vec::new(),
                "request body must be a JSON object",
            )),
        }
    }

    /// Parse the named-field shape. Unknown keys are ignored.
    pub fn from_fields(map: &Map<String, Value>) -> Result<Self, PredictError> {
        let mut problems = Problems::default();
        let mut slots = [Scalar::Int(0); 13];

        for (idx, field) in SCHEMA.iter().enumerate() {
            match map.get(field.name) {
                None | Some(Value::Null) => problems.missing.push(field.name.to_string()),
                Some(v) => problems.check(field, v, &mut slots[idx]),
            }
        }

        problems.report()?;
        Ok(Self::from_slots(&slots))
    }

    /// Parse the ordered-list shape.
    pub fn from_values(values: &[Value]) -> Result<Self, PredictError> {
        if values.len() != SCHEMA.len() {
            return Err(PredictError::invalid(
                vec!["values".to_string()],
                format!("expected {} values, got {}", SCHEMA.len(), values.len()),
            ));
        }

        let mut problems = Problems::default();
        let mut slots = [Scalar::Int(0); 13];
        for (idx, (field, v)) in SCHEMA.iter().zip(values).enumerate() {
            problems.check(field, v, &mut slots[idx]);
        }

        problems.report()?;
        Ok(Self::from_slots(&slots))
    }

    fn from_slots(s: &[Scalar; 13]) -> Self {
        Self {
            age: s[0].int(),
            sex: s[1].int(),
            cp: s[2].int(),
            trestbps: s[3].int(),
            chol: s[4].int(),
            fbs: s[5].int(),
            restecg: s[6].int(),
            thalach: s[7].int(),
            exang: s[8].int(),
            oldpeak: s[9].float(),
            slope: s[10].int(),
            ca: s[11].int(),
            thal: s[12].int(),
        }
    }

    /// All 13 values in `SCHEMA` order.
    pub fn to_values(&self) -> [f64; 13] {
        [
            self.age as f64,
            self.sex as f64,
            self.cp as f64,
            self.trestbps as f64,
            self.chol as f64,
            self.fbs as f64,
            self.restecg as f64,
            self.thalach as f64,
            self.exang as f64,
            self.oldpeak,
            self.slope as f64,
            self.ca as f64,
            self.thal as f64,
        ]
    }

    /// The pass-through partition in `NUMERIC_COLUMNS` order.
    pub fn numeric(&self) -> [f64; 10] {
        [
            self.age as f64,
            self.sex as f64,
            self.trestbps as f64,
            self.chol as f64,
            self.fbs as f64,
            self.restecg as f64,
            self.thalach as f64,
            self.exang as f64,
            self.oldpeak,
            self.ca as f64,
        ]
    }

    /// The encoded partition in `CATEGORICAL_COLUMNS` order.
    pub fn categorical(&self) -> [i64; 3] {
        [self.cp, self.slope, self.thal]
    }

    /// Body in the ordered-list shape, as the dashboard client sends it.
    pub fn to_values_body(&self) -> Value {
        let values: Vec<Value> = SCHEMA
            .iter()
            .zip(self.to_values())
            .map(|(field, v)| match field.ty {
                FieldType::Int => Value::from(v as i64),
                FieldType::Float => Value::from(v),
            })
            .collect();
        serde_json::json!({ "values": values })
    }
}

fn coerce(value: &Value, ty: FieldType) -> Option<Scalar> {
    let n = match value {
        Value::Number(n) => n,
        _ => return None,
    };
    match ty {
        FieldType::Int => {
            if let Some(i) = n.as_i64() {
                return Some(Scalar::Int(i));
            }
            // Integral floats such as 63.0 are accepted.
            let f = n.as_f64()?;
            if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                Some(Scalar::Int(f as i64))
            } else {
                None
            }
        }
        FieldType::Float => n.as_f64().filter(|f| f.is_finite()).map(Scalar::Float),
    }
}

#[derive(Default)]
struct Problems {
    missing: Vec<String>,
    mistyped: Vec<String>,
    out_of_domain: Vec<(String, i64, String)>,
}

impl Problems {
    fn check(&mut self, field: &Field, value: &Value, slot: &mut Scalar) {
        let Some(scalar) = coerce(value, field.ty) else {
            self.mistyped.push(field.name.to_string());
            return;
        };
        if let (Some(domain), Scalar::Int(v)) = (&field.domain, scalar) {
            if !domain.contains(&v) {
                let expected = format!("{}..={}", domain.start(), domain.end());
                self.out_of_domain.push((field.name.to_string(), v, expected));
                return;
            }
        }
        *slot = scalar;
    }

    fn report(self) -> Result<(), PredictError> {
        if self.missing.is_empty() && self.mistyped.is_empty() && self.out_of_domain.is_empty() {
            return Ok(());
        }

        let mut parts = Vec::new();
        if !self.missing.is_empty() {
            parts.push(format!("missing field(s): {}", self.missing.join(", ")));
        }
        if !self.mistyped.is_empty() {
            parts.push(format!("wrong type for field(s): {}", self.mistyped.join(", ")));
        }
        if !self.out_of_domain.is_empty() {
            let detail: Vec<String> = self
                .out_of_domain
                .iter()
                .map(|(name, v, expected)| format!("{name}={v} (expected {expected})"))
                .collect();
            parts.push(format!("out of range: {}", detail.join(", ")));
        }
        let fields = self
            .missing
            .into_iter()
            .chain(self.mistyped)
            .chain(self.out_of_domain.into_iter().map(|(name, _, _)| name))
            .collect();
        Err(PredictError::invalid(fields, parts.join("; ")))
    }
}
