//! Architecture Verification Suite
//!
//! The loaded artifacts are shared by every request without locks, so every
//! piece that holds them must be thread-safe.

#[cfg(test)]
mod architecture_tests {
    use heart_risk::models::{CategoricalEncoder, Classifier, RecordClassifier};

    // 1. Model backends can sit behind an Arc shared across request tasks.
    #[test]
    fn test_backends_are_thread_safe() {
        fn assert_send_sync<T: Send + Sync>() {}

        assert_send_sync::<heart_risk::models::LogisticRegression>();
        assert_send_sync::<heart_risk::models::RandomForest>();
        assert_send_sync::<heart_risk::models::OneHotEncoder>();
        assert_send_sync::<heart_risk::models::OrdinalEncoder>();
        assert_send_sync::<heart_risk::models::PipelineArtifact>();
    }

    // 2. The orchestrator and its parts are shared state.
    #[test]
    fn test_service_is_thread_safe() {
        fn assert_send_sync<T: Send + Sync>() {}

        assert_send_sync::<heart_risk::Artifacts>();
        assert_send_sync::<heart_risk::features::FeatureAssembler>();
        assert_send_sync::<heart_risk::inference::InferenceEngine>();
        assert_send_sync::<heart_risk::PredictionService>();
    }

    // 3. Concrete artifacts implement the traits the pipeline is written against.
    #[test]
    fn test_artifacts_implement_backend_traits() {
        fn assert_classifier<T: Classifier>() {}
        fn assert_encoder<T: CategoricalEncoder>() {}
        fn assert_record_classifier<T: RecordClassifier>() {}

        assert_classifier::<heart_risk::models::ClassifierArtifact>();
        assert_encoder::<heart_risk::models::EncoderArtifact>();
        assert_record_classifier::<heart_risk::models::PipelineArtifact>();
    }
}
