use std::sync::Arc;

use tracing::info;

use super::{DiabetesPrediction, PredictionError, PredictionService, ProbabilityModel};
use crate::domain::{ColumnRole, FeatureSchema, PatientRecord, SchemaError};
use crate::features::FeatureEngineeringPipeline;

/// Validates a raw patient record, enriches it and interprets the model's
/// probability.
pub struct PredictPatientUseCase<M: ?Sized> {
    schema: FeatureSchema,
    pipeline: Arc<FeatureEngineeringPipeline>,
    predictions: PredictionService,
    model: Arc<M>,
}

impl<M> PredictPatientUseCase<M>
where
    M: ProbabilityModel + ?Sized,
{
    pub fn new(
        schema: FeatureSchema,
        pipeline: Arc<FeatureEngineeringPipeline>,
        predictions: PredictionService,
        model: Arc<M>,
    ) -> Self {
        Self {
            schema,
            pipeline,
            predictions,
            model,
        }
    }

    pub fn execute(&self, record: &PatientRecord) -> Result<DiabetesPrediction, PredictionError> {
        self.schema
            .validate(record)
            .map_err(|violation| SchemaError { row: 0, violation })?;

        let mut features = self.pipeline.transform_record(record)?;
        for target in self.schema.columns_with_role(ColumnRole::Target) {
            features.remove(target);
        }

        let prediction = self.predictions.predict(self.model.as_ref(), &features)?;
        info!(
            probability = prediction.probability,
            label = prediction.predicted_label,
            risk_level = prediction.risk_level.label(),
            "patient scored"
        );
        Ok(prediction)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::domain::SchemaViolation;
    use crate::evaluation::DecisionThresholdPolicy;
    use crate::prediction::{ModelError, RiskLevel};

    /// Returns a fixed probability and remembers the record it scored.
    struct RecordingModel {
        probability: f64,
        seen: Mutex<Option<PatientRecord>>,
    }

    impl RecordingModel {
        fn returning(probability: f64) -> Self {
            Self {
                probability,
                seen: Mutex::new(None),
            }
        }
    }

    impl ProbabilityModel for RecordingModel {
        fn predict_proba(&self, features: &PatientRecord) -> Result<f64, ModelError> {
            *self.seen.lock().expect("lock") = Some(features.clone());
            Ok(self.probability)
        }
    }

    struct BrokenModel;

    impl ProbabilityModel for BrokenModel {
        fn predict_proba(&self, _features: &PatientRecord) -> Result<f64, ModelError> {
            Err(ModelError("weights not loaded".to_string()))
        }
    }

    fn raw_patient() -> PatientRecord {
        serde_json::from_value(json!({
            "age": 58, "gender": "Female", "ethnicity": "Asian",
            "education_level": "Graduate", "income_level": "Middle",
            "employment_status": "Retired", "smoking_status": "Former",
            "alcohol_consumption_per_week": 3, "physical_activity_minutes_per_week": 90,
            "diet_score": 5.4, "sleep_hours_per_day": 6.5, "screen_time_hours_per_day": 7.0,
            "family_history_diabetes": 1, "hypertension_history": 1,
            "cardiovascular_history": 0, "bmi": 29.4, "waist_to_hip_ratio": 0.95,
            "systolic_bp": 142, "diastolic_bp": 91, "heart_rate": 78,
            "cholesterol_total": 228, "hdl_cholesterol": 42, "ldl_cholesterol": 150,
            "triglycerides": 180, "glucose_fasting": 118, "glucose_postprandial": 165,
            "insulin_level": 14.2, "hba1c": 6.1,
            "diagnosed_diabetes": 1
        }))
        .expect("record deserializes")
    }

    fn use_case<M: ProbabilityModel>(model: Arc<M>) -> PredictPatientUseCase<M> {
        PredictPatientUseCase::new(
            FeatureSchema::standard(),
            Arc::new(FeatureEngineeringPipeline::default()),
            PredictionService::new(DecisionThresholdPolicy::prevention()),
            model,
        )
    }

    #[test]
    fn model_scores_enriched_record_without_target() {
        let model = Arc::new(RecordingModel::returning(0.62));

        let prediction = use_case(Arc::clone(&model))
            .execute(&raw_patient())
            .expect("prediction succeeds");

        assert_eq!(prediction.predicted_label, 1);
        assert_eq!(prediction.risk_level, RiskLevel::High);
        assert_eq!(prediction.threshold_used, 0.30);

        let seen = model
            .seen
            .lock()
            .expect("lock")
            .clone()
            .expect("model was called");
        assert!(seen.contains("homa_ir"));
        assert!(seen.contains("lifestyle_score"));
        assert!(!seen.contains("diagnosed_diabetes"));
        assert_eq!(seen.text("employment_status"), Ok(Some("Inactive")));
    }

    #[test]
    fn schema_violations_stop_before_the_model() {
        let model = Arc::new(RecordingModel::returning(0.5));
        let mut record = raw_patient();
        record.set("bmi", "overweight");

        let error = use_case(Arc::clone(&model))
            .execute(&record)
            .expect_err("bmi must be numeric");

        match error {
            PredictionError::Schema(SchemaError { violation, .. }) => assert_eq!(
                violation,
                SchemaViolation::TypeMismatch {
                    column: "bmi".to_string(),
                    expected: "float",
                    found: "text",
                }
            ),
            other => panic!("expected schema error, got {other:?}"),
        }
        assert!(model.seen.lock().expect("lock").is_none());
    }

    #[test]
    fn model_failures_propagate() {
        let error = use_case(Arc::new(BrokenModel))
            .execute(&raw_patient())
            .expect_err("model fails");

        assert!(matches!(error, PredictionError::Model(_)));
    }

    #[test]
    fn invalid_model_output_is_rejected() {
        let error = use_case(Arc::new(RecordingModel::returning(1.7)))
            .execute(&raw_patient())
            .expect_err("probability out of range");

        assert!(matches!(error, PredictionError::InvalidProbability(_)));
    }
}
