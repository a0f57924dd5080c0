use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::domain::{FeatureSchema, RecordSet, SchemaError};
use crate::evaluation::{
    calibration_points, AcceptanceError, AcceptancePolicy, CalibrationCurve,
    DecisionThresholdPolicy, EvaluationError, EvaluationResult, EvaluationService,
    MetricsProvider, ModelAcceptanceUseCase, ModelReview,
};
use crate::features::{FeatureEngineeringPipeline, FeatureError};
use crate::prediction::{DiabetesPrediction, PredictionError, PredictionService};

/// Labels and probabilities scored by a model on a held-out set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub y_true: Vec<u8>,
    pub y_proba: Vec<f64>,
    /// Overrides the configured decision policy for this request.
    #[serde(default)]
    pub threshold: Option<DecisionThresholdPolicy>,
    #[serde(default)]
    pub calibration_bins: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub evaluation: EvaluationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calibration: Option<CalibrationCurve>,
}

#[derive(Debug, thiserror::Error)]
pub enum RiskServiceError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Features(#[from] FeatureError),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error(transparent)]
    Acceptance(#[from] AcceptanceError),
    #[error(transparent)]
    Prediction(#[from] PredictionError),
}

/// Facade over the pipeline, evaluation and decision components, wired from
/// the loaded configuration.
pub struct RiskService<M> {
    schema: FeatureSchema,
    pipeline: Arc<FeatureEngineeringPipeline>,
    evaluation: EvaluationService<M>,
    acceptance: AcceptancePolicy,
}

impl<M> RiskService<M>
where
    M: MetricsProvider,
{
    pub fn new(
        schema: FeatureSchema,
        pipeline: Arc<FeatureEngineeringPipeline>,
        evaluation: EvaluationService<M>,
        acceptance: AcceptancePolicy,
    ) -> Self {
        Self {
            schema,
            pipeline,
            evaluation,
            acceptance,
        }
    }

    pub fn from_config(config: &AppConfig, metrics: Arc<M>) -> Self {
        Self::new(
            FeatureSchema::standard(),
            Arc::new(FeatureEngineeringPipeline::new(config.features)),
            EvaluationService::new(metrics, config.decision),
            config.acceptance,
        )
    }

    pub fn pipeline(&self) -> &FeatureEngineeringPipeline {
        &self.pipeline
    }

    pub fn decision_policy(&self) -> DecisionThresholdPolicy {
        self.evaluation.policy()
    }

    /// Validates raw records against the schema, then enriches them.
    pub fn engineer_features(&self, records: &RecordSet) -> Result<RecordSet, RiskServiceError> {
        self.schema.validate_records(records)?;
        Ok(self.pipeline.transform(records)?)
    }

    pub fn evaluate(&self, request: &EvaluationRequest) -> Result<EvaluationReport, RiskServiceError> {
        let evaluation = self
            .evaluation_for(request.threshold)
            .evaluate(&request.y_true, &request.y_proba)?;
        let calibration = request
            .calibration_bins
            .map(|bins| calibration_points(&request.y_true, &request.y_proba, bins))
            .transpose()?;
        Ok(EvaluationReport {
            evaluation,
            calibration,
        })
    }

    /// Evaluates and gates the model; rejection is an error.
    pub fn review_model(&self, request: &EvaluationRequest) -> Result<ModelReview, RiskServiceError> {
        let use_case =
            ModelAcceptanceUseCase::new(self.evaluation_for(request.threshold), self.acceptance);
        Ok(use_case.execute(&request.y_true, &request.y_proba)?)
    }

    pub fn interpret(
        &self,
        probability: f64,
        threshold: Option<DecisionThresholdPolicy>,
    ) -> Result<DiabetesPrediction, RiskServiceError> {
        let policy = threshold.unwrap_or_else(|| self.decision_policy());
        Ok(PredictionService::new(policy).interpret(probability)?)
    }

    fn evaluation_for(&self, threshold: Option<DecisionThresholdPolicy>) -> EvaluationService<M> {
        self.evaluation
            .with_policy(threshold.unwrap_or_else(|| self.decision_policy()))
    }
}
