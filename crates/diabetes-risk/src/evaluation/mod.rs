//! Turns model probabilities into audited binary decisions and metrics.

mod acceptance;
mod calibration;
mod confusion;
mod metrics;
mod policy;
mod service;
mod threshold;

#[cfg(test)]
mod tests;

pub use acceptance::{
    AcceptanceError, AcceptancePolicy, ModelAcceptanceUseCase, ModelRejected, ModelReview,
    ModelStatus, RejectedMetric,
};
pub use calibration::{calibration_points, CalibrationCurve, DEFAULT_CALIBRATION_BINS};
pub use confusion::{ConfusionMatrix, Normalization};
pub use metrics::{names as metric_names, MetricsError, MetricsProvider, MetricsReport, StandardMetrics};
pub use policy::{DecisionThresholdPolicy, PolicyError};
pub use service::{EvaluationResult, EvaluationService};
pub use threshold::ThresholdService;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("nothing to evaluate: no labels supplied")]
    EmptyInput,
    #[error("{labels} labels but {predictions} predictions")]
    LengthMismatch { labels: usize, predictions: usize },
    #[error("label at index {index} must be 0 or 1, got {value}")]
    InvalidLabel { index: usize, value: u8 },
    #[error("probability at index {index} must lie in [0, 1], got {value}")]
    InvalidProbability { index: usize, value: f64 },
    #[error(transparent)]
    Metrics(#[from] MetricsError),
}
