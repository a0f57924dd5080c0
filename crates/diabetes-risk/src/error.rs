use crate::config::ConfigError;
use crate::dataset::DatasetError;
use crate::domain::SchemaError;
use crate::evaluation::{
    AcceptanceError, EvaluationError, MetricsError, ModelRejected, PolicyError,
};
use crate::features::FeatureError;
use crate::prediction::PredictionError;
use crate::service::RiskServiceError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Dataset(DatasetError),
    Schema(SchemaError),
    Features(FeatureError),
    Policy(PolicyError),
    Evaluation(EvaluationError),
    Rejected(ModelRejected),
    Prediction(PredictionError),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Schema(_)
            | AppError::Features(_)
            | AppError::Policy(_)
            | AppError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Evaluation(EvaluationError::Metrics(MetricsError::Provider(_))) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Evaluation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Prediction(PredictionError::Model(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Prediction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Dataset(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Dataset(err) => write!(f, "dataset error: {}", err),
            AppError::Schema(err) => write!(f, "validation error: {}", err),
            AppError::Features(err) => write!(f, "feature engineering error: {}", err),
            AppError::Policy(err) => write!(f, "policy error: {}", err),
            AppError::Evaluation(err) => write!(f, "evaluation error: {}", err),
            AppError::Rejected(err) => write!(f, "{}", err),
            AppError::Prediction(err) => write!(f, "prediction error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Dataset(err) => Some(err),
            AppError::Schema(err) => Some(err),
            AppError::Features(err) => Some(err),
            AppError::Policy(err) => Some(err),
            AppError::Evaluation(err) => Some(err),
            AppError::Rejected(err) => Some(err),
            AppError::Prediction(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Rejected(rejection) => json!({
                "status": "rejected",
                "metric": rejection.metric,
                "value": rejection.value,
                "limit": rejection.limit,
                "error": self.to_string(),
            }),
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<DatasetError> for AppError {
    fn from(value: DatasetError) -> Self {
        Self::Dataset(value)
    }
}

impl From<SchemaError> for AppError {
    fn from(value: SchemaError) -> Self {
        Self::Schema(value)
    }
}

impl From<FeatureError> for AppError {
    fn from(value: FeatureError) -> Self {
        Self::Features(value)
    }
}

impl From<PolicyError> for AppError {
    fn from(value: PolicyError) -> Self {
        Self::Policy(value)
    }
}

impl From<EvaluationError> for AppError {
    fn from(value: EvaluationError) -> Self {
        Self::Evaluation(value)
    }
}

impl From<ModelRejected> for AppError {
    fn from(value: ModelRejected) -> Self {
        Self::Rejected(value)
    }
}

impl From<AcceptanceError> for AppError {
    fn from(value: AcceptanceError) -> Self {
        match value {
            AcceptanceError::Evaluation(err) => Self::Evaluation(err),
            AcceptanceError::Rejected(rejection) => Self::Rejected(rejection),
        }
    }
}

impl From<PredictionError> for AppError {
    fn from(value: PredictionError) -> Self {
        Self::Prediction(value)
    }
}

impl From<RiskServiceError> for AppError {
    fn from(value: RiskServiceError) -> Self {
        match value {
            RiskServiceError::Schema(err) => Self::Schema(err),
            RiskServiceError::Features(err) => Self::Features(err),
            RiskServiceError::Evaluation(err) => Self::Evaluation(err),
            RiskServiceError::Acceptance(err) => err.into(),
            RiskServiceError::Prediction(err) => Self::Prediction(err),
        }
    }
}
