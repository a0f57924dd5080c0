use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::RecordSet;
use crate::error::AppError;
use crate::evaluation::{DecisionThresholdPolicy, MetricsProvider};
use crate::service::{EvaluationRequest, RiskService};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskRequest {
    pub probability: f64,
    #[serde(default)]
    pub threshold: Option<DecisionThresholdPolicy>,
}

/// Router builder exposing feature engineering, evaluation and decisions.
pub fn risk_router<M>(service: Arc<RiskService<M>>) -> Router
where
    M: MetricsProvider + 'static,
{
    Router::new()
        .route("/api/v1/features", post(features_handler::<M>))
        .route("/api/v1/evaluate", post(evaluate_handler::<M>))
        .route("/api/v1/models/review", post(review_handler::<M>))
        .route("/api/v1/risk", post(risk_handler::<M>))
        .with_state(service)
}

pub(crate) async fn features_handler<M>(
    State(service): State<Arc<RiskService<M>>>,
    Json(records): Json<RecordSet>,
) -> Response
where
    M: MetricsProvider + 'static,
{
    match service.engineer_features(&records) {
        Ok(enriched) => {
            let payload = json!({
                "rows": enriched.len(),
                "derived_columns": service.pipeline().derived_columns(),
                "records": enriched,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn evaluate_handler<M>(
    State(service): State<Arc<RiskService<M>>>,
    Json(request): Json<EvaluationRequest>,
) -> Response
where
    M: MetricsProvider + 'static,
{
    match service.evaluate(&request) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn review_handler<M>(
    State(service): State<Arc<RiskService<M>>>,
    Json(request): Json<EvaluationRequest>,
) -> Response
where
    M: MetricsProvider + 'static,
{
    match service.review_model(&request) {
        Ok(review) => (StatusCode::OK, Json(review)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn risk_handler<M>(
    State(service): State<Arc<RiskService<M>>>,
    Json(request): Json<RiskRequest>,
) -> Response
where
    M: MetricsProvider + 'static,
{
    match service.interpret(request.probability, request.threshold) {
        Ok(prediction) => (StatusCode::OK, Json(prediction)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}
