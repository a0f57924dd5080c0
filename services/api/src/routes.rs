use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use diabetes_risk::evaluation::MetricsProvider;
use diabetes_risk::{risk_router, RiskService};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_risk_routes<M>(service: Arc<RiskService<M>>) -> axum::Router
where
    M: MetricsProvider + 'static,
{
    risk_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use diabetes_risk::config::AppConfig;
    use diabetes_risk::evaluation::StandardMetrics;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    fn state(ready: bool) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        }
    }

    fn app(state: AppState) -> axum::Router {
        let config = AppConfig::load().expect("default config loads");
        let service = Arc::new(RiskService::from_config(&config, Arc::new(StandardMetrics)));
        with_risk_routes(service).layer(Extension(state))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1 << 16)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn readiness_tracks_startup_flag() {
        let starting = state(false);
        let response = readiness_endpoint(Extension(starting.clone()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["status"], "initializing");

        starting.readiness.store(true, Ordering::Release);
        let response = readiness_endpoint(Extension(starting)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn risk_routes_are_mounted_next_to_probes() {
        let response = app(state(true))
            .oneshot(
                Request::post("/api/v1/risk")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"probability": 0.85, "threshold": 0.7}"#))
                    .expect("request"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["risk_level"], "Très élevé");
        assert_eq!(body["predicted_label"], 1);
    }

    #[tokio::test]
    async fn metrics_endpoint_serves_prometheus_text() {
        let response = app(state(true))
            .oneshot(
                Request::get("/metrics")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );
    }
}
