use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_risk_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use diabetes_risk::config::AppConfig;
use diabetes_risk::error::AppError;
use diabetes_risk::evaluation::StandardMetrics;
use diabetes_risk::telemetry;
use diabetes_risk::RiskService;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let risk_service = Arc::new(RiskService::from_config(&config, Arc::new(StandardMetrics)));

    let app = with_risk_routes(risk_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        threshold = config.decision.threshold(),
        age_groups = %config.features.age_group_strategy,
        "diabetes risk service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
