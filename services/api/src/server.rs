use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_prediction_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use credit_risk::config::AppConfig;
use credit_risk::error::AppError;
use credit_risk::scoring::{ArtifactLoader, CreditScoringService, ScoringEngine};
use credit_risk::telemetry;
use std::sync::Arc;
use tracing::{error, info};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(model) = args.model.take() {
        config.model.artifact_path = model;
    }

    telemetry::init(&config.telemetry)?;

    let loader = Arc::new(ArtifactLoader::new(config.model.artifact_path.clone()));
    let engine = Arc::new(ScoringEngine::new(loader));
    if let Err(err) = engine.warm_up() {
        error!(
            error = %err,
            path = %config.model.artifact_path.display(),
            "classifier warm-up failed; predictions will retry the load"
        );
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let app_state = AppState {
        engine: engine.clone(),
        metrics: Arc::new(prometheus_handle),
    };
    let service = Arc::new(CreditScoringService::new(engine.clone()));

    let app = with_prediction_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(
        ?config.environment,
        %addr,
        model = engine.state().label(),
        "credit risk service listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
