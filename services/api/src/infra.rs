use credit_risk::scoring::ScoringEngine;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Process-wide handles shared with the operational routes.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) engine: Arc<ScoringEngine>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}
