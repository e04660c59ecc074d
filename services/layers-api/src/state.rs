//! Shared application state.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use crate::catalog::LayerCatalog;

/// State shared across request handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<LayerCatalog>,
    pub metrics: PrometheusHandle,
}

impl AppState {
    pub fn new(catalog: Arc<LayerCatalog>, metrics: PrometheusHandle) -> Self {
        Self { catalog, metrics }
    }
}
