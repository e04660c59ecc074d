//! HTTP handlers and router assembly.
//!
//! Search and layer-data responses always come back as a FeatureCollection
//! or layer payload with HTTP 200 — upstream failure states ride inside the
//! envelope. Only a genuinely unknown layer id maps to 404.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use metrics::counter;
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use geoportal_protocol::FeatureCollection;
use nspd_client::SearchBounds;

use crate::state::AppState;

/// Build the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/api/maps/available-layers/", get(available_layers))
        .route("/api/maps/layer-data/:layer_id", get(layer_data))
        .route("/api/nspd/thematic-search/", get(thematic_search))
        .route("/api/nspd/fallback/", get(fallback))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "layers-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    state.metrics.render()
}

/// All available layers: store, static files, and NSPD virtual layers.
async fn available_layers(State(state): State<AppState>) -> impl IntoResponse {
    counter!("layers_list_requests_total").increment(1);
    let layers = state.catalog.list_layers().await;
    info!(count = layers.len(), "listed available layers");
    Json(layers)
}

/// Resolve one layer's data payload by id.
async fn layer_data(
    State(state): State<AppState>,
    Path(layer_id): Path<String>,
) -> impl IntoResponse {
    counter!("layer_data_requests_total").increment(1);

    match state.catalog.resolve_layer_data(&layer_id).await {
        Some(payload) => (StatusCode::OK, Json(payload)),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": format!("Layer not found: {}", layer_id) })),
        ),
    }
}

#[derive(Debug, Deserialize)]
struct ThematicSearchQuery {
    #[serde(default)]
    query: String,
    #[serde(default)]
    thematic_search: String,
    north: Option<f64>,
    east: Option<f64>,
    south: Option<f64>,
    west: Option<f64>,
}

impl ThematicSearchQuery {
    /// Bounds are only meaningful when all four edges are present.
    fn bounds(&self) -> Option<SearchBounds> {
        match (self.north, self.east, self.south, self.west) {
            (Some(north), Some(east), Some(south), Some(west)) => Some(SearchBounds {
                north,
                east,
                south,
                west,
            }),
            _ => None,
        }
    }
}

/// Thematic search against the NSPD upstream. Always HTTP 200; validation
/// and upstream failures are reported inside the collection envelope.
async fn thematic_search(
    State(state): State<AppState>,
    Query(params): Query<ThematicSearchQuery>,
) -> Json<FeatureCollection> {
    counter!("thematic_search_requests_total").increment(1);
    info!(query = %params.query, category = %params.thematic_search, "thematic search request");

    let collection = state
        .catalog
        .nspd()
        .thematic_search(&params.query, &params.thematic_search, params.bounds())
        .await;

    Json(collection)
}

/// Static degraded response for when the upstream is known to be down.
async fn fallback() -> Json<FeatureCollection> {
    Json(FeatureCollection::fallback(
        "NSPD data is currently unavailable. Please try again later.",
    ))
}
