//! Tests for the layer resolution facade: catalog merging across sources
//! and the composite identifier dispatch.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::json;

use geoportal_protocol::SourceType;
use layers_api::catalog::LayerCatalog;
use layers_api::store::{LayerStore, MemoryLayerStore, StoredLayer};
use nspd_client::{NspdClient, NspdConfig, Transport, TransportError, TransportResponse};

/// Transport that refuses every call; catalog tests must not depend on the
/// upstream being reachable.
struct UnreachableTransport;

#[async_trait]
impl Transport for UnreachableTransport {
    async fn get(
        &self,
        _url: &str,
        _params: &[(String, String)],
    ) -> Result<TransportResponse, TransportError> {
        Err(TransportError::Connect("unreachable".to_string()))
    }
}

/// Store whose backend is down.
struct FailingStore;

#[async_trait]
impl LayerStore for FailingStore {
    async fn list(&self) -> Result<Vec<StoredLayer>> {
        Err(anyhow!("store backend down"))
    }

    async fn get(&self, _id: i64) -> Result<Option<StoredLayer>> {
        Err(anyhow!("store backend down"))
    }
}

fn nspd_client() -> Arc<NspdClient> {
    let config = NspdConfig {
        retry_delay: Duration::from_millis(1),
        ..NspdConfig::default()
    };
    Arc::new(NspdClient::with_transport(
        Arc::new(UnreachableTransport),
        config,
    ))
}

fn catalog_with(store: Arc<dyn LayerStore>, static_dirs: Vec<PathBuf>) -> LayerCatalog {
    LayerCatalog::new(store, nspd_client(), static_dirs)
}

fn stored_layer(id: i64, source_type: SourceType, data: Option<serde_json::Value>) -> StoredLayer {
    StoredLayer {
        id,
        name: format!("Layer {}", id),
        description: Some("from store".to_string()),
        source_type,
        source_url: Some(format!("/data/{}", id)),
        style: json!({"fillColor": "#123456"}),
        data,
    }
}

#[tokio::test]
async fn test_list_always_contains_the_four_nspd_layers() {
    let catalog = catalog_with(Arc::new(MemoryLayerStore::new()), vec![]);

    let layers = catalog.list_layers().await;
    let nspd_ids: Vec<&str> = layers
        .iter()
        .filter(|layer| layer.source_type == SourceType::Nspd)
        .map(|layer| layer.id.as_str())
        .collect();

    assert_eq!(
        nspd_ids,
        vec!["nspd_cad_del", "nspd_admin_del", "nspd_zouit", "nspd_ter_zone"]
    );
}

#[tokio::test]
async fn test_list_merges_store_and_static_layers() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("park_zones.geojson"),
        r#"{"type":"FeatureCollection","features":[]}"#,
    )
    .unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let store = MemoryLayerStore::new();
    store.insert(stored_layer(7, SourceType::Db, None)).await;

    let catalog = catalog_with(Arc::new(store), vec![dir.path().to_path_buf()]);
    let layers = catalog.list_layers().await;

    assert_eq!(layers.len(), 6); // 1 store + 1 static + 4 nspd
    assert_eq!(layers[0].id, "7");

    let static_layer = layers
        .iter()
        .find(|layer| layer.id == "static_park_zones")
        .expect("static layer discovered");
    assert_eq!(static_layer.name, "Park Zones");
    assert_eq!(static_layer.source_type, SourceType::Static);
    assert_eq!(
        static_layer.source_url.as_deref(),
        Some("/static/layers/park_zones.geojson")
    );
}

#[tokio::test]
async fn test_store_failure_does_not_block_other_sources() {
    let catalog = catalog_with(Arc::new(FailingStore), vec![]);

    let layers = catalog.list_layers().await;
    assert_eq!(layers.len(), 4); // nspd layers still listed
}

#[tokio::test]
async fn test_missing_static_directories_yield_no_static_layers() {
    let catalog = catalog_with(
        Arc::new(MemoryLayerStore::new()),
        vec![PathBuf::from("/definitely/not/here")],
    );

    let layers = catalog.list_layers().await;
    assert!(layers
        .iter()
        .all(|layer| layer.source_type != SourceType::Static));
}

#[tokio::test]
async fn test_resolve_db_geojson_layer_returns_payload() {
    let payload = json!({"type": "FeatureCollection", "features": [{"id": "a"}]});
    let store = MemoryLayerStore::new();
    store
        .insert(stored_layer(3, SourceType::DbGeojson, Some(payload.clone())))
        .await;

    let catalog = catalog_with(Arc::new(store), vec![]);
    assert_eq!(catalog.resolve_layer_data("3").await, Some(payload));
}

#[tokio::test]
async fn test_resolve_plain_db_layer_returns_metadata() {
    let store = MemoryLayerStore::new();
    store.insert(stored_layer(4, SourceType::Db, None)).await;

    let catalog = catalog_with(Arc::new(store), vec![]);
    let resolved = catalog.resolve_layer_data("4").await.unwrap();

    assert_eq!(resolved["id"], 4);
    assert_eq!(resolved["source_type"], "db");
    assert_eq!(resolved["source_url"], "/data/4");
}

#[tokio::test]
async fn test_resolve_unknown_numeric_id() {
    let catalog = catalog_with(Arc::new(MemoryLayerStore::new()), vec![]);
    assert_eq!(catalog.resolve_layer_data("99").await, None);
}

#[tokio::test]
async fn test_resolve_static_layer_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let contents = json!({"type": "Feature", "geometry": null, "properties": {"name": "x"}});
    std::fs::write(
        dir.path().join("boundaries.geojson"),
        serde_json::to_string(&contents).unwrap(),
    )
    .unwrap();

    let catalog = catalog_with(
        Arc::new(MemoryLayerStore::new()),
        vec![PathBuf::from("/missing/first"), dir.path().to_path_buf()],
    );

    assert_eq!(
        catalog.resolve_layer_data("static_boundaries").await,
        Some(contents)
    );
}

#[tokio::test]
async fn test_resolve_absent_static_layer_returns_stub() {
    let catalog = catalog_with(Arc::new(MemoryLayerStore::new()), vec![]);

    let resolved = catalog.resolve_layer_data("static_city_parks").await.unwrap();
    assert_eq!(resolved["id"], "static_city_parks");
    assert_eq!(resolved["name"], "City Parks");
    assert_eq!(resolved["source_url"], "/static/layers/city_parks.geojson");
}

#[tokio::test]
async fn test_resolve_nspd_layer_returns_collection_envelope() {
    let catalog = catalog_with(Arc::new(MemoryLayerStore::new()), vec![]);

    // Empty-query search: the orchestrator answers without touching the
    // (unreachable) upstream.
    let resolved = catalog.resolve_layer_data("nspd_cad_del").await.unwrap();
    assert_eq!(resolved["type"], "FeatureCollection");
    assert_eq!(resolved["features"].as_array().unwrap().len(), 0);
    assert!(resolved["message"].as_str().is_some());
}

#[tokio::test]
async fn test_resolve_nspd_rejects_unknown_and_unlisted_categories() {
    let catalog = catalog_with(Arc::new(MemoryLayerStore::new()), vec![]);

    // `objects` is searchable but has no virtual layer.
    assert_eq!(catalog.resolve_layer_data("nspd_objects").await, None);
    assert_eq!(catalog.resolve_layer_data("nspd_bogus").await, None);
}

#[tokio::test]
async fn test_resolve_unknown_identifier_shape() {
    let catalog = catalog_with(Arc::new(MemoryLayerStore::new()), vec![]);
    assert_eq!(catalog.resolve_layer_data("mystery-layer").await, None);
}
