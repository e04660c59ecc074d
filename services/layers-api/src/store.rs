//! Layer store collaborator interface.
//!
//! Persistence of layer records lives outside this service; the catalog
//! only needs to list records and fetch one by id. [`MemoryLayerStore`]
//! backs tests and standalone deployments without a database.

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use geoportal_protocol::SourceType;

/// A persisted layer record.
#[derive(Debug, Clone)]
pub struct StoredLayer {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub source_type: SourceType,
    pub source_url: Option<String>,
    pub style: Value,
    /// GeoJSON payload for `db_geojson` layers; `None` for layers whose
    /// data is served from `source_url`.
    pub data: Option<Value>,
}

/// Read access to persisted layer records.
#[async_trait]
pub trait LayerStore: Send + Sync {
    async fn list(&self) -> Result<Vec<StoredLayer>>;
    async fn get(&self, id: i64) -> Result<Option<StoredLayer>>;
}

/// In-memory layer store.
#[derive(Default)]
pub struct MemoryLayerStore {
    layers: RwLock<BTreeMap<i64, StoredLayer>>,
}

impl MemoryLayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, layer: StoredLayer) {
        self.layers.write().await.insert(layer.id, layer);
    }
}

#[async_trait]
impl LayerStore for MemoryLayerStore {
    async fn list(&self) -> Result<Vec<StoredLayer>> {
        Ok(self.layers.read().await.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> Result<Option<StoredLayer>> {
        Ok(self.layers.read().await.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryLayerStore::new();
        store
            .insert(StoredLayer {
                id: 1,
                name: "Districts".to_string(),
                description: None,
                source_type: SourceType::Db,
                source_url: Some("/data/districts".to_string()),
                style: json!({}),
                data: None,
            })
            .await;

        assert_eq!(store.list().await.unwrap().len(), 1);
        assert!(store.get(1).await.unwrap().is_some());
        assert!(store.get(2).await.unwrap().is_none());
    }
}
