//! Layer resolution facade.
//!
//! The catalog is assembled fresh per request: store records, a directory
//! scan for static GeoJSON files, and four fixed NSPD-backed virtual
//! layers. Each source degrades independently — an unreachable store or a
//! missing directory never hides the other sources.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, warn};

use geoportal_protocol::{layer::title_from_slug, Layer, SourceType};
use nspd_client::{NspdClient, ThematicCategory};

use crate::store::{LayerStore, StoredLayer};

/// The thematic categories exposed as virtual catalog layers. `objects` is
/// searchable but deliberately has no layer of its own.
pub const NSPD_LAYER_CATEGORIES: [ThematicCategory; 4] = [
    ThematicCategory::CadDel,
    ThematicCategory::AdminDel,
    ThematicCategory::Zouit,
    ThematicCategory::TerZone,
];

/// Merges and resolves layers across the store, the static directory, and
/// the NSPD client.
pub struct LayerCatalog {
    store: Arc<dyn LayerStore>,
    nspd: Arc<NspdClient>,
    static_dirs: Vec<PathBuf>,
}

impl LayerCatalog {
    pub fn new(
        store: Arc<dyn LayerStore>,
        nspd: Arc<NspdClient>,
        static_dirs: Vec<PathBuf>,
    ) -> Self {
        Self {
            store,
            nspd,
            static_dirs,
        }
    }

    /// The NSPD client behind the catalog's virtual layers.
    pub fn nspd(&self) -> &NspdClient {
        &self.nspd
    }

    /// List every available layer: store records, then static files, then
    /// the four NSPD virtual layers.
    pub async fn list_layers(&self) -> Vec<Layer> {
        let mut layers: Vec<Layer> = match self.store.list().await {
            Ok(stored) => stored.into_iter().map(layer_from_stored).collect(),
            Err(err) => {
                warn!(error = %err, "layer store unavailable, listing without store layers");
                Vec::new()
            }
        };

        layers.extend(self.scan_static_layers());
        layers.extend(nspd_layers());
        layers
    }

    /// Resolve a layer's data payload by its composite identifier.
    ///
    /// Numeric ids go to the store, `static_*` ids to the filesystem,
    /// `nspd_*` ids to an empty-query thematic search. Unknown shapes
    /// resolve to `None`.
    pub async fn resolve_layer_data(&self, layer_id: &str) -> Option<Value> {
        if let Ok(id) = layer_id.parse::<i64>() {
            return self.resolve_store_layer(id).await;
        }

        if let Some(stem) = layer_id.strip_prefix("static_") {
            return Some(self.resolve_static_layer(layer_id, stem));
        }

        if let Some(category) = layer_id.strip_prefix("nspd_") {
            return self.resolve_nspd_layer(category).await;
        }

        debug!(layer_id = %layer_id, "unknown layer identifier shape");
        None
    }

    async fn resolve_store_layer(&self, id: i64) -> Option<Value> {
        let stored = match self.store.get(id).await {
            Ok(stored) => stored?,
            Err(err) => {
                warn!(id, error = %err, "layer store lookup failed");
                return None;
            }
        };

        if stored.source_type == SourceType::DbGeojson {
            // Payload lives in the record itself.
            return stored.data;
        }

        Some(json!({
            "id": stored.id,
            "name": stored.name,
            "description": stored.description,
            "source_type": stored.source_type,
            "source_url": stored.source_url,
            "style": stored.style,
        }))
    }

    /// Read a static layer file from the first candidate directory that has
    /// it. When the file is absent everywhere, return a metadata stub so
    /// the frontend can still fetch it by URL.
    fn resolve_static_layer(&self, layer_id: &str, stem: &str) -> Value {
        let filename = format!("{}.geojson", stem);

        for dir in &self.static_dirs {
            let path = dir.join(&filename);
            if !path.exists() {
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(contents) => match serde_json::from_str(&contents) {
                    Ok(value) => {
                        debug!(path = %path.display(), "loaded static layer file");
                        return value;
                    }
                    Err(err) => {
                        warn!(path = %path.display(), error = %err, "static layer file is not valid JSON");
                    }
                },
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "failed to read static layer file");
                }
            }
        }

        debug!(layer_id = %layer_id, "static layer file not found, returning metadata stub");
        json!({
            "id": layer_id,
            "name": title_from_slug(stem),
            "description": format!("Static layer from file {}", filename),
            "source_type": "static",
            "source_url": format!("/static/layers/{}", filename),
            "style": default_static_style(),
        })
    }

    async fn resolve_nspd_layer(&self, category: &str) -> Option<Value> {
        if !NSPD_LAYER_CATEGORIES
            .iter()
            .any(|known| known.as_str() == category)
        {
            return None;
        }

        // An empty query asks the orchestrator for the layer's default
        // response; upstream failures come back as the fallback payload,
        // never as an error.
        let collection = self.nspd.thematic_search("", category, None).await;
        serde_json::to_value(collection).ok()
    }

    /// One synthesized layer per `*.geojson` file in the first existing
    /// candidate directory. Scan failures mean no static layers.
    fn scan_static_layers(&self) -> Vec<Layer> {
        let dir = match self.static_dirs.iter().find(|dir| dir.exists()) {
            Some(dir) => dir,
            None => {
                debug!("no static layer directory found");
                return Vec::new();
            }
        };

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(dir = %dir.display(), error = %err, "failed to scan static layer directory");
                return Vec::new();
            }
        };

        let mut layers = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("geojson") {
                continue;
            }
            let stem = match path.file_stem().and_then(|stem| stem.to_str()) {
                Some(stem) => stem,
                None => continue,
            };
            let filename = format!("{}.geojson", stem);

            debug!(layer = %stem, dir = %dir.display(), "discovered static layer");
            layers.push(Layer {
                id: format!("static_{}", stem),
                name: title_from_slug(stem),
                description: Some(format!("Static layer from file {}", filename)),
                source_type: SourceType::Static,
                source_url: Some(format!("/static/layers/{}", filename)),
                style: default_static_style(),
            });
        }

        layers.sort_by(|a, b| a.id.cmp(&b.id));
        layers
    }
}

fn layer_from_stored(stored: StoredLayer) -> Layer {
    Layer {
        id: stored.id.to_string(),
        name: stored.name,
        description: stored.description,
        source_type: stored.source_type,
        source_url: stored.source_url,
        style: stored.style,
    }
}

/// The four upstream-backed virtual layers. Compile-time constants in
/// spirit; ids are `nspd_` + category.
pub fn nspd_layers() -> Vec<Layer> {
    let entries = [
        (
            ThematicCategory::CadDel,
            "Cadastral divisions",
            "Cadastral division boundaries from NSPD",
            "#FF5733",
        ),
        (
            ThematicCategory::AdminDel,
            "Administrative divisions",
            "Administrative division boundaries from NSPD",
            "#33FF57",
        ),
        (
            ThematicCategory::Zouit,
            "Special use condition zones",
            "Zones with special conditions for territory use from NSPD",
            "#3357FF",
        ),
        (
            ThematicCategory::TerZone,
            "Territorial zones",
            "Territorial zones from NSPD",
            "#AA33FF",
        ),
    ];

    entries
        .into_iter()
        .map(|(category, name, description, fill)| Layer {
            id: format!("nspd_{}", category.as_str()),
            name: name.to_string(),
            description: Some(description.to_string()),
            source_type: SourceType::Nspd,
            source_url: Some(format!(
                "/api/nspd/thematic-search/?thematic_search={}&query=",
                category.as_str()
            )),
            style: json!({
                "fillColor": fill,
                "fillOpacity": 0.5,
                "outlineColor": "#000",
            }),
        })
        .collect()
}

fn default_static_style() -> Value {
    json!({
        "fillColor": "#0080ff",
        "fillOpacity": 0.5,
        "outlineColor": "#000",
    })
}
