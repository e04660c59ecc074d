//! Layer catalog metadata.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a layer's data comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// Metadata record in the layer store; data served from `source_url`.
    Db,
    /// GeoJSON payload stored directly in the layer store record.
    DbGeojson,
    /// `*.geojson` file discovered on disk at catalog time.
    Static,
    /// Backed by an NSPD thematic-search category.
    Nspd,
}

/// A catalog entry describing one map layer.
///
/// Store-backed layers carry numeric-looking ids; static and NSPD layers use
/// the `static_*` / `nspd_*` prefix schemes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    /// Layer identifier.
    pub id: String,

    /// Human-readable display name.
    pub name: String,

    /// Optional description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Data source kind.
    pub source_type: SourceType,

    /// URL the frontend can fetch the layer data from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,

    /// Rendering style configuration.
    pub style: Value,
}

/// Derive a display name from a file slug: underscores become spaces and
/// each word is title-cased ("city_parks" -> "City Parks").
pub fn title_from_slug(slug: &str) -> String {
    slug.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
