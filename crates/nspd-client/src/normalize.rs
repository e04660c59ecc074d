//! Reshaping of raw upstream search records into canonical features.
//!
//! Upstream records are property bags with optional geometry in whichever
//! CRS the geoportal felt like using. Normalization guarantees three things:
//! a string identifier when the upstream had any id at all, a flat ordered
//! property map with a best-effort display `name`, and a WGS84 geometry on
//! every feature — records without usable geometry get a flagged placeholder
//! point rather than being dropped.

use metrics::counter;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use geoportal_protocol::{Feature, Geometry};
use projection::{transform_geometry, web_mercator_to_wgs84, CrsPolicy, RangeHeuristic};

/// Placeholder coordinates for features without usable geometry
/// (central Moscow, the upstream's home region).
pub const PLACEHOLDER_COORDINATES: [f64; 2] = [37.6173, 55.7558];

/// Normalize a batch of raw upstream features.
///
/// Returns the normalized features and the number of records dropped.
/// A failure in one record never aborts the batch.
pub fn normalize_features(raw_features: &[Value]) -> (Vec<Feature>, usize) {
    let mut features = Vec::with_capacity(raw_features.len());
    let mut dropped = 0usize;

    for raw in raw_features {
        match normalize_feature(raw) {
            Some(feature) => features.push(feature),
            None => {
                warn!(record = %raw, "skipping unnormalizable upstream record");
                dropped += 1;
            }
        }
    }

    if dropped > 0 {
        counter!("nspd_features_dropped_total").increment(dropped as u64);
        warn!(dropped, total = raw_features.len(), "dropped upstream records during normalization");
    }

    (features, dropped)
}

/// Normalize one raw upstream record into a canonical [`Feature`].
///
/// Returns `None` only for records that are not JSON objects; every object
/// record yields a renderable feature.
pub fn normalize_feature(raw: &Value) -> Option<Feature> {
    let record = raw.as_object()?;

    let mut feature = Feature::new();

    // Upstream ids are numeric as often as they are strings; coerce, never
    // synthesize.
    if let Some(id) = record.get("id") {
        feature.id = Some(id_to_string(id));
    }

    if let Some(properties) = record.get("properties").and_then(Value::as_object) {
        feature.properties = flatten_properties(properties, feature.id.as_deref());
    }

    match record.get("geometry") {
        Some(geometry) if !geometry.is_null() => {
            match normalize_geometry(geometry) {
                Some(normalized) => feature.geometry = Some(normalized),
                None => {
                    warn!(geometry = %geometry, "record carries invalid geometry, using placeholder");
                    feature.geometry = Some(placeholder_point());
                    feature
                        .properties
                        .insert("invalid_geometry".to_string(), Value::Bool(true));
                }
            }
        }
        _ => {
            debug!("record has no geometry, using placeholder");
            feature.geometry = Some(placeholder_point());
            feature
                .properties
                .insert("no_geometry".to_string(), Value::Bool(true));
        }
    }

    Some(feature)
}

/// Flatten `properties.options` and the top-level properties into one
/// ordered map, synthesizing a display `name`.
///
/// `options` entries land first and take precedence; top-level entries are
/// added only for keys not already present.
fn flatten_properties(properties: &Map<String, Value>, id: Option<&str>) -> Map<String, Value> {
    let mut flat = Map::new();

    if let Some(options) = properties.get("options").and_then(Value::as_object) {
        for (key, value) in options {
            flat.insert(key.clone(), value.clone());
        }

        if !flat.contains_key("name") {
            let name = options
                .get("cad_number")
                .or_else(|| options.get("build_record_purpose"))
                .cloned()
                .unwrap_or_else(|| {
                    let category = properties
                        .get("categoryName")
                        .and_then(Value::as_str)
                        .unwrap_or("Object");
                    json!(format!("{} #{}", category, id.unwrap_or("")))
                });
            flat.insert("name".to_string(), name);
        }
    }

    for (key, value) in properties {
        if key != "options" && !flat.contains_key(key) {
            flat.insert(key.clone(), value.clone());
        }
    }

    flat
}

/// Produce a WGS84 geometry from a raw upstream geometry value, or `None`
/// when the value is structurally unusable.
fn normalize_geometry(geometry: &Value) -> Option<Geometry> {
    let type_ = geometry.get("type")?.as_str()?;
    let coordinates = geometry.get("coordinates")?;

    if type_ == "Point" {
        // Fast path: a single position needs no recursive walk.
        let position = coordinates.as_array()?;
        if position.len() < 2 {
            return None;
        }
        let x = position[0].as_f64()?;
        let y = position[1].as_f64()?;

        let (lng, lat) = if RangeHeuristic.needs_transform(geometry) {
            web_mercator_to_wgs84(x, y)
        } else {
            (x.clamp(-180.0, 180.0), y.clamp(-90.0, 90.0))
        };

        let mut out = vec![lng, lat];
        out.extend(position[2..].iter().filter_map(Value::as_f64));
        return Some(Geometry::Point { coordinates: out });
    }

    let transformed = transform_geometry(geometry);
    serde_json::from_value(transformed).ok()
}

fn placeholder_point() -> Geometry {
    Geometry::point(PLACEHOLDER_COORDINATES[0], PLACEHOLDER_COORDINATES[1])
}

fn id_to_string(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
