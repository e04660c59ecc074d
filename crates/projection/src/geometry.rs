//! Fail-safe geometry transformation over raw GeoJSON values.
//!
//! Upstream geometries arrive as arbitrary JSON: the `type` may be missing,
//! coordinate arrays may be ragged, and CRS metadata is optional. The walker
//! here therefore operates on `serde_json::Value` and degrades to a no-op
//! instead of erroring — a geometry it cannot understand is returned
//! unchanged and logged.

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::web_mercator::web_mercator_to_wgs84;

/// Policy deciding whether a geometry's coordinates are in the projected
/// system and need transforming to WGS84.
///
/// Pluggable because range sniffing is inherently ambiguous: a small-magnitude
/// projected coordinate near the origin is indistinguishable from a
/// geographic one. Deployments where the upstream's CRS behavior is known can
/// substitute a stricter policy.
pub trait CrsPolicy: Send + Sync {
    /// Return true when `geometry` should be transformed to WGS84.
    fn needs_transform(&self, geometry: &Value) -> bool;
}

/// Default detection: explicit `EPSG:3857` CRS metadata, or a representative
/// coordinate outside the valid geographic range (`|x| > 180 || |y| > 90`).
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeHeuristic;

impl CrsPolicy for RangeHeuristic {
    fn needs_transform(&self, geometry: &Value) -> bool {
        if crs_name(geometry) == Some("EPSG:3857") {
            return true;
        }
        match sample_position(geometry) {
            Some((x, y)) => x.abs() > 180.0 || y.abs() > 90.0,
            None => false,
        }
    }
}

/// Extract the first coordinate pair of a geometry, descending the nesting
/// depth implied by its `type`.
pub fn sample_position(geometry: &Value) -> Option<(f64, f64)> {
    let type_ = geometry.get("type")?.as_str()?;
    let depth = nesting_depth(type_)?;

    let mut node = geometry.get("coordinates")?;
    for _ in 0..depth {
        node = node.as_array()?.first()?;
    }
    let position = node.as_array()?;
    if position.len() < 2 {
        return None;
    }
    Some((position[0].as_f64()?, position[1].as_f64()?))
}

/// Transform a geometry to WGS84 using the default [`RangeHeuristic`].
pub fn transform_geometry(geometry: &Value) -> Value {
    transform_geometry_with(geometry, &RangeHeuristic)
}

/// Transform a geometry's coordinates from Web Mercator to WGS84, updating
/// the CRS metadata to declare `EPSG:4326` afterwards.
///
/// Returns the input unchanged when the geometry is malformed (missing
/// `type` or `coordinates`), of an unknown type, or already geographic.
/// Never panics and never returns an error.
pub fn transform_geometry_with(geometry: &Value, policy: &dyn CrsPolicy) -> Value {
    let (type_, coordinates) = match (
        geometry.get("type").and_then(Value::as_str),
        geometry.get("coordinates"),
    ) {
        (Some(t), Some(c)) => (t, c),
        _ => {
            warn!(geometry = %geometry, "cannot transform geometry with missing type or coordinates");
            return geometry.clone();
        }
    };

    let depth = match nesting_depth(type_) {
        Some(depth) => depth,
        None => {
            warn!(geometry_type = type_, "unknown geometry type, leaving untouched");
            return geometry.clone();
        }
    };

    if !policy.needs_transform(geometry) {
        debug!(geometry_type = type_, "coordinates already geographic");
        return geometry.clone();
    }

    let mut transformed = geometry.clone();
    transformed["coordinates"] = transform_at_depth(coordinates, depth);
    set_geographic_crs(&mut transformed);
    debug!(geometry_type = type_, "transformed geometry to WGS84");
    transformed
}

/// Recursively apply the point transform `depth` levels down.
fn transform_at_depth(node: &Value, depth: usize) -> Value {
    if depth == 0 {
        return transform_position(node);
    }
    match node.as_array() {
        Some(items) => Value::Array(
            items
                .iter()
                .map(|item| transform_at_depth(item, depth - 1))
                .collect(),
        ),
        None => node.clone(),
    }
}

/// Transform one position array, preserving dimensions beyond x/y.
/// Positions with fewer than two numeric components pass through unchanged.
fn transform_position(position: &Value) -> Value {
    let items = match position.as_array() {
        Some(items) if items.len() >= 2 => items,
        _ => return position.clone(),
    };
    let (x, y) = match (items[0].as_f64(), items[1].as_f64()) {
        (Some(x), Some(y)) => (x, y),
        _ => return position.clone(),
    };

    let (lng, lat) = web_mercator_to_wgs84(x, y);
    let mut out = vec![json!(lng), json!(lat)];
    out.extend(items[2..].iter().cloned());
    Value::Array(out)
}

/// Read the named CRS of a geometry, if declared.
fn crs_name(geometry: &Value) -> Option<&str> {
    geometry
        .get("crs")?
        .get("properties")?
        .get("name")?
        .as_str()
}

/// Declare WGS84 on a geometry, updating the existing CRS member or
/// inserting one.
fn set_geographic_crs(geometry: &mut Value) {
    match geometry.get_mut("crs") {
        Some(crs) => match crs.get_mut("properties") {
            Some(props) if props.is_object() => {
                props["name"] = json!("EPSG:4326");
            }
            _ => *crs = geographic_crs(),
        },
        None => {
            geometry["crs"] = geographic_crs();
        }
    }
}

fn geographic_crs() -> Value {
    json!({
        "type": "name",
        "properties": { "name": "EPSG:4326" }
    })
}

fn nesting_depth(geometry_type: &str) -> Option<usize> {
    match geometry_type {
        "Point" => Some(0),
        "LineString" | "MultiPoint" => Some(1),
        "Polygon" | "MultiLineString" => Some(2),
        "MultiPolygon" => Some(3),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projected_point() -> Value {
        json!({
            "type": "Point",
            "coordinates": [4_187_600.0, 7_508_800.0]
        })
    }

    #[test]
    fn test_point_transform_and_crs_insert() {
        let out = transform_geometry(&projected_point());
        let coords = out["coordinates"].as_array().unwrap();
        let lng = coords[0].as_f64().unwrap();
        let lat = coords[1].as_f64().unwrap();
        assert!((lng - 37.6).abs() < 0.1);
        assert!((lat - 55.9).abs() < 0.1);
        assert_eq!(out["crs"]["properties"]["name"], "EPSG:4326");
    }

    #[test]
    fn test_geographic_input_is_untouched() {
        let geom = json!({
            "type": "Point",
            "coordinates": [37.6173, 55.7558]
        });
        assert_eq!(transform_geometry(&geom), geom);
    }

    #[test]
    fn test_idempotent_after_transform() {
        let once = transform_geometry(&projected_point());
        let twice = transform_geometry(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_explicit_crs_forces_transform() {
        // Coordinates look geographic but the CRS says otherwise.
        let geom = json!({
            "type": "Point",
            "coordinates": [100.0, 50.0],
            "crs": { "type": "name", "properties": { "name": "EPSG:3857" } }
        });
        let out = transform_geometry(&geom);
        let lng = out["coordinates"][0].as_f64().unwrap();
        assert!(lng < 1.0, "expected near-origin longitude, got {}", lng);
        assert_eq!(out["crs"]["properties"]["name"], "EPSG:4326");
    }

    #[test]
    fn test_polygon_depth_and_extra_dims() {
        let geom = json!({
            "type": "Polygon",
            "coordinates": [[
                [4_187_600.0, 7_508_800.0, 120.5],
                [4_187_700.0, 7_508_900.0],
                [4_187_600.0, 7_508_800.0, 120.5]
            ]]
        });
        let out = transform_geometry(&geom);
        let ring = out["coordinates"][0].as_array().unwrap();
        assert_eq!(ring.len(), 3);
        // Third dimension preserved verbatim.
        assert_eq!(ring[0][2], 120.5);
        assert!(ring[0][0].as_f64().unwrap().abs() <= 180.0);
        assert!(ring[1][1].as_f64().unwrap().abs() <= 90.0);
    }

    #[test]
    fn test_multipolygon_depth() {
        let geom = json!({
            "type": "MultiPolygon",
            "coordinates": [[[
                [4_187_600.0, 7_508_800.0],
                [4_187_700.0, 7_508_900.0],
                [4_187_600.0, 7_508_800.0]
            ]]]
        });
        let out = transform_geometry(&geom);
        let lng = out["coordinates"][0][0][0][0].as_f64().unwrap();
        assert!((lng - 37.6).abs() < 0.1);
    }

    #[test]
    fn test_malformed_geometry_is_a_noop() {
        let missing_coords = json!({ "type": "Point" });
        assert_eq!(transform_geometry(&missing_coords), missing_coords);

        let missing_type = json!({ "coordinates": [1.0, 2.0] });
        assert_eq!(transform_geometry(&missing_type), missing_type);

        let not_an_object = json!(null);
        assert_eq!(transform_geometry(&not_an_object), not_an_object);
    }

    #[test]
    fn test_degenerate_crs_member_is_replaced() {
        let geom = json!({
            "type": "Point",
            "coordinates": [4_187_600.0, 7_508_800.0],
            "crs": { "properties": "EPSG:3857" }
        });
        let out = transform_geometry(&geom);
        assert_eq!(out["crs"]["properties"]["name"], "EPSG:4326");
    }

    #[test]
    fn test_unknown_type_is_a_noop() {
        let geom = json!({
            "type": "GeometryCollection",
            "coordinates": [4_187_600.0, 7_508_800.0]
        });
        assert_eq!(transform_geometry(&geom), geom);
    }

    #[test]
    fn test_sample_position_per_type() {
        let line = json!({
            "type": "LineString",
            "coordinates": [[4_187_600.0, 7_508_800.0], [0.0, 0.0]]
        });
        assert_eq!(sample_position(&line), Some((4_187_600.0, 7_508_800.0)));

        let multi = json!({
            "type": "MultiPolygon",
            "coordinates": [[[[1.0, 2.0]]]]
        });
        assert_eq!(sample_position(&multi), Some((1.0, 2.0)));

        let short = json!({ "type": "Point", "coordinates": [5.0] });
        assert_eq!(sample_position(&short), None);
    }

    #[test]
    fn test_ragged_positions_pass_through() {
        let geom = json!({
            "type": "LineString",
            "coordinates": [[4_187_600.0, 7_508_800.0], [5.0], "junk"]
        });
        let out = transform_geometry(&geom);
        let coords = out["coordinates"].as_array().unwrap();
        assert_eq!(coords[1], json!([5.0]));
        assert_eq!(coords[2], json!("junk"));
        assert!(coords[0][0].as_f64().unwrap().abs() <= 180.0);
    }
}
