//! Coordinate transforms between Web Mercator (EPSG:3857) and WGS84
//! (EPSG:4326).
//!
//! Upstream geoportal responses mix projected and geographic coordinates,
//! sometimes with explicit CRS metadata and sometimes without. This crate
//! provides the point-level math, a pluggable detection policy for deciding
//! whether a geometry needs transforming, and a fail-safe geometry walker
//! that never rejects input — malformed geometries pass through unchanged.

pub mod geometry;
pub mod web_mercator;

pub use geometry::{sample_position, transform_geometry, transform_geometry_with, CrsPolicy, RangeHeuristic};
pub use web_mercator::{web_mercator_to_wgs84, wgs84_to_web_mercator, WEB_MERCATOR_EXTENT_M};
