//! Protocol types shared by the geoportal services.
//!
//! The canonical response envelope for every map-data operation is a
//! GeoJSON [`FeatureCollection`] — success, partial success, and failure
//! all produce this shape, so callers never need a separate error path.

pub mod geojson;
pub mod layer;

pub use geojson::{Feature, FeatureCollection, Geometry};
pub use layer::{Layer, SourceType};
