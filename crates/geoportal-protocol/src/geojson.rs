//! GeoJSON types for layer and search responses.
//!
//! Positions are `Vec<f64>` rather than fixed pairs: upstream sources
//! occasionally attach elevation or other extra dimensions, and those must
//! survive normalization untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A GeoJSON geometry.
///
/// Coordinate nesting depth follows the type: 0 for Point, 1 for
/// LineString/MultiPoint, 2 for Polygon/MultiLineString, 3 for MultiPolygon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Geometry {
    /// A single position.
    Point {
        /// Coordinates as [longitude, latitude, ...].
        coordinates: Vec<f64>,
    },

    /// A set of positions.
    MultiPoint {
        coordinates: Vec<Vec<f64>>,
    },

    /// A sequence of positions.
    LineString {
        coordinates: Vec<Vec<f64>>,
    },

    /// A set of LineStrings.
    MultiLineString {
        coordinates: Vec<Vec<Vec<f64>>>,
    },

    /// An array of linear rings (first is exterior, rest are holes).
    Polygon {
        coordinates: Vec<Vec<Vec<f64>>>,
    },

    /// A set of Polygons.
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Vec<f64>>>>,
    },
}

impl Geometry {
    /// Create a point geometry.
    pub fn point(lng: f64, lat: f64) -> Self {
        Geometry::Point {
            coordinates: vec![lng, lat],
        }
    }
}

/// A GeoJSON Feature with a stable string identifier and flat properties.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feature {
    /// Type identifier (always "Feature").
    #[serde(rename = "type")]
    pub type_: String,

    /// Optional feature identifier. Upstream numeric ids are coerced to
    /// strings; absent ids are never synthesized.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The geometry of this feature, if any.
    pub geometry: Option<Geometry>,

    /// Flat property map. Insertion order is preserved.
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Feature {
    /// Create a new feature with no id, geometry, or properties.
    pub fn new() -> Self {
        Self {
            type_: "Feature".to_string(),
            id: None,
            geometry: None,
            properties: Map::new(),
        }
    }

    /// Set the feature ID.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the geometry.
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Add a property, overwriting any existing value for the key.
    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }
}

impl Default for Feature {
    fn default() -> Self {
        Self::new()
    }
}

/// The canonical response envelope for every layer/search operation.
///
/// Failure is carried inside the envelope (`fallback` + `message`) rather
/// than through a separate error response type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureCollection {
    /// Type identifier (always "FeatureCollection").
    #[serde(rename = "type")]
    pub type_: String,

    /// Array of features.
    pub features: Vec<Feature>,

    /// True when this collection is a degraded substitute for unavailable
    /// upstream data.
    #[serde(default)]
    pub fallback: bool,

    /// Human-readable status message (result count, validation notice,
    /// upstream diagnostics).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FeatureCollection {
    /// Create a new empty FeatureCollection.
    pub fn new() -> Self {
        Self {
            type_: "FeatureCollection".to_string(),
            features: Vec::new(),
            fallback: false,
            message: None,
        }
    }

    /// Add multiple features to the collection.
    pub fn with_features(mut self, features: Vec<Feature>) -> Self {
        self.features.extend(features);
        self
    }

    /// Set the status message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Create an empty collection flagged as a fallback substitute.
    pub fn fallback(message: impl Into<String>) -> Self {
        Self {
            fallback: true,
            ..Self::new().with_message(message)
        }
    }
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::new()
    }
}
