//! Thematic search orchestration.
//!
//! Composes validation, the upstream request, and normalization into one
//! call that always returns a well-formed [`FeatureCollection`] — bad
//! input, upstream outages, and malformed data all degrade to an empty
//! collection with a human-readable message.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

use geoportal_protocol::FeatureCollection;

use crate::client::NspdClient;
use crate::normalize::normalize_features;

/// The five thematic-search categories the upstream understands, with their
/// fixed upstream numeric identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThematicCategory {
    Objects,
    CadDel,
    AdminDel,
    Zouit,
    TerZone,
}

impl ThematicCategory {
    pub const ALL: [ThematicCategory; 5] = [
        ThematicCategory::Objects,
        ThematicCategory::CadDel,
        ThematicCategory::AdminDel,
        ThematicCategory::Zouit,
        ThematicCategory::TerZone,
    ];

    /// The upstream `thematicSearchId` value.
    pub fn search_id(&self) -> u32 {
        match self {
            ThematicCategory::Objects => 1,
            ThematicCategory::CadDel => 2,
            ThematicCategory::AdminDel => 4,
            ThematicCategory::Zouit => 5,
            ThematicCategory::TerZone => 7,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThematicCategory::Objects => "objects",
            ThematicCategory::CadDel => "cad_del",
            ThematicCategory::AdminDel => "admin_del",
            ThematicCategory::Zouit => "zouit",
            ThematicCategory::TerZone => "ter_zone",
        }
    }
}

impl FromStr for ThematicCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "objects" => Ok(ThematicCategory::Objects),
            "cad_del" => Ok(ThematicCategory::CadDel),
            "admin_del" => Ok(ThematicCategory::AdminDel),
            "zouit" => Ok(ThematicCategory::Zouit),
            "ter_zone" => Ok(ThematicCategory::TerZone),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ThematicCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Geographic bounding box accepted by the search contract.
///
/// Currently NOT forwarded to the upstream query — the primary upstream
/// code path ignores bounds, and forwarding them has been observed to
/// over-constrain results. Kept as an accepted-but-unused input pending
/// clarification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchBounds {
    pub north: f64,
    pub east: f64,
    pub south: f64,
    pub west: f64,
}

impl NspdClient {
    /// Run a thematic search and normalize the result.
    ///
    /// Never returns an error: validation failures and upstream outages
    /// produce an empty collection whose `message` explains what happened.
    /// Idempotent; the only side effect is the cache traffic in
    /// [`NspdClient::request`].
    pub async fn thematic_search(
        &self,
        query: &str,
        category: &str,
        bounds: Option<SearchBounds>,
    ) -> FeatureCollection {
        debug!(query = %query, category = %category, bounds = ?bounds, "thematic search");

        if query.trim().is_empty() {
            return FeatureCollection::new()
                .with_message("Empty search query. Please enter text to search.");
        }

        let category = match ThematicCategory::from_str(category) {
            Ok(category) => category,
            Err(()) => {
                return FeatureCollection::new()
                    .with_message(format!("Unknown thematic search category: {}", category));
            }
        };

        let params = vec![
            ("query".to_string(), query.to_string()),
            ("limit".to_string(), self.config().search_limit.to_string()),
            (
                "thematicSearchId".to_string(),
                category.search_id().to_string(),
            ),
        ];

        let body = match self.request(&params).await {
            Ok(body) => body,
            Err(err) => {
                error!(category = %category, error = %err, "thematic search failed upstream");
                return FeatureCollection::fallback(format!("NSPD API error: {}", err));
            }
        };

        let raw_features: Vec<Value> = body
            .get("features")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let (features, dropped) = normalize_features(&raw_features);
        let found = features.len();
        info!(category = %category, found, dropped, "thematic search complete");

        // A message already present on the body (e.g. the bad-request
        // sentinel) takes precedence over the generic count message.
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| {
                if found > 0 {
                    format!("Found {} object(s)", found)
                } else {
                    "Nothing found for this query".to_string()
                }
            });

        FeatureCollection::new()
            .with_features(features)
            .with_message(message)
    }
}
