//! NSPD client configuration.

use std::time::Duration;

/// Configuration for [`crate::NspdClient`].
#[derive(Debug, Clone)]
pub struct NspdConfig {
    /// Thematic-search endpoint URL.
    pub base_url: String,
    /// Maximum number of results requested per search. Observed working
    /// values range from 50 to 200; tunable rather than fixed.
    pub search_limit: u32,
    /// Total request attempts before giving up.
    pub max_retries: u32,
    /// Delay between attempts.
    pub retry_delay: Duration,
    /// Per-request socket timeout.
    pub request_timeout: Duration,
    /// Time-to-live for cached non-search responses.
    pub cache_ttl: Duration,
    /// Maximum number of cached responses.
    pub cache_max_entries: usize,
}

impl Default for NspdConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nspd.gov.ru/api/geoportal/v2/search/geoportal".to_string(),
            search_limit: 200,
            max_retries: 3,
            retry_delay: Duration::from_secs(2),
            request_timeout: Duration::from_secs(20),
            cache_ttl: Duration::from_secs(3600),
            cache_max_entries: 1024,
        }
    }
}
