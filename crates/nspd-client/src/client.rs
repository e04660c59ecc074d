//! Upstream request execution: retries, status taxonomy, caching.

use std::sync::Arc;

use metrics::counter;
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use crate::cache::{cache_key, RequestCache};
use crate::config::NspdConfig;
use crate::error::NspdError;
use crate::transport::{ReqwestTransport, Transport};

/// Query parameter that marks a user-initiated thematic search. Requests
/// carrying it are never cached, so search results stay fresh.
pub const SEARCH_ID_PARAM: &str = "thematicSearchId";

/// Client for the NSPD geoportal API.
///
/// Owns its transport and cache explicitly — no process-global state — so
/// multiple instances with independent policies can coexist.
pub struct NspdClient {
    transport: Arc<dyn Transport>,
    cache: RequestCache,
    config: NspdConfig,
}

impl NspdClient {
    /// Create a client with the production reqwest transport.
    pub fn new(config: NspdConfig) -> Result<Self, reqwest::Error> {
        let transport = Arc::new(ReqwestTransport::new(config.request_timeout)?);
        Ok(Self::with_transport(transport, config))
    }

    /// Create a client over an explicit transport (used by tests).
    pub fn with_transport(transport: Arc<dyn Transport>, config: NspdConfig) -> Self {
        let cache = RequestCache::new(config.cache_max_entries, config.cache_ttl);
        Self {
            transport,
            cache,
            config,
        }
    }

    pub fn config(&self) -> &NspdConfig {
        &self.config
    }

    pub fn cache(&self) -> &RequestCache {
        &self.cache
    }

    /// Perform a GET against the upstream with bounded retries.
    ///
    /// Status handling:
    /// - 400 — terminal but recoverable: returns an empty-collection
    ///   sentinel immediately (over-specific queries are common and the
    ///   caller can simplify and retry).
    /// - 403/404 — terminal: [`NspdError::Unavailable`] without retry.
    /// - any other error status or connection failure — retried after
    ///   `retry_delay`, up to `max_retries` attempts total.
    ///
    /// Successful bodies are unwrapped from the optional `data` envelope and
    /// shape-checked; a body without `type`/`features` is replaced by an
    /// empty collection with a diagnostic message.
    pub async fn request(&self, params: &[(String, String)]) -> Result<Value, NspdError> {
        let is_search = params.iter().any(|(key, _)| key == SEARCH_ID_PARAM);
        let key = cache_key(&self.config.base_url, params);

        if !is_search {
            if let Some(cached) = self.cache.get(&key).await {
                debug!(key = %key, "serving upstream response from cache");
                counter!("nspd_cache_hits_total").increment(1);
                return Ok(cached);
            }
            counter!("nspd_cache_misses_total").increment(1);
        }

        counter!("nspd_upstream_requests_total").increment(1);

        let attempts = self.config.max_retries.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            if attempt > 1 {
                tokio::time::sleep(self.config.retry_delay).await;
            }
            debug!(attempt, attempts, "upstream attempt");

            match self.transport.get(&self.config.base_url, params).await {
                Ok(response) if response.status == 400 => {
                    warn!(attempt, "upstream rejected request parameters (400)");
                    return Ok(bad_request_collection());
                }
                Ok(response) if response.status == 403 || response.status == 404 => {
                    warn!(status = response.status, "terminal upstream status, not retrying");
                    return Err(NspdError::Unavailable {
                        attempts: attempt,
                        message: format!("HTTP {}", response.status),
                    });
                }
                Ok(response) if !response.is_success() => {
                    last_error = format!("HTTP {}", response.status);
                    warn!(attempt, status = response.status, "retryable upstream status");
                    counter!("nspd_upstream_retries_total").increment(1);
                }
                Ok(response) => {
                    let result = unwrap_body(&response.body);
                    if !is_search {
                        self.cache.put(key, result.clone()).await;
                    }
                    return Ok(result);
                }
                Err(err) => {
                    last_error = err.to_string();
                    warn!(attempt, error = %err, "upstream connection failure");
                    counter!("nspd_upstream_retries_total").increment(1);
                }
            }
        }

        error!(attempts, error = %last_error, "all upstream attempts failed");
        Err(NspdError::Unavailable {
            attempts,
            message: last_error,
        })
    }
}

/// Parse a response body, unwrap the optional `data` envelope, and validate
/// the FeatureCollection shape.
fn unwrap_body(body: &str) -> Value {
    let parsed: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, "upstream body is not valid JSON");
            return malformed_collection();
        }
    };

    let result = match parsed.get("data") {
        Some(data) if data.is_object() => {
            debug!("unwrapping nested data envelope");
            data.clone()
        }
        _ => parsed,
    };

    if result.get("type").is_none() || result.get("features").is_none() {
        warn!(body = %result, "unexpected upstream response shape");
        return malformed_collection();
    }

    result
}

fn bad_request_collection() -> Value {
    json!({
        "type": "FeatureCollection",
        "features": [],
        "message": "Malformed NSPD request. Please refine the search parameters."
    })
}

fn malformed_collection() -> Value {
    json!({
        "type": "FeatureCollection",
        "features": [],
        "message": "Unexpected response shape from the NSPD API"
    })
}
