//! Client for the NSPD geoportal thematic-search API.
//!
//! The upstream is a third-party cadastral/GIS service with a browser-gated
//! endpoint, a self-signed certificate, mixed coordinate reference systems,
//! and an irregular response schema. This crate isolates all of that behind
//! two calls:
//!
//! - [`NspdClient::request`] — the raw HTTP call with bounded retries, the
//!   status-code taxonomy, response unwrapping, and read-through caching of
//!   non-search requests.
//! - [`NspdClient::thematic_search`] — the orchestrated search: input
//!   validation, upstream invocation, per-feature normalization to WGS84
//!   GeoJSON, and degradation to a well-formed empty collection on any
//!   failure. It never returns an error.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod normalize;
pub mod search;
pub mod transport;

pub use cache::RequestCache;
pub use client::NspdClient;
pub use config::NspdConfig;
pub use error::NspdError;
pub use search::{SearchBounds, ThematicCategory};
pub use transport::{ReqwestTransport, Transport, TransportError, TransportResponse};
