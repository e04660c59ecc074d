//! Error types for the NSPD client.

use thiserror::Error;

/// Failures surfaced by [`crate::NspdClient::request`].
///
/// Only genuinely unrecoverable outcomes become errors. HTTP 400 and
/// malformed response shapes are absorbed into empty-collection sentinels,
/// so callers see exactly one failure mode: the upstream could not be
/// reached at all.
#[derive(Debug, Error)]
pub enum NspdError {
    #[error("NSPD API unavailable after {attempts} attempt(s): {message}")]
    Unavailable { attempts: u32, message: String },
}
