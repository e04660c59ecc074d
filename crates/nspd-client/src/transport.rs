//! HTTP transport seam for the NSPD client.
//!
//! The client logic (retry, status taxonomy, caching) is written against the
//! [`Transport`] trait so tests can script upstream behavior without a live
//! socket. [`ReqwestTransport`] is the production implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use thiserror::Error;
use tracing::debug;

/// A raw HTTP response: status plus body text.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Connection-level failures (no HTTP status was obtained).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),
}

/// Performs one GET against the upstream.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> Result<TransportResponse, TransportError>;
}

/// Production transport backed by `reqwest`.
///
/// The upstream only accepts requests that look like they came from its own
/// web frontend, hence the fixed browser header set. Its TLS certificate
/// does not validate against public roots, so verification is disabled —
/// an operational trade-off inherited from the upstream, not a choice.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(request_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .default_headers(Self::browser_headers())
            .timeout(request_timeout)
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self { client })
    }

    fn browser_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            HeaderValue::from_static(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
            ),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("ru-RU,ru;q=0.9,en-US;q=0.8,en;q=0.7"),
        );
        headers.insert(
            reqwest::header::ORIGIN,
            HeaderValue::from_static("https://nspd.gov.ru"),
        );
        headers.insert(
            reqwest::header::REFERER,
            HeaderValue::from_static("https://nspd.gov.ru/"),
        );
        headers.insert(
            reqwest::header::CONNECTION,
            HeaderValue::from_static("keep-alive"),
        );
        headers
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> Result<TransportResponse, TransportError> {
        debug!(url = %url, "sending upstream request");

        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    TransportError::Timeout
                } else {
                    TransportError::Connect(err.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| TransportError::Connect(err.to_string()))?;

        debug!(status = status, bytes = body.len(), "upstream response received");
        Ok(TransportResponse { status, body })
    }
}
