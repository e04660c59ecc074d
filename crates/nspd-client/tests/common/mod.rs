//! Shared test doubles for client and search tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use nspd_client::{NspdClient, NspdConfig, Transport, TransportError, TransportResponse};

/// A transport that replays a scripted sequence of outcomes and records
/// every call it receives.
pub struct FakeTransport {
    script: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    calls: Mutex<Vec<Vec<(String, String)>>>,
}

impl FakeTransport {
    pub fn new(script: Vec<Result<TransportResponse, TransportError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<Vec<(String, String)>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(
        &self,
        _url: &str,
        params: &[(String, String)],
    ) -> Result<TransportResponse, TransportError> {
        self.calls.lock().unwrap().push(params.to_vec());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("transport script exhausted"))
    }
}

/// An HTTP 200 with the given body.
pub fn ok(body: &str) -> Result<TransportResponse, TransportError> {
    Ok(TransportResponse {
        status: 200,
        body: body.to_string(),
    })
}

/// An HTTP response with the given status and an empty body.
pub fn status(status: u16) -> Result<TransportResponse, TransportError> {
    Ok(TransportResponse {
        status,
        body: String::new(),
    })
}

/// A connection-level failure.
pub fn connect_error() -> Result<TransportResponse, TransportError> {
    Err(TransportError::Connect("connection refused".to_string()))
}

/// A client over the fake transport with test-friendly timing.
pub fn client(transport: Arc<FakeTransport>) -> NspdClient {
    let config = NspdConfig {
        retry_delay: Duration::from_millis(1),
        ..NspdConfig::default()
    };
    NspdClient::with_transport(transport, config)
}
