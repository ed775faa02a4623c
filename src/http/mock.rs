//! Scripted transport for tests

use super::request::{ApiRequest, ApiResponse};
use super::transport::{Transport, TransportError};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

type Responder =
    Box<dyn Fn(&ApiRequest, Option<&str>) -> Result<ApiResponse, TransportError> + Send + Sync>;

/// One recorded outbound request
#[derive(Debug, Clone)]
pub struct Sent {
    pub request: ApiRequest,
    pub bearer: Option<String>,
}

/// Transport answering from a closure and recording every request
pub struct MockTransport {
    responder: Responder,
    delay: Option<Duration>,
    sent: Mutex<Vec<Sent>>,
}

impl MockTransport {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&ApiRequest, Option<&str>) -> Result<ApiResponse, TransportError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            responder: Box::new(responder),
            delay: None,
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Delay every response by `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    /// Number of requests sent to `path`
    pub fn count(&self, path: &str) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.request.path == path)
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<ApiResponse, TransportError> {
        self.sent.lock().unwrap().push(Sent {
            request: request.clone(),
            bearer: bearer.map(str::to_string),
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.responder)(request, bearer)
    }
}

pub fn json(status: u16, body: serde_json::Value) -> Result<ApiResponse, TransportError> {
    Ok(ApiResponse::new(status, body.to_string()))
}
