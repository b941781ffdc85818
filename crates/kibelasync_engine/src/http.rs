//! HTTP transport implementation.
//!
//! This module provides an HTTP-based transport for the sync engine.
//! The actual HTTP client is abstracted via a trait to allow different
//! implementations (reqwest, hyper, etc.).

use crate::config::SyncConfig;
use crate::context::CallContext;
use crate::error::{SyncError, SyncResult};
use crate::transport::GraphqlTransport;
use kibelasync_protocol::response::Envelope;
use kibelasync_protocol::Payload;
use std::time::Duration;
use tracing::debug;

/// An outgoing POST request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Target URL.
    pub url: String,
    /// Header name/value pairs.
    pub headers: Vec<(String, String)>,
    /// Request body.
    pub body: Vec<u8>,
    /// Time allowed for the whole exchange.
    pub timeout: Duration,
}

/// A received response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client abstraction.
///
/// Implement this trait to provide the actual HTTP transport.
pub trait HttpClient: Send + Sync {
    /// Sends a POST request and returns the response.
    fn post(&self, request: &HttpRequest) -> Result<HttpResponse, String>;
}

/// GraphQL over HTTP.
///
/// Sends `{"query", "variables"}` as JSON with a bearer token and unwraps
/// the response envelope.
pub struct HttpTransport<C: HttpClient> {
    config: SyncConfig,
    client: C,
}

impl<C: HttpClient> HttpTransport<C> {
    /// Creates a new HTTP transport.
    pub fn new(config: SyncConfig, client: C) -> Self {
        Self { config, client }
    }

    /// Returns the endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    fn build_request(&self, ctx: &CallContext, body: Vec<u8>) -> HttpRequest {
        HttpRequest {
            url: self.config.endpoint.clone(),
            headers: vec![
                (
                    "Authorization".into(),
                    format!("Bearer {}", self.config.token),
                ),
                ("Content-Type".into(), "application/json".into()),
                ("Accept".into(), "application/json".into()),
                ("User-Agent".into(), self.config.user_agent.clone()),
            ],
            body,
            timeout: ctx.request_timeout(self.config.timeout),
        }
    }
}

impl<C: HttpClient> GraphqlTransport for HttpTransport<C> {
    fn execute(&self, ctx: &CallContext, payload: &Payload) -> SyncResult<Vec<u8>> {
        ctx.check()?;
        let operation = payload.operation_name();

        let body = payload
            .to_json()
            .map_err(|e| SyncError::remote(operation, format!("failed to encode request: {e}")))?;
        let request = self.build_request(ctx, body);

        debug!(operation, endpoint = %request.url, "executing graphql request");
        let response = self
            .client
            .post(&request)
            .map_err(|e| SyncError::remote(operation, e))?;

        // a transport error may have been the deadline expiring
        ctx.check()?;

        if !response.is_success() {
            let body = String::from_utf8_lossy(&response.body);
            return Err(SyncError::remote(
                operation,
                format!("status {}: {}", response.status, body.trim()),
            ));
        }

        let envelope: Envelope = serde_json::from_slice(&response.body)
            .map_err(|e| SyncError::unmarshal(operation, e))?;

        if !envelope.errors.is_empty() {
            let messages: Vec<_> = envelope.errors.iter().map(|e| e.message.as_str()).collect();
            return Err(SyncError::remote(operation, messages.join("; ")));
        }

        envelope
            .data
            .map(|raw| raw.get().as_bytes().to_vec())
            .ok_or_else(|| SyncError::unmarshal(operation, "response has no data"))
    }
}
