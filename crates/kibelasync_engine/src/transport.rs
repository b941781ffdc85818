//! Transport layer abstraction for GraphQL calls.

use crate::context::CallContext;
use crate::error::{SyncError, SyncResult};
use kibelasync_protocol::Payload;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Executes GraphQL payloads against the remote store.
///
/// This trait abstracts the network layer, allowing for different
/// implementations (HTTP, mock for testing, etc.). Implementations return the
/// raw bytes of the response's `data` object; a GraphQL `errors` array must be
/// surfaced as [`SyncError::RemoteCallFailed`].
pub trait GraphqlTransport: Send + Sync {
    /// Executes one request.
    fn execute(&self, ctx: &CallContext, payload: &Payload) -> SyncResult<Vec<u8>>;
}

impl<T: GraphqlTransport + ?Sized> GraphqlTransport for &T {
    fn execute(&self, ctx: &CallContext, payload: &Payload) -> SyncResult<Vec<u8>> {
        (**self).execute(ctx, payload)
    }
}

type Handler = Box<dyn Fn(&Payload) -> SyncResult<String> + Send + Sync>;

/// A mock transport for testing.
///
/// Scripted responses are consumed in order; once the script is empty the
/// handler, if any, answers. Every request is recorded.
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<SyncResult<String>>>,
    handler: Mutex<Option<Handler>>,
    requests: Mutex<Vec<Payload>>,
}

impl MockTransport {
    /// Creates a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful response carrying `data`.
    pub fn push_response(&self, data: impl Into<String>) {
        self.script.lock().push_back(Ok(data.into()));
    }

    /// Queues a GraphQL error.
    pub fn push_error(&self, message: impl Into<String>) {
        self.script
            .lock()
            .push_back(Err(SyncError::remote("mock", message)));
    }

    /// Sets the fallback handler used once the script runs out.
    pub fn set_handler<F>(&self, handler: F)
    where
        F: Fn(&Payload) -> SyncResult<String> + Send + Sync + 'static,
    {
        *self.handler.lock() = Some(Box::new(handler));
    }

    /// Returns every request executed so far.
    pub fn requests(&self) -> Vec<Payload> {
        self.requests.lock().clone()
    }

    /// Returns the operation names of every request, in order.
    pub fn operations(&self) -> Vec<String> {
        self.requests
            .lock()
            .iter()
            .map(|p| p.operation_name().to_string())
            .collect()
    }

    /// Number of requests with the given operation name.
    pub fn count(&self, operation: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|p| p.operation_name() == operation)
            .count()
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("scripted", &self.script.lock().len())
            .field("requests", &self.requests.lock().len())
            .finish()
    }
}

impl GraphqlTransport for MockTransport {
    fn execute(&self, ctx: &CallContext, payload: &Payload) -> SyncResult<Vec<u8>> {
        ctx.check()?;
        self.requests.lock().push(payload.clone());

        let scripted = self.script.lock().pop_front();
        let response = match scripted {
            Some(response) => response,
            None => match self.handler.lock().as_ref() {
                Some(handler) => handler(payload),
                None => Err(SyncError::remote(
                    payload.operation_name(),
                    "no mock response set",
                )),
            },
        };
        response.map(String::into_bytes)
    }
}
