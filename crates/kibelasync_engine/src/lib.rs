//! # kibelasync engine
//!
//! Pull/push synchronization between a Kibela team and local storage.
//!
//! This crate provides:
//! - Typed remote calls over a pluggable GraphQL transport
//! - Cursor-chained pagination under the per-request cost ceiling
//! - Pull with update-time skipping, and a forced full pull
//! - Push with canonical diffing and group name resolution
//! - HTTP transport abstraction
//! - In-memory transport and local store for tests
//!
//! ## Key Invariants
//!
//! - Strictly sequential: one remote call at a time
//! - Fail-fast: the first error aborts the operation, nothing is retried
//! - Pushing an unchanged document issues no mutation
//! - Pulling twice without remote changes writes nothing the second time

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod context;
mod engine;
mod error;
mod fetcher;
mod http;
mod local;
mod pull;
mod push;
mod remote;
mod transport;

pub use config::SyncConfig;
pub use context::CallContext;
pub use engine::SyncEngine;
pub use error::{ResultExt, SyncError, SyncResult};
pub use fetcher::PaginatedFetcher;
pub use http::{HttpClient, HttpRequest, HttpResponse, HttpTransport};
pub use local::{to_local, LocalDocument, LocalStore, MemoryLocalStore};
pub use pull::{PullDecision, PullReport};
pub use push::{GroupResolver, PushOutcome};
pub use remote::RemoteClient;
pub use transport::{GraphqlTransport, MockTransport};
