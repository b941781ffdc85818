//! # kibelasync protocol
//!
//! Wire types and pure algorithms for kibelasync.
//!
//! This crate provides:
//! - `Identifier` codec for the remote's opaque base64 identifiers
//! - Query budget planning (`PagePlan`) under the per-request cost ceiling
//! - `Document` and its `CanonicalForm` used for diffing
//! - GraphQL payload builders and typed response shapes
//!
//! This is a pure protocol crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod budget;
mod canonical;
mod document;
mod error;
mod id;
pub mod query;
pub mod response;

pub use budget::{ListingShape, PagePlan};
pub use canonical::{normalize_content, CanonicalForm};
pub use document::{Author, Document, DocumentDraft, FolderRef, GroupRef, Timestamp};
pub use error::{ProtocolError, ProtocolResult};
pub use id::{IdTag, Identifier};
pub use query::{ListingScope, Payload};
