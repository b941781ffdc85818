//! Error types for the sync engine.

use kibelasync_protocol::{Identifier, ProtocolError};
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during sync operations.
///
/// Nothing is retried: the first failure aborts the running operation and
/// reaches the caller wrapped in [`SyncError::Context`] layers.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Identifier could not be decoded.
    #[error(transparent)]
    MalformedIdentifier(ProtocolError),

    /// Transport failure, non-2xx status, or GraphQL `errors` in the response.
    #[error("remote call {operation} failed: {message}")]
    RemoteCallFailed {
        /// GraphQL operation name.
        operation: String,
        /// Error message.
        message: String,
    },

    /// Response body does not match the expected shape.
    #[error("unexpected response to {operation}: {message}")]
    UnmarshalFailed {
        /// GraphQL operation name.
        operation: String,
        /// Decoder message.
        message: String,
    },

    /// No group with this name exists.
    #[error("group {name:?} not found")]
    UnknownGroup {
        /// Group name.
        name: String,
    },

    /// No folder with this path exists.
    #[error("folder {path:?} not found")]
    UnknownFolder {
        /// Folder path.
        path: String,
    },

    /// The remote returned null for a note.
    #[error("note {id} not found")]
    NoteNotFound {
        /// Requested identifier.
        id: Identifier,
    },

    /// The update mutation succeeded but returned a null note.
    #[error("update of note {id} was rejected: null note returned")]
    UpdateRejected {
        /// Identifier of the note.
        id: Identifier,
    },

    /// Local store failure.
    #[error("local store error: {0}")]
    Local(String),

    /// Sync was cancelled.
    #[error("sync cancelled")]
    Cancelled,

    /// Deadline passed.
    #[error("operation timed out")]
    Timeout,

    /// An error wrapped with the operation that hit it.
    #[error("{operation}: {source}")]
    Context {
        /// What was being done.
        operation: String,
        /// Underlying error.
        source: Box<SyncError>,
    },
}

impl SyncError {
    /// Creates a remote call error.
    pub fn remote(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RemoteCallFailed {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Creates an unmarshal error.
    pub fn unmarshal(operation: impl Into<String>, message: impl ToString) -> Self {
        Self::UnmarshalFailed {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    /// Wraps the error with the operation that produced it.
    pub fn context(self, operation: impl Into<String>) -> Self {
        Self::Context {
            operation: operation.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping context layers.
    pub fn root(&self) -> &SyncError {
        let mut err = self;
        while let SyncError::Context { source, .. } = err {
            err = &**source;
        }
        err
    }

    /// Returns true if the root cause is cancellation or a deadline.
    pub fn is_cancellation(&self) -> bool {
        matches!(self.root(), SyncError::Cancelled | SyncError::Timeout)
    }
}

impl From<ProtocolError> for SyncError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::MalformedIdentifier { .. } => SyncError::MalformedIdentifier(err),
            ProtocolError::UnresolvedGroup { name } => SyncError::UnknownGroup { name },
            ProtocolError::Json(e) => SyncError::unmarshal("json", e),
        }
    }
}

/// Adds operation context to fallible results.
pub trait ResultExt<T> {
    /// Wraps an error with a fixed operation description.
    fn context(self, operation: &str) -> SyncResult<T>;

    /// Wraps an error with a lazily built operation description.
    fn with_context<F: FnOnce() -> String>(self, operation: F) -> SyncResult<T>;
}

impl<T> ResultExt<T> for SyncResult<T> {
    fn context(self, operation: &str) -> SyncResult<T> {
        self.map_err(|e| e.context(operation))
    }

    fn with_context<F: FnOnce() -> String>(self, operation: F) -> SyncResult<T> {
        self.map_err(|e| e.context(operation()))
    }
}
