//! Error types for the protocol layer.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors raised while encoding or decoding wire values.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// The identifier does not decode to `<tag>/<number>`.
    #[error("malformed identifier {value:?}: {reason}")]
    MalformedIdentifier {
        /// The offending wire value.
        value: String,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// A group reference has no wire identifier yet.
    #[error("group {name:?} has no identifier")]
    UnresolvedGroup {
        /// Group name.
        name: String,
    },

    /// JSON (de)serialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProtocolError {
    pub(crate) fn malformed(value: impl Into<String>, reason: &'static str) -> Self {
        Self::MalformedIdentifier {
            value: value.into(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ProtocolError::malformed("QmxvZw", "missing '/' separator");
        assert_eq!(
            err.to_string(),
            "malformed identifier \"QmxvZw\": missing '/' separator"
        );

        let err = ProtocolError::UnresolvedGroup {
            name: "Home".into(),
        };
        assert!(err.to_string().contains("Home"));
    }
}
