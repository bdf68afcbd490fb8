use serde::{Deserialize, Serialize};

/// Errors returned by navlink glue operations.
///
/// Transport-level failures of any cause collapse into `Transport`: the RPC
/// runtime's own status codes are not preserved across this boundary. The
/// remote service's result codes are not errors — they pass through to
/// callers as [`crate::types::ServiceStatus`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum NavError {
    /// A call was made before `initialize()` succeeded, or after a
    /// successful `close` tore the shared channel down.
    #[error("client not initialized")]
    NotInitialized,

    /// The RPC call mechanism reported a non-success status.
    #[error("transport failure: {message}")]
    Transport { message: String },

    /// All registry slots are bound; the capacity is hard-capped.
    #[error("too many clients")]
    TooManyClients,

    /// A glue-level request or reply was malformed or mismatched.
    #[error("rejected: {message}")]
    Rejected { message: String },

    /// A synchronous-call wait expired before a matching event arrived.
    #[error("timeout: {operation}")]
    Timeout { operation: String },
}

impl NavError {
    /// Returns `true` for transient errors that may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Timeout { .. })
    }

    /// Convenience constructor for `Transport`.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport { message: message.into() }
    }

    /// Convenience constructor for `Rejected`.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected { message: message.into() }
    }

    /// Convenience constructor for `Timeout`.
    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout { operation: operation.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::NavError;

    #[test]
    fn transport_and_timeout_are_retryable() {
        assert!(NavError::transport("connection refused").is_retryable());
        assert!(NavError::timeout("open").is_retryable());
        assert!(!NavError::NotInitialized.is_retryable());
        assert!(!NavError::TooManyClients.is_retryable());
        assert!(!NavError::rejected("bad payload").is_retryable());
    }

    #[test]
    fn display_includes_message() {
        let err = NavError::transport("clnt_call failed");
        assert_eq!(err.to_string(), "transport failure: clnt_call failed");
    }
}
