//! Error types for handle operations

use crate::value::Value;

/// Result type for every operation routed through a handle or a trap
pub type HandleResult<T> = Result<T, ProxyError>;

/// Failure of a single handle operation.
///
/// Errors surface at the call site of the operation that raised them. Traps
/// may return any variant; the dispatch core passes it through unchanged.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProxyError {
    /// Closed-schema write to a key the store does not have
    #[error("\"{key}\" isn't a valid property")]
    UnknownKey {
        /// Rejected key
        key: String,
    },

    /// Write to a key with no registered predicate
    #[error("no validator registered for \"{key}\"")]
    NoValidator {
        /// Key without a predicate
        key: String,
    },

    /// Predicate rejected the candidate value
    #[error("ValidationError: can't assign {value} to \"{key}\"")]
    Validation {
        /// Target key
        key: String,
        /// Rejected value
        value: Value,
    },

    /// Operation touched a key classified as private
    #[error("\"{key}\" property is blackboxed")]
    PrivacyViolation {
        /// Private key
        key: String,
    },

    /// Operation attempted after the handle was revoked
    #[error("cannot perform operation on a revoked handle")]
    Revoked,

    /// `invoke` on a member that is not an operation
    #[error("\"{key}\" is not an operation")]
    NotInvocable {
        /// Member name
        key: String,
    },

    /// Native write to a slot marked non-writable
    #[error("cannot assign to read-only property \"{key}\"")]
    ReadOnlyKey {
        /// Read-only key
        key: String,
    },

    /// Failure raised by caller-supplied code (trap body, observer, operation)
    #[error("{message}")]
    Trap {
        /// Caller-supplied message
        message: String,
    },
}

impl ProxyError {
    /// Build a caller-defined failure
    pub fn trap(message: impl Into<String>) -> Self {
        ProxyError::Trap {
            message: message.into(),
        }
    }

    /// Key the failure refers to, if any
    pub fn key(&self) -> Option<&str> {
        match self {
            ProxyError::UnknownKey { key }
            | ProxyError::NoValidator { key }
            | ProxyError::Validation { key, .. }
            | ProxyError::PrivacyViolation { key }
            | ProxyError::NotInvocable { key }
            | ProxyError::ReadOnlyKey { key } => Some(key),
            ProxyError::Revoked | ProxyError::Trap { .. } => None,
        }
    }
}

impl From<String> for ProxyError {
    fn from(s: String) -> Self {
        ProxyError::trap(s)
    }
}

impl From<&str> for ProxyError {
    fn from(s: &str) -> Self {
        ProxyError::trap(s)
    }
}
