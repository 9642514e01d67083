// ============================================================================
// Engine Errors
// ============================================================================

use std::time::Duration;
use thiserror::Error;

/// Failures reported by an order store, trade history or asset catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store call exceeded {0:?}")]
    Timeout(Duration),

    /// The write was refused because it would break a stored invariant
    #[error("store conflict: {0}")]
    Conflict(String),
}

/// Coarse error classes exposed to transports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    Unavailable,
}

#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed request parameters; never retried
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Order submission failed validation
    #[error("invalid order: {0}")]
    InvalidOrder(String),

    /// Unknown asset or order, or an order the caller may not touch.
    /// Deliberately carries no detail.
    #[error("not found")]
    NotFound,

    #[error("{operation} unavailable (retryable: {retryable})")]
    Unavailable {
        operation: &'static str,
        retryable: bool,
        #[source]
        source: StoreError,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl EngineError {
    /// A failed read; safe to retry
    pub fn read_failed(operation: &'static str, source: StoreError) -> Self {
        EngineError::Unavailable {
            operation,
            retryable: true,
            source,
        }
    }

    /// A failed write; retryable only when the caller supplied an idempotency key
    pub fn write_failed(operation: &'static str, idempotent: bool, source: StoreError) -> Self {
        EngineError::Unavailable {
            operation,
            retryable: idempotent,
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::InvalidInput(_)
            | EngineError::InvalidOrder(_)
            | EngineError::InvalidConfig(_) => ErrorKind::InvalidInput,
            EngineError::NotFound => ErrorKind::NotFound,
            EngineError::Unavailable { .. } => ErrorKind::Unavailable,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EngineError::Unavailable {
                retryable: true,
                ..
            }
        )
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
