//! Error types for txmap core.

use crate::types::ContextId;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in txmap core operations.
///
/// Missing keys are never errors; lookups and removals report them as
/// `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Operation not permitted in the context's current transaction state.
    #[error("invalid state: {message}")]
    InvalidState {
        /// Description of why the operation is invalid.
        message: String,
    },

    /// A transaction is already open and the map rejects re-opening.
    #[error("transaction already open for {context}")]
    TransactionAlreadyOpen {
        /// The context that already owns an open transaction.
        context: ContextId,
    },

    /// Transaction was aborted by its caller.
    #[error("transaction aborted: {reason}")]
    TransactionAborted {
        /// Reason for abort.
        reason: String,
    },
}

impl CoreError {
    /// Creates an invalid state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// The error returned by commit and rollback when nothing is open.
    pub fn not_open() -> Self {
        Self::invalid_state("transaction is not open")
    }

    /// Creates a transaction aborted error.
    pub fn transaction_aborted(reason: impl Into<String>) -> Self {
        Self::TransactionAborted {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_open_message() {
        assert_eq!(
            CoreError::not_open().to_string(),
            "invalid state: transaction is not open"
        );
    }

    #[test]
    fn already_open_names_context() {
        let err = CoreError::TransactionAlreadyOpen {
            context: ContextId::new(7),
        };
        assert_eq!(err.to_string(), "transaction already open for ctx:7");
    }
}
