//! Store errors.

use booklend_core::{CoreError, LedgerError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by store operations and persistence backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No book with this id.
    #[error("book not found: {0}")]
    BookNotFound(String),

    /// No member with this id or name.
    #[error("member not found: {0}")]
    MemberNotFound(String),

    /// No transaction with this id.
    #[error("transaction not found: {0}")]
    TransactionNotFound(String),

    /// A ledger rule rejected the action.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Input failed validation.
    #[error(transparent)]
    Invalid(#[from] CoreError),

    /// A persisted container could not be parsed. Reported as a load
    /// warning; the container falls back to its default.
    #[error("malformed persisted state for {key}: {message}")]
    MalformedPersistedState {
        /// Container key.
        key: String,
        /// Parser message.
        message: String,
    },

    /// A backup document is missing containers or is not valid JSON.
    #[error("invalid backup: {0}")]
    InvalidBackup(String),

    /// Reading or writing a container file failed.
    #[error("failed to access {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A container could not be encoded.
    #[error("failed to encode {key}: {source}")]
    Encode {
        /// Container key.
        key: String,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Whether this is a rejected borrow (or correction) for lack of stock.
    #[must_use]
    pub const fn is_insufficient_stock(&self) -> bool {
        matches!(self, Self::Ledger(LedgerError::InsufficientStock { .. }))
    }

    /// Whether this is a duplicate class registration.
    #[must_use]
    pub const fn is_duplicate_class(&self) -> bool {
        matches!(self, Self::Invalid(CoreError::DuplicateClass { .. }))
    }
}
