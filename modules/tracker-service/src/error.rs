//! Error taxonomy shared by the record store and its specializations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Missing or malformed caller input.
    #[error("{0}")]
    Validation(String),

    /// An identifier did not resolve in its collection.
    #[error("{0}")]
    NotFound(String),

    /// The caller failed the access gate.
    #[error("Forbidden")]
    Forbidden,

    /// Collection content exists but does not decode to the expected shape.
    #[error("Corrupt collection: {0}")]
    Corrupt(String),

    #[error("Storage I/O failure: {0}")]
    Io(String),
}

impl StoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        StoreError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        StoreError::NotFound(msg.into())
    }

    /// Corrupt and I/O failures are server faults; everything else is on the caller.
    pub fn is_server_fault(&self) -> bool {
        matches!(self, StoreError::Corrupt(_) | StoreError::Io(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
