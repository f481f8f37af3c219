//! Error types for the postern-spool crate.
//!
//! Every store operation returns [`SpoolError`]. At the acceptance boundary
//! any of these is an infrastructure failure, reported to the client as a
//! temporary rejection.

use std::io;

use thiserror::Error;

use crate::SpooledMessageId;

/// Top-level spool error type.
#[derive(Debug, Error)]
pub enum SpoolError {
    /// I/O operation failed (file read/write/delete).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// Message not found in spool.
    #[error("Message not found: {0}")]
    NotFound(SpooledMessageId),

    /// Spool directory validation failed.
    #[error("Spool validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Internal error (lock poisoning, capacity, etc.).
    #[error("Internal error: {0}")]
    Internal(String),

    /// Message already exists in spool.
    #[error("Message already exists: {0}")]
    AlreadyExists(SpooledMessageId),
}

/// Serialization and deserialization errors.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("Bincode encode error: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("Bincode decode error: {0}")]
    Decode(#[from] bincode::error::DecodeError),
}

/// Spool configuration errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Spool path is not a directory.
    #[error("Spool path is not a directory: {0}")]
    NotDirectory(String),

    /// Spool path is not acceptable (relative, traversal, system directory).
    #[error("Invalid spool path: {0}")]
    InvalidPath(String),
}

/// Specialized `Result` type for spool operations.
pub type Result<T> = std::result::Result<T, SpoolError>;

impl<T> From<std::sync::PoisonError<T>> for SpoolError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        Self::Internal(format!("Lock poisoned: {e}"))
    }
}

impl From<bincode::error::EncodeError> for SpoolError {
    fn from(e: bincode::error::EncodeError) -> Self {
        Self::Serialization(e.into())
    }
}

impl From<bincode::error::DecodeError> for SpoolError {
    fn from(e: bincode::error::DecodeError) -> Self {
        Self::Serialization(e.into())
    }
}
