//! Error types shared between the tiers.
//!
//! The `PriceError` enum follows the failure classes of the system: socket
//! transport, protocol decoding, unusable upstream collaborators and storage.
//! A few plumbing variants (JSON, oversized lines, poisoned locks) sit next to them so
//! every crate can propagate a single error type with `?`.
use std::io;
use std::sync::PoisonError;

use thiserror::Error;

/// Unified error type shared by every tier.
#[derive(Error, Debug)]
pub enum PriceError {
    /// Socket or file I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed line, unknown command or invalid token.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The external price source or the persistence tier could not be reached
    /// or answered with something unusable.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The storage collaborator failed to read or write.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// A line exceeded the codec's length limit; the rest of it was discarded.
    #[error("Line longer than {0} bytes")]
    LineTooLong(usize),

    /// Error indicating a poisoned mutex/lock was encountered.
    #[error("Mutex Lock Poisoned: {0}")]
    MutexLock(String),
}

impl<T> From<PoisonError<T>> for PriceError {
    fn from(err: PoisonError<T>) -> Self {
        PriceError::MutexLock(err.to_string())
    }
}
