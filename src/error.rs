//! Error types for ranked dictionaries and the succinct structures beneath them.
//!
//! A query that simply has no answer (an absent string, an identifier outside
//! `[1, elements]`) is not an error: those return `None`. Errors are reserved
//! for operations a variant cannot perform, bad construction parameters and
//! corrupt persisted bytes.

use thiserror::Error;

/// Error variants for dictionary and succinct structure operations.
#[derive(Debug, Error)]
pub enum Error {
    /// An index was provided that is out of the structure's bounds.
    #[error("index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// A selection query was performed for a rank that does not exist.
    #[error("invalid selection: rank {0} not found")]
    InvalidSelection(usize),

    /// The dictionary variant cannot answer this kind of query.
    #[error("operation not supported by this dictionary: {0}")]
    Unsupported(&'static str),

    /// A construction parameter was rejected before building anything.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Persisted bytes are truncated, malformed or internally inconsistent.
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    /// An I/O error occurred during serialization or deserialization.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn encoding(msg: impl Into<String>) -> Self {
        Error::InvalidEncoding(msg.into())
    }
}

/// A specialized Result type for dictionary operations.
pub type Result<T> = std::result::Result<T, Error>;
