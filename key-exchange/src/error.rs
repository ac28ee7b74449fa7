//! Error types for parameter and key generation

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KexError {
    /// Envelope or structured payload could not be decoded
    #[error("Format error: {0}")]
    Format(String),

    /// Arithmetic invariant violated (zero modulus, empty range, ...)
    #[error("Domain fault: {0}")]
    DomainFault(&'static str),

    #[error("Safe-prime search exhausted after {attempts} attempts")]
    SearchExhausted { attempts: u64 },

    #[error("Invalid bit length {bits} (must be >= {min})")]
    InvalidBitLength { bits: u64, min: u64 },

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl KexError {
    pub(crate) fn format(reason: impl Into<String>) -> Self {
        KexError::Format(reason.into())
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        KexError::InvalidParameters(reason.into())
    }
}

pub type Result<T> = std::result::Result<T, KexError>;
