//! Error taxonomy for the buffer engine
//!
//! Every failure is either a Range violation (offset, length, or size
//! outside valid bounds) or a Type violation (an argument that cannot be
//! coerced). The classification is part of the public contract and is
//! exposed through [`BufferError::kind`].

use thiserror::Error;

/// Classification of a buffer engine failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Offset, length, or size outside valid bounds
    Range,
    /// Argument of a type that cannot be coerced
    Type,
}

/// Buffer engine error types
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BufferError {
    /// Offset or index outside the addressable range
    #[error("Out of range: {0}")]
    OutOfRange(String),

    /// Size argument rejected (negative, non-integral, or non-finite)
    #[error("Invalid size: {0}")]
    InvalidSize(String),

    /// Length above the maximum addressable byte length
    #[error("Length {len} exceeds maximum of {max} bytes")]
    TooLong {
        /// Requested length
        len: u64,
        /// Maximum the engine addresses
        max: u64,
    },

    /// Decoded string would exceed the maximum string length
    #[error("String of {len} bytes exceeds maximum of {max}")]
    StringTooLong {
        /// Byte length of the offending range
        len: usize,
        /// Maximum single-string length
        max: usize,
    },

    /// Argument of a type that cannot be coerced
    #[error("Invalid argument type: {0}")]
    InvalidType(String),

    /// Encoding name not recognized
    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),

    /// Backing store allocation failed
    #[error("Allocation of {0} bytes failed")]
    AllocationFailed(usize),
}

impl BufferError {
    /// Classify the error under the Range/Type taxonomy
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::OutOfRange(_)
            | Self::InvalidSize(_)
            | Self::TooLong { .. }
            | Self::StringTooLong { .. }
            | Self::AllocationFailed(_) => ErrorKind::Range,
            Self::InvalidType(_) | Self::UnknownEncoding(_) => ErrorKind::Type,
        }
    }
}

/// Result alias used across the engine crates
pub type Result<T> = std::result::Result<T, BufferError>;
