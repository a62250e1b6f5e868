//! Error types for Brotli decoding.
//!
//! This module provides the [`BrotliError`] type, the error a container
//! (ZIP reader, HTTP body, archive entry) sees when it hands a compressed
//! payload to this crate.
//!
//! ## Error Categories
//!
//! | Category | Errors | Description |
//! |----------|--------|-------------|
//! | Stream | [`Decompress`] | The compressed stream is corrupt, truncated or unsupported |
//! | Container | [`LengthMismatch`], [`InvalidRange`] | The payload does not match what the container declared |
//! | I/O | [`Io`] | Reading the payload failed |
//!
//! ## Example
//!
//! ```rust
//! use brotli_stream::{decompress, BrotliError};
//!
//! match decompress(&[0x06], 0) {
//!     Ok(data) => assert!(data.is_empty()),
//!     Err(BrotliError::LengthMismatch { expected, actual }) => {
//!         eprintln!("Expected {} bytes, got {}", expected, actual)
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```
//!
//! [`Decompress`]: BrotliError::Decompress
//! [`LengthMismatch`]: BrotliError::LengthMismatch
//! [`InvalidRange`]: BrotliError::InvalidRange
//! [`Io`]: BrotliError::Io

use std::fmt;
use std::io;

use crate::decompress::{DecompressError, ErrorCode};

/// Error type for Brotli payloads.
#[derive(Debug)]
pub enum BrotliError {
    /// The decoder rejected the stream.
    ///
    /// Any bytes already written to the output buffer must not be trusted.
    Decompress(DecompressError),

    /// The stream ended cleanly but produced a different number of bytes
    /// than the container declared.
    LengthMismatch {
        /// Declared uncompressed size.
        expected: usize,
        /// Bytes actually produced.
        actual: usize,
    },

    /// The payload range lies outside its source.
    InvalidRange {
        /// First byte of the requested range.
        offset: u64,
        /// Length of the source.
        length: u64,
    },

    /// An I/O error occurred while reading the payload.
    Io(io::Error),
}

impl BrotliError {
    /// Decoder status corresponding to this error.
    ///
    /// A length mismatch happens after a clean `End`; errors raised before
    /// decoding started report `Ok`.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Decompress(e) => e.code(),
            Self::LengthMismatch { .. } => ErrorCode::End,
            Self::InvalidRange { .. } | Self::Io(_) => ErrorCode::Ok,
        }
    }
}

impl fmt::Display for BrotliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decompress(e) => write!(f, "Brotli decompression failed: {}", e),
            Self::LengthMismatch { expected, actual } => {
                write!(
                    f,
                    "Decompressed size mismatch: expected {} bytes, got {}",
                    expected, actual
                )
            }
            Self::InvalidRange { offset, length } => {
                write!(f, "Invalid payload range at {} (source length: {})", offset, length)
            }
            Self::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for BrotliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decompress(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for BrotliError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<DecompressError> for BrotliError {
    fn from(e: DecompressError) -> Self {
        Self::Decompress(e)
    }
}

pub type Result<T> = std::result::Result<T, BrotliError>;
