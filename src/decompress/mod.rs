//! Brotli decompression (RFC 7932).
//!
//! This module implements the decoding side of the Brotli format: prefix
//! (Huffman) codes, block switching, context modeling, back-references and
//! the static dictionary.
//!
//! ## Components
//!
//! | Component | Module | Role |
//! |-----------|--------|------|
//! | [`BitReader`] | `bit_reader` | LSB-first bit access to the compressed stream |
//! | [`HuffmanTable`] | `huffman` | Canonical prefix codes, simple and complex |
//! | [`ContextMode`] | `context` | Literal context ids and context maps |
//! | [`MetaBlock`] | `meta_block`, `block` | Meta-block headers and block switching |
//! | [`Command`] | `command` | Insert-and-copy commands and distances |
//! | [`RingBuffer`] | `ring_buffer` | Sliding window over the output |
//! | [`BrotliDecoder`] | `decoder` | The decode loop |
//!
//! ## Example
//!
//! ```rust
//! use brotli_stream::BrotliDecoder;
//!
//! // An empty stream: WBITS=16, ISLAST=1, ISLASTEMPTY=1.
//! let mut decoder = BrotliDecoder::new();
//! let mut output = [0u8; 0];
//! assert_eq!(decoder.decode(&[0x06], &mut output).unwrap(), 0);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Compressed Data
//!       ↓
//! ┌─────────────┐
//! │ BitReader   │ ← Bit-level access to compressed stream
//! └─────────────┘
//!       ↓
//! ┌─────────────┐
//! │ MetaBlock   │ ← Header, block switches, context maps, prefix codes
//! └─────────────┘
//!       ↓
//! ┌─────────────┐
//! │ Commands    │ ← Literals, back-references, dictionary words
//! └─────────────┘
//!       ↓
//! ┌─────────────┐
//! │ RingBuffer  │ ← Sliding window, mirrored into the output buffer
//! └─────────────┘
//!       ↓
//! Decompressed Data
//! ```

mod bit_reader;
mod block;
mod command;
mod context;
mod decoder;
mod dictionary;
mod huffman;
mod meta_block;
mod ring_buffer;
mod tables;

#[cfg(test)]
mod test_utils;

pub use bit_reader::BitReader;
pub use block::{next_block_type, BlockCategory, BlockState};
pub use command::{Command, DistanceCache, DistanceParams};
pub use context::{inverse_move_to_front, read_context_map, ContextMode};
pub use decoder::{BrotliDecoder, DecodeOptions, DecoderState};
pub use dictionary::{
    dictionary_word, lookup_reference, transform_word, TransformedWord, WordTransform,
    NUM_TRANSFORMS,
};
pub use huffman::{read_prefix_code, HuffmanTable};
pub use meta_block::{read_stream_info, read_window_bits, MetaBlock, MetaBlockHeader, StreamInfo};
pub use ring_buffer::RingBuffer;

use std::fmt;

/// Decoder status, in the shape containers expect.
///
/// `End` is the only successful terminal value; `Ok` means a decode is in
/// progress (or has not started).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ErrorCode {
    #[default]
    Ok = 0,
    NeedMoreInput = 1,
    SyntaxError = 2,
    End = 3,
    HuffmanLengthError = 4,
    ContextMapError = 5,
    BufferOverflow = 6,
}

impl ErrorCode {
    /// Whether this code describes a failed decode.
    pub fn is_failure(self) -> bool {
        !matches!(self, Self::Ok | Self::End)
    }
}

/// Decompression errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecompressError {
    /// The stream ended before the decoder was done with it.
    NeedMoreInput { bit_position: u64 },
    /// A header field is malformed or uses an unsupported feature.
    SyntaxError(&'static str),
    /// A code-length array violates the Kraft equality, or an empty table
    /// was asked to decode.
    HuffmanLengthError,
    /// A context-map run would overflow the map.
    ContextMapError { run_end: usize, size: usize },
    /// The stream produced more bytes than the output buffer holds.
    BufferOverflow { capacity: usize },
}

impl DecompressError {
    /// The status code recorded in the decoder state for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NeedMoreInput { .. } => ErrorCode::NeedMoreInput,
            Self::SyntaxError(_) => ErrorCode::SyntaxError,
            Self::HuffmanLengthError => ErrorCode::HuffmanLengthError,
            Self::ContextMapError { .. } => ErrorCode::ContextMapError,
            Self::BufferOverflow { .. } => ErrorCode::BufferOverflow,
        }
    }
}

impl fmt::Display for DecompressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NeedMoreInput { bit_position } => {
                write!(f, "Unexpected end of data at bit {}", bit_position)
            }
            Self::SyntaxError(what) => write!(f, "Syntax error: {}", what),
            Self::HuffmanLengthError => write!(f, "Invalid prefix code lengths"),
            Self::ContextMapError { run_end, size } => {
                write!(
                    f,
                    "Context map run ends at {} but the map holds {} entries",
                    run_end, size
                )
            }
            Self::BufferOverflow { capacity } => {
                write!(f, "Decompressed data exceeds output buffer of {} bytes", capacity)
            }
        }
    }
}

impl std::error::Error for DecompressError {}

pub type Result<T> = std::result::Result<T, DecompressError>;
