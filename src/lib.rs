//! Brotli (RFC 7932) stream decompression with NAPI and WASM bindings.
//!
//! Decodes a complete Brotli stream held in memory into a buffer whose size
//! the caller already knows, the way archive and HTTP containers use it.
//!
//! ## Features
//! - Core library depends only on `tracing` and the static dictionary data
//! - `async` - Async payload reading with tokio
//! - `parallel` - Decode many independent streams with rayon
//! - `napi` - Node.js bindings
//! - `wasm` - Browser WASM bindings
//!
//! ## Example
//!
//! ```rust
//! // WBITS=16, ISLAST=1, ISLASTEMPTY=1: an empty stream.
//! let data = brotli_stream::decompress(&[0x06], 0).unwrap();
//! assert!(data.is_empty());
//! ```

pub mod decompress;
pub mod error;
mod file_media;

#[cfg(feature = "napi")]
mod napi_bindings;

#[cfg(feature = "wasm")]
mod wasm_bindings;

pub use error::BrotliError;
pub use file_media::{LocalFileMedia, PayloadRange};

#[cfg(feature = "async")]
pub use file_media::{decompress_media, FileMedia};

// Re-export decompression types
pub use decompress::{
    read_stream_info, BrotliDecoder, DecodeOptions, DecompressError, ErrorCode, StreamInfo,
};

// Re-export NAPI bindings when feature is enabled
#[cfg(all(feature = "napi", not(feature = "wasm")))]
pub use napi_bindings::*;

// Re-export WASM bindings when feature is enabled
#[cfg(all(feature = "wasm", not(feature = "napi")))]
pub use wasm_bindings::*;

/// Decompress a whole stream whose uncompressed size is `expected_len`.
///
/// Fails with [`BrotliError::LengthMismatch`] if the stream ends cleanly
/// after producing fewer bytes.
pub fn decompress(input: &[u8], expected_len: usize) -> error::Result<Vec<u8>> {
    let data = BrotliDecoder::new().decompress(input, expected_len)?;
    if data.len() != expected_len {
        return Err(BrotliError::LengthMismatch {
            expected: expected_len,
            actual: data.len(),
        });
    }
    Ok(data)
}

/// Decompress independent streams in parallel.
///
/// Each item is `(compressed, expected_len)`; results keep the input order.
#[cfg(feature = "parallel")]
pub fn decompress_batch(items: &[(&[u8], usize)]) -> Vec<error::Result<Vec<u8>>> {
    use rayon::prelude::*;

    items
        .par_iter()
        .map(|&(input, expected_len)| decompress(input, expected_len))
        .collect()
}
