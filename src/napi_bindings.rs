//! NAPI bindings for brotli-stream.
//!
//! Exposes Brotli decompression of buffers and file payloads to Node.js.

#![allow(missing_docs)]

use napi::bindgen_prelude::*;
use napi_derive::napi;
use std::sync::Arc;

use crate::file_media::{decompress_media, LocalFileMedia as RustLocalFileMedia, PayloadRange};

fn to_napi_error(e: impl std::fmt::Display) -> Error {
    Error::from_reason(format!("{}", e))
}

/// LocalFileMedia - reads compressed payloads from the local filesystem.
#[napi]
pub struct LocalFileMedia {
    inner: Arc<RustLocalFileMedia>,
}

#[napi]
impl LocalFileMedia {
    #[napi(constructor)]
    pub fn new(path: String) -> Result<Self> {
        let inner = RustLocalFileMedia::new(&path)
            .map_err(|e| Error::from_reason(format!("Failed to open file: {}", e)))?;
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    #[napi(getter)]
    pub fn name(&self) -> String {
        self.inner.name().to_string()
    }

    #[napi(getter)]
    pub fn length(&self) -> i64 {
        self.inner.length() as i64
    }

    /// Read and decompress the payload at `range`.
    #[napi]
    pub async fn decompress(&self, range: PayloadRangeJs) -> Result<Buffer> {
        let range = range.into_range()?;
        let data = decompress_media(self.inner.as_ref(), range)
            .await
            .map_err(to_napi_error)?;
        Ok(Buffer::from(data))
    }
}

/// Location and sizes of a compressed payload.
#[napi(object)]
pub struct PayloadRangeJs {
    pub offset: i64,
    pub compressed_length: i64,
    pub uncompressed_size: u32,
}

impl PayloadRangeJs {
    fn into_range(self) -> Result<PayloadRange> {
        if self.offset < 0 || self.compressed_length < 0 {
            return Err(Error::from_reason("Payload offset and length must not be negative"));
        }
        Ok(PayloadRange {
            offset: self.offset as u64,
            compressed_len: self.compressed_length as u64,
            uncompressed_len: self.uncompressed_size as usize,
        })
    }
}

/// Decompress a buffer whose uncompressed size is known.
#[napi(js_name = "decompress")]
pub fn decompress_buffer(buffer: Buffer, uncompressed_size: u32) -> Result<Buffer> {
    let data = crate::decompress(&buffer, uncompressed_size as usize).map_err(to_napi_error)?;
    Ok(Buffer::from(data))
}

/// One entry of a batch decode.
#[napi(object)]
pub struct CompressedPayload {
    pub data: Buffer,
    pub uncompressed_size: u32,
}

/// Decompress independent buffers in parallel.
///
/// Fails with the first error in input order.
#[napi]
pub fn decompress_batch(payloads: Vec<CompressedPayload>) -> Result<Vec<Buffer>> {
    let items: Vec<(&[u8], usize)> = payloads
        .iter()
        .map(|p| (&p.data[..], p.uncompressed_size as usize))
        .collect();

    crate::decompress_batch(&items)
        .into_iter()
        .map(|result| result.map(Buffer::from).map_err(to_napi_error))
        .collect()
}

/// Read a payload from a file and decompress it.
#[napi]
pub async fn decompress_file(path: String, range: PayloadRangeJs) -> Result<Buffer> {
    let media = RustLocalFileMedia::new(&path)
        .map_err(|e| Error::from_reason(format!("Failed to open file: {}", e)))?;
    let range = range.into_range()?;
    let data = decompress_media(&media, range)
        .await
        .map_err(to_napi_error)?;
    Ok(Buffer::from(data))
}

/// Leading header fields of a Brotli stream.
#[napi(object)]
pub struct BrotliStreamInfo {
    pub window_bits: u32,
    pub is_empty: bool,
    pub first_meta_block_length: u32,
    pub single_meta_block: bool,
}

/// Parse the window size and first meta-block header of a stream.
///
/// Returns `null` when the buffer does not start with valid headers.
#[napi]
pub fn parse_stream_info(buffer: Buffer) -> Result<Option<BrotliStreamInfo>> {
    let data: &[u8] = &buffer;

    let info = match crate::read_stream_info(data) {
        Ok(info) => info,
        Err(_) => return Ok(None),
    };

    Ok(Some(BrotliStreamInfo {
        window_bits: info.window_bits,
        is_empty: info.is_empty,
        first_meta_block_length: info.first_meta_block_len as u32,
        single_meta_block: info.single_meta_block,
    }))
}
