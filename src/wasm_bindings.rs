//! WASM bindings for brotli-stream.
//!
//! Provides a browser-compatible API for Brotli decompression.

use wasm_bindgen::prelude::*;

use crate::decompress::{read_stream_info, BrotliDecoder, ErrorCode};

/// Check whether a buffer starts with plausible Brotli stream headers.
///
/// Brotli has no magic number, so this only checks that the window size
/// and first meta-block header parse.
#[wasm_bindgen]
pub fn is_brotli_stream(data: &[u8]) -> bool {
    read_stream_info(data).is_ok()
}

/// WASM-compatible Brotli decompressor.
#[wasm_bindgen]
pub struct WasmBrotliDecoder {
    decoder: BrotliDecoder,
    unpacked_size: usize,
}

#[wasm_bindgen]
impl WasmBrotliDecoder {
    /// Create a new decoder for the specified unpacked size.
    #[wasm_bindgen(constructor)]
    pub fn new(unpacked_size: usize) -> Self {
        Self {
            decoder: BrotliDecoder::new(),
            unpacked_size,
        }
    }

    /// Decompress a complete stream.
    #[wasm_bindgen]
    pub fn decompress(&mut self, data: &[u8]) -> Result<Vec<u8>, JsError> {
        self.decoder
            .decompress(data, self.unpacked_size)
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Get total bytes decompressed by the last call.
    #[wasm_bindgen(js_name = bytesWritten)]
    pub fn bytes_written(&self) -> usize {
        self.decoder.bytes_written()
    }

    /// Check if the last stream decoded to its end.
    #[wasm_bindgen(js_name = isComplete)]
    pub fn is_complete(&self) -> bool {
        self.decoder.status() == ErrorCode::End
    }

    /// Numeric status of the last decode.
    #[wasm_bindgen]
    pub fn status(&self) -> u8 {
        self.decoder.status() as u8
    }

    /// Reset the decoder for a new stream.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.decoder.reset();
    }
}

/// Decompress a stream whose uncompressed size is known.
#[wasm_bindgen]
pub fn decompress(data: &[u8], unpacked_size: usize) -> Result<Vec<u8>, JsError> {
    crate::decompress(data, unpacked_size).map_err(|e| JsError::new(&e.to_string()))
}

/// Parse the window size and first meta-block header of a stream.
#[wasm_bindgen(js_name = streamInfo)]
pub fn stream_info(data: &[u8]) -> Result<JsValue, JsError> {
    let info = read_stream_info(data)
        .map_err(|e| JsError::new(&format!("Invalid stream header: {}", e)))?;

    let obj = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&obj, &"windowBits".into(), &JsValue::from_f64(info.window_bits as f64));
    let _ = js_sys::Reflect::set(&obj, &"isEmpty".into(), &JsValue::from_bool(info.is_empty));
    let _ = js_sys::Reflect::set(
        &obj,
        &"firstMetaBlockLength".into(),
        &JsValue::from_f64(info.first_meta_block_len as f64),
    );
    let _ = js_sys::Reflect::set(
        &obj,
        &"singleMetaBlock".into(),
        &JsValue::from_bool(info.single_meta_block),
    );

    Ok(obj.into())
}
