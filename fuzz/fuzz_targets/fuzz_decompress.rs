#![no_main]
use libfuzzer_sys::fuzz_target;
use brotli_stream::{BrotliDecoder, ErrorCode};

// Fuzz decompression of arbitrary streams.
fuzz_target!(|data: &[u8]| {
    // First 3 bytes: unpacked size (max 1MB to prevent OOM), rest is the stream
    if data.len() < 3 {
        return;
    }

    let unpacked_size = (u32::from_le_bytes([data[0], data[1], data[2], 0]) as usize) & 0xF_FFFF;
    let compressed = &data[3..];

    let mut output = vec![0u8; unpacked_size];
    let mut decoder = BrotliDecoder::new();
    match decoder.decode(compressed, &mut output) {
        Ok(written) => {
            assert!(written <= unpacked_size);
            assert_eq!(decoder.status(), ErrorCode::End);
        }
        Err(e) => assert_eq!(decoder.status(), e.code()),
    }
});
