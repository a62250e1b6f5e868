#![no_main]
use libfuzzer_sys::fuzz_target;
use brotli_stream::read_stream_info;

// Fuzz the window size and first meta-block header.
fuzz_target!(|data: &[u8]| {
    if let Ok(info) = read_stream_info(data) {
        assert!((10..=24).contains(&info.window_bits));
        assert!(info.is_empty || info.first_meta_block_len > 0);
    }
});
