//! Sliding window over decoded output.
//!
//! Back-references and literal contexts read from the window; every byte
//! written to it is mirrored into the caller's output buffer by the decoder.

use super::{DecompressError, Result};

/// Power-of-two ring buffer holding the most recent output bytes.
pub struct RingBuffer {
    /// Window buffer
    window: Vec<u8>,
    /// Window size mask for wrap-around
    mask: usize,
    /// Current write position in window
    pos: usize,
    /// Total bytes written
    total_written: u64,
}

impl RingBuffer {
    /// Create a ring buffer of `size` bytes (a power of two).
    pub fn new(size: usize) -> Self {
        debug_assert!(size.is_power_of_two());
        Self {
            window: vec![0; size],
            mask: size - 1,
            pos: 0,
            total_written: 0,
        }
    }

    /// Size the window for a stream: `2^window_bits`, but never larger than
    /// needed to address an output of `output_len` bytes.
    pub fn for_stream(window_bits: u32, output_len: usize) -> Self {
        let size = (1usize << window_bits).min(output_len.max(1).next_power_of_two());
        Self::new(size)
    }

    /// Window size in bytes.
    pub fn capacity(&self) -> usize {
        self.window.len()
    }

    /// Append one byte.
    #[inline]
    pub fn push(&mut self, byte: u8) {
        self.window[self.pos] = byte;
        self.pos = (self.pos + 1) & self.mask;
        self.total_written += 1;
    }

    /// Append a run of bytes.
    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.push(byte);
        }
    }

    /// The byte `distance` positions back (1 = last byte written).
    ///
    /// Positions before the start of the stream read as zero.
    #[inline]
    pub fn byte_back(&self, distance: usize) -> u8 {
        if distance == 0 || distance as u64 > self.total_written {
            return 0;
        }
        self.window[self.pos.wrapping_sub(distance) & self.mask]
    }

    /// Copy `out.len()` bytes starting `distance` back, writing each byte to
    /// the window and to `out`.
    ///
    /// Source and destination may overlap, so a short distance repeats the
    /// tail of the window.
    pub fn copy_match(&mut self, distance: usize, out: &mut [u8]) -> Result<()> {
        if distance == 0 || distance as u64 > self.total_written || distance > self.window.len()
        {
            return Err(DecompressError::SyntaxError("back-reference beyond window"));
        }

        let mut src = self.pos.wrapping_sub(distance) & self.mask;
        for slot in out.iter_mut() {
            let byte = self.window[src];
            *slot = byte;
            self.push(byte);
            src = (src + 1) & self.mask;
        }
        Ok(())
    }

    /// Total bytes written.
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// The most recent `len` bytes, oldest first.
    pub fn recent(&self, len: usize) -> Vec<u8> {
        let len = len.min(self.total_written as usize).min(self.window.len());
        (1..=len).rev().map(|back| self.byte_back(back)).collect()
    }
}
