//! Bit reader for compressed data streams.
//!
//! Reads bits from a byte slice, LSB first (Brotli/DEFLATE convention):
//! the first bit of the stream is bit 0 of the first byte.

use super::{DecompressError, Result};

/// Largest field peeked or read in one call.
pub const MAX_READ_BITS: u32 = 24;

/// Bit reader that reads from a byte slice.
///
/// Peeking past the end of the slice yields zero bits, so a 16-bit
/// lookahead for a prefix code is always possible. Consuming bits past the
/// end is an error.
pub struct BitReader<'a> {
    data: &'a [u8],
    /// Next byte to load into the buffer
    pos: usize,
    /// Bits consumed since the start of `data`
    bit_pos: u64,
    /// Bit buffer, next stream bit in bit 0
    buffer: u64,
    /// Bits available in buffer (including zero padding past the end)
    bits_in_buffer: u32,
}

impl<'a> BitReader<'a> {
    /// Create a new bit reader from a byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_bit_offset(data, 0)
    }

    /// Create a bit reader whose first bit is `bit_offset` bits into `data`.
    ///
    /// Containers use this when the compressed stream does not start on a
    /// byte boundary.
    pub fn with_bit_offset(data: &'a [u8], bit_offset: u64) -> Self {
        let mut reader = Self {
            data,
            pos: (bit_offset >> 3) as usize,
            bit_pos: bit_offset,
            buffer: 0,
            bits_in_buffer: 0,
        };
        reader.fill_buffer();
        let skip = (bit_offset & 7) as u32;
        reader.buffer >>= skip;
        reader.bits_in_buffer -= skip;
        reader
    }

    /// Fill the buffer with more bytes.
    #[inline]
    fn fill_buffer(&mut self) {
        while self.bits_in_buffer <= 56 {
            let byte = self.data.get(self.pos).copied().unwrap_or(0);
            self.buffer |= (byte as u64) << self.bits_in_buffer;
            self.bits_in_buffer += 8;
            self.pos += 1;
        }
    }

    #[inline]
    fn bit_len(&self) -> u64 {
        self.data.len() as u64 * 8
    }

    /// Peek at the next n bits without consuming them.
    #[inline]
    pub fn peek_bits(&self, n: u32) -> u32 {
        debug_assert!(n <= MAX_READ_BITS);
        (self.buffer & ((1u64 << n) - 1)) as u32
    }

    /// Read n bits and advance the position.
    #[inline]
    pub fn read_bits(&mut self, n: u32) -> Result<u32> {
        let value = self.peek_bits(n);
        self.advance_bits(n)?;
        Ok(value)
    }

    /// Advance by n bits.
    #[inline]
    pub fn advance_bits(&mut self, n: u32) -> Result<()> {
        if self.bit_pos + n as u64 > self.bit_len() {
            return Err(DecompressError::NeedMoreInput {
                bit_position: self.bit_pos,
            });
        }
        self.buffer >>= n;
        self.bits_in_buffer -= n;
        self.bit_pos += n as u64;
        self.fill_buffer();
        Ok(())
    }

    /// Read a single bit.
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? != 0)
    }

    /// Align to byte boundary by skipping remaining bits in current byte.
    pub fn align_to_byte(&mut self) -> Result<()> {
        let used = (self.bit_pos & 7) as u32;
        if used > 0 {
            self.advance_bits(8 - used)?;
        }
        Ok(())
    }

    /// Bits left before the next byte boundary.
    pub fn bits_to_byte_boundary(&self) -> u32 {
        ((8 - (self.bit_pos & 7)) & 7) as u32
    }

    /// Get the current bit position.
    pub fn bit_position(&self) -> u64 {
        self.bit_pos
    }

    /// Check if at end of data.
    pub fn is_eof(&self) -> bool {
        self.bit_pos >= self.bit_len()
    }

    /// Remaining bits available.
    pub fn remaining_bits(&self) -> u64 {
        self.bit_len().saturating_sub(self.bit_pos)
    }
}
