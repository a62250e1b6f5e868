//! The Brotli decode loop.
//!
//! Reads the window size, then meta-blocks until the last one, running the
//! insert-and-copy commands of each into the ring buffer and the caller's
//! output buffer.

use super::{
    bit_reader::BitReader,
    block::BlockCategory,
    command::{Command, DistanceCache},
    dictionary::lookup_reference,
    meta_block::{read_window_bits, MetaBlock, MetaBlockHeader},
    ring_buffer::RingBuffer,
    tables::WINDOW_GAP,
    DecompressError, ErrorCode, Result,
};

/// Options for a single decode call.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    /// Bit offset of the stream within the input slice.
    pub bit_offset: u64,
    /// Require the bits after the last meta-block (up to the next byte
    /// boundary) to be zero.
    pub strict_padding: bool,
}

/// State that lives for one stream.
pub struct DecoderState {
    /// Current status
    pub status: ErrorCode,
    /// WBITS of the stream
    pub window_bits: u32,
    /// Largest back-reference distance the window allows
    pub max_backward_distance: usize,
    /// Bytes written to the output buffer
    pub bytes_written: usize,
    /// Bit position of the reader when decoding stopped
    pub bit_position: u64,
    /// Last four distances, kept across meta-blocks
    pub distances: DistanceCache,
    /// Sliding window
    ring: RingBuffer,
}

impl DecoderState {
    fn new() -> Self {
        Self {
            status: ErrorCode::Ok,
            window_bits: 0,
            max_backward_distance: 0,
            bytes_written: 0,
            bit_position: 0,
            distances: DistanceCache::default(),
            ring: RingBuffer::new(1),
        }
    }

    /// Append one byte to the window and the output.
    #[inline]
    fn emit(&mut self, byte: u8, output: &mut [u8]) -> Result<()> {
        let capacity = output.len();
        let slot = output
            .get_mut(self.bytes_written)
            .ok_or(DecompressError::BufferOverflow { capacity })?;
        *slot = byte;
        self.ring.push(byte);
        self.bytes_written += 1;
        Ok(())
    }

    fn emit_slice(&mut self, bytes: &[u8], output: &mut [u8]) -> Result<()> {
        let capacity = output.len();
        let end = self.bytes_written + bytes.len();
        output
            .get_mut(self.bytes_written..end)
            .ok_or(DecompressError::BufferOverflow { capacity })?
            .copy_from_slice(bytes);
        self.ring.extend_from_slice(bytes);
        self.bytes_written = end;
        Ok(())
    }

    fn copy_match(&mut self, distance: usize, len: usize, output: &mut [u8]) -> Result<()> {
        let capacity = output.len();
        let end = self.bytes_written + len;
        let out = output
            .get_mut(self.bytes_written..end)
            .ok_or(DecompressError::BufferOverflow { capacity })?;
        self.ring.copy_match(distance, out)?;
        self.bytes_written = end;
        Ok(())
    }
}

/// Brotli stream decoder.
///
/// Decodes a complete stream held in memory into a caller-sized buffer.
pub struct BrotliDecoder {
    state: DecoderState,
}

impl BrotliDecoder {
    /// Create a new decoder.
    pub fn new() -> Self {
        Self {
            state: DecoderState::new(),
        }
    }

    /// Reset the decoder for a new stream.
    pub fn reset(&mut self) {
        self.state = DecoderState::new();
    }

    /// Decode a whole stream into `output`.
    ///
    /// Returns the number of bytes written. On error the output contents
    /// are unspecified and [`status`](Self::status) holds the error code.
    pub fn decode(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        self.decode_with_options(input, output, &DecodeOptions::default())
    }

    /// Decode a whole stream into `output` with explicit options.
    pub fn decode_with_options(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        options: &DecodeOptions,
    ) -> Result<usize> {
        self.reset();
        let mut reader = BitReader::with_bit_offset(input, options.bit_offset);
        let result = self.decode_stream(&mut reader, output, options);
        self.state.bit_position = reader.bit_position();

        match &result {
            Ok(_) => self.state.status = ErrorCode::End,
            Err(e) => {
                self.state.status = e.code();
                tracing::debug!(
                    "Brotli decode failed at bit {} after {} bytes: {}",
                    self.state.bit_position,
                    self.state.bytes_written,
                    e
                );
            }
        }
        result
    }

    /// Decode a stream whose uncompressed size is known.
    ///
    /// The result holds the bytes actually produced, which a container
    /// should compare against `unpacked_size`.
    pub fn decompress(&mut self, input: &[u8], unpacked_size: usize) -> Result<Vec<u8>> {
        let mut output = vec![0u8; unpacked_size];
        let written = self.decode(input, &mut output)?;
        output.truncate(written);
        Ok(output)
    }

    /// Status of the last decode.
    pub fn status(&self) -> ErrorCode {
        self.state.status
    }

    /// Bytes produced by the last decode.
    pub fn bytes_written(&self) -> usize {
        self.state.bytes_written
    }

    /// Input bytes consumed by the last decode, counting a partial byte.
    pub fn bytes_consumed(&self) -> usize {
        self.state.bit_position.div_ceil(8) as usize
    }

    /// Full decoder state.
    pub fn state(&self) -> &DecoderState {
        &self.state
    }

    fn decode_stream(
        &mut self,
        reader: &mut BitReader,
        output: &mut [u8],
        options: &DecodeOptions,
    ) -> Result<usize> {
        let window_bits = read_window_bits(reader)?;
        self.state.window_bits = window_bits;
        self.state.max_backward_distance = (1usize << window_bits) - WINDOW_GAP;
        self.state.ring = RingBuffer::for_stream(window_bits, output.len());
        tracing::debug!(
            "Brotli stream: window {} bits, ring buffer {} bytes",
            window_bits,
            self.state.ring.capacity()
        );

        loop {
            let header = MetaBlockHeader::read(reader)?;
            if header.is_last_empty {
                break;
            }
            let mut meta_block = MetaBlock::read(reader, header)?;
            self.decode_commands(reader, &mut meta_block, output)?;
            if header.is_last {
                break;
            }
        }

        if options.strict_padding {
            let padding = reader.bits_to_byte_boundary();
            if reader.read_bits(padding)? != 0 {
                return Err(DecompressError::SyntaxError(
                    "non-zero padding after last meta-block",
                ));
            }
        }

        Ok(self.state.bytes_written)
    }

    /// Run the commands of one meta-block.
    fn decode_commands(
        &mut self,
        reader: &mut BitReader,
        meta_block: &mut MetaBlock,
        output: &mut [u8],
    ) -> Result<()> {
        let state = &mut self.state;
        let mlen = meta_block.header.mlen;
        let mut pos = 0;

        while pos < mlen {
            let command_type = meta_block.block(BlockCategory::InsertCopy).advance(reader)?;
            let symbol = meta_block.command_code(command_type)?.decode(reader)?;
            let command = Command::read(symbol, reader)?;

            // Insert literals; the last command may stop short of its insert length.
            for _ in 0..command.insert_len {
                if pos >= mlen {
                    break;
                }
                let literal_type = meta_block.block(BlockCategory::Literal).advance(reader)?;
                let context_id = meta_block
                    .context_mode(literal_type)?
                    .context_id(state.ring.byte_back(1), state.ring.byte_back(2));
                let literal = meta_block
                    .literal_code(literal_type, context_id)?
                    .decode(reader)?;
                state.emit(literal as u8, output)?;
                pos += 1;
            }
            if pos >= mlen {
                break;
            }

            let (distance, record) = if command.implicit_distance {
                (state.distances.last(1), false)
            } else {
                let distance_type = meta_block.block(BlockCategory::Distance).advance(reader)?;
                let dcode = meta_block
                    .distance_code(distance_type, command.distance_context)?
                    .decode(reader)? as u32;
                let distance =
                    state
                        .distances
                        .resolve(dcode, &meta_block.distance_params, reader)?;
                (distance, dcode != 0)
            };

            let max_distance = state.max_backward_distance.min(state.bytes_written);
            if distance <= max_distance {
                if pos + command.copy_len > mlen {
                    return Err(DecompressError::SyntaxError(
                        "back-reference runs past the meta-block",
                    ));
                }
                if record {
                    state.distances.push(distance);
                }
                state.copy_match(distance, command.copy_len, output)?;
                pos += command.copy_len;
            } else {
                let word = lookup_reference(command.copy_len, distance - max_distance - 1)?;
                if pos + word.len() > mlen {
                    return Err(DecompressError::SyntaxError(
                        "dictionary word runs past the meta-block",
                    ));
                }
                state.emit_slice(word.as_bytes(), output)?;
                pos += word.len();
            }
        }

        Ok(())
    }
}

impl Default for BrotliDecoder {
    fn default() -> Self {
        Self::new()
    }
}
