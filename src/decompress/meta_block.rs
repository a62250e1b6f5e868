//! Stream and meta-block headers.
//!
//! A Brotli stream is a window-size field followed by meta-blocks. Each
//! compressed meta-block header carries its length, the block-switch state
//! of the three symbol categories, distance parameters, context modes,
//! context maps and the prefix codes used by its commands.

use super::block::{BlockCategory, BlockState};
use super::command::DistanceParams;
use super::context::{read_context_map, ContextMode};
use super::huffman::read_prefix_code;
use super::tables::{
    DISTANCE_CONTEXT_BITS, LITERAL_CONTEXT_BITS, NUM_COMMAND_SYMBOLS, NUM_LITERAL_SYMBOLS,
};
use super::{BitReader, DecompressError, HuffmanTable, Result};

/// Read the WBITS field at the start of a stream.
pub fn read_window_bits(reader: &mut BitReader) -> Result<u32> {
    if !reader.read_bit()? {
        return Ok(16);
    }
    let n = reader.read_bits(3)?;
    if n != 0 {
        return Ok(17 + n);
    }
    match reader.read_bits(3)? {
        0 => Ok(17),
        1 => Err(DecompressError::SyntaxError("large window streams are not supported")),
        m => Ok(8 + m),
    }
}

/// Fields that precede the body of a meta-block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetaBlockHeader {
    pub is_last: bool,
    /// ISLASTEMPTY: the stream ends here without another meta-block.
    pub is_last_empty: bool,
    /// Uncompressed length of the meta-block
    pub mlen: usize,
}

impl MetaBlockHeader {
    pub fn read(reader: &mut BitReader) -> Result<Self> {
        let is_last = reader.read_bit()?;
        if is_last && reader.read_bit()? {
            return Ok(Self {
                is_last,
                is_last_empty: true,
                mlen: 0,
            });
        }

        let nibbles = match reader.read_bits(2)? {
            3 => return Err(DecompressError::SyntaxError("metadata meta-blocks are not supported")),
            n => n + 4,
        };
        let value = reader.read_bits(nibbles * 4)?;
        if nibbles > 4 && value >> ((nibbles - 1) * 4) == 0 {
            return Err(DecompressError::SyntaxError("meta-block length has a zero top nibble"));
        }

        if !is_last && reader.read_bit()? {
            return Err(DecompressError::SyntaxError(
                "uncompressed meta-blocks are not supported",
            ));
        }

        Ok(Self {
            is_last,
            is_last_empty: false,
            mlen: value as usize + 1,
        })
    }
}

/// Summary of a stream's leading headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamInfo {
    /// WBITS of the stream
    pub window_bits: u32,
    /// The stream ends immediately (ISLAST and ISLASTEMPTY)
    pub is_empty: bool,
    /// Uncompressed length of the first meta-block
    pub first_meta_block_len: usize,
    /// The first meta-block is also the last one
    pub single_meta_block: bool,
}

/// Read the window size and the first meta-block header without decoding.
pub fn read_stream_info(data: &[u8]) -> Result<StreamInfo> {
    let mut reader = BitReader::new(data);
    let window_bits = read_window_bits(&mut reader)?;
    let header = MetaBlockHeader::read(&mut reader)?;
    Ok(StreamInfo {
        window_bits,
        is_empty: header.is_last_empty,
        first_meta_block_len: header.mlen,
        single_meta_block: header.is_last,
    })
}

fn read_prefix_codes(
    reader: &mut BitReader,
    count: usize,
    alphabet_size: usize,
) -> Result<Vec<HuffmanTable>> {
    (0..count)
        .map(|_| read_prefix_code(reader, alphabet_size))
        .collect()
}

/// Everything a compressed meta-block declares before its commands.
#[derive(Debug, Clone)]
pub struct MetaBlock {
    pub header: MetaBlockHeader,
    /// Block state per [`BlockCategory`]
    pub blocks: [BlockState; 3],
    pub distance_params: DistanceParams,
    /// Context mode of each literal block type
    pub context_modes: Vec<ContextMode>,
    pub literal_context_map: Vec<u8>,
    pub distance_context_map: Vec<u8>,
    pub literal_codes: Vec<HuffmanTable>,
    pub command_codes: Vec<HuffmanTable>,
    pub distance_codes: Vec<HuffmanTable>,
}

impl MetaBlock {
    /// Read the body header of a compressed meta-block.
    pub fn read(reader: &mut BitReader, header: MetaBlockHeader) -> Result<Self> {
        let blocks = [
            BlockState::read(reader)?,
            BlockState::read(reader)?,
            BlockState::read(reader)?,
        ];

        let postfix_bits = reader.read_bits(2)?;
        let direct_codes = reader.read_bits(4)? << postfix_bits;
        let distance_params = DistanceParams {
            postfix_bits,
            direct_codes,
        };

        let literal_types = blocks[BlockCategory::Literal as usize].num_types;
        let context_modes = (0..literal_types)
            .map(|_| reader.read_bits(2).map(ContextMode::from_bits))
            .collect::<Result<Vec<_>>>()?;

        let (literal_trees, literal_context_map) =
            read_context_map(reader, literal_types << LITERAL_CONTEXT_BITS)?;
        let distance_types = blocks[BlockCategory::Distance as usize].num_types;
        let (distance_trees, distance_context_map) =
            read_context_map(reader, distance_types << DISTANCE_CONTEXT_BITS)?;

        tracing::debug!(
            "Meta-block: {} bytes, block types {}/{}/{}, trees {}/{}, NPOSTFIX {}, NDIRECT {}",
            header.mlen,
            literal_types,
            blocks[BlockCategory::InsertCopy as usize].num_types,
            distance_types,
            literal_trees,
            distance_trees,
            postfix_bits,
            direct_codes
        );

        let literal_codes = read_prefix_codes(reader, literal_trees, NUM_LITERAL_SYMBOLS)?;
        let command_codes = read_prefix_codes(
            reader,
            blocks[BlockCategory::InsertCopy as usize].num_types,
            NUM_COMMAND_SYMBOLS,
        )?;
        let distance_codes =
            read_prefix_codes(reader, distance_trees, distance_params.alphabet_size())?;

        Ok(Self {
            header,
            blocks,
            distance_params,
            context_modes,
            literal_context_map,
            distance_context_map,
            literal_codes,
            command_codes,
            distance_codes,
        })
    }

    /// Block state of one category.
    #[inline]
    pub fn block(&mut self, category: BlockCategory) -> &mut BlockState {
        &mut self.blocks[category as usize]
    }

    /// Context mode of a literal block type.
    #[inline]
    pub fn context_mode(&self, block_type: usize) -> Result<ContextMode> {
        self.context_modes
            .get(block_type)
            .copied()
            .ok_or(DecompressError::ContextMapError {
                run_end: block_type + 1,
                size: self.context_modes.len(),
            })
    }

    /// Literal code for a block type and context id.
    #[inline]
    pub fn literal_code(&self, block_type: usize, context_id: usize) -> Result<&HuffmanTable> {
        let index = (block_type << LITERAL_CONTEXT_BITS) + context_id;
        Self::mapped_code(&self.literal_context_map, &self.literal_codes, index)
    }

    /// Distance code for a block type and distance context.
    #[inline]
    pub fn distance_code(&self, block_type: usize, context: usize) -> Result<&HuffmanTable> {
        let index = (block_type << DISTANCE_CONTEXT_BITS) + context;
        Self::mapped_code(&self.distance_context_map, &self.distance_codes, index)
    }

    /// Insert-and-copy code for a block type.
    #[inline]
    pub fn command_code(&self, block_type: usize) -> Result<&HuffmanTable> {
        self.command_codes
            .get(block_type)
            .ok_or(DecompressError::ContextMapError {
                run_end: block_type + 1,
                size: self.command_codes.len(),
            })
    }

    fn mapped_code<'t>(
        map: &[u8],
        codes: &'t [HuffmanTable],
        index: usize,
    ) -> Result<&'t HuffmanTable> {
        let tree = *map.get(index).ok_or(DecompressError::ContextMapError {
            run_end: index + 1,
            size: map.len(),
        })? as usize;
        codes.get(tree).ok_or(DecompressError::ContextMapError {
            run_end: tree + 1,
            size: codes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decompress::test_utils::BitWriter;

    fn window_bits(w: &BitWriter) -> Result<u32> {
        let data = w.finish();
        read_window_bits(&mut BitReader::new(&data))
    }

    #[test]
    fn test_window_bits() {
        assert_eq!(window_bits(BitWriter::new().bits(0, 1)).unwrap(), 16);
        assert_eq!(window_bits(BitWriter::new().bits(1, 1).bits(1, 3)).unwrap(), 18);
        assert_eq!(window_bits(BitWriter::new().bits(1, 1).bits(7, 3)).unwrap(), 24);
        assert_eq!(
            window_bits(BitWriter::new().bits(1, 1).bits(0, 3).bits(0, 3)).unwrap(),
            17
        );
        assert_eq!(
            window_bits(BitWriter::new().bits(1, 1).bits(0, 3).bits(2, 3)).unwrap(),
            10
        );
        assert_eq!(
            window_bits(BitWriter::new().bits(1, 1).bits(0, 3).bits(7, 3)).unwrap(),
            15
        );
    }

    #[test]
    fn test_large_window_rejected() {
        assert!(matches!(
            window_bits(BitWriter::new().bits(1, 1).bits(0, 3).bits(1, 3)),
            Err(DecompressError::SyntaxError(_))
        ));
    }

    #[test]
    fn test_last_empty_header() {
        let mut w = BitWriter::new();
        w.bits(1, 1).bits(1, 1);
        let data = w.finish();
        let header = MetaBlockHeader::read(&mut BitReader::new(&data)).unwrap();
        assert!(header.is_last && header.is_last_empty);
        assert_eq!(header.mlen, 0);
    }

    #[test]
    fn test_header_lengths() {
        let mut w = BitWriter::new();
        // Not last, 4 nibbles, MLEN-1 = 0xFFFF, compressed.
        w.bits(0, 1).bits(0, 2).bits(0xFFFF, 16).bits(0, 1);
        let data = w.finish();
        let header = MetaBlockHeader::read(&mut BitReader::new(&data)).unwrap();
        assert!(!header.is_last);
        assert_eq!(header.mlen, 0x10000);

        let mut w = BitWriter::new();
        // Last, 5 nibbles, MLEN-1 = 0x12345.
        w.bits(1, 1).bits(0, 1).bits(1, 2).bits(0x12345, 20);
        let data = w.finish();
        let header = MetaBlockHeader::read(&mut BitReader::new(&data)).unwrap();
        assert!(header.is_last && !header.is_last_empty);
        assert_eq!(header.mlen, 0x12346);
    }

    #[test]
    fn test_header_rejects_zero_top_nibble() {
        let mut w = BitWriter::new();
        w.bits(1, 1).bits(0, 1).bits(1, 2).bits(0x0FFFF, 20);
        let data = w.finish();
        assert!(MetaBlockHeader::read(&mut BitReader::new(&data)).is_err());
    }

    #[test]
    fn test_header_rejects_metadata_and_uncompressed() {
        let mut w = BitWriter::new();
        w.bits(1, 1).bits(0, 1).bits(3, 2);
        let data = w.finish();
        assert!(matches!(
            MetaBlockHeader::read(&mut BitReader::new(&data)),
            Err(DecompressError::SyntaxError(_))
        ));

        let mut w = BitWriter::new();
        w.bits(0, 1).bits(0, 2).bits(9, 16).bits(1, 1);
        let data = w.finish();
        assert!(matches!(
            MetaBlockHeader::read(&mut BitReader::new(&data)),
            Err(DecompressError::SyntaxError(_))
        ));
    }

    #[test]
    fn test_stream_info() {
        let info = read_stream_info(&[0x06]).unwrap();
        assert_eq!(
            info,
            StreamInfo {
                window_bits: 16,
                is_empty: true,
                first_meta_block_len: 0,
                single_meta_block: true,
            }
        );

        let mut w = BitWriter::new();
        w.bits(1, 1).bits(6, 3);
        w.bits(0, 1).bits(0, 2).bits(99, 16).bits(0, 1);
        let data = w.finish();
        let info = read_stream_info(&data).unwrap();
        assert_eq!(info.window_bits, 23);
        assert!(!info.is_empty && !info.single_meta_block);
        assert_eq!(info.first_meta_block_len, 100);

        assert!(read_stream_info(&[0x1A]).is_err());
        assert!(read_stream_info(&[]).is_err());
    }

    #[test]
    fn test_minimal_meta_block() {
        let mut w = BitWriter::new();
        // One block type per category, NPOSTFIX 1, NDIRECT 2 << 1.
        w.count_256(1).count_256(1).count_256(1);
        w.bits(1, 2).bits(2, 4);
        // Context mode UTF8, one literal tree, one distance tree.
        w.bits(2, 2).count_256(1).count_256(1);
        // Literal, insert-and-copy and distance codes, one symbol each.
        w.simple_code(256, &[b'z' as u16]);
        w.simple_code(704, &[130]);
        w.simple_code(16 + 4 + 96, &[16]);
        let data = w.finish();

        let header = MetaBlockHeader {
            is_last: true,
            is_last_empty: false,
            mlen: 10,
        };
        let mut reader = BitReader::new(&data);
        let meta_block = MetaBlock::read(&mut reader, header).unwrap();

        assert_eq!(meta_block.distance_params.postfix_bits, 1);
        assert_eq!(meta_block.distance_params.direct_codes, 4);
        assert_eq!(meta_block.context_mode(0).unwrap(), ContextMode::Utf8);
        assert_eq!(meta_block.literal_context_map.len(), 64);
        assert_eq!(meta_block.distance_context_map.len(), 4);

        let literal = meta_block.literal_code(0, 63).unwrap();
        assert_eq!(literal.decode_lookahead(0).unwrap(), (b'z' as u16, 0));
        let command = meta_block.command_code(0).unwrap();
        assert_eq!(command.decode_lookahead(0).unwrap(), (130, 0));
        let distance = meta_block.distance_code(0, 3).unwrap();
        assert_eq!(distance.decode_lookahead(0).unwrap(), (16, 0));

        assert!(meta_block.literal_code(1, 0).is_err());
        assert!(meta_block.command_code(1).is_err());
    }
}
