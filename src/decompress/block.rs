//! Block types and block switching.
//!
//! Each of the three symbol categories is split into blocks; every block
//! has a type that selects prefix codes (directly or through a context
//! map). When a block is used up, a block-switch command picks the next
//! type and length.

use super::huffman::read_prefix_code;
use super::tables::{
    BLOCK_LENGTH_PREFIX, BLOCK_LEN_UNBOUNDED, MAX_BLOCK_TYPES, NUM_BLOCK_LEN_SYMBOLS,
};
use super::{BitReader, HuffmanTable, Result};

/// Symbol categories that carry their own block structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockCategory {
    Literal = 0,
    InsertCopy = 1,
    Distance = 2,
}

/// Read a count in 1..=256 (NBLTYPES, NTREES).
pub(crate) fn read_count_256(reader: &mut BitReader) -> Result<usize> {
    if !reader.read_bit()? {
        return Ok(1);
    }
    let n = reader.read_bits(3)?;
    if n == 0 {
        return Ok(2);
    }
    let count = (1 << n) + reader.read_bits(n)? as usize + 1;
    debug_assert!(count <= MAX_BLOCK_TYPES);
    Ok(count)
}

/// Type that follows a block-switch code.
///
/// Code 0 selects the second-to-last type, code 1 the current type plus
/// one, and code `n >= 2` type `n - 2`, all modulo `num_types`.
pub fn next_block_type(code: usize, current: usize, last: usize, num_types: usize) -> usize {
    let next = match code {
        0 => last,
        1 => current + 1,
        n => n - 2,
    };
    if next >= num_types {
        next - num_types
    } else {
        next
    }
}

fn read_block_length(reader: &mut BitReader, code: &HuffmanTable) -> Result<u32> {
    let symbol = code.decode(reader)? as usize;
    let (offset, extra_bits) = BLOCK_LENGTH_PREFIX[symbol];
    Ok(offset + reader.read_bits(extra_bits as u32)?)
}

/// Block-switch state of one category within a meta-block.
#[derive(Debug, Clone)]
pub struct BlockState {
    pub num_types: usize,
    pub block_type: usize,
    /// Second-to-last block type
    pub last_block_type: usize,
    /// Symbols left in the current block
    pub block_len: u32,
    type_code: HuffmanTable,
    len_code: HuffmanTable,
}

impl BlockState {
    /// A category with a single block type that never switches.
    pub fn single() -> Self {
        Self {
            num_types: 1,
            block_type: 0,
            last_block_type: 1,
            block_len: BLOCK_LEN_UNBOUNDED,
            type_code: HuffmanTable::default(),
            len_code: HuffmanTable::default(),
        }
    }

    /// Read NBLTYPES and, if there is more than one type, the block-type
    /// code, the block-count code and the first block length.
    pub fn read(reader: &mut BitReader) -> Result<Self> {
        let num_types = read_count_256(reader)?;
        if num_types == 1 {
            return Ok(Self::single());
        }

        let type_code = read_prefix_code(reader, num_types + 2)?;
        let len_code = read_prefix_code(reader, NUM_BLOCK_LEN_SYMBOLS)?;
        let block_len = read_block_length(reader, &len_code)?;
        Ok(Self {
            num_types,
            block_len,
            type_code,
            len_code,
            ..Self::single()
        })
    }

    /// Account for one symbol of this category, switching blocks first if
    /// the current one is used up. Returns the block type to use.
    #[inline]
    pub fn advance(&mut self, reader: &mut BitReader) -> Result<usize> {
        if self.num_types > 1 {
            if self.block_len == 0 {
                self.switch(reader)?;
            }
            self.block_len -= 1;
        }
        Ok(self.block_type)
    }

    fn switch(&mut self, reader: &mut BitReader) -> Result<()> {
        let code = self.type_code.decode(reader)? as usize;
        let next = next_block_type(code, self.block_type, self.last_block_type, self.num_types);
        self.last_block_type = self.block_type;
        self.block_type = next;
        self.block_len = read_block_length(reader, &self.len_code)?;
        tracing::trace!(
            "Block switch: type {} for {} symbols",
            self.block_type,
            self.block_len
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decompress::test_utils::BitWriter;

    #[test]
    fn test_next_block_type() {
        assert_eq!(next_block_type(0, 2, 1, 4), 1);
        assert_eq!(next_block_type(1, 2, 1, 4), 3);
        assert_eq!(next_block_type(5, 2, 1, 4), 3);
    }

    #[test]
    fn test_next_block_type_wraps() {
        assert_eq!(next_block_type(1, 3, 0, 4), 0);
        assert_eq!(next_block_type(1, 1, 0, 2), 0);
        assert_eq!(next_block_type(2, 1, 0, 2), 0);
    }

    #[test]
    fn test_read_count_256() {
        for count in [1, 2, 3, 4, 17, 128, 255, 256] {
            let mut w = BitWriter::new();
            w.count_256(count);
            let data = w.finish();
            let mut reader = BitReader::new(&data);
            assert_eq!(read_count_256(&mut reader).unwrap(), count as usize);
        }
    }

    #[test]
    fn test_single_type_never_switches() {
        let data = [0u8];
        let mut reader = BitReader::new(&data);
        let mut state = BlockState::read(&mut reader).unwrap();
        assert_eq!(reader.bit_position(), 1);

        for _ in 0..100 {
            assert_eq!(state.advance(&mut reader).unwrap(), 0);
        }
        assert_eq!(state.block_len, BLOCK_LEN_UNBOUNDED);
        assert_eq!(reader.bit_position(), 1);
    }

    #[test]
    fn test_switch_after_block_ends() {
        let mut w = BitWriter::new();
        w.count_256(2);
        // Block-type code over 4 symbols: codes 0 and 1.
        w.simple_code(4, &[0, 1]);
        // Block-count code: symbols 0 (1..=4) and 1 (5..=8).
        w.simple_code(NUM_BLOCK_LEN_SYMBOLS, &[0, 1]);
        // First block: symbol 0 with extra 1 -> length 2.
        w.code(0, 1).bits(1, 2);
        // Switch code 1 (next type), then symbol 1 with extra 0 -> length 5.
        w.code(1, 1).code(1, 1).bits(0, 2);
        let data = w.finish();

        let mut reader = BitReader::new(&data);
        let mut state = BlockState::read(&mut reader).unwrap();
        assert_eq!(state.num_types, 2);
        assert_eq!(state.block_len, 2);

        assert_eq!(state.advance(&mut reader).unwrap(), 0);
        assert_eq!(state.advance(&mut reader).unwrap(), 0);
        assert_eq!(state.advance(&mut reader).unwrap(), 1);
        assert_eq!(state.last_block_type, 0);
        assert_eq!(state.block_len, 4);
    }
}
