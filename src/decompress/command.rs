//! Insert-and-copy commands and distance codes.

use super::tables::{
    COMMAND_LUT, COPY_LENGTH_BASE, COPY_LENGTH_EXTRA, INSERT_LENGTH_BASE, INSERT_LENGTH_EXTRA,
    NUM_DISTANCE_SHORT_CODES, SHORT_CODE_DELTA, SHORT_CODE_INDEX,
};
use super::{BitReader, DecompressError, Result};

/// One decoded insert-and-copy command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    /// Literals to insert before the copy
    pub insert_len: usize,
    /// Bytes to copy from the window or dictionary
    pub copy_len: usize,
    /// Reuse the last distance without reading a distance symbol
    pub implicit_distance: bool,
    /// Distance context id derived from the copy length
    pub distance_context: usize,
}

impl Command {
    /// Expand an insert-and-copy symbol, reading its extra bits.
    pub fn read(symbol: u16, reader: &mut BitReader) -> Result<Self> {
        let prefix = COMMAND_LUT
            .get(symbol as usize)
            .ok_or(DecompressError::SyntaxError("insert-and-copy symbol out of range"))?;
        let insert_code = prefix.insert_code as usize;
        let copy_code = prefix.copy_code as usize;

        let insert_len = INSERT_LENGTH_BASE[insert_code]
            + reader.read_bits(INSERT_LENGTH_EXTRA[insert_code] as u32)?;
        let copy_len =
            COPY_LENGTH_BASE[copy_code] + reader.read_bits(COPY_LENGTH_EXTRA[copy_code] as u32)?;

        Ok(Self {
            insert_len: insert_len as usize,
            copy_len: copy_len as usize,
            implicit_distance: prefix.implicit_distance,
            distance_context: match copy_len {
                2 => 0,
                3 => 1,
                4 => 2,
                _ => 3,
            },
        })
    }
}

/// NPOSTFIX and NDIRECT of a meta-block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DistanceParams {
    pub postfix_bits: u32,
    pub direct_codes: u32,
}

impl DistanceParams {
    /// Size of the distance alphabet.
    pub fn alphabet_size(&self) -> usize {
        (NUM_DISTANCE_SHORT_CODES + self.direct_codes + (48 << self.postfix_bits)) as usize
    }
}

/// The four most recent distances.
///
/// Survives meta-block boundaries; only distances that were actually used
/// for a back-reference are recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceCache {
    slots: [usize; 4],
    index: usize,
}

impl Default for DistanceCache {
    fn default() -> Self {
        Self {
            slots: [16, 15, 11, 4],
            index: 0,
        }
    }
}

impl DistanceCache {
    /// The `n`-th most recent distance (1 = last).
    #[inline]
    pub fn last(&self, n: usize) -> usize {
        self.slots[self.index.wrapping_sub(n) & 3]
    }

    #[inline]
    pub fn push(&mut self, distance: usize) {
        self.slots[self.index & 3] = distance;
        self.index = self.index.wrapping_add(1);
    }

    /// Turn a distance symbol into a distance, reading its extra bits.
    pub fn resolve(
        &self,
        dcode: u32,
        params: &DistanceParams,
        reader: &mut BitReader,
    ) -> Result<usize> {
        if dcode < NUM_DISTANCE_SHORT_CODES {
            let code = dcode as usize;
            let distance = self.last(SHORT_CODE_INDEX[code]) as i64 + SHORT_CODE_DELTA[code];
            if distance <= 0 {
                return Err(DecompressError::SyntaxError("non-positive distance"));
            }
            return Ok(distance as usize);
        }

        let direct_end = NUM_DISTANCE_SHORT_CODES + params.direct_codes;
        if dcode < direct_end {
            return Ok((dcode - NUM_DISTANCE_SHORT_CODES + 1) as usize);
        }

        let x = dcode - direct_end;
        let postfix_mask = (1u32 << params.postfix_bits) - 1;
        let extra_bits = 1 + (x >> (params.postfix_bits + 1));
        let hcode = (x >> params.postfix_bits) as u64;
        let lcode = (x & postfix_mask) as u64;
        let offset = ((2 + (hcode & 1)) << extra_bits) - 4;
        let extra = reader.read_bits(extra_bits)? as u64;
        let distance =
            ((offset + extra) << params.postfix_bits) + lcode + params.direct_codes as u64 + 1;
        Ok(distance as usize)
    }
}
