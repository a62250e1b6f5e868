//! Fixed tables defined by RFC 7932.

/// Number of literal symbols.
pub const NUM_LITERAL_SYMBOLS: usize = 256;

/// Number of insert-and-copy length symbols.
pub const NUM_COMMAND_SYMBOLS: usize = 704;

/// Number of block count symbols.
pub const NUM_BLOCK_LEN_SYMBOLS: usize = 26;

/// Number of symbols in the code-length code.
pub const CODE_LENGTH_CODES: usize = 18;

/// Upper bound for NBLTYPES and NTREES.
pub const MAX_BLOCK_TYPES: usize = 256;

/// Number of distance short codes.
pub const NUM_DISTANCE_SHORT_CODES: u32 = 16;

/// Literal context ids per literal block type (`1 << 6`).
pub const LITERAL_CONTEXT_BITS: u32 = 6;

/// Distance context ids per distance block type (`1 << 2`).
pub const DISTANCE_CONTEXT_BITS: u32 = 2;

/// Block length used when a category has a single block type.
pub const BLOCK_LEN_UNBOUNDED: u32 = 1 << 24;

/// Bytes subtracted from the window size to get the largest distance.
pub const WINDOW_GAP: usize = 16;

/// Prefix code length assumed before the first non-zero length is read.
pub const INITIAL_REPEATED_CODE_LENGTH: u8 = 8;

/// Code length symbol that repeats the previous non-zero length.
pub const REPEAT_PREVIOUS_CODE_LENGTH: u8 = 16;

/// Order in which code-length code lengths are stored.
pub const CODE_LENGTH_CODE_ORDER: [usize; CODE_LENGTH_CODES] = [
    1, 2, 3, 4, 0, 5, 17, 6, 16, 7, 8, 9, 10, 11, 12, 13, 14, 15,
];

/// Bits used by the static code for code-length code lengths, indexed by
/// the next 4 stream bits.
pub const CODE_LENGTH_PREFIX_LENGTH: [u8; 16] = [2, 2, 2, 3, 2, 2, 2, 4, 2, 2, 2, 3, 2, 2, 2, 4];

/// Value decoded by the static code for code-length code lengths.
pub const CODE_LENGTH_PREFIX_VALUE: [u8; 16] = [0, 4, 3, 2, 0, 4, 3, 1, 0, 4, 3, 2, 0, 4, 3, 5];

/// Code lengths of simple prefix codes, by NSYM (and tree select for NSYM=4).
pub const SIMPLE_CODE_LENGTHS: [&[u8]; 5] = [&[0], &[1, 1], &[1, 2, 2], &[2, 2, 2, 2], &[1, 2, 3, 3]];

/// Block count prefix code: (offset, extra bits).
pub const BLOCK_LENGTH_PREFIX: [(u32, u8); NUM_BLOCK_LEN_SYMBOLS] = [
    (1, 2),
    (5, 2),
    (9, 2),
    (13, 2),
    (17, 3),
    (25, 3),
    (33, 3),
    (41, 3),
    (49, 4),
    (65, 4),
    (81, 4),
    (97, 4),
    (113, 5),
    (145, 5),
    (177, 5),
    (209, 5),
    (241, 6),
    (305, 6),
    (369, 7),
    (497, 8),
    (753, 9),
    (1265, 10),
    (2289, 11),
    (4337, 12),
    (8433, 13),
    (16625, 24),
];

/// Base insert lengths for insert length codes.
pub const INSERT_LENGTH_BASE: [u32; 24] = [
    0, 1, 2, 3, 4, 5, 6, 8, 10, 14, 18, 26, 34, 50, 66, 98, 130, 194, 322, 578, 1090, 2114, 6210,
    22594,
];

/// Extra bits for insert length codes.
pub const INSERT_LENGTH_EXTRA: [u8; 24] = [
    0, 0, 0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 7, 8, 9, 10, 12, 14, 24,
];

/// Base copy lengths for copy length codes.
pub const COPY_LENGTH_BASE: [u32; 24] = [
    2, 3, 4, 5, 6, 7, 8, 9, 10, 12, 14, 18, 22, 30, 38, 54, 70, 102, 134, 198, 326, 582, 1094,
    2118,
];

/// Extra bits for copy length codes.
pub const COPY_LENGTH_EXTRA: [u8; 24] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 7, 8, 9, 10, 24,
];

/// Insert and copy length codes of one insert-and-copy symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandPrefix {
    pub insert_code: u8,
    pub copy_code: u8,
    /// The distance is the last distance and no distance symbol follows.
    pub implicit_distance: bool,
}

/// Insert code offset of each 64-symbol cell.
const CELL_INSERT_OFFSET: [u8; 11] = [0, 0, 0, 0, 8, 8, 0, 16, 8, 16, 16];

/// Copy code offset of each 64-symbol cell.
const CELL_COPY_OFFSET: [u8; 11] = [0, 8, 0, 8, 0, 8, 16, 0, 16, 8, 16];

const fn build_command_lut() -> [CommandPrefix; NUM_COMMAND_SYMBOLS] {
    let mut lut = [CommandPrefix {
        insert_code: 0,
        copy_code: 0,
        implicit_distance: false,
    }; NUM_COMMAND_SYMBOLS];
    let mut symbol = 0;
    while symbol < NUM_COMMAND_SYMBOLS {
        let cell = symbol >> 6;
        lut[symbol] = CommandPrefix {
            insert_code: CELL_INSERT_OFFSET[cell] + ((symbol >> 3) & 7) as u8,
            copy_code: CELL_COPY_OFFSET[cell] + (symbol & 7) as u8,
            implicit_distance: symbol < 128,
        };
        symbol += 1;
    }
    lut
}

/// Insert-and-copy symbol lookup.
pub static COMMAND_LUT: [CommandPrefix; NUM_COMMAND_SYMBOLS] = build_command_lut();

/// Which last distance a short code refers to (1 = last, 2 = second-to-last, ...).
pub const SHORT_CODE_INDEX: [usize; 16] = [1, 2, 3, 4, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2];

/// Value added to the referenced last distance.
pub const SHORT_CODE_DELTA: [i64; 16] = [0, 0, 0, 0, -1, 1, -2, 2, -3, 3, -1, 1, -2, 2, -3, 3];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_length_ranges_are_contiguous() {
        for pair in BLOCK_LENGTH_PREFIX.windows(2) {
            let (offset, bits) = pair[0];
            assert_eq!(offset + (1 << bits), pair[1].0);
        }
    }

    #[test]
    fn test_length_ranges_are_contiguous() {
        for i in 0..23 {
            assert_eq!(
                INSERT_LENGTH_BASE[i] + (1 << INSERT_LENGTH_EXTRA[i]),
                INSERT_LENGTH_BASE[i + 1]
            );
            assert_eq!(
                COPY_LENGTH_BASE[i] + (1 << COPY_LENGTH_EXTRA[i]),
                COPY_LENGTH_BASE[i + 1]
            );
        }
    }

    #[test]
    fn test_command_lut_cells() {
        assert_eq!(
            COMMAND_LUT[0],
            CommandPrefix {
                insert_code: 0,
                copy_code: 0,
                implicit_distance: true
            }
        );
        // Last symbol of the first explicit-distance cell.
        assert_eq!(COMMAND_LUT[191].insert_code, 7);
        assert_eq!(COMMAND_LUT[191].copy_code, 7);
        assert!(!COMMAND_LUT[191].implicit_distance);
        // 384..448: insert 0-7, copy 16-23
        assert_eq!(COMMAND_LUT[384 + 9].insert_code, 1);
        assert_eq!(COMMAND_LUT[384 + 9].copy_code, 17);
        assert_eq!(COMMAND_LUT[703].insert_code, 23);
        assert_eq!(COMMAND_LUT[703].copy_code, 23);
    }
}
