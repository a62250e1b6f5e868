//! Prefix (Huffman) codes for Brotli.
//!
//! Brotli uses canonical prefix codes with code lengths up to 15 bits. A
//! code is transmitted either as a "simple" code (one to four explicit
//! symbols with fixed lengths) or as a "complex" code whose lengths are
//! themselves prefix coded.

use super::tables::{
    CODE_LENGTH_CODES, CODE_LENGTH_CODE_ORDER, CODE_LENGTH_PREFIX_LENGTH,
    CODE_LENGTH_PREFIX_VALUE, INITIAL_REPEATED_CODE_LENGTH, REPEAT_PREVIOUS_CODE_LENGTH,
    SIMPLE_CODE_LENGTHS,
};
use super::{BitReader, DecompressError, Result};

/// Maximum code length in bits.
pub const MAX_CODE_LENGTH: usize = 15;

/// Bits of lookahead needed to decode any symbol.
pub const LOOKAHEAD_BITS: u32 = 16;

/// Kraft space of a complete code, in units of 2^-15.
const FULL_SPACE: u32 = 1 << MAX_CODE_LENGTH;

/// Canonical prefix code decoding table.
///
/// Symbols are kept sorted by (code length, symbol). For each code length
/// the table stores the exclusive upper bound of the left-aligned 16-bit
/// codes of that length or shorter (`limits`) and the difference between
/// the first code of that length and its index in `symbols` (`bases`), so a
/// lookup is a short scan over the lengths in use.
#[derive(Debug, Clone, Default)]
pub struct HuffmanTable {
    symbols: Vec<u16>,
    limits: [u32; MAX_CODE_LENGTH + 1],
    bases: [u32; MAX_CODE_LENGTH + 1],
    min_length: u8,
    max_length: u8,
}

impl HuffmanTable {
    /// Build a table from per-symbol code lengths (0 = symbol unused).
    ///
    /// The lengths must form a complete prefix code.
    pub fn from_lengths(lengths: &[u8]) -> Result<Self> {
        let mut counts = [0u32; MAX_CODE_LENGTH + 1];
        for &len in lengths {
            if len as usize > MAX_CODE_LENGTH {
                return Err(DecompressError::HuffmanLengthError);
            }
            counts[len as usize] += 1;
        }
        counts[0] = 0;

        let space: u32 = (1..=MAX_CODE_LENGTH)
            .map(|len| counts[len] << (MAX_CODE_LENGTH - len))
            .sum();
        if space != FULL_SPACE {
            return Err(DecompressError::HuffmanLengthError);
        }

        let mut table = Self {
            symbols: Vec::with_capacity(lengths.len()),
            ..Self::default()
        };
        table.min_length = (1..=MAX_CODE_LENGTH).find(|&l| counts[l] > 0).unwrap_or(0) as u8;
        table.max_length = (1..=MAX_CODE_LENGTH).rfind(|&l| counts[l] > 0).unwrap_or(0) as u8;

        let mut code = 0u32;
        let mut index = 0u32;
        for len in 1..=MAX_CODE_LENGTH {
            table.bases[len] = code - index;
            table
                .symbols
                .extend((0..lengths.len()).filter(|&s| lengths[s] as usize == len).map(|s| s as u16));
            code += counts[len];
            index += counts[len];
            table.limits[len] = code << (LOOKAHEAD_BITS as usize - len);
            code <<= 1;
        }

        Ok(table)
    }

    /// A code with one symbol, decoded without consuming any bits.
    pub fn single(symbol: u16) -> Self {
        Self {
            symbols: vec![symbol],
            ..Self::default()
        }
    }

    /// Build a simple prefix code: `symbols[i]` gets `lengths[i]`.
    pub fn from_simple(symbols: &[u16], lengths: &[u8], alphabet_size: usize) -> Result<Self> {
        if let [symbol] = symbols {
            return Ok(Self::single(*symbol));
        }
        let mut all = vec![0u8; alphabet_size];
        for (&symbol, &len) in symbols.iter().zip(lengths) {
            let slot = all
                .get_mut(symbol as usize)
                .ok_or(DecompressError::SyntaxError("prefix code symbol out of range"))?;
            if *slot != 0 {
                return Err(DecompressError::HuffmanLengthError);
            }
            *slot = len;
        }
        Self::from_lengths(&all)
    }

    /// Whether this table can decode anything.
    pub fn is_valid(&self) -> bool {
        !self.symbols.is_empty()
    }

    /// Number of symbols with a codeword.
    pub fn num_symbols(&self) -> usize {
        self.symbols.len()
    }

    /// Decode one symbol from a 16-bit LSB-first lookahead.
    ///
    /// Returns the symbol and the number of bits its codeword occupies.
    #[inline]
    pub fn decode_lookahead(&self, lookahead: u16) -> Result<(u16, u32)> {
        if self.max_length == 0 {
            return self
                .symbols
                .first()
                .map(|&symbol| (symbol, 0))
                .ok_or(DecompressError::HuffmanLengthError);
        }

        let value = lookahead.reverse_bits() as u32;
        for len in self.min_length as usize..=self.max_length as usize {
            if value < self.limits[len] {
                let code = value >> (LOOKAHEAD_BITS as usize - len);
                let index = (code - self.bases[len]) as usize;
                return Ok((self.symbols[index], len as u32));
            }
        }
        Err(DecompressError::HuffmanLengthError)
    }

    /// Decode a symbol from the bit reader.
    #[inline]
    pub fn decode(&self, reader: &mut BitReader) -> Result<u16> {
        let (symbol, len) = self.decode_lookahead(reader.peek_bits(LOOKAHEAD_BITS) as u16)?;
        reader.advance_bits(len)?;
        Ok(symbol)
    }
}

/// Read a prefix code over `alphabet_size` symbols from the stream.
pub fn read_prefix_code(reader: &mut BitReader, alphabet_size: usize) -> Result<HuffmanTable> {
    let code_type = reader.read_bits(2)?;
    if code_type == 1 {
        read_simple_code(reader, alphabet_size)
    } else {
        // For complex codes the type doubles as HSKIP.
        read_complex_code(reader, alphabet_size, code_type as usize)
    }
}

fn read_simple_code(reader: &mut BitReader, alphabet_size: usize) -> Result<HuffmanTable> {
    let num_symbols = reader.read_bits(2)? as usize + 1;
    let alphabet_bits = usize::BITS - (alphabet_size - 1).leading_zeros();

    let mut symbols = [0u16; 4];
    for symbol in symbols.iter_mut().take(num_symbols) {
        let value = reader.read_bits(alphabet_bits)? as usize;
        if value >= alphabet_size {
            return Err(DecompressError::SyntaxError("prefix code symbol out of range"));
        }
        *symbol = value as u16;
    }

    let lengths = if num_symbols == 4 && reader.read_bit()? {
        SIMPLE_CODE_LENGTHS[4]
    } else {
        SIMPLE_CODE_LENGTHS[num_symbols - 1]
    };
    HuffmanTable::from_simple(&symbols[..num_symbols], lengths, alphabet_size)
}

/// Read the code-length code that encodes the lengths of a complex code.
fn read_code_length_code(reader: &mut BitReader, skip: usize) -> Result<HuffmanTable> {
    let mut lengths = [0u8; CODE_LENGTH_CODES];
    let mut space = 32i32;
    let mut num_codes = 0;
    let mut last_symbol = 0;

    for &symbol in &CODE_LENGTH_CODE_ORDER[skip..] {
        let bits = reader.peek_bits(4) as usize;
        reader.advance_bits(CODE_LENGTH_PREFIX_LENGTH[bits] as u32)?;
        let len = CODE_LENGTH_PREFIX_VALUE[bits];
        lengths[symbol] = len;
        if len != 0 {
            num_codes += 1;
            last_symbol = symbol;
            space -= 32 >> len;
            if space <= 0 {
                break;
            }
        }
    }

    match num_codes {
        1 => Ok(HuffmanTable::single(last_symbol as u16)),
        _ if space == 0 => HuffmanTable::from_lengths(&lengths),
        _ => Err(DecompressError::HuffmanLengthError),
    }
}

fn read_complex_code(
    reader: &mut BitReader,
    alphabet_size: usize,
    skip: usize,
) -> Result<HuffmanTable> {
    let code_length_code = read_code_length_code(reader, skip)?;

    let mut lengths = vec![0u8; alphabet_size];
    let mut symbol = 0;
    let mut space = FULL_SPACE as i64;
    let mut prev_code_len = INITIAL_REPEATED_CODE_LENGTH;
    let mut repeat = 0usize;
    let mut repeat_code_len = 0u8;

    while symbol < alphabet_size && space > 0 {
        let code_len = code_length_code.decode(reader)? as u8;
        if code_len < REPEAT_PREVIOUS_CODE_LENGTH {
            repeat = 0;
            lengths[symbol] = code_len;
            symbol += 1;
            if code_len != 0 {
                prev_code_len = code_len;
                space -= (FULL_SPACE >> code_len) as i64;
            }
            continue;
        }

        let (extra_bits, new_len) = if code_len == REPEAT_PREVIOUS_CODE_LENGTH {
            (2, prev_code_len)
        } else {
            (3, 0)
        };
        let delta = reader.read_bits(extra_bits)? as usize;

        // Consecutive repeat codes of the same kind extend one run.
        if repeat_code_len != new_len {
            repeat = 0;
            repeat_code_len = new_len;
        }
        let old_repeat = repeat;
        if repeat > 0 {
            repeat = (repeat - 2) << extra_bits;
        }
        repeat += delta + 3;
        let run = repeat - old_repeat;

        if symbol + run > alphabet_size {
            return Err(DecompressError::HuffmanLengthError);
        }
        lengths[symbol..symbol + run].fill(new_len);
        symbol += run;
        if new_len != 0 {
            space -= (FULL_SPACE >> new_len) as i64 * run as i64;
        }
    }

    if space != 0 {
        return Err(DecompressError::HuffmanLengthError);
    }
    HuffmanTable::from_lengths(&lengths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decompress::test_utils::BitWriter;

    /// Canonical codewords computed the textbook way.
    fn canonical_codes(lengths: &[u8]) -> Vec<Option<(u32, u32)>> {
        let mut counts = [0u32; 16];
        for &len in lengths {
            counts[len as usize] += 1;
        }
        counts[0] = 0;
        let mut next = [0u32; 16];
        let mut code = 0;
        for len in 1..16 {
            code = (code + counts[len - 1]) << 1;
            next[len] = code;
        }
        lengths
            .iter()
            .map(|&len| {
                (len > 0).then(|| {
                    let c = next[len as usize];
                    next[len as usize] += 1;
                    (c, len as u32)
                })
            })
            .collect()
    }

    /// LSB-first lookahead whose first bits are `code` (MSB first).
    fn lookahead_for(code: u32, len: u32) -> u16 {
        (0..len).fold(0u16, |acc, i| acc | ((((code >> (len - 1 - i)) & 1) as u16) << i))
    }

    #[test]
    fn test_every_symbol_decodes_from_its_codeword() {
        let lengths = [3u8, 0, 3, 4, 4, 1, 0, 5, 5, 4];
        let table = HuffmanTable::from_lengths(&lengths).unwrap();

        for (symbol, entry) in canonical_codes(&lengths).into_iter().enumerate() {
            if let Some((code, len)) = entry {
                let decoded = table.decode_lookahead(lookahead_for(code, len)).unwrap();
                assert_eq!(decoded, (symbol as u16, len), "symbol {}", symbol);
            }
        }
    }

    #[test]
    fn test_max_length_codes() {
        // 1, 2, ..., 14, 15, 15
        let mut lengths: Vec<u8> = (1..=15).collect();
        lengths.push(15);
        let table = HuffmanTable::from_lengths(&lengths).unwrap();

        for (symbol, entry) in canonical_codes(&lengths).into_iter().enumerate() {
            let (code, len) = entry.unwrap();
            let decoded = table.decode_lookahead(lookahead_for(code, len)).unwrap();
            assert_eq!(decoded, (symbol as u16, len));
        }
    }

    #[test]
    fn test_oversubscribed_lengths_rejected() {
        assert_eq!(
            HuffmanTable::from_lengths(&[1, 1, 1]).unwrap_err(),
            DecompressError::HuffmanLengthError
        );
    }

    #[test]
    fn test_incomplete_lengths_rejected() {
        assert!(HuffmanTable::from_lengths(&[2, 2, 2]).is_err());
        assert!(HuffmanTable::from_lengths(&[0, 0, 0]).is_err());
        assert!(HuffmanTable::from_lengths(&[16, 1]).is_err());
    }

    #[test]
    fn test_simple_two_symbol_code() {
        let table = HuffmanTable::from_simple(&[0, 1], SIMPLE_CODE_LENGTHS[1], 256).unwrap();

        assert_eq!(table.decode_lookahead(0x0000).unwrap(), (0, 1));
        // First stream bit set: reversed lookahead is 0b1000_0000_0000_0000.
        assert_eq!(table.decode_lookahead(0x0001).unwrap(), (1, 1));
    }

    #[test]
    fn test_simple_code_sorts_equal_lengths() {
        // Listed order 200, 7: the smaller symbol still gets codeword 0.
        let table = HuffmanTable::from_simple(&[200, 7], SIMPLE_CODE_LENGTHS[1], 256).unwrap();
        assert_eq!(table.decode_lookahead(0).unwrap(), (7, 1));
        assert_eq!(table.decode_lookahead(1).unwrap(), (200, 1));
    }

    #[test]
    fn test_simple_code_duplicate_symbol() {
        assert_eq!(
            HuffmanTable::from_simple(&[5, 5], SIMPLE_CODE_LENGTHS[1], 256).unwrap_err(),
            DecompressError::HuffmanLengthError
        );
    }

    #[test]
    fn test_single_symbol_uses_no_bits() {
        let table = HuffmanTable::single(42);
        assert_eq!(table.decode_lookahead(0xFFFF).unwrap(), (42, 0));
    }

    #[test]
    fn test_empty_table_fails_to_decode() {
        let table = HuffmanTable::default();
        assert!(!table.is_valid());
        assert_eq!(
            table.decode_lookahead(0).unwrap_err(),
            DecompressError::HuffmanLengthError
        );
    }

    #[test]
    fn test_read_simple_code_from_stream() {
        let mut w = BitWriter::new();
        w.simple_code(256, &[b'x' as u16, b'a' as u16, b'm' as u16]);
        // 'x' has the 1-bit code 0; 'a' < 'm' get 10 and 11.
        w.code(0b11, 2).code(0, 1).code(0b10, 2);
        let data = w.finish();

        let mut reader = BitReader::new(&data);
        let table = read_prefix_code(&mut reader, 256).unwrap();
        assert_eq!(table.decode(&mut reader).unwrap(), b'm' as u16);
        assert_eq!(table.decode(&mut reader).unwrap(), b'x' as u16);
        assert_eq!(table.decode(&mut reader).unwrap(), b'a' as u16);
    }

    #[test]
    fn test_read_simple_code_out_of_range() {
        let mut w = BitWriter::new();
        // Alphabet of 26 uses 5-bit symbols; 30 is out of range.
        w.bits(1, 2).bits(1, 2).bits(3, 5).bits(30, 5);
        let data = w.finish();

        let mut reader = BitReader::new(&data);
        assert!(matches!(
            read_prefix_code(&mut reader, 26),
            Err(DecompressError::SyntaxError(_))
        ));
    }

    #[test]
    fn test_read_complex_code() {
        let mut w = BitWriter::new();
        w.bits(0, 2); // HSKIP 0
        // Code-length code: symbol 1 -> 1 bit, 2 -> 2 bits, 3 -> 2 bits.
        w.code_length_length(1)
            .code_length_length(2)
            .code_length_length(2);
        // Lengths [1, 2, 3, 3] with codewords 1:"0", 2:"10", 3:"11".
        w.code(0, 1).code(0b10, 2).code(0b11, 2).code(0b11, 2);
        // Symbols 3, 0, 1, 2 with codewords 111, 0, 10, 110.
        w.code(0b111, 3).code(0, 1).code(0b10, 2).code(0b110, 3);
        let data = w.finish();

        let mut reader = BitReader::new(&data);
        let table = read_prefix_code(&mut reader, 4).unwrap();
        assert_eq!(table.num_symbols(), 4);
        for expected in [3, 0, 1, 2] {
            assert_eq!(table.decode(&mut reader).unwrap(), expected);
        }
    }

    #[test]
    fn test_read_complex_code_with_zero_runs() {
        let mut w = BitWriter::new();
        w.bits(0, 2);
        // Code-length code: symbol 1 -> 1 bit, symbol 17 -> 1 bit.
        // Order is 1, 2, 3, 4, 0, 5, 17.
        w.code_length_length(1);
        for _ in 0..5 {
            w.code_length_length(0);
        }
        w.code_length_length(1);
        // Two consecutive 17s: 3 zeros, then (3 - 2) << 3 + 3 + 0 = 11 in total.
        w.code(1, 1).bits(0, 3).code(1, 1).bits(0, 3);
        // Symbols 11 and 12 get length 1.
        w.code(0, 1).code(0, 1);
        // Decode 12, 11.
        w.code(1, 1).code(0, 1);
        let data = w.finish();

        let mut reader = BitReader::new(&data);
        let table = read_prefix_code(&mut reader, 13).unwrap();
        assert_eq!(table.decode(&mut reader).unwrap(), 12);
        assert_eq!(table.decode(&mut reader).unwrap(), 11);
    }

    #[test]
    fn test_read_complex_code_repeat_previous() {
        let mut w = BitWriter::new();
        w.bits(0, 2);
        // Code-length code: symbol 2 -> 1 bit, symbol 16 -> 1 bit.
        // Order is 1, 2, 3, 4, 0, 5, 17, 6, 16.
        w.code_length_length(0).code_length_length(1);
        for _ in 0..6 {
            w.code_length_length(0);
        }
        w.code_length_length(1);
        // One length 2, then 16 repeats it 3 times: four 2-bit codes.
        w.code(0, 1).code(1, 1).bits(0, 2);
        let data = w.finish();

        let mut reader = BitReader::new(&data);
        let table = read_prefix_code(&mut reader, 6).unwrap();
        assert_eq!(table.num_symbols(), 4);
    }

    #[test]
    fn test_read_complex_code_incomplete_space() {
        let mut w = BitWriter::new();
        w.bits(0, 2);
        w.code_length_length(1)
            .code_length_length(2)
            .code_length_length(2);
        // Alphabet of 2 with lengths [2, 2]: half of the space is unused.
        w.code(0b10, 2).code(0b10, 2);
        let data = w.finish();

        let mut reader = BitReader::new(&data);
        assert_eq!(
            read_prefix_code(&mut reader, 2).unwrap_err(),
            DecompressError::HuffmanLengthError
        );
    }
}
