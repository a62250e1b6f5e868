//! Test helpers for assembling Brotli bit streams by hand.

/// LSB-first bit writer, the mirror image of [`super::BitReader`].
#[derive(Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the low `n` bits of `value`, least significant first.
    pub fn bits(&mut self, value: u32, n: u32) -> &mut Self {
        for i in 0..n {
            if self.bit_len % 8 == 0 {
                self.bytes.push(0);
            }
            if (value >> i) & 1 != 0 {
                let last = self.bytes.len() - 1;
                self.bytes[last] |= 1 << (self.bit_len % 8);
            }
            self.bit_len += 1;
        }
        self
    }

    /// Write a prefix codeword, most significant bit first.
    pub fn code(&mut self, code: u32, len: u32) -> &mut Self {
        for i in (0..len).rev() {
            self.bits((code >> i) & 1, 1);
        }
        self
    }

    /// Write a code-length code length using the fixed code of RFC 7932 §3.5.
    pub fn code_length_length(&mut self, value: u8) -> &mut Self {
        match value {
            0 => self.bits(0, 2),
            1 => self.bits(7, 4),
            2 => self.bits(3, 3),
            3 => self.bits(2, 2),
            4 => self.bits(1, 2),
            5 => self.bits(15, 4),
            _ => panic!("code-length code lengths are 0..=5"),
        }
    }

    /// Write a 1..=256 count (NBLTYPES, NTREES).
    pub fn count_256(&mut self, count: u32) -> &mut Self {
        match count {
            1 => self.bits(0, 1),
            2 => self.bits(1, 1).bits(0, 3),
            _ => {
                let n = 31 - (count - 1).leading_zeros();
                self.bits(1, 1).bits(n, 3).bits(count - 1 - (1 << n), n)
            }
        }
    }

    /// Write a simple prefix code with the given symbols.
    pub fn simple_code(&mut self, alphabet_size: usize, symbols: &[u16]) -> &mut Self {
        let alphabet_bits = usize::BITS - (alphabet_size - 1).leading_zeros();
        self.bits(1, 2).bits(symbols.len() as u32 - 1, 2);
        for &symbol in symbols {
            self.bits(symbol as u32, alphabet_bits);
        }
        if symbols.len() == 4 {
            self.bits(0, 1);
        }
        self
    }

    pub fn finish(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}
