//! Static dictionary references and word transforms.
//!
//! A distance larger than the window reaches into the static dictionary:
//! the copy length picks a word length, and the distance past the window
//! selects a word and one of 121 transforms that add a prefix and suffix,
//! trim the word or change its case.

use super::{DecompressError, Result};
use WordTransform::{FermentAll as FA, FermentFirst as FF, Identity as ID, OmitFirst, OmitLast};

/// Number of word transforms.
pub const NUM_TRANSFORMS: usize = 121;

/// Shortest dictionary word.
pub const MIN_WORD_LENGTH: usize = 4;

/// Longest dictionary word.
pub const MAX_WORD_LENGTH: usize = 24;

/// Longest transformed word: 5-byte prefix, 24-byte word, 8-byte suffix.
pub const MAX_TRANSFORMED_LENGTH: usize = 37;

/// Byte offset of the words of each length.
const OFFSETS_BY_LENGTH: [usize; MAX_WORD_LENGTH + 1] = [
    0, 0, 0, 0, 0, 4096, 9216, 21504, 35840, 44032, 53248, 63488, 74752, 87040, 93696, 100864,
    104704, 106752, 108928, 113536, 115968, 118528, 119872, 121280, 122016,
];

/// log2 of the number of words of each length.
const SIZE_BITS_BY_LENGTH: [u32; MAX_WORD_LENGTH + 1] = [
    0, 0, 0, 0, 10, 10, 11, 11, 10, 10, 10, 10, 10, 9, 9, 8, 7, 7, 8, 7, 7, 6, 6, 5, 5,
];

/// The RFC 7932 Appendix A word list.
fn dictionary_bytes() -> &'static [u8] {
    &brotli_decompressor::dictionary::kBrotliDictionary
}

/// Dictionary word `index` of the given length.
pub fn dictionary_word(length: usize, index: usize) -> Option<&'static [u8]> {
    if !(MIN_WORD_LENGTH..=MAX_WORD_LENGTH).contains(&length)
        || index >= 1 << SIZE_BITS_BY_LENGTH[length]
    {
        return None;
    }
    let start = OFFSETS_BY_LENGTH[length] + index * length;
    dictionary_bytes().get(start..start + length)
}

/// Elementary transform applied to the word between prefix and suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordTransform {
    Identity,
    OmitFirst(u8),
    OmitLast(u8),
    /// Uppercase the first character.
    FermentFirst,
    /// Uppercase every character.
    FermentAll,
}

struct Transform {
    prefix: &'static [u8],
    transform: WordTransform,
    suffix: &'static [u8],
}

const fn t(prefix: &'static [u8], transform: WordTransform, suffix: &'static [u8]) -> Transform {
    Transform {
        prefix,
        transform,
        suffix,
    }
}

#[rustfmt::skip]
static TRANSFORMS: [Transform; NUM_TRANSFORMS] = [
    t(b"", ID, b""),
    t(b"", ID, b" "),
    t(b" ", ID, b" "),
    t(b"", OmitFirst(1), b""),
    t(b"", FF, b" "),
    t(b"", ID, b" the "),
    t(b" ", ID, b""),
    t(b"s ", ID, b" "),
    t(b"", ID, b" of "),
    t(b"", FF, b""),
    t(b"", ID, b" and "),
    t(b"", OmitFirst(2), b""),
    t(b"", OmitLast(1), b""),
    t(b", ", ID, b" "),
    t(b"", ID, b", "),
    t(b" ", FF, b" "),
    t(b"", ID, b" in "),
    t(b"", ID, b" to "),
    t(b"e ", ID, b" "),
    t(b"", ID, b"\""),
    t(b"", ID, b"."),
    t(b"", ID, b"\">"),
    t(b"", ID, b"\n"),
    t(b"", OmitLast(3), b""),
    t(b"", ID, b"]"),
    t(b"", ID, b" for "),
    t(b"", OmitFirst(3), b""),
    t(b"", OmitLast(2), b""),
    t(b"", ID, b" a "),
    t(b"", ID, b" that "),
    t(b" ", FF, b""),
    t(b"", ID, b". "),
    t(b".", ID, b""),
    t(b" ", ID, b", "),
    t(b"", OmitFirst(4), b""),
    t(b"", ID, b" with "),
    t(b"", ID, b"'"),
    t(b"", ID, b" from "),
    t(b"", ID, b" by "),
    t(b"", OmitFirst(5), b""),
    t(b"", OmitFirst(6), b""),
    t(b" the ", ID, b""),
    t(b"", OmitLast(4), b""),
    t(b"", ID, b". The "),
    t(b"", FA, b""),
    t(b"", ID, b" on "),
    t(b"", ID, b" as "),
    t(b"", ID, b" is "),
    t(b"", OmitLast(7), b""),
    t(b"", OmitLast(1), b"ing "),
    t(b"", ID, b"\n\t"),
    t(b"", ID, b":"),
    t(b" ", ID, b". "),
    t(b"", ID, b"ed "),
    t(b"", OmitFirst(9), b""),
    t(b"", OmitFirst(7), b""),
    t(b"", OmitLast(6), b""),
    t(b"", ID, b"("),
    t(b"", FF, b", "),
    t(b"", OmitLast(8), b""),
    t(b"", ID, b" at "),
    t(b"", ID, b"ly "),
    t(b" the ", ID, b" of "),
    t(b"", OmitLast(5), b""),
    t(b"", OmitLast(9), b""),
    t(b" ", FF, b", "),
    t(b"", FF, b"\""),
    t(b".", ID, b"("),
    t(b"", FA, b" "),
    t(b"", FF, b"\">"),
    t(b"", ID, b"=\""),
    t(b" ", ID, b"."),
    t(b".com/", ID, b""),
    t(b" the ", ID, b" of the "),
    t(b"", FF, b"'"),
    t(b"", ID, b". This "),
    t(b"", ID, b","),
    t(b".", ID, b" "),
    t(b"", FF, b"("),
    t(b"", FF, b"."),
    t(b"", ID, b" not "),
    t(b" ", ID, b"=\""),
    t(b"", ID, b"er "),
    t(b" ", FA, b" "),
    t(b"", ID, b"al "),
    t(b" ", FA, b""),
    t(b"", ID, b"='"),
    t(b"", FA, b"\""),
    t(b"", FF, b". "),
    t(b" ", ID, b"("),
    t(b"", ID, b"ful "),
    t(b" ", FF, b". "),
    t(b"", ID, b"ive "),
    t(b"", ID, b"less "),
    t(b"", FA, b"'"),
    t(b"", ID, b"est "),
    t(b" ", FF, b"."),
    t(b"", FA, b"\">"),
    t(b" ", ID, b"='"),
    t(b"", FF, b","),
    t(b"", ID, b"ize "),
    t(b"", FA, b"."),
    t(b"\xc2\xa0", ID, b""),
    t(b" ", ID, b","),
    t(b"", FF, b"=\""),
    t(b"", FA, b"=\""),
    t(b"", ID, b"ous "),
    t(b"", FA, b", "),
    t(b"", FF, b"='"),
    t(b" ", FF, b","),
    t(b" ", FA, b"=\""),
    t(b" ", FA, b", "),
    t(b"", FA, b","),
    t(b"", FA, b"("),
    t(b"", FA, b". "),
    t(b" ", FA, b"."),
    t(b"", FA, b"='"),
    t(b" ", FA, b". "),
    t(b" ", FF, b"=\""),
    t(b" ", FA, b"='"),
    t(b" ", FF, b"='"),
];

/// Uppercase the character starting at `word[0]`; returns its length.
///
/// ASCII letters flip case; for a two-byte UTF-8 sequence the second byte
/// is flipped and for a longer one the third byte, as the format defines.
fn ferment(word: &mut [u8]) -> usize {
    let lead = word[0];
    if lead < 192 {
        if lead.is_ascii_lowercase() {
            word[0] ^= 32;
        }
        1
    } else if lead < 224 {
        if let Some(byte) = word.get_mut(1) {
            *byte ^= 32;
        }
        2
    } else {
        if let Some(byte) = word.get_mut(2) {
            *byte ^= 5;
        }
        3
    }
}

/// A transformed dictionary word held on the stack.
#[derive(Clone, Copy)]
pub struct TransformedWord {
    bytes: [u8; MAX_TRANSFORMED_LENGTH],
    len: usize,
}

impl TransformedWord {
    fn new() -> Self {
        Self {
            bytes: [0; MAX_TRANSFORMED_LENGTH],
            len: 0,
        }
    }

    fn push_slice(&mut self, data: &[u8]) {
        self.bytes[self.len..self.len + data.len()].copy_from_slice(data);
        self.len += data.len();
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl std::fmt::Debug for TransformedWord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TransformedWord({:?})", String::from_utf8_lossy(self.as_bytes()))
    }
}

/// Apply transform `transform_id` to `word`.
pub fn transform_word(word: &[u8], transform_id: usize) -> Result<TransformedWord> {
    let transform = TRANSFORMS
        .get(transform_id)
        .ok_or(DecompressError::SyntaxError("invalid dictionary transform"))?;
    if word.len() > MAX_WORD_LENGTH {
        return Err(DecompressError::SyntaxError("dictionary word too long"));
    }

    let body = match transform.transform {
        WordTransform::OmitFirst(n) => &word[(n as usize).min(word.len())..],
        WordTransform::OmitLast(n) => &word[..word.len().saturating_sub(n as usize)],
        _ => word,
    };

    let mut out = TransformedWord::new();
    out.push_slice(transform.prefix);
    let start = out.len;
    out.push_slice(body);

    let end = out.len;
    match transform.transform {
        WordTransform::FermentFirst if start < end => {
            ferment(&mut out.bytes[start..end]);
        }
        WordTransform::FermentAll => {
            let mut pos = start;
            while pos < end {
                pos += ferment(&mut out.bytes[pos..end]);
            }
        }
        _ => {}
    }

    out.push_slice(transform.suffix);
    Ok(out)
}

/// Resolve a dictionary reference of `copy_len` bytes.
///
/// `word_id` counts from the first distance past the window: its low bits
/// select the word and the rest the transform.
pub fn lookup_reference(copy_len: usize, word_id: usize) -> Result<TransformedWord> {
    if !(MIN_WORD_LENGTH..=MAX_WORD_LENGTH).contains(&copy_len) {
        return Err(DecompressError::SyntaxError("dictionary word length out of range"));
    }
    let bits = SIZE_BITS_BY_LENGTH[copy_len];
    let index = word_id & ((1 << bits) - 1);
    let word = dictionary_word(copy_len, index)
        .ok_or(DecompressError::SyntaxError("dictionary word out of range"))?;
    transform_word(word, word_id >> bits)
}
