//! Dictionary state for the LZW coder.
//!
//! The encoder maps (prefix code, next byte) to the code assigned to that string. The decoder keeps the
//! inverse: for every assigned code, the prefix code and trailing byte it was built from. Codes 0-255 are
//! the single bytes and are never stored; 256 and 257 are the CLEAR and END control codes; assigned codes
//! start at 258.
//!
//! The decoder learns each entry one code later than the encoder creates it, so its code counter is always
//! one behind. That is why the encoder widens when its next code reaches `2^width` and the decoder when its
//! next code reaches `2^width - 1`: both change width between the same two codes of the stream.

use log::debug;
use rustc_hash::FxHashMap;

use crate::error::CoderError;

pub const CLEAR_CODE: u32 = 256;
pub const END_CODE: u32 = 257;
pub const FIRST_CODE: u32 = 258;
/// Width of every code right after a CLEAR.
pub const MIN_BITS: u8 = 9;
pub const MAX_BITS: u8 = 32;

/// How the code width is bounded and what happens when the dictionary fills up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LzwParams {
    pub max_bits: u8,
    /// Emit CLEAR and start over when full. Otherwise stop adding entries.
    pub clear_on_overflow: bool,
}

impl LzwParams {
    pub fn new(max_bits: u8, clear_on_overflow: bool) -> Result<Self, CoderError> {
        let params = Self {
            max_bits,
            clear_on_overflow,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), CoderError> {
        if (MIN_BITS..=MAX_BITS).contains(&self.max_bits) {
            Ok(())
        } else {
            Err(CoderError::InvalidMaxBits)
        }
    }
}

impl Default for LzwParams {
    fn default() -> Self {
        Self {
            max_bits: 16,
            clear_on_overflow: true,
        }
    }
}

fn key(prefix: u32, byte: u8) -> u64 {
    (prefix as u64) << 8 | byte as u64
}

/// Encode side: string to code.
#[derive(Debug)]
pub struct EncodeDictionary {
    map: FxHashMap<u64, u32>,
    next: u64,
    width: u8,
    max_bits: u8,
    frozen: bool,
}

impl EncodeDictionary {
    pub fn new(max_bits: u8) -> Self {
        let mut map = FxHashMap::default();
        if max_bits <= 20 {
            map.reserve(1 << max_bits);
        }
        Self {
            map,
            next: FIRST_CODE as u64,
            width: MIN_BITS,
            max_bits,
            frozen: false,
        }
    }

    pub fn lookup(&self, prefix: u32, byte: u8) -> Option<u32> {
        self.map.get(&key(prefix, byte)).copied()
    }

    /// Current width for writing codes.
    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Assign the next code to (prefix, byte), widening if the following code would not fit.
    /// Returns true when the dictionary is full at `max_bits`; the caller then clears or freezes it.
    pub fn insert(&mut self, prefix: u32, byte: u8) -> bool {
        if self.frozen {
            return false;
        }
        self.map.insert(key(prefix, byte), self.next as u32);
        self.next += 1;
        if self.next == 1 << self.width {
            if self.width < self.max_bits {
                self.width += 1;
                debug!("Encoder widened to {} bits", self.width);
            } else {
                return true;
            }
        }
        false
    }

    pub fn reset(&mut self) {
        self.map.clear();
        self.next = FIRST_CODE as u64;
        self.width = MIN_BITS;
    }

    pub fn freeze(&mut self) {
        debug!("Dictionary frozen at {} entries", self.next);
        self.frozen = true;
    }

    /// Width for the END code. The decoder still makes one insertion after the last data code, and if
    /// that insertion widens it the END code must be written at the wider width.
    pub fn end_width(&self) -> u8 {
        if !self.frozen && self.width < self.max_bits && self.next + 1 == 1 << self.width {
            self.width + 1
        } else {
            self.width
        }
    }
}

/// Decode side: code to (prefix code, trailing byte).
#[derive(Debug)]
pub struct DecodeTable {
    entries: Vec<(u32, u8)>,
    width: u8,
    params: LzwParams,
    frozen: bool,
}

impl DecodeTable {
    pub fn new(params: LzwParams) -> Self {
        let mut entries = Vec::new();
        if params.max_bits <= 20 {
            entries.reserve(1 << params.max_bits);
        }
        Self {
            entries,
            width: MIN_BITS,
            params,
            frozen: false,
        }
    }

    /// The code the next insertion will receive.
    pub fn next_code(&self) -> u64 {
        FIRST_CODE as u64 + self.entries.len() as u64
    }

    /// Current width for reading codes.
    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn reset(&mut self) {
        self.entries.clear();
        self.width = MIN_BITS;
        self.frozen = false;
    }

    pub fn insert(&mut self, prefix: u32, byte: u8) {
        if self.frozen {
            return;
        }
        self.entries.push((prefix, byte));
        let next = self.next_code();
        if self.width < self.params.max_bits {
            if next == (1 << self.width) - 1 {
                self.width += 1;
            }
        } else if !self.params.clear_on_overflow && next == 1 << self.width {
            // Same last entry as the encoder, then no more
            self.frozen = true;
        }
    }

    /// Append the bytes of `code` to `out` in stream order and return the first of them.
    /// None if the chain touches a control code or an unassigned entry.
    pub fn expand(&self, code: u32, out: &mut Vec<u8>) -> Option<u8> {
        let start = out.len();
        let mut curr = code;
        while curr >= FIRST_CODE {
            let Some(&(prefix, byte)) = self.entries.get((curr - FIRST_CODE) as usize) else {
                out.truncate(start);
                return None;
            };
            out.push(byte);
            curr = prefix;
        }
        if curr > 0xff {
            out.truncate(start);
            return None;
        }
        out.push(curr as u8);
        out[start..].reverse();
        Some(curr as u8)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn params_range() {
        assert!(LzwParams::new(9, true).is_ok());
        assert!(LzwParams::new(32, false).is_ok());
        assert_eq!(LzwParams::new(8, true), Err(CoderError::InvalidMaxBits));
        assert_eq!(LzwParams::new(33, true), Err(CoderError::InvalidMaxBits));
    }

    #[test]
    fn encoder_widens_at_power_of_two() {
        let mut dict = EncodeDictionary::new(12);
        // 258..=510 keep 9 bits, assigning 511 moves next to 512
        for i in 0..253 {
            assert!(!dict.insert(i, 0));
            assert_eq!(dict.width(), 9);
        }
        assert_eq!(dict.end_width(), 10);
        assert!(!dict.insert(253, 0));
        assert_eq!(dict.width(), 10);
        assert_eq!(dict.lookup(253, 0), Some(511));
        assert_eq!(dict.lookup(254, 0), None);
    }

    #[test]
    fn encoder_reports_full() {
        let mut dict = EncodeDictionary::new(9);
        for i in 0..253 {
            assert!(!dict.insert(i, 1));
        }
        assert!(dict.insert(253, 1));
        assert_eq!(dict.width(), 9);
        dict.reset();
        assert_eq!(dict.lookup(0, 1), None);
        dict.insert(7, 7);
        assert_eq!(dict.lookup(7, 7), Some(FIRST_CODE));
    }

    #[test]
    fn frozen_encoder_ignores_inserts() {
        let mut dict = EncodeDictionary::new(9);
        dict.freeze();
        assert!(!dict.insert(1, 1));
        assert_eq!(dict.lookup(1, 1), None);
        assert!(dict.is_frozen());
    }

    #[test]
    fn decoder_widens_one_code_earlier() {
        let mut table = DecodeTable::new(LzwParams::new(12, true).unwrap());
        for i in 0..252 {
            table.insert(i, 0);
            assert_eq!(table.width(), 9);
        }
        table.insert(252, 0);
        assert_eq!(table.next_code(), 511);
        assert_eq!(table.width(), 10);
    }

    #[test]
    fn decoder_freezes_after_last_entry() {
        let mut table = DecodeTable::new(LzwParams::new(9, false).unwrap());
        for i in 0..254 {
            table.insert(i, 0);
        }
        assert_eq!(table.next_code(), 512);
        table.insert(1, 1);
        assert_eq!(table.next_code(), 512);
    }

    #[test]
    fn expand_follows_the_chain() {
        let mut table = DecodeTable::new(LzwParams::default());
        table.insert(b'a' as u32, b'b'); // 258 = "ab"
        table.insert(258, b'c'); // 259 = "abc"
        let mut out = b"x".to_vec();
        assert_eq!(table.expand(259, &mut out), Some(b'a'));
        assert_eq!(out, b"xabc");
        assert_eq!(table.expand(b'z' as u32, &mut out), Some(b'z'));
        assert_eq!(table.expand(260, &mut out), None);
        assert_eq!(table.expand(END_CODE, &mut out), None);
        assert_eq!(out, b"xabcz");
    }
}
