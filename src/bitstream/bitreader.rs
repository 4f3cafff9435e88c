//! BitReader: reads the packed bitstream written by BitWriter.
//!
//! NOTE: This module can read from any I/O source that supports the read() call. It pulls
//! one byte at a time, so hand it a BufReader when reading from a file.
//!

use std::io::{ErrorKind, Read};

use crate::error::BitStreamError;

/// Reads an LSB-first bitstream.
#[derive(Debug)]
pub struct BitReader<R> {
    source: R,
    current: u8,
    /// Next bit of `current` to hand out. 8 means we need a fresh byte.
    bit_index: u8,
    /// Bytes pulled from the source so far
    consumed: u64,
}

impl<R: Read> BitReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            current: 0,
            bit_index: 8,
            consumed: 0,
        }
    }

    /// Fill `data` with exactly `bit_length` bits, LSB first into successive bytes.
    /// `data` is zeroed first. Bits already taken from the source before an error are lost.
    pub fn read_bits(&mut self, data: &mut [u8], bit_length: usize) -> Result<(), BitStreamError> {
        data.iter_mut().for_each(|b| *b = 0);

        let mut byte_idx = 0;
        let mut dest_bit = 0;
        for _ in 0..bit_length {
            let bit = self.next_bit()?;
            if byte_idx >= data.len() {
                return Err(BitStreamError::BufferTooSmall);
            }
            data[byte_idx] |= bit << dest_bit;
            dest_bit += 1;
            if dest_bit == 8 {
                dest_bit = 0;
                byte_idx += 1;
            }
        }
        Ok(())
    }

    /// Return *true* if the next bit is 1, *false* if 0, consuming the bit.
    pub fn bool_bit(&mut self) -> Result<bool, BitStreamError> {
        self.next_bit().map(|bit| bit == 1)
    }

    /// Read a `width` bit code (at most 32 bits) written by `BitWriter::write_code`.
    pub fn read_code(&mut self, width: u8) -> Result<u32, BitStreamError> {
        let mut data = [0_u8; 4];
        self.read_bits(&mut data, width as usize)?;
        Ok(u32::from_le_bytes(data))
    }

    /// Debugging function. Report current position in the source.
    pub fn loc(&self) -> String {
        format!("[{}.{}]", self.consumed, self.bit_index % 8)
    }

    fn next_bit(&mut self) -> Result<u8, BitStreamError> {
        if self.bit_index == 8 {
            let mut byte = [0_u8; 1];
            self.source.read_exact(&mut byte).map_err(|e| match e.kind() {
                ErrorKind::UnexpectedEof => BitStreamError::EndOfStream,
                _ => BitStreamError::ReadFailure,
            })?;
            self.current = byte[0];
            self.bit_index = 0;
            self.consumed += 1;
        }
        let bit = (self.current >> self.bit_index) & 1;
        self.bit_index += 1;
        Ok(bit)
    }
}

#[cfg(test)]
mod test {
    use super::BitReader;
    use crate::bitstream::bitwriter::BitWriter;
    use crate::error::BitStreamError;

    #[test]
    fn basic_test() {
        let x = [0b1000_0001_u8].as_slice();
        let mut br = BitReader::new(x);
        assert_eq!(br.bool_bit(), Ok(true));
        for _ in 0..6 {
            assert_eq!(br.bool_bit(), Ok(false));
        }
        assert_eq!(br.bool_bit(), Ok(true));
        assert_eq!(br.bool_bit(), Err(BitStreamError::EndOfStream));
    }

    #[test]
    fn thirteen_bits_round_trip() {
        let value: u16 = 0b1_0110_1100_1011;
        let mut stream = Vec::new();
        {
            let mut bw = BitWriter::new(&mut stream);
            bw.write_bits(&value.to_le_bytes(), 13).unwrap();
        }
        // 13 bits plus 3 bits of padding
        assert_eq!(stream.len(), 2);

        let mut br = BitReader::new(stream.as_slice());
        let mut out = [0xff_u8; 2];
        br.read_bits(&mut out, 13).unwrap();
        assert_eq!(u16::from_le_bytes(out), value);
    }

    #[test]
    fn codes_across_byte_boundaries() {
        let mut stream = Vec::new();
        {
            let mut bw = BitWriter::new(&mut stream);
            for (code, width) in [(256, 9), (65, 9), (1023, 10), (3, 2), (0x1_0000, 17)] {
                bw.write_code(code, width).unwrap();
            }
        }
        let mut br = BitReader::new(stream.as_slice());
        assert_eq!(br.read_code(9), Ok(256));
        assert_eq!(br.read_code(9), Ok(65));
        assert_eq!(br.read_code(10), Ok(1023));
        assert_eq!(br.read_code(2), Ok(3));
        assert_eq!(br.read_code(17), Ok(0x1_0000));
    }

    #[test]
    fn end_of_stream_mid_request() {
        let x = [0xaa_u8].as_slice();
        let mut br = BitReader::new(x);
        let mut out = [0_u8; 2];
        assert_eq!(br.read_bits(&mut out, 12), Err(BitStreamError::EndOfStream));
    }

    #[test]
    fn buffer_too_small() {
        let x = [0xaa_u8, 0xbb].as_slice();
        let mut br = BitReader::new(x);
        let mut out = [0_u8; 1];
        assert_eq!(br.read_bits(&mut out, 9), Err(BitStreamError::BufferTooSmall));
        // The first source byte is gone; the 9th bit came from the second one.
        assert_eq!(br.loc(), "[2.1]");
    }

    #[test]
    fn read_zeroes_destination() {
        let x = [0b0000_0001_u8].as_slice();
        let mut br = BitReader::new(x);
        let mut out = [0xff_u8; 2];
        br.read_bits(&mut out, 1).unwrap();
        assert_eq!(out, [1, 0]);
    }
}
