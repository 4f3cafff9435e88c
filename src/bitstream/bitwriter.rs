use std::io::Write;

use log::error;

use crate::error::BitStreamError;

/// Writes a bitstream for output. Bits are packed least significant bit first into each
/// byte, and a byte goes to the sink as soon as all 8 of its bits are filled.
///
/// Any partial byte still pending when the writer goes out of scope is flushed
/// (zero padded) on drop. Call `flush()` yourself if you need to see the error.
pub struct BitWriter<W: Write> {
    /// Handle to the output stream
    out: W,
    /// Partial byte waiting for more bits.
    current: u8,
    /// Count of valid bits in `current`.
    bit_pos: u8,
    /// Bytes handed to the sink so far
    written: u64,
}

impl<W: Write> BitWriter<W> {
    /// Create a new BitWriter over any sink. Wrap files in a BufWriter, since every full byte
    /// is handed to the sink individually.
    pub fn new(out: W) -> Self {
        Self {
            out,
            current: 0,
            bit_pos: 0,
            written: 0,
        }
    }

    /// Write the first `bit_length` bits of `data`. Bits are taken LSB first from each byte,
    /// bytes in order. Asking for more bits than `data` holds writes only what is there.
    pub fn write_bits(&mut self, data: &[u8], bit_length: usize) -> Result<(), BitStreamError> {
        let mut bits_written = 0;
        for &byte in data {
            for i in 0..8 {
                if bits_written >= bit_length {
                    return Ok(());
                }
                self.current |= ((byte >> i) & 1) << self.bit_pos;
                self.bit_pos += 1;
                bits_written += 1;

                if self.bit_pos == 8 {
                    self.push_byte()?;
                }
            }
        }
        Ok(())
    }

    /// Write the low `width` bits of `code`, least significant bit first.
    pub fn write_code(&mut self, code: u32, width: u8) -> Result<(), BitStreamError> {
        self.write_bits(&code.to_le_bytes(), width as usize)
    }

    /// Flushes the remaining bits (1-7), padding the unused high bits with 0s.
    /// Does nothing when no bits are pending.
    pub fn flush(&mut self) -> Result<(), BitStreamError> {
        if self.bit_pos > 0 {
            self.push_byte()?;
        }
        Ok(())
    }

    /// Debugging function to return the number of bytes.bits output so far
    pub fn loc(&self) -> String {
        format!("[{}.{}]", self.written, self.bit_pos)
    }

    fn push_byte(&mut self) -> Result<(), BitStreamError> {
        self.out
            .write_all(&[self.current])
            .map_err(|_| BitStreamError::WriteFailure)?;
        self.written += 1;
        self.current = 0;
        self.bit_pos = 0;
        Ok(())
    }
}

impl<W: Write> Drop for BitWriter<W> {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            error!("BitWriter lost its last partial byte: {}", e);
        }
    }
}
