//! Field codecs shared by the Huffman and LZW archive headers.

use std::io::{Read, Write};
use std::path::Path;

use crate::error::CoderError;

/// Longest original filename stored in a header.
pub const MAX_NAME_LEN: usize = 255;

/// The name stored for `path`: its final component, cut to 255 bytes.
pub fn stored_name(path: &Path) -> Vec<u8> {
    let mut name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned().into_bytes())
        .unwrap_or_default();
    name.truncate(MAX_NAME_LEN);
    name
}

/// Write `[len:1][name:len]`. Returns the bytes written.
pub fn write_name(out: &mut impl Write, name: &[u8]) -> Result<u64, CoderError> {
    let len = name.len().min(MAX_NAME_LEN);
    out.write_all(&[len as u8])
        .and_then(|_| out.write_all(&name[..len]))
        .map_err(|_| CoderError::FileWriteError)?;
    Ok(1 + len as u64)
}

/// Read `[len:1][name:len]`.
pub fn read_name(fin: &mut impl Read) -> Result<String, CoderError> {
    let len = read_u8(fin)? as usize;
    let mut name = vec![0_u8; len];
    fin.read_exact(&mut name)
        .map_err(|_| CoderError::InvalidFormat)?;
    Ok(String::from_utf8_lossy(&name).into_owned())
}

pub fn write_u8(out: &mut impl Write, byte: u8) -> Result<(), CoderError> {
    out.write_all(&[byte]).map_err(|_| CoderError::FileWriteError)
}

/// Any short read inside a header means the archive is not valid.
pub fn read_u8(fin: &mut impl Read) -> Result<u8, CoderError> {
    let mut byte = [0_u8; 1];
    fin.read_exact(&mut byte)
        .map_err(|_| CoderError::InvalidFormat)?;
    Ok(byte[0])
}

pub fn read_u32(fin: &mut impl Read) -> Result<u32, CoderError> {
    let mut word = [0_u8; 4];
    fin.read_exact(&mut word)
        .map_err(|_| CoderError::InvalidFormat)?;
    Ok(u32::from_le_bytes(word))
}
