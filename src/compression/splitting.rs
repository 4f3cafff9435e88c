//! Block splitting for the optional BWT/MTF stage.
//!
//! The file is cut into blocks of at most `BLOCK_SIZE` bytes. Each block goes through BWT then MTF (whichever
//! are enabled) and is written as a record:
//!
//! `[block length: u32 LE][BWT key: u32 LE, only when BWT is on][transformed bytes]`
//!
//! The reverse path reads the same records and undoes MTF then BWT.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use log::{debug, info};

use crate::bwt_algorithms::bwt_sort::{bwt_decode, bwt_encode};
use crate::error::SplittingError;
use crate::tools::mtf::{mtf_decode, mtf_encode};

/// Largest block handed to the transforms.
pub const BLOCK_SIZE: usize = 256 * 1024;

/// Which block transforms are applied ahead of the coder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transforms {
    pub bwt: bool,
    pub mtf: bool,
}

impl Transforms {
    pub fn new(bwt: bool, mtf: bool) -> Self {
        Self { bwt, mtf }
    }

    pub fn any(&self) -> bool {
        self.bwt || self.mtf
    }

    /// Flag bits as stored in the archive headers: bit0 = BWT, bit1 = MTF.
    pub fn bits(&self) -> u8 {
        (self.bwt as u8) | (self.mtf as u8) << 1
    }

    pub fn from_bits(flags: u8) -> Self {
        Self {
            bwt: flags & 1 != 0,
            mtf: flags & 2 != 0,
        }
    }
}

/// Transform `in_path` block by block into `out_path`.
pub fn apply_forward(
    in_path: &Path,
    out_path: &Path,
    transforms: Transforms,
) -> Result<(), SplittingError> {
    let mut fin = BufReader::new(File::open(in_path).map_err(|_| SplittingError::FileOpenError)?);
    let mut f_out =
        BufWriter::new(File::create(out_path).map_err(|_| SplittingError::FileOpenError)?);

    let mut buf = vec![0_u8; BLOCK_SIZE];
    let mut blocks = 0;
    loop {
        let size = read_block(&mut fin, &mut buf)?;
        if size == 0 {
            break;
        }
        blocks += 1;
        let (key, data) = forward_block(&buf[..size], transforms)?;
        debug!("Block {}: {} bytes, key {}", blocks, size, key);

        f_out
            .write_all(&(data.len() as u32).to_le_bytes())
            .map_err(|_| SplittingError::FileWriteError)?;
        if transforms.bwt {
            f_out
                .write_all(&key.to_le_bytes())
                .map_err(|_| SplittingError::FileWriteError)?;
        }
        f_out
            .write_all(&data)
            .map_err(|_| SplittingError::FileWriteError)?;
    }
    f_out.flush().map_err(|_| SplittingError::FileWriteError)?;
    info!(
        "Transformed {} block(s) (BWT {}, MTF {}).",
        blocks, transforms.bwt, transforms.mtf
    );
    Ok(())
}

/// Undo `apply_forward`: read records from `in_path` and write the restored bytes to `out_path`.
pub fn apply_reverse(
    in_path: &Path,
    out_path: &Path,
    transforms: Transforms,
) -> Result<(), SplittingError> {
    let mut fin = BufReader::new(File::open(in_path).map_err(|_| SplittingError::FileOpenError)?);
    let mut f_out =
        BufWriter::new(File::create(out_path).map_err(|_| SplittingError::FileOpenError)?);

    let mut blocks = 0;
    // A clean end of input can only fall on a record boundary.
    while !fin
        .fill_buf()
        .map_err(|_| SplittingError::FileReadError)?
        .is_empty()
    {
        let size = read_u32(&mut fin)? as usize;
        if size > BLOCK_SIZE {
            return Err(SplittingError::TruncatedRecord);
        }
        let key = if transforms.bwt { read_u32(&mut fin)? } else { 0 };
        let mut data = vec![0_u8; size];
        fin.read_exact(&mut data).map_err(record_error)?;

        let restored = reverse_block(&data, key, transforms)?;
        f_out
            .write_all(&restored)
            .map_err(|_| SplittingError::FileWriteError)?;
        blocks += 1;
    }
    f_out.flush().map_err(|_| SplittingError::FileWriteError)?;
    info!("Restored {} block(s).", blocks);
    Ok(())
}

/// BWT then MTF on one block. The key is 0 when BWT is off.
pub fn forward_block(block: &[u8], transforms: Transforms) -> Result<(u32, Vec<u8>), SplittingError> {
    let (key, mut data) = if transforms.bwt {
        bwt_encode(block)?
    } else {
        (0, block.to_vec())
    };
    if transforms.mtf {
        data = mtf_encode(&data)?;
    }
    Ok((key, data))
}

/// MTF decode then BWT decode, the mirror of `forward_block`.
pub fn reverse_block(block: &[u8], key: u32, transforms: Transforms) -> Result<Vec<u8>, SplittingError> {
    let mut data = if transforms.mtf {
        mtf_decode(block)?
    } else {
        block.to_vec()
    };
    if transforms.bwt {
        data = bwt_decode(key, &data)?;
    }
    Ok(data)
}

/// Fill as much of `buf` as the input allows. Returns 0 only at end of input.
fn read_block(fin: &mut impl Read, buf: &mut [u8]) -> Result<usize, SplittingError> {
    let mut filled = 0;
    while filled < buf.len() {
        match fin.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(_) => return Err(SplittingError::FileReadError),
        }
    }
    Ok(filled)
}

fn read_u32(fin: &mut impl Read) -> Result<u32, SplittingError> {
    let mut word = [0_u8; 4];
    fin.read_exact(&mut word).map_err(record_error)?;
    Ok(u32::from_le_bytes(word))
}

fn record_error(e: std::io::Error) -> SplittingError {
    match e.kind() {
        ErrorKind::UnexpectedEof => SplittingError::TruncatedRecord,
        _ => SplittingError::FileReadError,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::TransformError;
    use tempfile::TempDir;

    /// Pseudo random text over a small alphabet, so the BWT has real work to do.
    fn sample(len: usize) -> Vec<u8> {
        let mut x = 0x2545_f491_u32;
        (0..len)
            .map(|_| {
                x ^= x << 13;
                x ^= x >> 17;
                x ^= x << 5;
                b'a' + (x % 8) as u8
            })
            .collect()
    }

    fn round_trip(data: &[u8], transforms: Transforms) -> Vec<u8> {
        let dir = TempDir::new().unwrap();
        let (src, mid, dst) = (
            dir.path().join("src"),
            dir.path().join("mid"),
            dir.path().join("dst"),
        );
        std::fs::write(&src, data).unwrap();
        apply_forward(&src, &mid, transforms).unwrap();
        apply_reverse(&mid, &dst, transforms).unwrap();
        std::fs::read(&dst).unwrap()
    }

    #[test]
    fn flag_bits() {
        assert_eq!(Transforms::new(true, false).bits(), 1);
        assert_eq!(Transforms::new(false, true).bits(), 2);
        assert_eq!(Transforms::from_bits(3), Transforms::new(true, true));
        assert!(!Transforms::from_bits(4).any());
    }

    #[test]
    fn record_layout() {
        let dir = TempDir::new().unwrap();
        let (src, mid) = (dir.path().join("src"), dir.path().join("mid"));
        std::fs::write(&src, b"banana").unwrap();
        apply_forward(&src, &mid, Transforms::new(true, false)).unwrap();
        let rec = std::fs::read(&mid).unwrap();
        assert_eq!(&rec[0..4], &6_u32.to_le_bytes());
        assert_eq!(&rec[4..8], &3_u32.to_le_bytes());
        assert_eq!(&rec[8..], b"nnbaaa");
    }

    #[test]
    fn multi_block_round_trips() {
        let data = sample(BLOCK_SIZE + 1234);
        for (bwt, mtf) in [(true, false), (false, true), (true, true)] {
            assert_eq!(round_trip(&data, Transforms::new(bwt, mtf)), data);
        }
    }

    #[test]
    fn empty_file_gives_no_records() {
        let data = round_trip(&[], Transforms::new(true, true));
        assert!(data.is_empty());
    }

    #[test]
    fn truncated_record_is_an_error() {
        let dir = TempDir::new().unwrap();
        let (mid, dst) = (dir.path().join("mid"), dir.path().join("dst"));
        let mut rec = 10_u32.to_le_bytes().to_vec();
        rec.extend_from_slice(b"short");
        std::fs::write(&mid, rec).unwrap();
        assert_eq!(
            apply_reverse(&mid, &dst, Transforms::new(false, true)),
            Err(SplittingError::TruncatedRecord)
        );
    }

    #[test]
    fn bad_key_is_a_transform_error() {
        assert_eq!(
            reverse_block(b"nnbaaa", 9, Transforms::new(true, false)),
            Err(SplittingError::TransformFailed(TransformError::InvalidIndex))
        );
    }
}
