use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::{debug, info, trace};

use super::huffman_code_from_weights::{Code, HuffmanTree};
use crate::bitstream::bitreader::BitReader;
use crate::bitstream::bitwriter::BitWriter;
use crate::compression::header::{read_name, read_u32, read_u8, stored_name, write_name, write_u8};
use crate::compression::splitting::{apply_forward, apply_reverse, Transforms};
use crate::compression::Stats;
use crate::error::{open_error, CoderError};
use crate::tools::freq_count::add_freqs;
use crate::tools::scratch::Scratch;

/// Flag bit marking an archive whose input held a single distinct byte value.
const SINGLE_SYMBOL: u8 = 4;
const CHUNK_SIZE: usize = 256 * 1024;

/// Everything stored ahead of the huffman payload.
#[derive(Debug, Clone)]
pub struct HuffHeader {
    pub name: String,
    pub transforms: Transforms,
    pub single_symbol: bool,
    pub freqs: [u32; 256],
}

impl HuffHeader {
    pub fn total(&self) -> u64 {
        self.freqs.iter().map(|&f| f as u64).sum()
    }

    pub fn symbols(&self) -> usize {
        self.freqs.iter().filter(|&&f| f > 0).count()
    }
}

/// Compress `in_path` into the huffman archive `out_path`, optionally running the BWT/MTF
/// block transforms first.
pub fn compress(
    in_path: &Path,
    out_path: &Path,
    transforms: Transforms,
    scratch: &Scratch,
) -> Result<Stats, CoderError> {
    // The temp file lives until we return, then removes itself.
    let temp = if transforms.any() {
        let temp = scratch
            .create(".huff.tmp")
            .map_err(|_| CoderError::FileWriteError)?;
        apply_forward(in_path, temp.path(), transforms)?;
        Some(temp)
    } else {
        None
    };
    let source = temp.as_ref().map_or(in_path, |t| t.path());

    let mut fin = BufReader::with_capacity(CHUNK_SIZE, File::open(source).map_err(open_error)?);
    let freqs = count_freqs(&mut fin)?;
    let total: u64 = freqs.iter().map(|&f| f as u64).sum();
    if total == 0 {
        return Err(CoderError::EmptyFile);
    }
    let symbols = freqs.iter().filter(|&&f| f > 0).count();
    info!("Read {} bytes holding {} distinct symbols.", total, symbols);

    let mut f_out = BufWriter::new(File::create(out_path).map_err(|_| CoderError::FileWriteError)?);

    let header = HuffHeader {
        name: String::new(),
        transforms,
        single_symbol: symbols == 1,
        freqs,
    };
    let metadata_size = write_header(&mut f_out, &stored_name(in_path), &header)?;

    if !header.single_symbol {
        let tree = HuffmanTree::from_weights(&freqs).ok_or(CoderError::EmptyFile)?;
        let codes = tree.codes();
        trace!(
            "Code lengths: {:?}",
            codes.iter().map(|c| c.len).collect::<Vec<_>>()
        );
        fin.seek(SeekFrom::Start(0))
            .map_err(|_| CoderError::FileReadError)?;
        encode_payload(&mut fin, &mut f_out, &codes)?;
    } else {
        debug!("Single symbol input, no payload written.");
    }
    f_out.flush().map_err(|_| CoderError::FileWriteError)?;
    drop(f_out);

    Ok(Stats {
        original_size: fs::metadata(in_path)
            .map_err(|_| CoderError::FileReadError)?
            .len(),
        compressed_size: fs::metadata(out_path)
            .map_err(|_| CoderError::FileWriteError)?
            .len(),
        metadata_size,
    })
}

/// Restore the file stored in the huffman archive `in_path` to `out_path`.
pub fn decompress(in_path: &Path, out_path: &Path, scratch: &Scratch) -> Result<(), CoderError> {
    let mut fin = BufReader::with_capacity(CHUNK_SIZE, File::open(in_path).map_err(open_error)?);
    let header = read_header(&mut fin)?;

    let total = header.total();
    if total == 0 {
        return Err(CoderError::EmptyFile);
    }
    // The flag and the table have to agree
    if header.single_symbol != (header.symbols() == 1) {
        return Err(CoderError::InvalidFormat);
    }
    info!(
        "Archive of '{}': {} bytes, {} symbols, BWT {}, MTF {}.",
        header.name,
        total,
        header.symbols(),
        header.transforms.bwt,
        header.transforms.mtf
    );

    let temp = if header.transforms.any() {
        Some(
            scratch
                .create(".huff.tmp")
                .map_err(|_| CoderError::FileWriteError)?,
        )
    } else {
        None
    };
    let target = temp.as_ref().map_or(out_path, |t| t.path());

    {
        let mut f_out = BufWriter::new(File::create(target).map_err(|_| CoderError::FileWriteError)?);
        if header.single_symbol {
            let sym = header.freqs.iter().position(|&f| f > 0).unwrap_or(0) as u8;
            write_repeated(&mut f_out, sym, total)?;
        } else {
            let tree = HuffmanTree::from_weights(&header.freqs).ok_or(CoderError::InvalidFormat)?;
            decode_payload(&mut fin, &mut f_out, &tree, total)?;
        }
        f_out.flush().map_err(|_| CoderError::FileWriteError)?;
    }

    if let Some(temp) = temp {
        apply_reverse(temp.path(), out_path, header.transforms)?;
    }
    Ok(())
}

/// Read just the original filename out of a huffman archive.
pub fn original_name(in_path: &Path) -> Result<String, CoderError> {
    let mut fin = BufReader::new(File::open(in_path).map_err(open_error)?);
    read_name(&mut fin)
}

/// Write `[name_len][name][flags][presence bitmask:32][freq:u32 LE per present symbol]`.
/// Returns the number of header bytes.
pub fn write_header(out: &mut impl Write, name: &[u8], header: &HuffHeader) -> Result<u64, CoderError> {
    let mut size = write_name(out, name)?;

    let flags = header.transforms.bits() | if header.single_symbol { SINGLE_SYMBOL } else { 0 };
    write_u8(out, flags)?;

    let mut bitmask = [0_u8; 32];
    for (i, _) in header.freqs.iter().enumerate().filter(|(_, &f)| f > 0) {
        bitmask[i / 8] |= 1 << (i % 8);
    }
    out.write_all(&bitmask)
        .map_err(|_| CoderError::FileWriteError)?;
    size += 1 + 32;

    for &f in header.freqs.iter().filter(|&&f| f > 0) {
        out.write_all(&f.to_le_bytes())
            .map_err(|_| CoderError::FileWriteError)?;
        size += 4;
    }
    Ok(size)
}

/// Parse the header written by `write_header`. Any short read is `InvalidFormat`.
pub fn read_header(fin: &mut impl Read) -> Result<HuffHeader, CoderError> {
    let name = read_name(fin)?;
    let flags = read_u8(fin)?;

    let mut bitmask = [0_u8; 32];
    fin.read_exact(&mut bitmask)
        .map_err(|_| CoderError::InvalidFormat)?;

    let mut freqs = [0_u32; 256];
    for (i, freq) in freqs.iter_mut().enumerate() {
        if bitmask[i / 8] & (1 << (i % 8)) != 0 {
            *freq = read_u32(fin)?;
        }
    }
    Ok(HuffHeader {
        name,
        transforms: Transforms::from_bits(flags),
        single_symbol: flags & SINGLE_SYMBOL != 0,
        freqs,
    })
}

/// Emit the code of every byte read from `fin`, then flush the last partial byte.
pub fn encode_payload<R: Read, W: Write>(
    fin: &mut R,
    out: W,
    codes: &[Code],
) -> Result<(), CoderError> {
    let mut bw = BitWriter::new(out);
    let mut buf = vec![0_u8; CHUNK_SIZE];
    loop {
        let size = fin.read(&mut buf).map_err(|_| CoderError::FileReadError)?;
        if size == 0 {
            break;
        }
        for &byte in &buf[..size] {
            let code = &codes[byte as usize];
            bw.write_bits(&code.bits, code.len)
                .map_err(|_| CoderError::FileWriteError)?;
        }
    }
    debug!("Payload ends at {}.", bw.loc());
    bw.flush().map_err(|_| CoderError::FileWriteError)
}

/// Walk the tree one bit at a time until `total` symbols have been written.
pub fn decode_payload<R: Read, W: Write>(
    fin: R,
    out: &mut W,
    tree: &HuffmanTree,
    total: u64,
) -> Result<(), CoderError> {
    let mut br = BitReader::new(fin);
    let mut buf = Vec::with_capacity(CHUNK_SIZE);
    for _ in 0..total {
        let mut idx = tree.root();
        let sym = loop {
            if let Some(sym) = tree.leaf(idx) {
                break sym;
            }
            let bit = br.bool_bit().map_err(|_| CoderError::InvalidFormat)?;
            idx = tree.step(idx, bit);
        };
        buf.push(sym);
        if buf.len() == CHUNK_SIZE {
            out.write_all(&buf).map_err(|_| CoderError::FileWriteError)?;
            buf.clear();
        }
    }
    out.write_all(&buf).map_err(|_| CoderError::FileWriteError)
}

fn count_freqs(fin: &mut impl Read) -> Result<[u32; 256], CoderError> {
    let mut freqs = [0_u32; 256];
    let mut buf = vec![0_u8; CHUNK_SIZE];
    loop {
        let size = fin.read(&mut buf).map_err(|_| CoderError::FileReadError)?;
        if size == 0 {
            return Ok(freqs);
        }
        add_freqs(&mut freqs, &buf[..size]).ok_or(CoderError::FileTooLarge)?;
    }
}

fn write_repeated(out: &mut impl Write, sym: u8, mut count: u64) -> Result<(), CoderError> {
    let chunk = vec![sym; 64 * 1024];
    while count > 0 {
        let n = count.min(chunk.len() as u64) as usize;
        out.write_all(&chunk[..n])
            .map_err(|_| CoderError::FileWriteError)?;
        count -= n as u64;
    }
    Ok(())
}
