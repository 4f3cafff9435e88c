use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::{debug, info};

use super::dictionary::{
    DecodeTable, EncodeDictionary, LzwParams, CLEAR_CODE, END_CODE, MAX_BITS, MIN_BITS,
};
use crate::bitstream::bitreader::BitReader;
use crate::bitstream::bitwriter::BitWriter;
use crate::compression::header::{read_name, read_u8, stored_name, write_name, write_u8};
use crate::compression::splitting::{apply_forward, apply_reverse, Transforms};
use crate::compression::Stats;
use crate::error::{open_error, CoderError};
use crate::tools::scratch::Scratch;

/// First three bytes of every LZW archive.
pub const MAGIC: &[u8; 3] = b"LZW";
const CHUNK_SIZE: usize = 256 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LzwHeader {
    pub name: String,
    pub params: LzwParams,
    pub transforms: Transforms,
}

/// Compress `in_path` into the LZW archive `out_path`.
pub fn compress(
    in_path: &Path,
    out_path: &Path,
    params: LzwParams,
    transforms: Transforms,
    scratch: &Scratch,
) -> Result<Stats, CoderError> {
    params.validate()?;

    let temp = if transforms.any() {
        let temp = scratch
            .create(".lzw.tmp")
            .map_err(|_| CoderError::FileWriteError)?;
        apply_forward(in_path, temp.path(), transforms)?;
        Some(temp)
    } else {
        None
    };
    let source = temp.as_ref().map_or(in_path, |t| t.path());

    let mut fin = BufReader::with_capacity(CHUNK_SIZE, File::open(source).map_err(open_error)?);
    if fin
        .fill_buf()
        .map_err(|_| CoderError::FileReadError)?
        .is_empty()
    {
        return Err(CoderError::EmptyFile);
    }

    let mut f_out = BufWriter::new(File::create(out_path).map_err(|_| CoderError::FileWriteError)?);
    let header = LzwHeader {
        name: String::new(),
        params,
        transforms,
    };
    let metadata_size = write_header(&mut f_out, &stored_name(in_path), &header)?;
    let read = encode_stream(&mut fin, &mut f_out, params)?;
    f_out.flush().map_err(|_| CoderError::FileWriteError)?;
    drop(f_out);
    info!(
        "Coded {} bytes with max width {} ({}).",
        read,
        params.max_bits,
        if params.clear_on_overflow { "clear" } else { "freeze" }
    );

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

/// Restore the file stored in the LZW archive `in_path` to `out_path`.
pub fn decompress(in_path: &Path, out_path: &Path, scratch: &Scratch) -> Result<(), CoderError> {
    let mut fin = BufReader::with_capacity(CHUNK_SIZE, File::open(in_path).map_err(open_error)?);
    let header = read_header(&mut fin)?;
    info!(
        "Archive of '{}': max width {}, clear {}, BWT {}, MTF {}.",
        header.name,
        header.params.max_bits,
        header.params.clear_on_overflow,
        header.transforms.bwt,
        header.transforms.mtf
    );

    let temp = if header.transforms.any() {
        Some(
            scratch
                .create(".lzw.tmp")
                .map_err(|_| CoderError::FileWriteError)?,
        )
    } else {
        None
    };
    let target = temp.as_ref().map_or(out_path, |t| t.path());

    {
        let mut f_out = BufWriter::new(File::create(target).map_err(|_| CoderError::FileWriteError)?);
        decode_stream(&mut fin, &mut f_out, header.params)?;
        f_out.flush().map_err(|_| CoderError::FileWriteError)?;
    }

    if let Some(temp) = temp {
        apply_reverse(temp.path(), out_path, header.transforms)?;
    }
    Ok(())
}

/// Read just the original filename out of an LZW archive.
pub fn original_name(in_path: &Path) -> Result<String, CoderError> {
    let mut fin = BufReader::new(File::open(in_path).map_err(open_error)?);
    Ok(read_header(&mut fin)?.name)
}

/// Write `["LZW"][name_len][name][max_bits][behavior][transform flags]`. Returns the header size.
pub fn write_header(out: &mut impl Write, name: &[u8], header: &LzwHeader) -> Result<u64, CoderError> {
    out.write_all(MAGIC)
        .map_err(|_| CoderError::FileWriteError)?;
    let size = MAGIC.len() as u64 + write_name(out, name)?;
    write_u8(out, header.params.max_bits)?;
    write_u8(out, header.params.clear_on_overflow as u8)?;
    write_u8(out, header.transforms.bits())?;
    Ok(size + 3)
}

/// Parse and check an LZW header: the magic has to match and max_bits has to be in 9..=32.
pub fn read_header(fin: &mut impl Read) -> Result<LzwHeader, CoderError> {
    let mut magic = [0_u8; 3];
    fin.read_exact(&mut magic)
        .map_err(|_| CoderError::InvalidFormat)?;
    if &magic != MAGIC {
        return Err(CoderError::InvalidFormat);
    }
    let name = read_name(fin)?;
    let max_bits = read_u8(fin)?;
    let behavior = read_u8(fin)?;
    let flags = read_u8(fin)?;
    if !(MIN_BITS..=MAX_BITS).contains(&max_bits) {
        return Err(CoderError::InvalidFormat);
    }
    Ok(LzwHeader {
        name,
        params: LzwParams {
            max_bits,
            clear_on_overflow: behavior == 1,
        },
        transforms: Transforms::from_bits(flags),
    })
}

/// Code everything read from `fin` as `CLEAR, codes..., END`. Returns the number of bytes read.
pub fn encode_stream<R: Read, W: Write>(
    fin: &mut R,
    out: W,
    params: LzwParams,
) -> Result<u64, CoderError> {
    params.validate()?;
    let mut dict = EncodeDictionary::new(params.max_bits);
    let mut bw = BitWriter::new(out);
    put(&mut bw, CLEAR_CODE, dict.width())?;

    let mut buf = vec![0_u8; CHUNK_SIZE];
    let mut prefix: Option<u32> = None;
    let mut total = 0_u64;
    let mut clears = 0;
    loop {
        let size = fin.read(&mut buf).map_err(|_| CoderError::FileReadError)?;
        if size == 0 {
            break;
        }
        total += size as u64;
        for &byte in &buf[..size] {
            let Some(p) = prefix else {
                prefix = Some(byte as u32);
                continue;
            };
            if let Some(code) = dict.lookup(p, byte) {
                prefix = Some(code);
                continue;
            }
            put(&mut bw, p, dict.width())?;
            if dict.insert(p, byte) {
                if params.clear_on_overflow {
                    put(&mut bw, CLEAR_CODE, dict.width())?;
                    dict.reset();
                    clears += 1;
                } else {
                    dict.freeze();
                }
            }
            prefix = Some(byte as u32);
        }
    }

    let Some(p) = prefix else {
        return Err(CoderError::EmptyFile);
    };
    put(&mut bw, p, dict.width())?;
    put(&mut bw, END_CODE, dict.end_width())?;
    debug!(
        "Stream ends at {}, {} clear(s), frozen {}.",
        bw.loc(),
        clears,
        dict.is_frozen()
    );
    bw.flush().map_err(|_| CoderError::FileWriteError)?;
    Ok(total)
}

fn put<W: Write>(bw: &mut BitWriter<W>, code: u32, width: u8) -> Result<(), CoderError> {
    bw.write_code(code, width)
        .map_err(|_| CoderError::FileWriteError)
}

/// Decode codes from `fin` up to and including END. Running out of bits before END, or meeting a code
/// the table cannot explain, is `InvalidFormat`.
pub fn decode_stream<R: Read, W: Write>(
    fin: R,
    out: &mut W,
    params: LzwParams,
) -> Result<(), CoderError> {
    params.validate().map_err(|_| CoderError::InvalidFormat)?;
    let mut br = BitReader::new(fin);
    let mut table = DecodeTable::new(params);
    let mut prev: Option<u32> = None;
    let mut buf = Vec::with_capacity(CHUNK_SIZE);

    loop {
        let code = br
            .read_code(table.width())
            .map_err(|_| CoderError::InvalidFormat)?;
        if code == END_CODE {
            break;
        }
        if code == CLEAR_CODE {
            table.reset();
            prev = None;
            continue;
        }

        let expanded = if (code as u64) < table.next_code() {
            table.expand(code, &mut buf)
        } else if code as u64 == table.next_code() {
            // The code the encoder made from the previous string plus its own first byte
            prev.and_then(|p| table.expand(p, &mut buf)).map(|head| {
                buf.push(head);
                head
            })
        } else {
            None
        };
        let head = expanded.ok_or(CoderError::InvalidFormat)?;

        if let Some(p) = prev {
            table.insert(p, head);
        }
        prev = Some(code);

        if buf.len() >= CHUNK_SIZE {
            out.write_all(&buf).map_err(|_| CoderError::FileWriteError)?;
            buf.clear();
        }
    }
    out.write_all(&buf).map_err(|_| CoderError::FileWriteError)
}
