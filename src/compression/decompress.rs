use std::fs::File;
use std::io::{self, BufRead, Read};
use std::path::{Path, PathBuf};

use log::{debug, info};

use super::compress::{ask, ask_yes, check_output, input_path};
use crate::error::{open_error, CoderError};
use crate::huffman_coding::huffman;
use crate::lzw_coding::lzw;
use crate::tools::cli::{Coder, TzOpts};

/// Decompress the archive named in opts (TzOpts). Returns the path of the restored file.
pub fn decompress(opts: &TzOpts) -> Result<PathBuf, CoderError> {
    decompress_with(opts, &mut io::stdin().lock())
}

/// As `decompress`, with the user's replies read from `answer`.
pub(crate) fn decompress_with(opts: &TzOpts, answer: &mut impl BufRead) -> Result<PathBuf, CoderError> {
    let input = input_path(opts)?;
    let coder = match opts.coder {
        Some(coder) => coder,
        None => detect_coder(input)?,
    };
    let output = match &opts.output {
        Some(output) => output.clone(),
        None => choose_output(input, coder, opts.force_overwrite, answer)?,
    };

    check_output(input, &output, opts.force_overwrite, answer)?;
    info!(
        "Decompressing {} to {} with {}.",
        input.display(),
        output.display(),
        coder
    );

    match coder {
        Coder::Huffman => huffman::decompress(input, &output, &opts.scratch)?,
        Coder::Lzw => lzw::decompress(input, &output, &opts.scratch)?,
    }
    info!("Done.");
    Ok(output)
}

/// Pick the coder from the extension, or failing that from the magic at the start of the file.
pub fn detect_coder(path: &Path) -> Result<Coder, CoderError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("lzw") => return Ok(Coder::Lzw),
        Some("huff") => return Ok(Coder::Huffman),
        _ => {}
    }
    let mut magic = [0_u8; 3];
    let mut fin = File::open(path).map_err(open_error)?;
    let coder = match fin.read_exact(&mut magic) {
        Ok(()) if &magic == lzw::MAGIC => Coder::Lzw,
        _ => Coder::Huffman,
    };
    debug!("No known extension, guessed {} from the contents", coder);
    Ok(coder)
}

/// No output was given: offer the stored name, or ask for another one. With `force` the stored name is
/// taken without asking.
fn choose_output(
    input: &Path,
    coder: Coder,
    force: bool,
    answer: &mut impl BufRead,
) -> Result<PathBuf, CoderError> {
    let stored = match coder {
        Coder::Huffman => huffman::original_name(input)?,
        Coder::Lzw => lzw::original_name(input)?,
    };
    let suggested = restored_name(input, &stored)?;
    if force {
        return Ok(suggested);
    }

    let prompt = format!(
        "Output filename not specified. Use '{}'? [y/n]: ",
        suggested.display()
    );
    if ask_yes(&prompt, answer)? {
        return Ok(suggested);
    }
    let name = ask("Please enter output filename: ", answer)?;
    if name.is_empty() {
        return Err(CoderError::UserCancelled);
    }
    Ok(PathBuf::from(name))
}

/// The stored filename placed next to the archive. Only its final component is used, and an archive
/// without one is not valid.
fn restored_name(input: &Path, stored: &str) -> Result<PathBuf, CoderError> {
    let name = Path::new(stored)
        .file_name()
        .ok_or(CoderError::InvalidFormat)?;
    Ok(input.with_file_name(name))
}
