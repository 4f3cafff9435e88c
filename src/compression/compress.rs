use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::compression::Stats;
use crate::error::CoderError;
use crate::huffman_coding::huffman;
use crate::lzw_coding::lzw;
use crate::tools::cli::{Coder, TzOpts};

/// Compress the input file named in opts <TzOpts>.
pub fn compress(opts: &TzOpts) -> Result<Stats, CoderError> {
    let input = input_path(opts)?;
    let coder = opts.coder.unwrap_or(Coder::Huffman);
    let output = opts
        .output
        .clone()
        .unwrap_or_else(|| default_archive_name(input, coder));

    check_output(
        input,
        &output,
        opts.force_overwrite,
        &mut io::stdin().lock(),
    )?;
    info!(
        "Compressing {} to {} with {}.",
        input.display(),
        output.display(),
        coder
    );

    let stats = match coder {
        Coder::Huffman => huffman::compress(input, &output, opts.transforms, &opts.scratch)?,
        Coder::Lzw => lzw::compress(input, &output, opts.lzw, opts.transforms, &opts.scratch)?,
    };
    debug!("{:?}", stats);
    Ok(stats)
}

/// The input path, which has to be given and has to exist.
pub(crate) fn input_path(opts: &TzOpts) -> Result<&Path, CoderError> {
    let input = opts
        .input
        .as_deref()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or(CoderError::NoPathProvided)?;
    if !input.is_file() {
        return Err(CoderError::FileNotFound);
    }
    Ok(input)
}

/// `<input>.huff` or `<input>.lzw`
pub fn default_archive_name(input: &Path, coder: Coder) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".");
    name.push(coder.extension());
    PathBuf::from(name)
}

/// Make sure we may write `output`. It can never be the input itself; an existing file is only replaced
/// with `force` or after the user answers y on `answer`.
pub(crate) fn check_output(
    input: &Path,
    output: &Path,
    force: bool,
    answer: &mut impl BufRead,
) -> Result<(), CoderError> {
    if !output.exists() {
        return Ok(());
    }
    let same = match (input.canonicalize(), output.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => input == output,
    };
    if same {
        return Err(CoderError::FileSameAsInput);
    }
    if force {
        warn!("Overwriting {}", output.display());
        return Ok(());
    }

    let prompt = format!("File '{}' already exists. Overwrite? [y/n]: ", output.display());
    if ask_yes(&prompt, answer)? {
        Ok(())
    } else {
        Err(CoderError::UserCancelled)
    }
}

/// Print `prompt` and read one line from `answer`.
pub(crate) fn ask(prompt: &str, answer: &mut impl BufRead) -> Result<String, CoderError> {
    print!("{}", prompt);
    io::stdout()
        .flush()
        .map_err(|_| CoderError::FileWriteError)?;
    let mut reply = String::new();
    answer
        .read_line(&mut reply)
        .map_err(|_| CoderError::FileReadError)?;
    Ok(reply.trim_end_matches(|c| c == '\r' || c == '\n').to_string())
}

/// Any reply starting with y or Y is a yes. Everything else, including no reply at all, is a no.
pub(crate) fn ask_yes(prompt: &str, answer: &mut impl BufRead) -> Result<bool, CoderError> {
    let reply = ask(prompt, answer)?;
    Ok(matches!(reply.chars().next(), Some('y' | 'Y')))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::compression::splitting::Transforms;
    use crate::lzw_coding::dictionary::LzwParams;
    use crate::tools::scratch::Scratch;
    use std::fs;
    use tempfile::TempDir;

    fn opts_for(input: &Path, coder: Option<Coder>) -> TzOpts {
        TzOpts {
            coder,
            input: Some(input.to_path_buf()),
            transforms: Transforms::new(true, true),
            lzw: LzwParams::new(12, true).unwrap(),
            scratch: Scratch::in_dir(input.parent().unwrap()),
            ..TzOpts::new()
        }
    }

    #[test]
    fn default_names() {
        assert_eq!(
            default_archive_name(Path::new("dir/a.txt"), Coder::Huffman),
            PathBuf::from("dir/a.txt.huff")
        );
        assert_eq!(
            default_archive_name(Path::new("a"), Coder::Lzw),
            PathBuf::from("a.lzw")
        );
    }

    #[test]
    fn compresses_next_to_the_input() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("song.txt");
        fs::write(&src, b"la la la, la la la, la la la la la").unwrap();
        for coder in [Coder::Huffman, Coder::Lzw] {
            let stats = compress(&opts_for(&src, Some(coder))).unwrap();
            let archive = default_archive_name(&src, coder);
            assert_eq!(fs::metadata(&archive).unwrap().len(), stats.compressed_size);
        }
    }

    #[test]
    fn missing_paths() {
        let mut opts = TzOpts::new();
        assert_eq!(compress(&opts), Err(CoderError::NoPathProvided));
        opts.input = Some(PathBuf::new());
        assert_eq!(compress(&opts), Err(CoderError::NoPathProvided));
        opts.input = Some(PathBuf::from("/definitely/not/here.txt"));
        assert_eq!(compress(&opts), Err(CoderError::FileNotFound));
    }

    #[test]
    fn output_checks() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a");
        let out = dir.path().join("b");
        fs::write(&src, b"a").unwrap();

        // Nothing there yet
        assert_eq!(check_output(&src, &out, false, &mut "".as_bytes()), Ok(()));

        fs::write(&out, b"b").unwrap();
        assert_eq!(
            check_output(&src, &src, true, &mut "y\n".as_bytes()),
            Err(CoderError::FileSameAsInput)
        );
        assert_eq!(check_output(&src, &out, true, &mut "".as_bytes()), Ok(()));
        assert_eq!(check_output(&src, &out, false, &mut "Y\n".as_bytes()), Ok(()));
        assert_eq!(
            check_output(&src, &out, false, &mut "n\n".as_bytes()),
            Err(CoderError::UserCancelled)
        );
        assert_eq!(check_output(&src, &out, false, &mut "yes\n".as_bytes()), Ok(()));
        assert_eq!(
            check_output(&src, &out, false, &mut " y\n".as_bytes()),
            Err(CoderError::UserCancelled)
        );
        assert_eq!(
            check_output(&src, &out, false, &mut "".as_bytes()),
            Err(CoderError::UserCancelled)
        );
    }

    #[test]
    fn replies() {
        assert_eq!(ask("? ", &mut "new.txt\r\n".as_bytes()), Ok("new.txt".to_string()));
        assert_eq!(ask("? ", &mut "".as_bytes()), Ok(String::new()));
        assert_eq!(ask_yes("? ", &mut "Yup\n".as_bytes()), Ok(true));
        assert_eq!(ask_yes("? ", &mut "nope\n".as_bytes()), Ok(false));
    }

    #[test]
    fn output_equal_to_input_is_refused() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("same.bin");
        fs::write(&src, b"data").unwrap();
        let mut opts = opts_for(&src, Some(Coder::Lzw));
        opts.output = Some(src.clone());
        opts.force_overwrite = true;
        assert_eq!(compress(&opts), Err(CoderError::FileSameAsInput));
        assert_eq!(fs::read(&src).unwrap(), b"data");
    }
}
