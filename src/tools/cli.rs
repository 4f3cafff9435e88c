//! tzip options - read & parse command line args into TzOpts
use std::path::PathBuf;
use std::{fmt::Display, fmt::Formatter};

use clap::{ArgEnum, Parser};
use log::{info, LevelFilter};

use crate::compression::splitting::Transforms;
use crate::error::CoderError;
use crate::lzw_coding::dictionary::LzwParams;
use crate::tools::scratch::Scratch;

/// Zip, Unzip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Zip,
    Unzip,
}
impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The two archive coders
#[derive(Debug, Clone, Copy, PartialEq, Eq, ArgEnum)]
pub enum Coder {
    /// Single table Huffman coding, `.huff` archives
    Huffman,
    /// Variable width LZW dictionary coding, `.lzw` archives
    Lzw,
}
impl Coder {
    /// Extension added to compressed files.
    pub fn extension(&self) -> &'static str {
        match self {
            Coder::Huffman => "huff",
            Coder::Lzw => "lzw",
        }
    }
}
impl Display for Coder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Command Line Interpretation - uses external CLAP crate.
#[derive(Parser, Debug)]
#[clap(
    version,
    about = "Compress files with Huffman or LZW coding, optionally after BWT and MTF",
    long_about = "
    tzip compresses a file with one of two coders: a single table Huffman coder or an LZW
    dictionary coder with a variable code width. Either coder can be preceded by the Burrows
    Wheeler Transform and/or the Move To Front transform, applied in 256k blocks.

    When decompressing, the coder is picked from the archive extension (.huff or .lzw) or
    from the archive itself, and the file is restored under its original name."
)]
pub struct Args {
    /// File to process
    #[clap(parse(from_os_str))]
    input: Option<PathBuf>,

    /// Output file. Defaults to <input>.huff / <input>.lzw, or the stored name when decompressing
    #[clap(parse(from_os_str))]
    output: Option<PathBuf>,

    /// Perform compression on the input file (default)
    #[clap(short = 'z', long = "compress", conflicts_with = "decompress")]
    compress: bool,

    /// Perform decompression on the input file
    #[clap(short = 'd', long = "decompress")]
    decompress: bool,

    /// Coder to use
    #[clap(short = 'c', long, arg_enum)]
    coder: Option<Coder>,

    /// Run the Burrows Wheeler Transform before coding
    #[clap(long)]
    bwt: bool,

    /// Run the Move To Front transform before coding
    #[clap(long)]
    mtf: bool,

    /// Largest LZW code width, 9-32 bits
    #[clap(short = 'b', long = "max-bits", default_value_t = 16)]
    max_bits: u8,

    /// Freeze the LZW dictionary when it is full instead of clearing it
    #[clap(long)]
    freeze: bool,

    /// Force overwriting output file
    #[clap(short = 'f', long = "force")]
    force: bool,

    /// Sets verbosity. -v shows progress, -vvv is chatty (release builds stop at warnings)
    #[clap(short = 'v', parse(from_occurrences))]
    v: u8,

    /// Only report errors
    #[clap(short = 'q', long = "quiet")]
    quiet: bool,

    /// Directory for temporary files (defaults to the system temp dir)
    #[clap(long = "temp-dir", parse(from_os_str))]
    temp_dir: Option<PathBuf>,
}

/// Everything the compression driver needs to know, taken from the command line.
#[derive(Debug, Clone)]
pub struct TzOpts {
    /// Compress/Decompress
    pub op_mode: Mode,
    /// Coder chosen by the user. None means the default (compress) or detect it (decompress).
    pub coder: Option<Coder>,
    /// File to read
    pub input: Option<PathBuf>,
    /// File to write
    pub output: Option<PathBuf>,
    /// Block transforms to run ahead of the coder
    pub transforms: Transforms,
    /// LZW code width and overflow policy
    pub lzw: LzwParams,
    /// Silently overwrite existing files with the same name
    pub force_overwrite: bool,
    /// Where temporary files go
    pub scratch: Scratch,
    /// Log level for the terminal logger
    pub verbosity: LevelFilter,
}

impl TzOpts {
    pub fn new() -> Self {
        Self {
            op_mode: Mode::Zip,
            coder: None,
            input: None,
            output: None,
            transforms: Transforms::default(),
            lzw: LzwParams::default(),
            force_overwrite: false,
            scratch: Scratch::system(),
            verbosity: LevelFilter::Warn,
        }
    }

    /// Put command line information from CLAP into our internal structure.
    pub fn from_args(args: Args) -> Result<Self, CoderError> {
        let verbosity = if args.quiet {
            LevelFilter::Off
        } else {
            match args.v {
                0 => LevelFilter::Warn,
                1 => LevelFilter::Info,
                2 => LevelFilter::Debug,
                _ => LevelFilter::Trace,
            }
        };
        // Levels above the compiled-in maximum would never be shown
        let verbosity = verbosity.min(log::STATIC_MAX_LEVEL);
        Ok(Self {
            op_mode: if args.decompress && !args.compress { Mode::Unzip } else { Mode::Zip },
            coder: args.coder,
            input: args.input,
            output: args.output,
            transforms: Transforms::new(args.bwt, args.mtf),
            lzw: LzwParams::new(args.max_bits, !args.freeze)?,
            force_overwrite: args.force,
            scratch: args.temp_dir.map_or_else(Scratch::system, |dir| Scratch::in_dir(dir)),
            verbosity,
        })
    }

    /// Report the settings in force.
    pub fn report(&self) {
        info!("---- tzip Initialization Start ----");
        info!("Verbosity set to {}", self.verbosity);
        info!("Operational mode set to {}", self.op_mode);
        match &self.coder {
            Some(c) => info!("Coder set to {}", c),
            None => info!("Coder not set, using the default"),
        }
        if let Some(input) = &self.input {
            info!("Getting input from the file {}", input.display());
        }
        if self.transforms.any() {
            info!(
                "Transforms: BWT {}, MTF {}",
                self.transforms.bwt, self.transforms.mtf
            );
        }
        if self.coder == Some(Coder::Lzw) {
            info!(
                "LZW max width {} bits, {} when full",
                self.lzw.max_bits,
                if self.lzw.clear_on_overflow { "clear" } else { "freeze" }
            );
        }
        if self.force_overwrite {
            info!("Forcing file overwriting")
        };
        info!("---- tzip Initialization End ----\n");
    }
}

impl Default for TzOpts {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse the command line.
pub fn tzopts_init() -> Result<TzOpts, CoderError> {
    TzOpts::from_args(Args::parse())
}

#[cfg(test)]
mod test {
    use super::*;

    fn opts(cmd: &[&str]) -> Result<TzOpts, CoderError> {
        TzOpts::from_args(Args::try_parse_from(cmd).unwrap())
    }

    #[test]
    fn defaults() {
        let o = opts(&["tzip", "notes.txt"]).unwrap();
        assert_eq!(o.op_mode, Mode::Zip);
        assert_eq!(o.coder, None);
        assert_eq!(o.input, Some(PathBuf::from("notes.txt")));
        assert_eq!(o.output, None);
        assert!(!o.transforms.any());
        assert_eq!(o.lzw, LzwParams::new(16, true).unwrap());
        assert_eq!(o.verbosity, LevelFilter::Warn);
        assert!(o.scratch.dir().is_none());
    }

    #[test]
    fn full_lzw_command() {
        let o = opts(&[
            "tzip", "-z", "--coder", "lzw", "--bwt", "--mtf", "--max-bits", "12", "--freeze", "-f", "-vv",
            "--temp-dir", "/tmp/x", "in.bin", "out.lzw",
        ])
        .unwrap();
        assert_eq!(o.coder, Some(Coder::Lzw));
        assert_eq!(o.transforms, Transforms::new(true, true));
        assert_eq!(o.lzw, LzwParams::new(12, false).unwrap());
        assert!(o.force_overwrite);
        assert_eq!(o.verbosity, LevelFilter::Debug.min(log::STATIC_MAX_LEVEL));
        assert_eq!(o.output, Some(PathBuf::from("out.lzw")));
        assert_eq!(o.scratch.dir(), Some(std::path::Path::new("/tmp/x")));
    }

    #[test]
    fn verbosity_stays_within_the_compiled_levels() {
        for (flag, level) in [("-v", LevelFilter::Info), ("-vvvvv", LevelFilter::Trace)] {
            let o = opts(&["tzip", flag, "a"]).unwrap();
            assert!(o.verbosity <= log::STATIC_MAX_LEVEL);
            assert_eq!(o.verbosity, level.min(log::STATIC_MAX_LEVEL));
        }
    }

    #[test]
    fn decompress_and_quiet() {
        let o = opts(&["tzip", "-d", "-q", "-vvv", "a.huff"]).unwrap();
        assert_eq!(o.op_mode, Mode::Unzip);
        assert_eq!(o.verbosity, LevelFilter::Off);
    }

    #[test]
    fn max_bits_is_checked() {
        assert_eq!(
            opts(&["tzip", "--max-bits", "40", "a"]).unwrap_err(),
            CoderError::InvalidMaxBits
        );
        assert!(Args::try_parse_from(["tzip", "-z", "-d", "a"]).is_err());
    }
}
