//! Error kinds for every layer of tzip.
//!
//! Each layer has its own small enumeration. Lower layers are mapped into the layer above
//! at the call site (for example a bitstream read failure inside a Huffman payload becomes
//! `CoderError::InvalidFormat`), so the top level only ever sees `CoderError`.

use thiserror::Error;

/// Errors from the bit-granular reader and writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BitStreamError {
    #[error("end of stream reached")]
    EndOfStream,
    #[error("failed to write to the output stream")]
    WriteFailure,
    #[error("failed to read from the input device")]
    ReadFailure,
    #[error("buffer too small for the requested number of bits")]
    BufferTooSmall,
}

/// Errors from the BWT and MTF block transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("empty input block")]
    EmptyInput,
    #[error("primary index out of range for the inverse BWT")]
    InvalidIndex,
}

/// Errors from the block splitting layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SplittingError {
    #[error("could not open a file for the block transforms")]
    FileOpenError,
    #[error("could not read a block")]
    FileReadError,
    #[error("could not write a block")]
    FileWriteError,
    #[error("block record is truncated or oversized")]
    TruncatedRecord,
    #[error("block transform failed: {0}")]
    TransformFailed(#[from] TransformError),
}

/// Errors reported by the Huffman and LZW coders and by the command line driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CoderError {
    #[error("file not found")]
    FileNotFound,
    #[error("could not read the input file")]
    FileReadError,
    #[error("could not write the output file")]
    FileWriteError,
    #[error("invalid format: not an archive of this kind, or it is damaged")]
    InvalidFormat,
    #[error("the input file is empty, nothing to compress")]
    EmptyFile,
    #[error("operation cancelled by the user")]
    UserCancelled,
    #[error("the output file cannot be the same as the input file")]
    FileSameAsInput,
    #[error("the BWT/MTF transform stage failed")]
    TransformFailed,
    #[error("invalid max bits, allowed range is 9-32")]
    InvalidMaxBits,
    #[error("no file path provided")]
    NoPathProvided,
    #[error("a symbol count does not fit the 32 bit frequency table")]
    FileTooLarge,
}

impl From<SplittingError> for CoderError {
    fn from(_: SplittingError) -> Self {
        CoderError::TransformFailed
    }
}

/// Sort an io::Error raised while opening an input file into the coder error kinds.
pub(crate) fn open_error(e: std::io::Error) -> CoderError {
    match e.kind() {
        std::io::ErrorKind::NotFound => CoderError::FileNotFound,
        _ => CoderError::FileReadError,
    }
}
