//! The compression module ties the transforms and coders together into whole-file operations.
//!
//! Compression happens in the following steps:
//! - Splitting (optional): cut the file into 256k blocks and run each through the Burrows Wheeler Transform
//!   and/or the Move To Front transform, writing the results to a temporary file.
//! - Coding: compress the (possibly transformed) data with either the Huffman coder or the LZW coder, behind a
//!   small header that records the original filename and which transforms were used.
//!
//! Decompression follows the inverse of the compression process.
//! - Decoding with the coder named by the archive.
//! - Splitting reversal: undo MTF, then BWT, block by block.
//!
//! `compress` and `decompress` below are the driver used by the binary: they pick output names, guard
//! against overwriting, and report statistics.
//!

use std::fmt::{Display, Formatter};

pub mod compress;
pub mod decompress;
pub mod header;
pub mod splitting;

/// Sizes reported after compressing a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    /// Size of the input file in bytes
    pub original_size: u64,
    /// Size of the archive in bytes
    pub compressed_size: u64,
    /// Bytes of the archive taken by its header
    pub metadata_size: u64,
}

impl Stats {
    /// Archive size as a percentage of the input size.
    pub fn ratio(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        self.compressed_size as f64 * 100.0 / self.original_size as f64
    }
}

impl Display for Stats {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Original size:   {} bytes", self.original_size)?;
        writeln!(f, "Compressed size: {} bytes", self.compressed_size)?;
        writeln!(f, "Metadata size:   {} bytes", self.metadata_size)?;
        write!(f, "Compression:     {:.2}% of original", self.ratio())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn stats_report() {
        let stats = Stats {
            original_size: 24,
            compressed_size: 84,
            metadata_size: 60,
        };
        assert_eq!(
            stats.to_string(),
            "Original size:   24 bytes\n\
             Compressed size: 84 bytes\n\
             Metadata size:   60 bytes\n\
             Compression:     350.00% of original"
        );
        let empty = Stats {
            original_size: 0,
            ..stats
        };
        assert_eq!(empty.ratio(), 0.0);
    }
}
