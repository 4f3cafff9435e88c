//! tzip, a small file compressor built from composable byte transforms.
//!
//! Version 0.1.0
//!
//! Two coders are available: a single table Huffman coder and an LZW dictionary coder with a variable
//! code width. Either one can be preceded by the Burrows Wheeler Transform and/or the Move To Front
//! transform, applied to the file in 256k blocks. Both coders store the original filename so the file
//! can be restored under its own name.
//!
//! Basic usage to compress a file is as follows:
//!
//! `$> tzip -z test.txt --bwt --mtf`
//!
//! This will compress the file and create the file test.txt.huff. `--coder lzw` gives test.txt.lzw
//! instead, and `tzip -d test.txt.lzw` restores test.txt.
//!
pub mod bitstream;
pub mod bwt_algorithms;
pub mod compression;
pub mod error;
pub mod huffman_coding;
pub mod lzw_coding;
pub mod tools;
