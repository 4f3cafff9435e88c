//! The bwt_algorithms module holds the block sorting transform for tzip.
//!
//! The Burrows-Wheeler Transform (BWT) reorders a block so that bytes with similar following context end up
//! next to each other. This produces long runs that the later stages (MTF, then Huffman or LZW) compress well.
//!
//! The forward transform needs a sorted order of all rotations of the block. It is computed by prefix doubling
//! over rotation ranks, which never materialises the rotations themselves.
//!
pub mod bwt_sort;
