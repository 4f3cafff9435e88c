//! The huffman module is one of the two coders behind a tzip archive.
//!
//! A single code table is built for the whole file from its byte frequencies. The frequencies are stored in
//! the archive header so that decompression can rebuild exactly the same tree, then every input byte is
//! replaced by its code, packed LSB first by the BitWriter.
//!
//! A file made of one repeated byte needs no payload at all: the header alone says which byte and how many.
//!
//! Coding each file is inherently sequential; the tree build is cheap next to the bit writing.
//!

pub mod huffman;
pub mod huffman_code_from_weights;
