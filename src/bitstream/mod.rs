//! The bitstream module forms the I/O subsystem for tzip.
//!
//! Both the Huffman coder and the LZW coder need to emit values that are not byte sized: variable length
//! Huffman codes, and LZW codes of 9 to 32 bits. BitWriter packs those bits into bytes, BitReader unpacks them.
//!
//! Bits are packed least significant bit first within each byte. A writer that goes out of scope pads and
//! flushes its last partial byte, so no bits are silently dropped.
//!
pub mod bitreader;
pub mod bitwriter;
