//! The lzw module is the dictionary coder behind a tzip archive.
//!
//! Repeated byte strings are replaced by codes from a dictionary that both sides build as they go, so
//! nothing but a few parameters has to be stored in the header. Codes start 9 bits wide and grow by one
//! bit each time the dictionary outgrows the current width, up to the chosen maximum (9 to 32 bits).
//!
//! Once the maximum is reached the dictionary is either cleared (a CLEAR code is written and both sides
//! start over at 9 bits) or frozen, in which case the existing entries are used for the rest of the file.
//!

pub mod dictionary;
pub mod lzw;
