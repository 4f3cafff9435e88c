//! The tools module provides several helper functions for tzip.
//!
//! The tools are:
//! - cli: Command line interface for tzip.
//! - freq_count: Frequency count of byte values.
//! - mtf: Move-To-Front transform.
//! - scratch: Self-deleting temporary files used between the transform and coding stages.
//!
pub mod cli;
pub mod freq_count;
pub mod mtf;
pub mod scratch;
