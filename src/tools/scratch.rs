//! Temporary files for the BWT/MTF stage.
//!
//! Every scratch file gets a unique name and is removed when its handle drops, whichever way the owning
//! function returns.

use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use tempfile::{Builder, NamedTempFile};

/// Hands out self-deleting temporary files, either in the OS temp dir or in a chosen directory.
#[derive(Debug, Clone, Default)]
pub struct Scratch {
    dir: Option<PathBuf>,
}

impl Scratch {
    /// Use the OS temporary directory.
    pub fn system() -> Self {
        Self { dir: None }
    }

    /// Use `dir` for all temporary files.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// Create a new empty temporary file. `tag` only makes the name easier to recognise.
    pub fn create(&self, tag: &str) -> io::Result<NamedTempFile> {
        let mut builder = Builder::new();
        builder.prefix("tzip-").suffix(tag);
        let file = match &self.dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        debug!("Scratch file {}", file.path().display());
        Ok(file)
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }
}
