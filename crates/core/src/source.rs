//! File access: turn a path into an owned program image.
//!
//! The image owns its bytes and releases them when dropped, so every return
//! path out of a classification call gives the buffer back.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use crate::classify::{detect, is_protocol_compatible, Detection};
use crate::constants::{MAX_LINE_LEN, SHEBANG};

/// Error type for loading a program image.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The file could not be read.
    #[error("Failed to read program {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file exists but has no contents to classify.
    #[error("Program {0} is empty")]
    Empty(PathBuf),
}

/// Read-only contents of an executable, loaded for a single classification.
#[derive(Debug)]
pub struct ProgramImage {
    path: PathBuf,
    bytes: Vec<u8>,
}

impl ProgramImage {
    /// Load the file at `path`.
    ///
    /// Scripts are only ever inspected within their first [`MAX_LINE_LEN`]
    /// bytes, so reading stops there once the `#!` prefix is seen. Anything
    /// else is read in full, since ELF offsets can point anywhere.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref().to_path_buf();
        let bytes = read_program(&path)
            .map_err(|source| SourceError::Io { path: path.clone(), source })?;
        if bytes.is_empty() {
            return Err(SourceError::Empty(path));
        }
        Ok(Self { path, bytes })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn read_program(path: &Path) -> io::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut bytes = Vec::new();
    file.by_ref().take(SHEBANG.len() as u64).read_to_end(&mut bytes)?;
    if bytes.starts_with(SHEBANG) {
        file.take((MAX_LINE_LEN - bytes.len()) as u64).read_to_end(&mut bytes)?;
    } else {
        file.read_to_end(&mut bytes)?;
    }
    Ok(bytes)
}

/// Load and classify the program at `path`, keeping the reason.
pub fn detect_path(path: impl AsRef<Path>) -> Result<Detection, SourceError> {
    let image = ProgramImage::open(path)?;
    Ok(detect(image.bytes()))
}

/// Return `true` if the program at `path` is dgsh-compatible.
///
/// Files that cannot be opened, or are empty, are simply not compatible.
pub fn is_dgsh_program(path: impl AsRef<Path>) -> bool {
    match ProgramImage::open(path) {
        Ok(image) => is_protocol_compatible(image.bytes()),
        Err(err) => {
            debug!("{err}");
            false
        }
    }
}
