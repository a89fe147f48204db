/// Bounds-checked big-endian readers shared by every parser
pub mod parser_utils;

use std::fs;
use std::path::{Path, PathBuf};

use rootcause::Report;
use tracing::debug;

use crate::error::{DecodeResult, Wl3Error};

/// A whole WL3 file held in memory.
///
/// The buffer is the only long-lived allocation of a decode; everything the
/// parsers derive from it refers back by absolute byte offset.
#[derive(Debug, Clone)]
pub struct RawFile {
    path: Option<PathBuf>,
    bytes: Vec<u8>,
}

impl RawFile {
    /// Read the entire file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> DecodeResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| {
            Report::new(Wl3Error::SourceUnavailable {
                path: path.to_owned(),
                source,
            })
        })?;
        debug!("loaded {} ({} bytes)", path.display(), bytes.len());
        Ok(Self {
            path: Some(path.to_owned()),
            bytes,
        })
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { path: None, bytes }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
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

impl AsRef<[u8]> for RawFile {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<Vec<u8>> for RawFile {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_bytes(bytes)
    }
}
