use std::io;
use std::path::PathBuf;

use rootcause::Report;
use thiserror::Error;

/// Everything that can abort a WL3 decode.
///
/// Unknown fields are never an error: they are carried positionally as
/// [`ByteRange`](crate::data::parser_utils::ByteRange)s and only tagged.
#[derive(Error, Debug)]
pub enum Wl3Error {
    #[error("cannot read source file {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("read at 0x{offset:X} extends beyond file (need 0x{need:X} bytes, have 0x{have:X})")]
    OutOfBounds {
        offset: usize,
        need: usize,
        have: usize,
    },
    #[error("structural anomaly at 0x{offset:X}: {detail}")]
    StructuralAnomaly { offset: usize, detail: String },
    #[error("cannot determine format revision: {detail}")]
    AmbiguousRevision { detail: String },
    #[error("parse error: {0}")]
    ParseError(String),
}

impl Wl3Error {
    pub fn anomaly(offset: usize, detail: impl Into<String>) -> Self {
        Wl3Error::StructuralAnomaly {
            offset,
            detail: detail.into(),
        }
    }

    /// Out-of-bounds reads are structural anomalies with a dedicated shape.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Wl3Error::StructuralAnomaly { .. } | Wl3Error::OutOfBounds { .. }
        )
    }
}

pub type DecodeResult<T> = Result<T, Report<Wl3Error>>;
