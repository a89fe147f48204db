use std::io;

use thiserror::Error;

pub mod hex_tags;
#[cfg(feature = "json")]
pub mod json;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
    #[error("failed to write XML: {0}")]
    Xml(String),
    #[cfg(feature = "json")]
    #[error("failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
}
