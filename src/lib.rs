//! Decoder for `.wl3` model files, with a byte-accurate annotation stream for
//! reverse engineering the format in wxHexEditor.
//!
//! ```no_run
//! use wl3kit::data::RawFile;
//! use wl3kit::models::walker::{DecodeOptions, decode};
//!
//! let raw = RawFile::open("ebike/ebike.wl3")?;
//! let model = decode(&raw, &DecodeOptions::default())?;
//! println!("{} primitives", model.mesh.primitive_count());
//! # Ok::<(), rootcause::Report<wl3kit::error::Wl3Error>>(())
//! ```

/// Loading files and reading big-endian fields from them
pub mod data;
/// Error definitions
pub mod error;
/// Writers for decode results (hex-editor tags, JSON)
pub mod export;
/// The WL3 model format
pub mod models;

pub use data::RawFile;
pub use error::{DecodeResult, Wl3Error};
pub use models::mesh::Wl3Mesh;
pub use models::revision::FormatRevision;
pub use models::tags::{NoTags, Tag, TagLog, TagSink};
pub use models::walker::{DecodeOptions, DecodedModel, decode, decode_into, decode_with_tags};
