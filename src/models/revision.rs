//! WL3 layout revisions and the deterministic check that tells them apart.
//!
//! The two known revisions differ only in the primitive index block:
//!
//! - [`FormatRevision::Early`]: `u16 tri`, `tri` triangles, then
//!   `num_prim - tri` quads with no count field.
//! - [`FormatRevision::Final`]: `u16 tri`, `tri` triangles, `u16 quad`, `quad` quads.
//!
//! Files carry no version marker. Detection looks at the `u16` right after
//! each part's triangle list. In a final-revision file it equals
//! `num_prim - tri`; in an early-revision file it is the first quad index,
//! which can hold the same value by coincidence. A match is only taken as
//! final-revision evidence when reading the index block the early way would
//! produce an out-of-range or odd index. Parts made only of triangles decode
//! identically under both revisions and abstain. Mixed or inconclusive
//! evidence fails closed.

use std::fmt;
use std::str::FromStr;

use rootcause::Report;
use tracing::debug;

use crate::data::parser_utils::read_u16_be;
use crate::error::{DecodeResult, Wl3Error};
use crate::models::wl3::Part;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum FormatRevision {
    /// Quad count inferred from the part's primitive count.
    Early,
    /// Quad count stored explicitly.
    Final,
}

impl fmt::Display for FormatRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatRevision::Early => f.write_str("early"),
            FormatRevision::Final => f.write_str("final"),
        }
    }
}

impl FromStr for FormatRevision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "early" => Ok(FormatRevision::Early),
            "final" => Ok(FormatRevision::Final),
            other => Err(format!("unknown format revision `{other}`")),
        }
    }
}

/// Per-part revision evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evidence {
    Final,
    Early,
    /// Both layouts read as valid index blocks.
    Inconclusive,
    Abstain,
}

/// Whether `words` big-endian `u16`s at `at` are all valid vertex byte offsets.
fn indices_valid(file_data: &[u8], at: usize, words: usize, num_vert: u32) -> bool {
    let Some(block) = words
        .checked_mul(2)
        .and_then(|len| at.checked_add(len).map(|end| (at, end)))
        .and_then(|(at, end)| file_data.get(at..end))
    else {
        return false;
    };
    block.chunks_exact(2).all(|w| {
        let index = u16::from_be_bytes([w[0], w[1]]) as u32;
        index & 1 == 0 && (index >> 1) < num_vert
    })
}

/// Read the evidence one part provides.
pub fn part_evidence(file_data: &[u8], part: &Part) -> DecodeResult<Evidence> {
    let block = part.indices_at()?;
    let tri = read_u16_be(file_data, block)? as u32;
    if tri > part.num_prim {
        return Err(Report::new(Wl3Error::anomaly(
            block,
            format!(
                "part[{}] declares {tri} triangles but only {} primitives",
                part.index, part.num_prim
            ),
        )));
    }
    if tri == part.num_prim {
        return Ok(Evidence::Abstain);
    }

    let quads = part.num_prim - tri;
    let after = block + 2 + tri as usize * 6;
    let field = read_u16_be(file_data, after)? as u32;
    if field != quads {
        return Ok(Evidence::Early);
    }

    let words = quads as usize * 4;
    let as_early = indices_valid(file_data, after, words, part.num_vert);
    let as_final = indices_valid(file_data, after + 2, words, part.num_vert);
    Ok(match (as_final, as_early) {
        (true, false) => Evidence::Final,
        (false, true) => Evidence::Early,
        _ => Evidence::Inconclusive,
    })
}

/// Decide the revision of a file from its parts.
pub fn detect_revision(file_data: &[u8], parts: &[Part]) -> DecodeResult<FormatRevision> {
    let mut finals = 0usize;
    let mut earlies = 0usize;
    let mut inconclusive = 0usize;
    for part in parts {
        match part_evidence(file_data, part)? {
            Evidence::Final => finals += 1,
            Evidence::Early => earlies += 1,
            Evidence::Inconclusive => inconclusive += 1,
            Evidence::Abstain => {}
        }
    }
    debug!("revision evidence: {finals} final, {earlies} early, {inconclusive} inconclusive");

    match (finals, earlies, inconclusive) {
        (0, 0, 0) => Ok(FormatRevision::Final),
        (_, 0, _) if finals > 0 => Ok(FormatRevision::Final),
        (0, _, _) if earlies > 0 => Ok(FormatRevision::Early),
        (0, 0, _) => Err(Report::new(Wl3Error::AmbiguousRevision {
            detail: format!(
                "{inconclusive} parts read as valid index blocks under both layouts"
            ),
        })),
        _ => Err(Report::new(Wl3Error::AmbiguousRevision {
            detail: format!(
                "{finals} parts look like the final layout and {earlies} like the early one"
            ),
        })),
    }
}
