//! Shared bounds-checked big-endian readers used by the header, part and walker code.
//!
//! WL3 is stored big-endian. Every read goes through a winnow `be_*` parser
//! so the byte-order conversion happens regardless of host architecture.

use rootcause::Report;
use winnow::Parser;
use winnow::binary::{be_i16, be_i32, be_u16, be_u32, i8, u8};
use winnow::error::ContextError;

use crate::error::{DecodeResult, Wl3Error};

/// Common result type for winnow parsers.
pub type WResult<T> = Result<T, winnow::error::ErrMode<ContextError>>;

/// A positional record for a field whose meaning is unknown.
///
/// The bytes are not copied; the range is an absolute offset into the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ByteRange {
    pub offset: usize,
    pub len: usize,
}

impl ByteRange {
    pub const fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    pub const fn end(&self) -> usize {
        self.offset + self.len
    }

    /// The bytes covered by this range, if it lies within `file_data`.
    pub fn bytes<'a>(&self, file_data: &'a [u8]) -> Option<&'a [u8]> {
        file_data.get(self.offset..self.end())
    }
}

/// Resolve a relative offset: `base + rel`, failing on overflow.
pub fn resolve_relptr(base: usize, rel: u32) -> DecodeResult<usize> {
    base.checked_add(rel as usize).ok_or_else(|| {
        Report::new(Wl3Error::anomaly(
            base,
            format!("relative offset 0x{rel:X} overflows the address space"),
        ))
    })
}

/// Ensure `offset..offset + len` lies inside `file_data`.
pub fn check_range(file_data: &[u8], offset: usize, len: usize) -> DecodeResult<()> {
    match offset.checked_add(len) {
        Some(end) if end <= file_data.len() => Ok(()),
        _ => Err(Report::new(Wl3Error::OutOfBounds {
            offset,
            need: len,
            have: file_data.len().saturating_sub(offset),
        })),
    }
}

/// Borrow `len` bytes at `offset`.
pub fn slice_at(file_data: &[u8], offset: usize, len: usize) -> DecodeResult<&[u8]> {
    check_range(file_data, offset, len)?;
    Ok(&file_data[offset..offset + len])
}

fn read_with<T>(
    file_data: &[u8],
    offset: usize,
    len: usize,
    mut parser: impl FnMut(&mut &[u8]) -> WResult<T>,
) -> DecodeResult<T> {
    let input = &mut slice_at(file_data, offset, len)?;
    parser(input).map_err(|e| Report::new(Wl3Error::ParseError(format!("at 0x{offset:X}: {e}"))))
}

pub fn read_u8(file_data: &[u8], offset: usize) -> DecodeResult<u8> {
    read_with(file_data, offset, 1, |i| u8.parse_next(i))
}

pub fn read_i8(file_data: &[u8], offset: usize) -> DecodeResult<i8> {
    read_with(file_data, offset, 1, |i| i8.parse_next(i))
}

pub fn read_u16_be(file_data: &[u8], offset: usize) -> DecodeResult<u16> {
    read_with(file_data, offset, 2, |i| be_u16.parse_next(i))
}

pub fn read_i16_be(file_data: &[u8], offset: usize) -> DecodeResult<i16> {
    read_with(file_data, offset, 2, |i| be_i16.parse_next(i))
}

pub fn read_u32_be(file_data: &[u8], offset: usize) -> DecodeResult<u32> {
    read_with(file_data, offset, 4, |i| be_u32.parse_next(i))
}

pub fn read_i32_be(file_data: &[u8], offset: usize) -> DecodeResult<i32> {
    read_with(file_data, offset, 4, |i| be_i32.parse_next(i))
}

/// Parse three consecutive big-endian `i16`s.
pub fn parse_i16_triple(input: &mut &[u8]) -> WResult<[i16; 3]> {
    Ok([
        be_i16.parse_next(input)?,
        be_i16.parse_next(input)?,
        be_i16.parse_next(input)?,
    ])
}

/// Parse three consecutive `i8`s.
pub fn parse_i8_triple(input: &mut &[u8]) -> WResult<[i8; 3]> {
    Ok([
        i8.parse_next(input)?,
        i8.parse_next(input)?,
        i8.parse_next(input)?,
    ])
}

/// Decode a fixed-width, NUL-padded ASCII field.
pub fn fixed_string(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
