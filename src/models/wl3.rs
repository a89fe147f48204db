//! Fixed-layout records of a `.wl3` model file.
//!
//! Layout (all fields big-endian):
//! ```text
//! Header @ 0x00 (0x60 bytes + extension)
//!   0x00 offs_part   u32   Part Offset Table
//!   0x04 offs_unk    u32   (W,W,D,D,D,D) block, purpose unknown, 0 = absent
//!   0x08 offs_coli   u32   "colitab", purpose unknown, 0 = absent
//!   0x0C offs_tail   u32   trailing u16 array, 0 = absent
//!   0x10 num_part    u32
//!   0x14 num_vert    u32
//!   0x18 num_prim    u32
//!   0x1C unknown     36 bytes
//!   0x40 unknown     12 bytes
//!   0x4C name        16 bytes ASCII
//!   0x5C hdr_size    u16   counted from 0x5C
//!   0x5E hdr_objs    u16
//!   0x60 extension   hdr_size - 4 bytes
//!
//! Part (0x68 bytes), offsets relative to the part start
//!   0x00..0x18  six u32 sub-array offsets
//!   0x18 num_vert    u32
//!   0x1C num_prim    u32
//!   0x20 unknown     8 bytes
//!   0x28 transform   [scale, x, y, z] i32
//!   0x38 unknown     12 bytes
//!   0x44 unknown     4 bytes (usually 0)
//!   0x48 unknown     16 bytes (W,W,D,D,D)
//!   0x58 texture     12 bytes ASCII
//!   0x64 part_size   u16
//!   0x66 part_objs   u16
//! ```

use rootcause::Report;
use tracing::warn;
use winnow::Parser;
use winnow::binary::{be_i32, be_u16, be_u32};
use winnow::token::take;

use crate::data::parser_utils::{
    ByteRange, WResult, check_range, fixed_string, read_u32_be, resolve_relptr,
};
use crate::error::{DecodeResult, Wl3Error};

/// Main header of a WL3 file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Header {
    pub offs_part: u32,
    pub offs_unk: u32,
    pub offs_coli: u32,
    pub offs_tail: u32,
    /// Declared number of parts.
    pub num_part: u32,
    /// Declared total vertex count.
    pub num_vert: u32,
    /// Declared total primitive count.
    pub num_prim: u32,
    pub unknown1: ByteRange,
    pub unknown2: ByteRange,
    pub name: String,
    /// Size of the remainder of the header, counted from the size field itself.
    pub hdr_size: u16,
    pub hdr_objs: u16,
    pub extension: ByteRange,
}

impl Header {
    pub const SIZE: usize = 0x60;
    pub const NAME_OFFSET: usize = 0x4C;
    pub const HDR_SIZE_OFFSET: usize = 0x5C;

    pub fn has_unknown_block(&self) -> bool {
        self.offs_unk != 0
    }

    pub fn has_collision_table(&self) -> bool {
        self.offs_coli != 0
    }

    pub fn has_tail(&self) -> bool {
        self.offs_tail != 0
    }
}

struct HeaderFields<'a> {
    offs_part: u32,
    offs_unk: u32,
    offs_coli: u32,
    offs_tail: u32,
    num_part: u32,
    num_vert: u32,
    num_prim: u32,
    name: &'a [u8],
    hdr_size: u16,
    hdr_objs: u16,
}

fn parse_header_fields<'a>(input: &mut &'a [u8]) -> WResult<HeaderFields<'a>> {
    let offs_part = be_u32.parse_next(input)?;
    let offs_unk = be_u32.parse_next(input)?;
    let offs_coli = be_u32.parse_next(input)?;
    let offs_tail = be_u32.parse_next(input)?;
    let num_part = be_u32.parse_next(input)?;
    let num_vert = be_u32.parse_next(input)?;
    let num_prim = be_u32.parse_next(input)?;
    let _unknown1: &[u8] = take(36usize).parse_next(input)?;
    let _unknown2: &[u8] = take(12usize).parse_next(input)?;
    let name: &[u8] = take(16usize).parse_next(input)?;
    let hdr_size = be_u16.parse_next(input)?;
    let hdr_objs = be_u16.parse_next(input)?;
    Ok(HeaderFields {
        offs_part,
        offs_unk,
        offs_coli,
        offs_tail,
        num_part,
        num_vert,
        num_prim,
        name,
        hdr_size,
        hdr_objs,
    })
}

/// Parse the header at offset 0, including the bounds of its extension.
pub fn parse_header(file_data: &[u8]) -> DecodeResult<Header> {
    check_range(file_data, 0, Header::SIZE)?;

    let input = &mut &file_data[..];
    let fields = parse_header_fields(input)
        .map_err(|e| Report::new(Wl3Error::ParseError(format!("header: {e}"))))?;

    if fields.hdr_size < 4 {
        warn!(
            "header size field is 0x{:X}, smaller than its own size/objs pair",
            fields.hdr_size
        );
    }
    let extension = ByteRange::new(Header::SIZE, (fields.hdr_size as usize).saturating_sub(4));
    check_range(file_data, extension.offset, extension.len)?;

    Ok(Header {
        offs_part: fields.offs_part,
        offs_unk: fields.offs_unk,
        offs_coli: fields.offs_coli,
        offs_tail: fields.offs_tail,
        num_part: fields.num_part,
        num_vert: fields.num_vert,
        num_prim: fields.num_prim,
        unknown1: ByteRange::new(0x1C, 36),
        unknown2: ByteRange::new(0x40, 12),
        name: fixed_string(fields.name),
        hdr_size: fields.hdr_size,
        hdr_objs: fields.hdr_objs,
        extension,
    })
}

/// One mesh chunk with its own sub-arrays and transform.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Part {
    /// Position in the part table.
    pub index: usize,
    /// Absolute offset of the record; all `offs_*` fields are relative to it.
    pub start: usize,
    pub offs_indices: u32,
    pub offs_vertices: u32,
    pub offs_texcoords: u32,
    pub offs_prim_normals: u32,
    pub offs_vertex_normals: u32,
    pub offs_attributes: u32,
    pub num_vert: u32,
    pub num_prim: u32,
    pub unknown1: ByteRange,
    /// `[scale, x, y, z]`
    pub transform: [i32; 4],
    pub unknown2: ByteRange,
    pub unknown3: ByteRange,
    pub unknown4: ByteRange,
    pub texture: String,
    pub part_size: u16,
    pub part_objs: u16,
}

impl Part {
    pub const SIZE: usize = 0x68;

    pub fn indices_at(&self) -> DecodeResult<usize> {
        resolve_relptr(self.start, self.offs_indices)
    }

    pub fn vertices_at(&self) -> DecodeResult<usize> {
        resolve_relptr(self.start, self.offs_vertices)
    }

    pub fn texcoords_at(&self) -> DecodeResult<usize> {
        resolve_relptr(self.start, self.offs_texcoords)
    }

    pub fn prim_normals_at(&self) -> DecodeResult<usize> {
        resolve_relptr(self.start, self.offs_prim_normals)
    }

    pub fn vertex_normals_at(&self) -> DecodeResult<usize> {
        resolve_relptr(self.start, self.offs_vertex_normals)
    }

    pub fn attributes_at(&self) -> DecodeResult<usize> {
        resolve_relptr(self.start, self.offs_attributes)
    }
}

struct PartFields<'a> {
    offsets: [u32; 6],
    num_vert: u32,
    num_prim: u32,
    transform: [i32; 4],
    texture: &'a [u8],
    part_size: u16,
    part_objs: u16,
}

fn parse_part_fields<'a>(input: &mut &'a [u8]) -> WResult<PartFields<'a>> {
    let mut offsets = [0u32; 6];
    for offset in offsets.iter_mut() {
        *offset = be_u32.parse_next(input)?;
    }
    let num_vert = be_u32.parse_next(input)?;
    let num_prim = be_u32.parse_next(input)?;
    let _unknown1: &[u8] = take(8usize).parse_next(input)?;
    let transform = [
        be_i32.parse_next(input)?,
        be_i32.parse_next(input)?,
        be_i32.parse_next(input)?,
        be_i32.parse_next(input)?,
    ];
    let _unknown2: &[u8] = take(12usize).parse_next(input)?;
    let _unknown3: &[u8] = take(4usize).parse_next(input)?;
    let _unknown4: &[u8] = take(16usize).parse_next(input)?;
    let texture: &[u8] = take(12usize).parse_next(input)?;
    let part_size = be_u16.parse_next(input)?;
    let part_objs = be_u16.parse_next(input)?;
    Ok(PartFields {
        offsets,
        num_vert,
        num_prim,
        transform,
        texture,
        part_size,
        part_objs,
    })
}

/// Parse the fixed fields of the part record at absolute offset `start`.
pub fn parse_part(file_data: &[u8], index: usize, start: usize) -> DecodeResult<Part> {
    check_range(file_data, start, Part::SIZE)?;

    let input = &mut &file_data[start..start + Part::SIZE];
    let fields = parse_part_fields(input).map_err(|e| {
        Report::new(Wl3Error::ParseError(format!("part[{index}] at 0x{start:X}: {e}")))
    })?;
    let [
        offs_indices,
        offs_vertices,
        offs_texcoords,
        offs_prim_normals,
        offs_vertex_normals,
        offs_attributes,
    ] = fields.offsets;

    Ok(Part {
        index,
        start,
        offs_indices,
        offs_vertices,
        offs_texcoords,
        offs_prim_normals,
        offs_vertex_normals,
        offs_attributes,
        num_vert: fields.num_vert,
        num_prim: fields.num_prim,
        unknown1: ByteRange::new(start + 0x20, 8),
        transform: fields.transform,
        unknown2: ByteRange::new(start + 0x38, 12),
        unknown3: ByteRange::new(start + 0x44, 4),
        unknown4: ByteRange::new(start + 0x48, 16),
        texture: fixed_string(fields.texture),
        part_size: fields.part_size,
        part_objs: fields.part_objs,
    })
}

/// Part Offset Table: a size prefix `S` followed by `S/4 - 1` sub-offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PartTable {
    pub start: usize,
    pub size: u32,
    /// Absolute start of every part, in table order.
    pub part_starts: Vec<usize>,
}

/// Resolve every part start from the table at `offs_part`.
///
/// The last part is not listed; it sits right after the offset vector, at
/// table start + `S`. A zero-sized table holds no parts.
pub fn parse_part_table(file_data: &[u8], header: &Header) -> DecodeResult<PartTable> {
    let start = header.offs_part as usize;
    let size = read_u32_be(file_data, start)?;

    if size % 4 != 0 {
        return Err(Report::new(Wl3Error::anomaly(
            start,
            format!("part table size 0x{size:X} is not a multiple of 4"),
        )));
    }
    check_range(file_data, start, size as usize)?;

    let resolved = size as usize / 4;
    if resolved != header.num_part as usize {
        return Err(Report::new(Wl3Error::anomaly(
            start,
            format!(
                "part table resolves {resolved} parts but the header declares {}",
                header.num_part
            ),
        )));
    }

    let mut part_starts = Vec::with_capacity(resolved);
    for slot in (4..=size).step_by(4) {
        let rel = if slot == size {
            size
        } else {
            read_u32_be(file_data, start + slot as usize)?
        };
        part_starts.push(resolve_relptr(start, rel)?);
    }

    Ok(PartTable {
        start,
        size,
        part_starts,
    })
}
