//! Structural walk over a WL3 file.
//!
//! The walk visits the header, the auxiliary blocks, the part table and
//! every part's sub-arrays in file order, feeding geometry to the
//! [`MeshAssembler`] and a tag for every visited field to the [`TagSink`].
//! Every tagged range is bounds-checked whether or not tags are recorded, so
//! the choice of sink never changes the outcome of a decode.

use bon::Builder;
use rootcause::Report;
use tracing::{debug, warn};
use winnow::Parser;
use winnow::binary::be_u16;
use winnow::combinator::repeat;

use crate::data::RawFile;
use crate::data::parser_utils::{
    WResult, check_range, parse_i8_triple, parse_i16_triple, read_u16_be, slice_at,
};
use crate::error::{DecodeResult, Wl3Error};
use crate::models::mesh::{MeshAssembler, PartGeometry, Wl3Mesh};
use crate::models::revision::{FormatRevision, detect_revision};
use crate::models::tags::{NoTags, Rgb, Tag, TagLog, TagSink};
use crate::models::wl3::{Header, Part, PartTable, parse_header, parse_part, parse_part_table};

/// Colours used by the tag stream.
mod palette {
    use crate::models::tags::Rgb;

    pub const PART_TABLE: Rgb = Rgb(0x55C6C3);
    pub const UNKNOWN: Rgb = Rgb(0x906000);
    pub const UNKNOWN_ALT: Rgb = Rgb(0xF0C070);
    pub const COLITAB: Rgb = Rgb(0xF03030);
    pub const TAIL: Rgb = Rgb(0x9A1490);
    pub const VERTEX_DARK: Rgb = Rgb(0x204A87);
    pub const VERTEX_LIGHT: Rgb = Rgb(0x729FCF);
    pub const PRIM_DARK: Rgb = Rgb(0xCF5C00);
    pub const PRIM_LIGHT: Rgb = Rgb(0xFCAF3E);
    pub const NAME: Rgb = Rgb(0x5ED505);
    pub const HEADER: Rgb = Rgb(0xEFD43B);
    pub const PART_FIELD: Rgb = Rgb(0x9070E0);
    pub const PART_VECTOR: Rgb = Rgb(0x41F356);
    pub const PART_UNKNOWN: Rgb = Rgb(0x557C2A);
    pub const PART_TAIL: Rgb = Rgb(0x901090);
}

/// Per-decode configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Builder)]
pub struct DecodeOptions {
    /// Force a layout revision. `None` detects it from the file.
    pub revision: Option<FormatRevision>,
}

/// One part together with the counts read from its sub-arrays.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DecodedPart {
    pub part: Part,
    pub triangles: u32,
    pub quads: u32,
    /// Count stored at the head of the texcoord block; not used for geometry.
    pub texcoord_count: u16,
    /// Number of per-vertex normals parsed; not used for geometry.
    pub vertex_normal_count: usize,
    /// Global ordinal of the part's first vertex.
    pub vertex_base: u32,
}

/// Everything a decode produces.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DecodedModel {
    pub revision: FormatRevision,
    pub header: Header,
    pub part_table: PartTable,
    pub parts: Vec<DecodedPart>,
    pub mesh: Wl3Mesh,
}

/// Decode `raw` without recording tags.
pub fn decode(raw: &RawFile, options: &DecodeOptions) -> DecodeResult<DecodedModel> {
    decode_into(raw.bytes(), options, &mut NoTags)
}

/// Decode `raw` and return the tag stream alongside the model.
pub fn decode_with_tags(
    raw: &RawFile,
    options: &DecodeOptions,
) -> DecodeResult<(DecodedModel, Vec<Tag>)> {
    let mut log = TagLog::new();
    let model = decode_into(raw.bytes(), options, &mut log)?;
    Ok((model, log.into_tags()))
}

/// Decode `file_data`, sending tags to `tags`.
pub fn decode_into(
    file_data: &[u8],
    options: &DecodeOptions,
    tags: &mut dyn TagSink,
) -> DecodeResult<DecodedModel> {
    let header = parse_header(file_data)?;
    let part_table = parse_part_table(file_data, &header)?;
    let parts = part_table
        .part_starts
        .iter()
        .enumerate()
        .map(|(index, &start)| parse_part(file_data, index, start))
        .collect::<DecodeResult<Vec<_>>>()?;

    let revision = match options.revision {
        Some(revision) => revision,
        None => detect_revision(file_data, &parts)?,
    };
    debug!(
        "decoding '{}': {} parts, {} revision",
        header.name,
        parts.len(),
        revision
    );

    let mut walker = Walker {
        data: file_data,
        tags,
        revision,
    };
    walker.walk_header(&header)?;
    walker.walk_aux_blocks(&header)?;

    let mut assembler =
        MeshAssembler::with_capacity_within(header.num_prim, header.num_vert, file_data.len());
    let mut decoded = Vec::with_capacity(parts.len());
    for (i, part) in parts.into_iter().enumerate() {
        if i == 0 {
            walker.tag(
                part_table.start,
                part_table.size as usize,
                Rgb::BLACK,
                palette::PART_TABLE,
                "part table",
            )?;
        }
        decoded.push(walker.walk_part(part, &mut assembler)?);
    }

    check_totals(&header, &assembler)?;

    Ok(DecodedModel {
        revision,
        header,
        part_table,
        parts: decoded,
        mesh: assembler.finish(),
    })
}

fn check_totals(header: &Header, assembler: &MeshAssembler) -> DecodeResult<()> {
    let prims = assembler.primitive_count() as u64;
    let verts = assembler.vertex_base() as u64;
    if prims > header.num_prim as u64 || verts > header.num_vert as u64 {
        return Err(Report::new(Wl3Error::anomaly(
            0x14,
            format!(
                "parts hold {verts} vertices / {prims} primitives, header declares {} / {}",
                header.num_vert, header.num_prim
            ),
        )));
    }
    if prims < header.num_prim as u64 || verts < header.num_vert as u64 {
        warn!(
            "'{}': parts hold {verts} vertices / {prims} primitives, header declares {} / {}",
            header.name, header.num_vert, header.num_prim
        );
    }
    Ok(())
}

fn alternate(i: usize, even: Rgb, odd: Rgb) -> Rgb {
    if i & 1 == 1 { odd } else { even }
}

fn first_blue(i: usize) -> Rgb {
    if i == 0 { Rgb::BLUE } else { Rgb::BLACK }
}

fn parse_corner_list<const N: usize>(input: &mut &[u8], count: usize) -> WResult<Vec<[u16; N]>> {
    repeat(count, |i: &mut &[u8]| -> WResult<[u16; N]> {
        let mut corners = [0u16; N];
        for c in corners.iter_mut() {
            *c = be_u16.parse_next(i)?;
        }
        Ok(corners)
    })
    .parse_next(input)
}

struct Walker<'a, 't> {
    data: &'a [u8],
    tags: &'t mut dyn TagSink,
    revision: FormatRevision,
}

impl Walker<'_, '_> {
    fn tag(&mut self, start: usize, len: usize, fg: Rgb, bg: Rgb, label: &str) -> DecodeResult<()> {
        check_range(self.data, start, len)?;
        self.tags.emit_tag(start, len, fg, bg, label);
        Ok(())
    }

    /// Tag `count` consecutive records of `stride` bytes.
    fn tag_records(
        &mut self,
        start: usize,
        count: usize,
        stride: usize,
        color: impl Fn(usize) -> (Rgb, Rgb),
    ) -> DecodeResult<()> {
        let total = count.checked_mul(stride).ok_or_else(|| {
            Report::new(Wl3Error::anomaly(start, format!("{count} records overflow")))
        })?;
        check_range(self.data, start, total)?;
        for i in 0..count {
            let (fg, bg) = color(i);
            self.tags.emit_tag(start + i * stride, stride, fg, bg, "");
        }
        Ok(())
    }

    fn parse_at<T>(
        &self,
        offset: usize,
        len: usize,
        what: &str,
        mut parser: impl FnMut(&mut &[u8]) -> WResult<T>,
    ) -> DecodeResult<T> {
        let input = &mut slice_at(self.data, offset, len)?;
        parser(input).map_err(|e| {
            Report::new(Wl3Error::ParseError(format!("{what} at 0x{offset:X}: {e}")))
        })
    }

    fn walk_header(&mut self, header: &Header) -> DecodeResult<()> {
        let black = Rgb::BLACK;
        self.tag(0x00, 4, black, palette::PART_TABLE, "part table offset")?;
        self.tag(0x04, 4, black, palette::UNKNOWN, "unknown struct offset")?;
        self.tag(0x08, 4, black, palette::COLITAB, "colitab offset")?;
        self.tag(0x0C, 4, black, palette::TAIL, "tail offset")?;
        self.tag(0x10, 4, black, palette::PART_TABLE, "part table size")?;
        self.tag(0x14, 4, black, palette::VERTEX_DARK, "total vertex count")?;
        self.tag(0x18, 4, black, palette::PRIM_DARK, "total prim count")?;
        self.tag(Header::NAME_OFFSET, 16, black, palette::NAME, "name")?;

        let at = Header::HDR_SIZE_OFFSET;
        self.tag(at, 2, black, palette::HEADER, "header size")?;
        self.tag(at + 2, 2, black, palette::HEADER, "header objs")?;
        self.tag(
            header.extension.offset,
            header.extension.len,
            black,
            palette::HEADER,
            "header",
        )
    }

    fn walk_aux_blocks(&mut self, header: &Header) -> DecodeResult<()> {
        if header.has_unknown_block() {
            let records = (header.num_part as usize * 2).saturating_sub(1);
            self.tag_records(header.offs_unk as usize, records, 20, |i| {
                (Rgb::BLACK, alternate(i, palette::UNKNOWN_ALT, palette::UNKNOWN))
            })?;
        }

        if header.has_collision_table() {
            self.tag(
                header.offs_coli as usize,
                2,
                Rgb::BLACK,
                palette::COLITAB,
                "colitab",
            )?;
        }

        if header.has_tail() {
            let at = header.offs_tail as usize;
            let words = read_u16_be(self.data, at)? as usize;
            self.tag(at, 2, Rgb::BLACK, palette::TAIL, "tail size")?;
            self.tag(at + 2, words * 2, Rgb::BLACK, palette::TAIL, "tail")?;
        }
        Ok(())
    }

    fn walk_part_fields(&mut self, part: &Part) -> DecodeResult<()> {
        const FIELDS: [(usize, usize, Rgb, Rgb, &str); 16] = [
            (0, 4, Rgb::BLUE, palette::PART_FIELD, "part: prim indices"),
            (4, 4, Rgb::BLACK, palette::PART_FIELD, "part: vertices"),
            (8, 4, Rgb::BLACK, palette::PART_FIELD, "part: texcoords"),
            (12, 4, Rgb::BLACK, palette::PART_FIELD, "part: prim normals"),
            (16, 4, Rgb::BLACK, palette::PART_FIELD, "part: vertex normals"),
            (20, 4, Rgb::BLACK, palette::PART_FIELD, "part: prim attrs"),
            (24, 4, Rgb::BLACK, palette::VERTEX_DARK, "part: vertex count"),
            (28, 4, Rgb::BLACK, palette::PRIM_DARK, "part: prim count"),
            (32, 12, Rgb::BLACK, palette::PART_VECTOR, "part: (D,D, part scale)"),
            (44, 12, Rgb::BLACK, palette::PART_VECTOR, "part: offsets (X,Y,Z)"),
            (56, 12, Rgb::BLACK, palette::PART_VECTOR, "part: (D,D,D)"),
            (68, 4, Rgb::BLACK, palette::PART_UNKNOWN, "part: (usually 0) (?)"),
            (72, 16, Rgb::BLACK, palette::PART_UNKNOWN, "part: (W,W,D,D,D)"),
            (88, 12, Rgb::BLACK, palette::PART_FIELD, "part: texture"),
            (100, 2, Rgb::BLACK, palette::PART_TAIL, "part: tail size"),
            (102, 2, Rgb::BLACK, palette::PART_TAIL, "part: tail objs"),
        ];
        for (rel, len, fg, bg, label) in FIELDS {
            self.tag(part.start + rel, len, fg, bg, label)?;
        }
        Ok(())
    }

    /// Read the index block; returns degenerate-quad corner groups and the counts.
    fn walk_indices(&mut self, part: &Part) -> DecodeResult<(Vec<[u16; 4]>, u32, u32)> {
        let block = part.indices_at()?;
        let tri = read_u16_be(self.data, block)? as usize;
        self.tag(block, 2, Rgb::BLUE, palette::PRIM_LIGHT, "triangle count")?;

        let tri_at = block + 2;
        self.tag_records(tri_at, tri, 6, |i| {
            (Rgb::BLACK, alternate(i, palette::PRIM_DARK, palette::PRIM_LIGHT))
        })?;
        let triangles: Vec<[u16; 3]> =
            self.parse_at(tri_at, tri * 6, "triangle list", |i| parse_corner_list(i, tri))?;

        let mut quad_at = tri_at + tri * 6;
        let qua = match self.revision {
            FormatRevision::Final => {
                let qua = read_u16_be(self.data, quad_at)? as usize;
                let bg = alternate(tri, palette::PRIM_DARK, palette::PRIM_LIGHT);
                self.tag(quad_at, 2, Rgb::BLACK, bg, "quad count")?;
                quad_at += 2;
                if (tri + qua) as u64 != part.num_prim as u64 {
                    return Err(Report::new(Wl3Error::anomaly(
                        block,
                        format!(
                            "part[{}]: {tri} triangles + {qua} quads != {} primitives",
                            part.index, part.num_prim
                        ),
                    )));
                }
                qua
            }
            FormatRevision::Early => {
                (part.num_prim as usize).checked_sub(tri).ok_or_else(|| {
                    Report::new(Wl3Error::anomaly(
                        block,
                        format!(
                            "part[{}]: {tri} triangles exceed {} primitives",
                            part.index, part.num_prim
                        ),
                    ))
                })?
            }
        };

        self.tag_records(quad_at, qua, 8, |i| {
            (Rgb::BLACK, alternate(tri + i, palette::PRIM_LIGHT, palette::PRIM_DARK))
        })?;
        let quads: Vec<[u16; 4]> =
            self.parse_at(quad_at, qua * 8, "quad list", |i| parse_corner_list(i, qua))?;

        let corners = triangles
            .iter()
            .map(|t| [t[0] >> 1, t[1] >> 1, t[2] >> 1, t[2] >> 1])
            .chain(quads.iter().map(|q| [q[0] >> 1, q[1] >> 1, q[2] >> 1, q[3] >> 1]))
            .collect();
        Ok((corners, tri as u32, qua as u32))
    }

    fn walk_part(&mut self, part: Part, assembler: &mut MeshAssembler) -> DecodeResult<DecodedPart> {
        self.walk_part_fields(&part)?;

        let (corners, tri, qua) = self.walk_indices(&part)?;
        let prims = corners.len();
        let num_vert = part.num_vert as usize;

        if num_vert > 0 && part.transform[0] == 0 {
            return Err(Report::new(Wl3Error::anomaly(
                part.start + 0x28,
                format!("part[{}] has vertices but a zero scale", part.index),
            )));
        }
        if let Some(bad) = corners.iter().flatten().find(|&&c| c as usize >= num_vert) {
            return Err(Report::new(Wl3Error::anomaly(
                part.indices_at()?,
                format!(
                    "part[{}] references vertex {bad} but has {num_vert}",
                    part.index
                ),
            )));
        }

        let verts_at = part.vertices_at()?;
        self.tag_records(verts_at, num_vert, 6, |i| {
            (first_blue(i), alternate(i, palette::VERTEX_LIGHT, palette::VERTEX_DARK))
        })?;
        let vertices: Vec<[i16; 3]> = self.parse_at(verts_at, num_vert * 6, "vertices", |i| {
            repeat(num_vert, parse_i16_triple).parse_next(i)
        })?;

        let tex_at = part.texcoords_at()?;
        let texcoord_count = read_u16_be(self.data, tex_at)?;
        self.tag(tex_at, 2, Rgb::BLUE, palette::PRIM_LIGHT, "texcoord count, never used")?;
        self.tag_records(tex_at + 2, prims, 4, |i| {
            (Rgb::BLACK, alternate(i, palette::PRIM_DARK, palette::PRIM_LIGHT))
        })?;

        let pnrm_at = part.prim_normals_at()?;
        self.tag_records(pnrm_at, prims, 3, |i| {
            (first_blue(i), alternate(i, palette::VERTEX_LIGHT, palette::VERTEX_DARK))
        })?;
        let normals: Vec<[i8; 3]> = self.parse_at(pnrm_at, prims * 3, "prim normals", |i| {
            repeat(prims, parse_i8_triple).parse_next(i)
        })?;

        let vnrm_at = part.vertex_normals_at()?;
        let vertex_normal_count = tri as usize * 3 + qua as usize * 4;
        self.tag_records(vnrm_at, vertex_normal_count, 3, |i| {
            (first_blue(i), alternate(i, palette::VERTEX_LIGHT, palette::VERTEX_DARK))
        })?;
        let _vertex_normals: Vec<[i8; 3]> =
            self.parse_at(vnrm_at, vertex_normal_count * 3, "vertex normals", |i| {
                repeat(vertex_normal_count, parse_i8_triple).parse_next(i)
            })?;

        let attr_at = part.attributes_at()?;
        self.tag_records(attr_at, prims, 2, |i| {
            (first_blue(i), alternate(i, palette::PRIM_DARK, palette::PRIM_LIGHT))
        })?;
        let attributes: Vec<u16> = self.parse_at(attr_at, prims * 2, "prim attrs", |i| {
            repeat(prims, be_u16).parse_next(i)
        })?;

        debug!(
            "part[{}] at 0x{:X}: {tri} triangles, {qua} quads, {num_vert} vertices, texture '{}'",
            part.index, part.start, part.texture
        );

        let vertex_base = assembler.vertex_base();
        assembler.push_part(&PartGeometry {
            origin: part.start,
            corners: &corners,
            vertices: &vertices,
            transform: part.transform,
            normals: &normals,
            attributes: &attributes,
        })?;

        Ok(DecodedPart {
            part,
            triangles: tri,
            quads: qua,
            texcoord_count,
            vertex_normal_count,
            vertex_base,
        })
    }
}
