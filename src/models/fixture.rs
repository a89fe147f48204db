//! Synthetic WL3 files for tests.
//!
//! Layout produced by [`ModelFixture::build`]:
//! header, header extension, optional unknown block, optional colitab,
//! part table, the last part (which the table does not list), the other
//! parts, optional tail.

use crate::models::revision::FormatRevision;
use crate::models::wl3::Part;

const PART_SIZE: usize = Part::SIZE;

fn put_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn put_i32(out: &mut Vec<u8>, v: i32) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn set_u32(out: &mut [u8], at: usize, v: u32) {
    out[at..at + 4].copy_from_slice(&v.to_be_bytes());
}

fn pad4(out: &mut Vec<u8>) {
    while out.len() % 4 != 0 {
        out.push(0);
    }
}

fn put_fixed_str(out: &mut Vec<u8>, s: &str, width: usize) {
    let mut bytes = s.as_bytes().to_vec();
    bytes.resize(width, 0);
    out.extend_from_slice(&bytes);
}

#[derive(Debug, Clone)]
pub struct FixturePart {
    pub vertices: Vec<[i16; 3]>,
    /// Local vertex ordinals.
    pub triangles: Vec<[u16; 3]>,
    pub quads: Vec<[u16; 4]>,
    /// One per primitive, triangles first.
    pub normals: Vec<[i8; 3]>,
    pub attributes: Vec<u16>,
    pub transform: [i32; 4],
    pub texture: &'static str,
    /// Overrides the part's primitive count field.
    pub declared_prims: Option<u32>,
}

impl FixturePart {
    /// `n` triangles over `n + 2` vertices.
    pub fn triangle_strip(n: u16) -> Self {
        let vertices = (0..n + 2)
            .map(|i| [i as i16 * 100, (i % 2) as i16 * 100, 0])
            .collect();
        let triangles = (0..n).map(|i| [i, i + 1, i + 2]).collect();
        Self {
            vertices,
            triangles,
            quads: Vec::new(),
            normals: vec![[0, 0, 127]; n as usize],
            attributes: vec![0x7FFF; n as usize],
            transform: [0x7FFFF, 0, 0, 0],
            texture: "strip",
            declared_prims: None,
        }
    }

    /// Two triangles and one quad over five vertices.
    ///
    /// Both triangles end on vertex 2, so the second one's colour (green)
    /// overwrites the first one's (red). The quad writes blue to vertex 4.
    pub fn mixed() -> Self {
        Self {
            vertices: vec![
                [0, 0, 0],
                [0x7FFF, 0, 0],
                [0x7FFF, -0x7FFF, 0],
                [0, -0x7FFF, 0],
                [0, 0, -0x7FFF],
            ],
            triangles: vec![[0, 1, 2], [1, 3, 2]],
            quads: vec![[0, 1, 3, 4]],
            normals: vec![[0, 0, 127], [0, 127, 0], [127, 0, 0]],
            attributes: vec![0x7C00, 0x03E0, 0x001F],
            transform: [0x7FFFF, 0, 0, 0],
            texture: "mixed",
            declared_prims: None,
        }
    }

    pub fn prim_count(&self) -> u32 {
        (self.triangles.len() + self.quads.len()) as u32
    }

    fn write(&self, out: &mut Vec<u8>, revision: FormatRevision) {
        let start = out.len();
        let tri = self.triangles.len();
        let qua = self.quads.len();
        let prims = tri + qua;

        let mut body = Vec::new();
        let mut offsets = [0u32; 6];

        offsets[0] = (PART_SIZE + body.len()) as u32;
        put_u16(&mut body, tri as u16);
        for t in &self.triangles {
            for &i in t {
                put_u16(&mut body, i << 1);
            }
        }
        if revision == FormatRevision::Final {
            put_u16(&mut body, qua as u16);
        }
        for q in &self.quads {
            for &i in q {
                put_u16(&mut body, i << 1);
            }
        }
        pad4(&mut body);

        offsets[1] = (PART_SIZE + body.len()) as u32;
        for v in &self.vertices {
            for &c in v {
                body.extend_from_slice(&c.to_be_bytes());
            }
        }
        pad4(&mut body);

        offsets[2] = (PART_SIZE + body.len()) as u32;
        put_u16(&mut body, prims as u16);
        body.extend(std::iter::repeat_n(0u8, prims * 4));
        pad4(&mut body);

        offsets[3] = (PART_SIZE + body.len()) as u32;
        for n in &self.normals {
            body.extend(n.iter().map(|&c| c as u8));
        }
        pad4(&mut body);

        offsets[4] = (PART_SIZE + body.len()) as u32;
        body.extend(std::iter::repeat_n(0u8, (tri * 3 + qua * 4) * 3));
        pad4(&mut body);

        offsets[5] = (PART_SIZE + body.len()) as u32;
        for &a in &self.attributes {
            put_u16(&mut body, a);
        }
        pad4(&mut body);

        for o in offsets {
            put_u32(out, o);
        }
        put_u32(out, self.vertices.len() as u32);
        put_u32(out, self.declared_prims.unwrap_or(prims as u32));
        out.extend_from_slice(&[0xAA; 8]);
        for t in self.transform {
            put_i32(out, t);
        }
        out.extend_from_slice(&[0xBB; 12]);
        put_u32(out, 0);
        put_u16(out, 0x0C);
        put_u16(out, 0);
        out.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFE]);
        put_fixed_str(out, self.texture, 12);
        put_u16(out, 0);
        put_u16(out, 0);
        debug_assert_eq!(out.len() - start, PART_SIZE);

        out.extend_from_slice(&body);
    }
}

#[derive(Debug, Clone)]
pub struct ModelFixture {
    pub name: &'static str,
    pub parts: Vec<FixturePart>,
    pub revision: FormatRevision,
    pub declared_parts: Option<u32>,
    pub declared_prims: Option<u32>,
    pub declared_verts: Option<u32>,
    pub unknown_block: bool,
    pub collision_table: bool,
    pub tail: Option<Vec<u16>>,
}

impl ModelFixture {
    pub fn new(parts: Vec<FixturePart>) -> Self {
        Self {
            name: "fixture",
            parts,
            revision: FormatRevision::Final,
            declared_parts: None,
            declared_prims: None,
            declared_verts: None,
            unknown_block: false,
            collision_table: false,
            tail: None,
        }
    }

    pub fn single_triangle() -> Self {
        let mut part = FixturePart::triangle_strip(1);
        part.texture = "barreltex";
        let mut fixture = Self::new(vec![part]);
        fixture.name = "barrel";
        fixture
    }

    pub fn build(&self) -> Vec<u8> {
        let num_part = self.parts.len() as u32;
        let num_vert: u32 = self.parts.iter().map(|p| p.vertices.len() as u32).sum();
        let num_prim: u32 = self.parts.iter().map(FixturePart::prim_count).sum();

        let mut out = Vec::new();
        // Offsets are patched once the blocks are placed.
        for _ in 0..4 {
            put_u32(&mut out, 0);
        }
        put_u32(&mut out, self.declared_parts.unwrap_or(num_part));
        put_u32(&mut out, self.declared_verts.unwrap_or(num_vert));
        put_u32(&mut out, self.declared_prims.unwrap_or(num_prim));
        out.extend_from_slice(&[0x11; 36]);
        out.extend_from_slice(&[0x22; 12]);
        put_fixed_str(&mut out, self.name, 16);
        put_u16(&mut out, 8);
        put_u16(&mut out, 1);
        out.extend_from_slice(&[0x33; 4]);

        if self.unknown_block {
            let at = out.len() as u32;
            set_u32(&mut out, 4, at);
            let records = (num_part * 2).saturating_sub(1) as usize;
            out.extend(std::iter::repeat_n(0x44u8, records * 20));
        }

        if self.collision_table {
            let at = out.len() as u32;
            set_u32(&mut out, 8, at);
            out.extend_from_slice(&[0x55, 0x55]);
            pad4(&mut out);
        }

        let table = out.len();
        set_u32(&mut out, 0, table as u32);
        let size = num_part * 4;
        put_u32(&mut out, size);
        for _ in 1..num_part {
            put_u32(&mut out, 0);
        }

        if let Some((last, rest)) = self.parts.split_last() {
            last.write(&mut out, self.revision);
            for (i, part) in rest.iter().enumerate() {
                pad4(&mut out);
                let at = out.len() - table;
                set_u32(&mut out, table + 4 + i * 4, at as u32);
                part.write(&mut out, self.revision);
            }
        }

        if let Some(tail) = &self.tail {
            pad4(&mut out);
            let at = out.len() as u32;
            set_u32(&mut out, 12, at);
            put_u16(&mut out, tail.len() as u16);
            for &w in tail {
                put_u16(&mut out, w);
            }
        }

        out
    }
}
