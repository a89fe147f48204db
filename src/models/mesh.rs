//! Assembly of decoded parts into one renderer-ready mesh.
//!
//! Every primitive becomes a 4-corner group. Triangles repeat their last
//! corner (`v0, v1, v2, v2`). Positions and normals are stored per corner;
//! colours are scattered into a sparse per-vertex array at each primitive's
//! fourth corner.

use rootcause::Report;

use crate::error::{DecodeResult, Wl3Error};
use crate::models::fixed_point::{face_normal, transform_position, unpack_color_555};

/// Output buffers of a decode.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Wl3Mesh {
    /// Global vertex ordinals, 4 per primitive (quad topology).
    pub indices: Vec<u32>,
    /// One position per corner.
    pub positions: Vec<[f32; 3]>,
    /// Flat normal of each primitive, repeated on its 4 corners.
    pub normals: Vec<[f32; 3]>,
    /// Sparse colours indexed by global vertex ordinal; unset slots are black.
    pub colors: Vec<[f32; 3]>,
}

impl Wl3Mesh {
    pub fn primitive_count(&self) -> usize {
        self.indices.len() / 4
    }

    /// Corner groups as `[v0, v1, v2, v3]`.
    pub fn quads(&self) -> impl Iterator<Item = [u32; 4]> + '_ {
        self.indices
            .chunks_exact(4)
            .map(|c| [c[0], c[1], c[2], c[3]])
    }
}

/// Raw per-part geometry as read from the file.
#[derive(Debug, Clone, Copy)]
pub struct PartGeometry<'a> {
    /// Absolute offset of the part record, for error reporting.
    pub origin: usize,
    /// Local vertex ordinals, triangles first, already in degenerate-quad form.
    pub corners: &'a [[u16; 4]],
    pub vertices: &'a [[i16; 3]],
    pub transform: [i32; 4],
    /// One per primitive.
    pub normals: &'a [[i8; 3]],
    /// One packed 5:5:5 colour per primitive.
    pub attributes: &'a [u16],
}

fn ordinal_overflow(origin: usize) -> Report<Wl3Error> {
    Report::new(Wl3Error::anomaly(
        origin,
        "global vertex ordinal exceeds u32::MAX",
    ))
}

/// Accumulates parts in file order.
#[derive(Debug)]
pub struct MeshAssembler {
    mesh: Wl3Mesh,
    vertex_base: u32,
    max_index: Option<u32>,
}

impl MeshAssembler {
    /// Reserve room for the header-declared totals. These are upper bounds, not occupancy.
    pub fn with_capacity(num_prim: u32, num_vert: u32) -> Self {
        Self::with_capacity_within(num_prim, num_vert, usize::MAX)
    }

    /// Like [`with_capacity`](Self::with_capacity), for a file of `file_len` bytes.
    ///
    /// Every primitive owns at least a 2-byte attribute and every vertex a
    /// 6-byte position, so declared totals beyond that are clamped.
    pub fn with_capacity_within(num_prim: u32, num_vert: u32, file_len: usize) -> Self {
        let prims = (num_prim as usize).min(file_len / 2);
        let verts = (num_vert as usize).min(file_len / 6);
        let corners = prims.saturating_mul(4);
        Self {
            mesh: Wl3Mesh {
                indices: Vec::with_capacity(corners),
                positions: Vec::with_capacity(corners),
                normals: Vec::with_capacity(corners),
                colors: Vec::with_capacity(verts),
            },
            vertex_base: 0,
            max_index: None,
        }
    }

    /// Number of vertices consumed by the parts pushed so far.
    pub fn vertex_base(&self) -> u32 {
        self.vertex_base
    }

    pub fn primitive_count(&self) -> usize {
        self.mesh.primitive_count()
    }

    pub fn push_part(&mut self, part: &PartGeometry<'_>) -> DecodeResult<()> {
        let prims = part.corners.len();
        if part.normals.len() != prims || part.attributes.len() != prims {
            return Err(Report::new(Wl3Error::anomaly(
                part.origin,
                format!(
                    "{prims} primitives but {} normals and {} attributes",
                    part.normals.len(),
                    part.attributes.len()
                ),
            )));
        }

        for (prim, corners) in part.corners.iter().enumerate() {
            let normal = face_normal(part.normals[prim]);
            let mut global = [0u32; 4];
            for (slot, &local) in global.iter_mut().zip(corners.iter()) {
                let raw = part.vertices.get(local as usize).copied().ok_or_else(|| {
                    Report::new(Wl3Error::anomaly(
                        part.origin,
                        format!(
                            "primitive {prim} references vertex {local} of {}",
                            part.vertices.len()
                        ),
                    ))
                })?;
                *slot = self
                    .vertex_base
                    .checked_add(local as u32)
                    .ok_or_else(|| ordinal_overflow(part.origin))?;
                self.mesh.indices.push(*slot);
                self.mesh.positions.push(transform_position(raw, part.transform));
                self.mesh.normals.push(normal);
            }

            let target = global[3] as usize;
            if target >= self.mesh.colors.len() {
                self.mesh.colors.resize(target + 1, [0.0; 3]);
            }
            self.mesh.colors[target] = unpack_color_555(part.attributes[prim]);

            let part_max = global.iter().copied().max().unwrap_or_default();
            self.max_index = Some(self.max_index.map_or(part_max, |m| m.max(part_max)));
        }

        self.vertex_base = u32::try_from(part.vertices.len())
            .ok()
            .and_then(|n| self.vertex_base.checked_add(n))
            .ok_or_else(|| ordinal_overflow(part.origin))?;
        Ok(())
    }

    pub fn finish(mut self) -> Wl3Mesh {
        if let Some(max) = self.max_index {
            let len = max as usize + 1;
            if self.mesh.colors.len() < len {
                self.mesh.colors.resize(len, [0.0; 3]);
            }
        }
        self.mesh
    }
}
