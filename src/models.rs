/// Known asset names and what they contain.
pub mod catalog;
/// Fixed-point vector and packed-colour decoders.
pub mod fixed_point;
/// Output mesh buffers and the per-part assembler.
pub mod mesh;
/// Format revision detection.
pub mod revision;
/// Diagnostic byte-range tags.
pub mod tags;
/// File-order walk tying records, geometry and tags together.
pub mod walker;
/// Header, part and part table records.
pub mod wl3;

#[cfg(test)]
pub(crate) mod fixture;
