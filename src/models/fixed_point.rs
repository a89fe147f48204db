//! Fixed-point decoders for WL3 vector and colour encodings.
//!
//! All vector decoders share the same axis convention: X is kept, Y and Z
//! are negated.

/// Divisor for 16-bit signed components.
const I16_ONE: f32 = 0x7FFF as f32;
/// Divisor for 8-bit signed components.
const I8_ONE: f32 = 0x7F as f32;
/// Divisor for 5-bit colour channels.
const CHANNEL_MAX: f32 = 0x1F as f32;
/// Denominator of the per-part position scale factor.
const PART_SCALE_ONE: f32 = 0x7FFFF as f32;

/// Decode a part transform `[scale, x, y, z]` into a translation.
///
/// The normalization is `0.5 / scale`, not `1 / scale`.
pub fn vec3_from_i32_header(raw: [i32; 4]) -> [f32; 3] {
    let [scale, x, y, z] = raw;
    let s = 0.5 / scale as f32;
    [s * x as f32, -s * y as f32, -s * z as f32]
}

/// Decode a raw vertex position.
pub fn vec3_from_i16(raw: [i16; 3]) -> [f32; 3] {
    [
        raw[0] as f32 / I16_ONE,
        -(raw[1] as f32) / I16_ONE,
        -(raw[2] as f32) / I16_ONE,
    ]
}

/// Decode a raw per-primitive normal. The result is not guaranteed to be unit length.
pub fn vec3_from_i8(raw: [i8; 3]) -> [f32; 3] {
    [
        raw[0] as f32 / I8_ONE,
        -(raw[1] as f32) / I8_ONE,
        -(raw[2] as f32) / I8_ONE,
    ]
}

/// Unpack a 5:5:5 colour (`[10:14]` red, `[5:9]` green, `[0:4]` blue) into `[0, 1]` RGB.
///
/// Bit 15 is ignored.
pub fn unpack_color_555(packed: u16) -> [f32; 3] {
    [
        ((packed >> 10) & 0x1F) as f32 / CHANNEL_MAX,
        ((packed >> 5) & 0x1F) as f32 / CHANNEL_MAX,
        (packed & 0x1F) as f32 / CHANNEL_MAX,
    ]
}

/// Scale factor applied after translation: `scale / 0x7FFFF`.
pub fn part_scale(raw: [i32; 4]) -> f32 {
    raw[0] as f32 / PART_SCALE_ONE
}

/// Transform a raw vertex into model space using its part's transform.
pub fn transform_position(raw: [i16; 3], transform: [i32; 4]) -> [f32; 3] {
    let v = vec3_from_i16(raw);
    let plus = vec3_from_i32_header(transform);
    let scale = part_scale(transform);
    [
        (v[0] + plus[0]) * scale,
        (v[1] + plus[1]) * scale,
        (v[2] + plus[2]) * scale,
    ]
}

/// Decode a flat face normal: negated, then normalized. A zero vector stays zero.
pub fn face_normal(raw: [i8; 3]) -> [f32; 3] {
    let n = vec3_from_i8(raw);
    let n = [-n[0], -n[1], -n[2]];
    let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if len > 0.0 && len.is_finite() {
        [n[0] / len, n[1] / len, n[2] / len]
    } else {
        [0.0; 3]
    }
}
