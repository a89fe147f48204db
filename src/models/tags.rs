//! Diagnostic byte-range tags describing every field the walker visits.
//!
//! A [`TagSink`] is handed to the walker by the caller. [`TagLog`] records
//! tags with ids counting up from 0; [`NoTags`] drops them.

use std::fmt;

/// A 24-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Rgb(pub u32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0x000000);
    pub const BLUE: Rgb = Rgb(0x0000FF);

    pub const fn value(self) -> u32 {
        self.0 & 0xFF_FFFF
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.value())
    }
}

/// One annotated byte range.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Tag {
    pub id: u64,
    /// Absolute offset of the first byte.
    pub start: usize,
    /// Number of bytes covered; never zero.
    pub len: usize,
    pub label: String,
    pub foreground: Rgb,
    pub background: Rgb,
}

impl Tag {
    /// Absolute offset of the last covered byte.
    pub fn end_inclusive(&self) -> usize {
        self.start + self.len.saturating_sub(1)
    }
}

/// Receiver for diagnostic tags. Never consulted by the decoder.
pub trait TagSink {
    fn emit_tag(&mut self, start: usize, len: usize, foreground: Rgb, background: Rgb, label: &str);
}

/// Discards every tag.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTags;

impl TagSink for NoTags {
    fn emit_tag(&mut self, _: usize, _: usize, _: Rgb, _: Rgb, _: &str) {}
}

/// Collects tags in emission order.
#[derive(Debug, Default, Clone)]
pub struct TagLog {
    next_id: u64,
    tags: Vec<Tag>,
}

impl TagLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn into_tags(self) -> Vec<Tag> {
        self.tags
    }
}

impl TagSink for TagLog {
    fn emit_tag(&mut self, start: usize, len: usize, foreground: Rgb, background: Rgb, label: &str) {
        // Empty ranges have no representation in the annotation format.
        if len == 0 {
            return;
        }
        self.tags.push(Tag {
            id: self.next_id,
            start,
            len,
            label: label.to_owned(),
            foreground,
            background,
        });
        self.next_id += 1;
    }
}
