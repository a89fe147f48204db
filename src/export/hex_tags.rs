//! wxHexEditor tag files.
//!
//! wxHexEditor loads `<file>.tags` next to the opened file and paints every
//! `<TAG>` as a coloured note over its byte range.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use rootcause::Report;

use crate::export::ExportError;
use crate::models::tags::Tag;

const ROOT: &str = "wxHexEditor_XML_TAG";

fn write_event<W: Write>(
    xml: &mut Writer<W>,
    event: Event<'_>,
) -> Result<(), Report<ExportError>> {
    xml.write_event(event)
        .map_err(|e| Report::new(ExportError::Xml(e.to_string())))
}

/// `<name>text</name>` on one line.
fn write_leaf<W: Write>(
    xml: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<(), Report<ExportError>> {
    write_event(xml, Event::Start(BytesStart::new(name)))?;
    write_event(xml, Event::Text(BytesText::new(text)))?;
    write_event(xml, Event::End(BytesEnd::new(name)))
}

fn write_tag<W: Write>(xml: &mut Writer<W>, tag: &Tag) -> Result<(), Report<ExportError>> {
    let mut elem = BytesStart::new("TAG");
    elem.push_attribute(("id", tag.id.to_string().as_str()));
    write_event(xml, Event::Start(elem))?;

    write_leaf(xml, "start_offset", &tag.start.to_string())?;
    write_leaf(xml, "end_offset", &tag.end_inclusive().to_string())?;
    write_leaf(xml, "tag_text", &tag.label)?;
    write_leaf(xml, "font_colour", &tag.foreground.to_string())?;
    write_leaf(xml, "note_colour", &tag.background.to_string())?;

    write_event(xml, Event::End(BytesEnd::new("TAG")))
}

/// Write `tags` as a wxHexEditor XML document for the file at `path_label`.
pub fn write_hex_tags<W: Write>(
    path_label: &str,
    tags: &[Tag],
    writer: &mut W,
) -> Result<(), Report<ExportError>> {
    let mut xml = Writer::new_with_indent(&mut *writer, b' ', 2);

    write_event(&mut xml, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_event(&mut xml, Event::Start(BytesStart::new(ROOT)))?;

    let mut filename = BytesStart::new("filename");
    filename.push_attribute(("path", path_label));
    write_event(&mut xml, Event::Start(filename))?;
    for tag in tags {
        write_tag(&mut xml, tag)?;
    }
    write_event(&mut xml, Event::End(BytesEnd::new("filename")))?;
    write_event(&mut xml, Event::End(BytesEnd::new(ROOT)))?;

    writer
        .write_all(b"\n")
        .and_then(|()| writer.flush())
        .map_err(|e| Report::new(ExportError::from(e)))
}

/// Render to a `String`.
pub fn hex_tags_to_string(path_label: &str, tags: &[Tag]) -> Result<String, Report<ExportError>> {
    let mut out = Vec::new();
    write_hex_tags(path_label, tags, &mut out)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}
