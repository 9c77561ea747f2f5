//! DOCX text extraction

use crate::dispatch::Extractor;
use crate::error::ExtractorError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use tracing::debug;

/// Main document part inside the OOXML package
const DOCUMENT_PART: &str = "word/document.xml";

/// Default cap on the decompressed document part
pub const DEFAULT_MAX_PART_BYTES: u64 = 1 << 30;

/// DOCX extractor: one output line per `w:p` paragraph.
///
/// Paragraphs inside tables are included in document order. Empty
/// paragraphs produce empty lines. A paragraph nested in another one, as in
/// a text box, ends the text before it and the outer paragraph resumes on a
/// new line afterwards.
#[derive(Debug, Clone, Copy)]
pub struct DocxExtractor {
    max_part_bytes: u64,
}

impl Default for DocxExtractor {
    fn default() -> Self {
        Self {
            max_part_bytes: DEFAULT_MAX_PART_BYTES,
        }
    }
}

impl DocxExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the decompressed size of `word/document.xml`
    pub fn with_max_part_bytes(mut self, max: u64) -> Self {
        self.max_part_bytes = max;
        self
    }
}

impl Extractor for DocxExtractor {
    fn name(&self) -> &str {
        "docx"
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractorError> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
        let part = archive.by_name(DOCUMENT_PART)?;
        let mut raw = Vec::new();
        part.take(self.max_part_bytes.saturating_add(1))
            .read_to_end(&mut raw)?;
        if raw.len() as u64 > self.max_part_bytes {
            return Err(ExtractorError::PartTooLarge {
                part: DOCUMENT_PART,
                max: self.max_part_bytes,
            });
        }
        let xml = String::from_utf8(raw).map_err(|e| ExtractorError::Xml(e.to_string()))?;

        let paragraphs = paragraphs_from_xml(&xml)?;
        debug!(paragraphs = paragraphs.len(), "docx text extracted");
        Ok(paragraphs.join("\n"))
    }
}

/// Collect the text of every paragraph in a WordprocessingML body
fn paragraphs_from_xml(xml: &str) -> Result<Vec<String>, ExtractorError> {
    let mut reader = Reader::from_str(xml);

    let mut paragraphs = Vec::new();
    let mut open: Vec<OpenParagraph> = Vec::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"p" => {
                    if let Some(outer) = open.last_mut() {
                        outer.split(&mut paragraphs);
                    }
                    open.push(OpenParagraph::default());
                }
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"p" => paragraphs.push(String::new()),
                b"tab" => push_to(&mut open, "\t"),
                b"br" | b"cr" => push_to(&mut open, "\n"),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => {
                let text = e
                    .unescape()
                    .map_err(|err| ExtractorError::Xml(err.to_string()))?;
                push_to(&mut open, &text);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    if let Some(paragraph) = open.pop() {
                        paragraph.close(&mut paragraphs);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractorError::Xml(format!(
                    "{} at position {}",
                    e,
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
    }

    Ok(paragraphs)
}

/// A `w:p` whose end tag has not been seen yet
#[derive(Default)]
struct OpenParagraph {
    text: String,
    split: bool,
}

impl OpenParagraph {
    /// Emit the text so far because a nested paragraph starts
    fn split(&mut self, paragraphs: &mut Vec<String>) {
        if !self.text.is_empty() {
            paragraphs.push(std::mem::take(&mut self.text));
        }
        self.split = true;
    }

    fn close(self, paragraphs: &mut Vec<String>) {
        // a split paragraph with nothing after the nested one adds no line
        if !(self.split && self.text.is_empty()) {
            paragraphs.push(self.text);
        }
    }
}

fn push_to(open: &mut [OpenParagraph], text: &str) {
    if let Some(paragraph) = open.last_mut() {
        paragraph.text.push_str(text);
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    /// Wrap body XML in a minimal document part and zip it
    pub fn docx_with_body(body: &str) -> Vec<u8> {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        );
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    /// One `w:p` per line
    pub fn docx_with_paragraphs(lines: &[&str]) -> Vec<u8> {
        let body: String = lines
            .iter()
            .map(|line| format!("<w:p><w:r><w:t xml:space=\"preserve\">{line}</w:t></w:r></w:p>"))
            .collect();
        docx_with_body(&body)
    }
}
