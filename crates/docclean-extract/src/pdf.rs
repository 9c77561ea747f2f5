//! PDF text extraction

use crate::dispatch::Extractor;
use crate::error::ExtractorError;
use lopdf::Document;
use tracing::debug;

/// PDF extractor backed by `lopdf`.
///
/// Page text is concatenated in page order, each page terminated by a
/// newline. Pages that yield no text contribute nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }

    fn extract_from_document(&self, doc: &Document) -> String {
        let pages = doc.get_pages();
        let mut text = String::new();

        // BTreeMap keys are page numbers, so iteration is in page order
        for page_num in pages.keys() {
            match doc.extract_text(&[*page_num]) {
                Ok(page_text) => {
                    let page_text = page_text.trim_end();
                    if !page_text.is_empty() {
                        text.push_str(page_text);
                        text.push('\n');
                    }
                }
                Err(e) => debug!(page = page_num, error = %e, "skipping page without text"),
            }
        }

        debug!(pages = pages.len(), chars = text.len(), "pdf text extracted");
        text
    }
}

impl Extractor for PdfExtractor {
    fn name(&self) -> &str {
        "lopdf"
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractorError> {
        let doc = Document::load_mem(bytes)?;
        if doc.is_encrypted() {
            return Err(ExtractorError::Encrypted);
        }
        Ok(self.extract_from_document(&doc))
    }
}
