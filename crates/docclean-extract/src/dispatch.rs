//! Format detection and routing to extractors

use crate::config::ExtractorConfig;
use crate::error::{ExtractError, ExtractorError, Result};
use crate::format::{extension_of, unsupported_reason, FormatTag};
use crate::input::InputDocument;
use once_cell::sync::Lazy;
use tracing::debug;

/// Turns the raw bytes of one format into text.
///
/// Implementations receive the buffer exactly as read and must not assume
/// anything about it beyond the format tag they were registered for.
pub trait Extractor: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Extract text from the document bytes
    fn extract(&self, bytes: &[u8]) -> std::result::Result<String, ExtractorError>;
}

/// Stands in for a format whose feature is compiled out
#[cfg_attr(
    all(feature = "pdf", feature = "docx", feature = "html", feature = "ocr"),
    allow(dead_code)
)]
struct UnavailableExtractor(FormatTag);

impl Extractor for UnavailableExtractor {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn extract(&self, _bytes: &[u8]) -> std::result::Result<String, ExtractorError> {
        Err(ExtractorError::Unavailable(self.0))
    }
}

/// Routes a document to exactly one extractor based on its file name
pub struct Dispatcher {
    pdf: Box<dyn Extractor>,
    docx: Box<dyn Extractor>,
    html: Box<dyn Extractor>,
    image: Box<dyn Extractor>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(&ExtractorConfig::default())
    }
}

impl Dispatcher {
    /// Install the default extractor for every enabled format
    pub fn new(config: &ExtractorConfig) -> Self {
        #[cfg(feature = "pdf")]
        let pdf: Box<dyn Extractor> = Box::new(crate::pdf::PdfExtractor::new());
        #[cfg(not(feature = "pdf"))]
        let pdf: Box<dyn Extractor> = Box::new(UnavailableExtractor(FormatTag::Pdf));

        #[cfg(feature = "docx")]
        let docx: Box<dyn Extractor> = Box::new(
            crate::docx::DocxExtractor::new().with_max_part_bytes(config.max_part_bytes()),
        );
        #[cfg(not(feature = "docx"))]
        let docx: Box<dyn Extractor> = Box::new(UnavailableExtractor(FormatTag::Docx));

        #[cfg(feature = "html")]
        let html: Box<dyn Extractor> = Box::new(crate::html::HtmlExtractor::new());
        #[cfg(not(feature = "html"))]
        let html: Box<dyn Extractor> = Box::new(UnavailableExtractor(FormatTag::Html));

        #[cfg(feature = "ocr")]
        let image: Box<dyn Extractor> = Box::new(crate::ocr::OcrExtractor::new(config.ocr.clone()));
        #[cfg(not(feature = "ocr"))]
        let image: Box<dyn Extractor> = {
            let _ = config;
            Box::new(UnavailableExtractor(FormatTag::Image))
        };

        Self {
            pdf,
            docx,
            html,
            image,
        }
    }

    /// Replace the extractor bound to `tag`
    pub fn set_extractor(&mut self, tag: FormatTag, extractor: impl Extractor + 'static) -> Result<()> {
        let slot = match tag {
            FormatTag::Pdf => &mut self.pdf,
            FormatTag::Docx => &mut self.docx,
            FormatTag::Html => &mut self.html,
            FormatTag::Image => &mut self.image,
            FormatTag::Unsupported => {
                return Err(ExtractError::InvalidInput(
                    "cannot bind an extractor to the unsupported format".to_string(),
                ))
            }
        };
        *slot = Box::new(extractor);
        Ok(())
    }

    /// Builder-style [`set_extractor`](Self::set_extractor)
    pub fn with_extractor(mut self, tag: FormatTag, extractor: impl Extractor + 'static) -> Result<Self> {
        self.set_extractor(tag, extractor)?;
        Ok(self)
    }

    /// Extractor bound to `tag`, if any
    pub fn extractor(&self, tag: FormatTag) -> Option<&dyn Extractor> {
        match tag {
            FormatTag::Pdf => Some(self.pdf.as_ref()),
            FormatTag::Docx => Some(self.docx.as_ref()),
            FormatTag::Html => Some(self.html.as_ref()),
            FormatTag::Image => Some(self.image.as_ref()),
            FormatTag::Unsupported => None,
        }
    }

    /// Detect the format of `filename` and extract `content` with the
    /// matching extractor. The extractor output is returned unchanged.
    pub fn detect_and_extract(&self, content: &[u8], filename: &str) -> Result<String> {
        if filename.trim().is_empty() {
            return Err(ExtractError::InvalidInput(
                "a file name is required to detect the format".to_string(),
            ));
        }

        let format = FormatTag::from_filename(filename);
        let extractor = match format {
            FormatTag::Pdf => &self.pdf,
            FormatTag::Docx => &self.docx,
            FormatTag::Html => &self.html,
            FormatTag::Image => &self.image,
            FormatTag::Unsupported => {
                let reason = unsupported_reason(filename);
                debug!(filename, %reason, "unsupported format");
                return Err(ExtractError::UnsupportedFormat {
                    filename: filename.to_string(),
                    extension: extension_of(filename),
                    reason,
                });
            }
        };

        debug!(
            filename,
            %format,
            extractor = extractor.name(),
            bytes = content.len(),
            "dispatching"
        );
        extractor
            .extract(content)
            .map_err(|source| ExtractError::ExtractionFailure {
                filename: filename.to_string(),
                format,
                source,
            })
    }

    /// [`detect_and_extract`](Self::detect_and_extract) over an [`InputDocument`]
    pub fn extract_document(&self, document: &InputDocument<'_>) -> Result<String> {
        self.detect_and_extract(document.content(), document.filename())
    }
}

static DEFAULT_DISPATCHER: Lazy<Dispatcher> = Lazy::new(Dispatcher::default);

/// Extract text from `content` using the default extractors
pub fn detect_and_extract(content: &[u8], filename: &str) -> Result<String> {
    DEFAULT_DISPATCHER.detect_and_extract(content, filename)
}
