//! HTML visible-text extraction

use crate::dispatch::Extractor;
use crate::error::ExtractorError;
use scraper::{ElementRef, Html};
use tracing::debug;

/// Elements whose whole subtree is never rendered as text
const SKIP_TAGS: &[&str] = &["head", "script", "style", "noscript", "template"];

/// Elements followed by a line break in the output
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "h1", "h2", "h3", "h4", "h5", "h6", "li", "tr", "table", "section",
    "article", "blockquote", "pre",
];

/// HTML extractor backed by `scraper`.
///
/// Invalid UTF-8 is replaced rather than rejected, and html5ever recovers
/// from any markup, so this extractor does not fail on content.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlExtractor;

impl HtmlExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Visible text of an HTML document
    pub fn extract_text(&self, html: &str) -> String {
        let document = Html::parse_document(html);
        let mut text = String::new();
        collect_text(&document.root_element(), &mut text);
        clean_text(&text)
    }
}

impl Extractor for HtmlExtractor {
    fn name(&self) -> &str {
        "scraper"
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractorError> {
        let html = String::from_utf8_lossy(bytes);
        let text = self.extract_text(&html);
        debug!(input_bytes = bytes.len(), chars = text.len(), "html text extracted");
        Ok(text)
    }
}

fn collect_text(element: &ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            let tag = child_element.value().name();
            if SKIP_TAGS.contains(&tag) {
                continue;
            }
            collect_text(&child_element, out);
            if BLOCK_TAGS.contains(&tag) {
                out.push('\n');
            }
        } else if let Some(text_node) = child.value().as_text() {
            out.push_str(text_node);
        }
    }
}

/// Collapse whitespace runs to one space and keep at most one blank line
fn clean_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut pending_space = false;
    let mut newlines = 0;

    for c in text.chars() {
        if c == '\n' {
            newlines += 1;
            pending_space = false;
        } else if c.is_whitespace() {
            pending_space = newlines == 0;
        } else {
            if newlines > 0 {
                if !result.is_empty() {
                    result.push_str(if newlines > 1 { "\n\n" } else { "\n" });
                }
                newlines = 0;
            } else if pending_space && !result.is_empty() {
                result.push(' ');
            }
            pending_space = false;
            result.push(c);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  Hello   World  \n  Test  "), "Hello World\nTest");
        assert_eq!(clean_text("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(clean_text("\n\n  lead"), "lead");
    }

    #[test]
    fn test_script_removed() {
        let html = r#"<html><head><title>T</title></head>
            <body><h1>Welcome</h1><script>alert('x')</script><p>Body text</p></body></html>"#;
        let text = HtmlExtractor::new().extract_text(html);
        assert!(text.contains("Welcome"));
        assert!(text.contains("Body text"));
        assert!(!text.contains("alert"));
    }

    #[test]
    fn test_head_title_not_rendered() {
        let html = "<html><head><title>Tab title</title></head><body><p>Page</p></body></html>";
        assert_eq!(HtmlExtractor::new().extract_text(html), "Page");
    }

    #[test]
    fn test_style_noscript_template_removed() {
        let html = "<body><style>p{color:red}</style><noscript>enable js</noscript>\
                    <template><p>hidden</p></template><p>shown</p></body>";
        assert_eq!(HtmlExtractor::new().extract_text(html), "shown");
    }

    #[test]
    fn test_blocks_become_lines() {
        let html = "<body><p>one</p><p>two</p><ul><li>three</li><li>four</li></ul></body>";
        assert_eq!(HtmlExtractor::new().extract_text(html), "one\ntwo\nthree\nfour");
    }

    #[test]
    fn test_inline_elements_join() {
        let html = "<p>Hello <b>bold</b> <i>world</i></p>";
        assert_eq!(HtmlExtractor::new().extract_text(html), "Hello bold world");
    }

    #[test]
    fn test_entities_decoded() {
        let html = "<p>Fish &amp; chips &lt;3</p>";
        assert_eq!(HtmlExtractor::new().extract_text(html), "Fish & chips <3");
    }

    #[test]
    fn test_invalid_utf8_and_empty() {
        let extractor = HtmlExtractor::new();
        assert_eq!(extractor.extract(b"<p>ok \xff</p>").unwrap(), "ok \u{fffd}");
        assert_eq!(extractor.extract(&[]).unwrap(), "");
    }
}
