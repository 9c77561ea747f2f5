//! Unicode folding and markup escaping (pipeline stages 1 and 2)

use std::ops::Range;
use unicode_normalization::UnicodeNormalization;

/// Entity forms produced by [`escape_markup`], indexed by the raw character
pub const ENTITIES: [(char, &str); 5] = [
    ('&', "&amp;"),
    ('<', "&lt;"),
    ('>', "&gt;"),
    ('"', "&quot;"),
    ('\'', "&#x27;"),
];

/// NFKD-decompose `text` and drop every character without an ASCII form.
///
/// Returns the folded text and the number of decomposed code points dropped.
/// Fullwidth and other compatibility variants collapse to their ASCII base,
/// accents separate from their letters and are removed.
pub fn fold_to_ascii(text: &str) -> (String, usize) {
    let mut folded = String::with_capacity(text.len());
    let mut dropped = 0usize;
    for c in text.nfkd() {
        if c.is_ascii() {
            folded.push(c);
        } else {
            dropped += 1;
        }
    }
    (folded, dropped)
}

/// Escape `& < > " '` to their entity forms.
///
/// An `&` that already begins one of the five entities in [`ENTITIES`] is
/// left alone, so escaping is idempotent.
pub fn escape_markup(text: &str) -> (String, usize) {
    let mut escaped = String::with_capacity(text.len() + text.len() / 8);
    let mut count = 0usize;
    for (idx, c) in text.char_indices() {
        match c {
            '&' if starts_with_entity(&text[idx..]) => escaped.push('&'),
            '&' | '<' | '>' | '"' | '\'' => {
                escaped.push_str(entity_for(c));
                count += 1;
            }
            _ => escaped.push(c),
        }
    }
    (escaped, count)
}

/// Whether `text` begins with one of the entities this module emits
pub fn starts_with_entity(text: &str) -> bool {
    ENTITIES.iter().any(|(_, entity)| text.starts_with(entity))
}

/// Byte ranges of every entity from [`ENTITIES`] in `text`, in order
pub fn entity_spans(text: &str) -> Vec<Range<usize>> {
    text.match_indices('&')
        .filter_map(|(idx, _)| {
            ENTITIES
                .iter()
                .find(|(_, entity)| text[idx..].starts_with(entity))
                .map(|(_, entity)| idx..idx + entity.len())
        })
        .collect()
}

fn entity_for(c: char) -> &'static str {
    ENTITIES
        .iter()
        .find(|(raw, _)| *raw == c)
        .map(|(_, entity)| *entity)
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_accents_and_fullwidth() {
        let (text, dropped) = fold_to_ascii("Café ＩＧＮＯＲＥ");
        assert_eq!(text, "Cafe IGNORE");
        // the combining acute accent
        assert_eq!(dropped, 1);
    }

    #[test]
    fn test_fold_drops_unmappable() {
        let (text, dropped) = fold_to_ascii("漢字 ok 🚀");
        assert_eq!(text, " ok ");
        assert_eq!(dropped, 3);
    }

    #[test]
    fn test_fold_ligature() {
        let (text, _) = fold_to_ascii("ﬁle");
        assert_eq!(text, "file");
    }

    #[test]
    fn test_escape_all_five() {
        let (text, count) = escape_markup(r#"<a href="x">Tom & Jerry's</a>"#);
        assert_eq!(
            text,
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#x27;s&lt;/a&gt;"
        );
        assert_eq!(count, 8);
    }

    #[test]
    fn test_escape_is_idempotent() {
        let (once, _) = escape_markup("1 < 2 && 'q'");
        let (twice, count) = escape_markup(&once);
        assert_eq!(once, twice);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_escape_foreign_entity_is_escaped() {
        let (text, _) = escape_markup("&nbsp;");
        assert_eq!(text, "&amp;nbsp;");
    }

    #[test]
    fn test_entity_spans() {
        let text = "a &lt;b&gt; & &nbsp; &#x27;";
        let spans = entity_spans(text);
        let found: Vec<&str> = spans.iter().map(|r| &text[r.clone()]).collect();
        assert_eq!(found, vec!["&lt;", "&gt;", "&#x27;"]);
    }
}
