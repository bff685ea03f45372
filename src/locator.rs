//! Page locator - finds the page on which a section heading starts.
//!
//! Extracted headings rarely survive verbatim: titles wrap across lines,
//! pick up running headers, or lose words to hyphenation. When the full
//! title is not found the locator retries with progressively shorter
//! variants, first dropping words from the end and then from the start.

use crate::document::Document;
use serde::{Deserialize, Serialize};

/// Where a title was found, and the variant that matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMatch {
    /// 1-indexed page number, `None` when no variant matched.
    pub page: Option<usize>,
    /// The title variant that matched (empty when not found).
    pub text: String,
}

impl PageMatch {
    pub fn not_found() -> Self {
        Self {
            page: None,
            text: String::new(),
        }
    }

    pub fn is_found(&self) -> bool {
        self.page.is_some()
    }
}

/// Lowercased, whitespace-collapsed page texts of one document.
pub struct SearchablePages {
    pages: Vec<(usize, String)>,
}

impl SearchablePages {
    /// Normalize every page numbered above `skip_pages`.
    pub fn new(document: &Document, skip_pages: usize) -> Self {
        let pages = document
            .pages
            .iter()
            .filter(|p| p.number > skip_pages)
            .map(|p| (p.number, normalize(&p.content)))
            .collect();
        Self { pages }
    }

    /// Locate the first page containing `title` or one of its shortened variants.
    pub fn locate(&self, title: &str) -> PageMatch {
        let words: Vec<&str> = title.split_whitespace().collect();
        if words.is_empty() {
            return PageMatch::not_found();
        }

        for variant in variants(&words) {
            let needle = variant.to_lowercase();
            if let Some((number, _)) = self.pages.iter().find(|(_, text)| text.contains(&needle)) {
                return PageMatch {
                    page: Some(*number),
                    text: variant,
                };
            }
            tracing::debug!(title, variant = %variant, "Title variant not found, retrying");
        }

        PageMatch::not_found()
    }
}

/// Locate the first page containing `title`, ignoring the first `skip_pages`.
///
/// Use [`SearchablePages`] directly when locating many titles in one document.
pub fn locate(document: &Document, title: &str, skip_pages: usize) -> PageMatch {
    SearchablePages::new(document, skip_pages).locate(title)
}

/// Full title, then right-trimmed, then left-trimmed variants.
fn variants(words: &[&str]) -> Vec<String> {
    let n = words.len();
    let mut out = vec![words.join(" ")];
    out.extend((1..n).rev().map(|i| words[..i].join(" ")));
    out.extend((1..n).map(|i| words[i..].join(" ")));
    out
}

/// Lowercase with whitespace runs collapsed to single spaces.
fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{FORM_FEED, Page};

    fn doc(pages: &[&str]) -> Document {
        Document::new(
            "book",
            pages
                .iter()
                .enumerate()
                .map(|(i, c)| Page::new(i + 1, c.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_full_title_match() {
        let d = doc(&["contents", "2.1 Project Scope\nbody", "more"]);
        let m = locate(&d, "2.1 Project Scope", 0);
        assert_eq!(m.page, Some(2));
        assert_eq!(m.text, "2.1 Project Scope");
    }

    #[test]
    fn test_case_and_whitespace_are_ignored() {
        let d = doc(&["2.1   PROJECT\n   scope"]);
        assert_eq!(locate(&d, "2.1 project Scope", 0).page, Some(1));
    }

    #[test]
    fn test_skip_pages() {
        let d = doc(&["2.1 Project Scope ....... 14", "x", "2.1 Project Scope\nbody"]);
        assert_eq!(locate(&d, "2.1 Project Scope", 0).page, Some(1));
        assert_eq!(locate(&d, "2.1 Project Scope", 2).page, Some(3));
    }

    #[test]
    fn test_right_trim_before_left_trim() {
        // Page 1 only has the tail, page 2 only the head.
        let d = doc(&["Scope Statement", "4.3 Define\nrest of page"]);
        let m = locate(&d, "4.3 Define Scope Statement", 0);
        assert_eq!(m.page, Some(2));
        assert_eq!(m.text, "4.3 Define");
    }

    #[test]
    fn test_left_trim_when_head_missing() {
        let d = doc(&["nothing here", "Estimate Activity Durations"]);
        let m = locate(&d, "6.4 Estimate Activity Durations", 0);
        assert_eq!(m.page, Some(2));
        assert_eq!(m.text, "Estimate Activity Durations");
    }

    #[test]
    fn test_single_word_miss() {
        let d = doc(&["alpha", "beta"]);
        assert_eq!(locate(&d, "gamma", 0), PageMatch::not_found());
    }

    #[test]
    fn test_exhausted_variants_miss() {
        let d = doc(&["alpha", "beta"]);
        let m = locate(&d, "gamma delta epsilon", 0);
        assert!(!m.is_found());
        assert!(m.text.is_empty());
    }

    #[test]
    fn test_blank_title() {
        let d = doc(&["anything"]);
        assert_eq!(locate(&d, "   ", 0), PageMatch::not_found());
    }

    #[test]
    fn test_searchable_pages_reused_across_titles() {
        let d = doc(&["contents", "1 Intro\nbody", "1.1   SCOPE\nmore"]);
        let pages = SearchablePages::new(&d, 1);

        assert_eq!(pages.locate("1 Intro").page, Some(2));
        assert_eq!(pages.locate("1.1 Scope").page, Some(3));
        assert_eq!(pages.locate("contents"), PageMatch::not_found());
    }

    #[test]
    fn test_variant_order() {
        let v = variants(&["a", "b", "c"]);
        assert_eq!(v, vec!["a b c", "a b", "a", "b c", "c"]);
    }

    #[test]
    fn test_pages_from_form_feed_text() {
        let d = Document::from_text_with_delimiter(
            "book",
            &format!("cover{FORM_FEED}1 Intro\nhello{FORM_FEED}1.1 Scope"),
            FORM_FEED,
        );
        assert_eq!(locate(&d, "1.1 Scope", 1).page, Some(3));
    }
}
