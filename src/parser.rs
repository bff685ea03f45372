//! Section parser - splits linear document text at numbered headings.
//!
//! A heading is a line starting with a dotted number followed by whitespace
//! and a title, optionally preceded by the word "Section" or "Chapter":
//!
//! ```text
//! 1 Introduction
//! 1.2 Scope
//! Chapter 3 Planning
//! ```
//!
//! Everything between two headings becomes the content of the first one.

use crate::section::{Section, SectionId};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?i:section|chapter)\s+)?(\d+(?:\.\d+)*)\s+(.+)$")
        .expect("heading pattern is valid")
});

/// Parse text into sections keyed by identifier.
///
/// Lines before the first heading are dropped. A repeated identifier
/// replaces the earlier section.
pub fn parse_sections(text: &str) -> BTreeMap<SectionId, Section> {
    let mut sections = BTreeMap::new();
    let mut current: Option<(SectionId, String)> = None;
    let mut content: Vec<&str> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some((id, title)) = match_heading(line) {
            if let Some((prev_id, prev_title)) = current.take() {
                sections.insert(prev_id, Section::new(prev_title, join_content(&content)));
            }
            current = Some((id, title));
            content.clear();
        } else if current.is_some() {
            content.push(line);
        }
    }

    if let Some((id, title)) = current {
        sections.insert(id, Section::new(title, join_content(&content)));
    }

    tracing::debug!("Parsed {} sections from text", sections.len());
    sections
}

/// Match a trimmed line against the heading pattern.
fn match_heading(line: &str) -> Option<(SectionId, String)> {
    let caps = HEADING.captures(line)?;
    let id = SectionId::parse(caps.get(1)?.as_str()).ok()?;
    let title = caps.get(2)?.as_str().to_string();
    Some((id, title))
}

fn join_content(lines: &[&str]) -> String {
    lines.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> SectionId {
        SectionId::parse(s).unwrap()
    }

    #[test]
    fn test_parse_basic_document() {
        let text = "1 Intro\nHello world\n1.1 Background\nMore text about planning";
        let sections = parse_sections(text);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[&id("1")].title, "Intro");
        assert_eq!(sections[&id("1")].content, "Hello world");
        assert_eq!(sections[&id("1.1")].title, "Background");
        assert_eq!(sections[&id("1.1")].content, "More text about planning");
    }

    #[test]
    fn test_preamble_is_discarded() {
        let text = "Copyright notice\nAll rights reserved\n\n2 Scope\nBody";
        let sections = parse_sections(text);

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[&id("2")].content, "Body");
    }

    #[test]
    fn test_blank_lines_are_skipped_and_content_joined() {
        let text = "3 Risk\n\n  first line  \n\nsecond line\n";
        let sections = parse_sections(text);
        assert_eq!(sections[&id("3")].content, "first line\nsecond line");
        assert_eq!(sections[&id("3")].word_count, 4);
    }

    #[test]
    fn test_section_and_chapter_prefixes() {
        let text = "Chapter 4 Quality\nbody one\nsection 4.1 Purpose\nbody two";
        let sections = parse_sections(text);

        assert_eq!(sections[&id("4")].title, "Quality");
        assert_eq!(sections[&id("4.1")].title, "Purpose");
        assert_eq!(sections[&id("4.1")].content, "body two");
    }

    #[test]
    fn test_heading_title_is_kept_verbatim() {
        let sections = parse_sections("5.3.1  12 34\ncontent");
        assert_eq!(sections[&id("5.3.1")].title, "12 34");
    }

    #[test]
    fn test_number_without_title_is_content() {
        let text = "1 Intro\n42\nmore";
        let sections = parse_sections(text);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[&id("1")].content, "42\nmore");
    }

    #[test]
    fn test_heading_without_content_is_kept() {
        let sections = parse_sections("1 Empty\n2 Full\ntext");
        assert_eq!(sections[&id("1")].content, "");
        assert_eq!(sections[&id("2")].content, "text");
    }

    #[test]
    fn test_repeated_identifier_last_wins() {
        let sections = parse_sections("1 First\nold\n1 Second\nnew");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[&id("1")].title, "Second");
        assert_eq!(sections[&id("1")].content, "new");
    }

    #[test]
    fn test_empty_text_yields_no_sections() {
        assert!(parse_sections("").is_empty());
        assert!(parse_sections("   \n\n").is_empty());
        assert!(parse_sections("no headings here\nat all").is_empty());
    }

    #[test]
    fn test_every_identifier_is_dotted_numeric() {
        let text = "1 A\nx\n1.2 B\ny\n10.2.3 C\nz\nSection 7 D\nw";
        for key in parse_sections(text).keys() {
            assert!(key.components().all(|c| c.bytes().all(|b| b.is_ascii_digit())));
        }
    }
}
