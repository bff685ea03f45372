//! Sections and books.
//!
//! A book is the set of numbered sections found in one source document.
//! Sections are keyed by a dotted numeric identifier such as `6.2.4.3` and
//! ordered naturally (component by component, numerically).

use crate::error::{IndexerError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Dotted numeric section identifier (e.g. "1", "1.2", "6.2.4.3").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SectionId(String);

impl SectionId {
    /// Parse an identifier, rejecting anything that is not digits separated by dots.
    pub fn parse(s: &str) -> Result<Self> {
        let valid = !s.is_empty()
            && s.split('.')
                .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()));

        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(IndexerError::InvalidSectionId(s.to_string()))
        }
    }

    /// The identifier as written.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of dot separators ("1" is 0, "1.2.3" is 2).
    pub fn depth(&self) -> usize {
        self.0.matches('.').count()
    }

    /// Number of numeric components.
    pub fn len(&self) -> usize {
        self.depth() + 1
    }

    /// Always false; identifiers have at least one component.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate over the digit runs.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// The identifier truncated to its first `n` components.
    ///
    /// Identifiers with `n` or fewer components are returned unchanged.
    pub fn truncate(&self, n: usize) -> SectionId {
        if n == 0 || self.len() <= n {
            return self.clone();
        }
        let prefix: Vec<&str> = self.components().take(n).collect();
        SectionId(prefix.join("."))
    }

    /// The identifier without its last component, if it has more than one.
    pub fn parent(&self) -> Option<SectionId> {
        self.0
            .rfind('.')
            .map(|pos| SectionId(self.0[..pos].to_string()))
    }
}

/// Compare two digit runs numerically without parsing them.
fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

impl Ord for SectionId {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut left = self.components();
        let mut right = other.components();
        loop {
            match (left.next(), right.next()) {
                (Some(a), Some(b)) => match cmp_digits(a, b) {
                    Ordering::Equal => continue,
                    unequal => return unequal,
                },
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                // "01.2" and "1.2" compare equal numerically; keep Ord consistent with Eq.
                (None, None) => return self.0.cmp(&other.0),
            }
        }
    }
}

impl PartialOrd for SectionId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SectionId {
    type Err = IndexerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SectionId {
    type Error = IndexerError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<SectionId> for String {
    fn from(id: SectionId) -> Self {
        id.0
    }
}

/// Sort identifiers in natural order.
pub fn natural_sort(ids: &mut [SectionId]) {
    ids.sort();
}

/// A titled block of text under a numbered heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub content: String,
    pub word_count: usize,
}

impl Section {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        let word_count = content.split_whitespace().count();
        Self {
            title: title.into(),
            content,
            word_count,
        }
    }

    /// Title and content joined, as fed to the keyword indexer.
    pub fn full_text(&self) -> String {
        format!("{} {}", self.title, self.content)
    }
}

/// All sections parsed from one source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub name: String,
    pub sections: BTreeMap<SectionId, Section>,
}

impl Book {
    pub fn new(name: impl Into<String>, sections: BTreeMap<SectionId, Section>) -> Self {
        Self {
            name: name.into(),
            sections,
        }
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn get(&self, id: &SectionId) -> Option<&Section> {
        self.sections.get(id)
    }

    /// Look up a section, reporting which part of the lookup failed.
    pub fn section(&self, id: &str) -> Result<&Section> {
        SectionId::parse(id)
            .ok()
            .and_then(|id| self.sections.get(&id))
            .ok_or_else(|| IndexerError::SectionNotFound {
                book: self.name.clone(),
                section: id.to_string(),
            })
    }

    /// Total words across all section contents.
    pub fn word_count(&self) -> usize {
        self.sections.values().map(|s| s.word_count).sum()
    }

    /// One "id  title" line per section, in natural order.
    pub fn format(&self) -> String {
        let mut result = format!("{} ({} sections)\n", self.name, self.section_count());
        result.push_str(&"─".repeat(50));
        result.push('\n');
        for (id, section) in &self.sections {
            result.push_str(&format!("{:<10} {}\n", id.as_str(), section.title));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<SectionId> {
        raw.iter().map(|s| SectionId::parse(s).unwrap()).collect()
    }

    #[test]
    fn test_parse_valid_ids() {
        assert!(SectionId::parse("1").is_ok());
        assert!(SectionId::parse("6.2.4.3").is_ok());
        assert!(SectionId::parse("20311.4.4").is_ok());
    }

    #[test]
    fn test_parse_rejects_malformed_ids() {
        for bad in ["", ".", "1.", ".1", "1..2", "1.a", "v1", "1 2"] {
            assert!(SectionId::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_depth_and_truncate() {
        let id = SectionId::parse("6.2.4.3").unwrap();
        assert_eq!(id.depth(), 3);
        assert_eq!(id.len(), 4);
        assert_eq!(id.truncate(2).as_str(), "6.2");
        assert_eq!(SectionId::parse("7").unwrap().truncate(2).as_str(), "7");
        assert_eq!(id.parent().unwrap().as_str(), "6.2.4");
        assert!(SectionId::parse("7").unwrap().parent().is_none());
    }

    #[test]
    fn test_natural_sort() {
        let mut sorted = ids(&["1.10", "1.2", "1.9"]);
        natural_sort(&mut sorted);
        assert_eq!(sorted, ids(&["1.2", "1.9", "1.10"]));
    }

    #[test]
    fn test_natural_sort_is_numeric_not_lexicographic() {
        let mut sorted = ids(&["10", "2", "1.1", "1", "2.10", "2.9.1"]);
        natural_sort(&mut sorted);
        assert_eq!(sorted, ids(&["1", "1.1", "2", "2.9.1", "2.10", "10"]));
        assert!(SectionId::parse("1.1").unwrap() < SectionId::parse("2").unwrap());
    }

    #[test]
    fn test_huge_components_do_not_overflow() {
        let small = SectionId::parse("99999999999999999999999").unwrap();
        let large = SectionId::parse("100000000000000000000000").unwrap();
        assert!(small < large);
    }

    #[test]
    fn test_ord_consistent_with_eq() {
        let a = SectionId::parse("01.2").unwrap();
        let b = SectionId::parse("1.2").unwrap();
        assert_ne!(a, b);
        assert_ne!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn test_serde_as_string() {
        let id = SectionId::parse("1.2.3").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"1.2.3\"");
        let back: SectionId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<SectionId>("\"abc\"").is_err());
    }

    #[test]
    fn test_section_word_count() {
        let section = Section::new("Intro", "Hello big\nworld");
        assert_eq!(section.word_count, 3);
        assert_eq!(section.full_text(), "Intro Hello big\nworld");
    }

    #[test]
    fn test_book_section_lookup() {
        let mut sections = BTreeMap::new();
        sections.insert(SectionId::parse("1").unwrap(), Section::new("Intro", "text"));
        let book = Book::new("book", sections);

        assert_eq!(book.section("1").unwrap().title, "Intro");
        assert!(matches!(
            book.section("2"),
            Err(IndexerError::SectionNotFound { .. })
        ));
        assert!(book.section("not-an-id").is_err());
        assert!(book.format().contains("Intro"));
    }
}
