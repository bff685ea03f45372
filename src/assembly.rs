//! Shapes search hits into the per-book response served to clients.
//!
//! Hits are grouped under their two-level prefix, each group gets a
//! readable title, and every listed section is paired with its located
//! page (shifted by the book's configured offset).

use crate::config::{BookConfig, Config};
use crate::hierarchy::group_by_prefix;
use crate::persistence::{IndexBundle, PageMap, PageMaps};
use crate::search::SearchHits;
use crate::section::{Book, SectionId};
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use std::sync::LazyLock;

static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d.]+\s+").expect("numbering pattern is valid"));

static NUMERIC_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d.]+$").expect("numeric pattern is valid"));

const LEVEL_LABELS: [&str; 5] = [
    "Chapter",
    "Section",
    "Subsection",
    "Sub-subsection",
    "Sub-sub-subsection",
];

/// One section listed under a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subsection {
    pub section: SectionId,
    pub page: Option<i64>,
    pub title: String,
}

/// Hits sharing a two-level prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionGroup {
    /// 1-based position of the group within its book.
    pub id: usize,
    /// The prefix key, e.g. "4.3".
    pub number: SectionId,
    pub title: String,
    pub count: usize,
    pub subsections: Vec<Subsection>,
}

/// Results for one book, with its display metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookResults {
    pub name: String,
    pub icon: String,
    pub color: String,
    pub sections: Vec<SectionGroup>,
}

/// Book key → results, serialized as a JSON object in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResponse(pub Vec<(String, BookResults)>);

impl SearchResponse {
    pub fn get(&self, key: &str) -> Option<&BookResults> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, r)| r)
    }

    /// Total subsections across all books.
    pub fn hit_count(&self) -> usize {
        self.0
            .iter()
            .flat_map(|(_, r)| &r.sections)
            .map(|g| g.count)
            .sum()
    }
}

impl Serialize for SearchResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (k, v)))
    }
}

/// Build the response for `hits` over configured books.
///
/// When no books are configured every indexed book is listed, in name order.
pub fn assemble(
    bundle: &IndexBundle,
    pages: &PageMaps,
    config: &Config,
    hits: &SearchHits,
) -> SearchResponse {
    let books: Vec<BookConfig> = if config.books.is_empty() {
        bundle.books.keys().map(BookConfig::new).collect()
    } else {
        config.books.clone()
    };

    let empty = PageMap::new();
    let results = books
        .into_iter()
        .map(|book_config| {
            let key = book_config.key.clone();
            let sections = match (bundle.books.get(&key), hits.get(&key)) {
                (Some(book), Some(ids)) => {
                    let page_map = pages.get(&key).unwrap_or(&empty);
                    build_groups(book, page_map, &book_config, ids)
                }
                _ => Vec::new(),
            };

            let results = BookResults {
                name: book_config.display_name().to_string(),
                icon: book_config.icon.clone(),
                color: book_config.color.clone(),
                sections,
            };
            (key, results)
        })
        .collect();

    SearchResponse(results)
}

fn build_groups(
    book: &Book,
    page_map: &PageMap,
    book_config: &BookConfig,
    ids: &[SectionId],
) -> Vec<SectionGroup> {
    let start_text = |id: &SectionId| -> String {
        page_map
            .get(id)
            .map(|e| e.start_text.clone())
            .filter(|t| !t.is_empty())
            .or_else(|| book.get(id).map(|s| s.title.clone()))
            .unwrap_or_else(|| id.to_string())
    };

    let subsection = |id: &SectionId| Subsection {
        section: id.clone(),
        page: page_map
            .get(id)
            .and_then(|e| e.page)
            .map(|p| p as i64 + book_config.page_offset),
        title: start_text(id),
    };

    group_by_prefix(ids)
        .into_iter()
        .enumerate()
        .map(|(i, (key, members))| {
            let subsections: Vec<Subsection> = if members.len() == 1 && members[0] == key {
                vec![subsection(&key)]
            } else {
                members.iter().map(&subsection).collect()
            };

            SectionGroup {
                id: i + 1,
                title: clean_section_title(&start_text(&key)),
                number: key,
                count: subsections.len(),
                subsections,
            }
        })
        .collect()
}

/// Turn a raw heading into a short display title.
///
/// "2.2.1" → "Chapter 2 Section 2 Subsection 1";
/// "4.3 Define Scope – Inputs" → "Define Scope".
pub fn clean_section_title(raw: &str) -> String {
    let title = raw.trim();

    if NUMERIC_TITLE.is_match(title) {
        return title
            .split('.')
            .enumerate()
            .map(|(i, part)| match LEVEL_LABELS.get(i) {
                Some(label) => format!("{label} {part}"),
                None => format!("Level{} {part}", i + 1),
            })
            .collect::<Vec<_>>()
            .join(" ");
    }

    let cleaned = LEADING_NUMBER.replace(title, "");
    let cleaned = cleaned.trim();

    let cleaned = if let Some((head, _)) = cleaned.split_once('–') {
        head.trim()
    } else if let Some((head, _)) = cleaned.split_once('—') {
        head.trim()
    } else if let Some((head, _)) = cleaned.split_once(" and ") {
        head.trim()
    } else {
        cleaned
    };

    let mut chars = cleaned.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndexingConfig;
    use crate::indexer::KeywordIndexer;
    use crate::parser::parse_sections;
    use crate::persistence::PageEntry;

    fn id(s: &str) -> SectionId {
        SectionId::parse(s).unwrap()
    }

    fn bundle() -> IndexBundle {
        let books = vec![
            Book::new(
                "book1",
                parse_sections(
                    "4.3 Define scope\nx\n4.3.1 Inputs\nx\n4.3.2 Outputs\nx\n5.1 Plan quality\nx",
                ),
            ),
            Book::new("book2", parse_sections("1 Intro\nx")),
        ];
        let (index, stems) = KeywordIndexer::new(&IndexingConfig::default()).build(&books);
        IndexBundle::new(books, index, stems)
    }

    fn pages() -> PageMaps {
        let mut map = PageMap::new();
        map.insert(
            id("4.3"),
            PageEntry {
                start_text: "4.3 define scope – overview".to_string(),
                page: Some(10),
            },
        );
        map.insert(
            id("4.3.1"),
            PageEntry {
                start_text: "4.3.1 Inputs".to_string(),
                page: Some(11),
            },
        );
        map.insert(
            id("5.1"),
            PageEntry {
                start_text: String::new(),
                page: None,
            },
        );
        PageMaps::from([("book1".to_string(), map)])
    }

    fn hits(raw: &[&str]) -> SearchHits {
        SearchHits::from([("book1".to_string(), raw.iter().map(|s| id(s)).collect())])
    }

    #[test]
    fn test_clean_numeric_titles() {
        assert_eq!(clean_section_title("2.2.1"), "Chapter 2 Section 2 Subsection 1");
        assert_eq!(clean_section_title("3"), "Chapter 3");
        assert_eq!(
            clean_section_title("1.2.3.4.5.6"),
            "Chapter 1 Section 2 Subsection 3 Sub-subsection 4 Sub-sub-subsection 5 Level6 6"
        );
    }

    #[test]
    fn test_clean_text_titles() {
        assert_eq!(clean_section_title("4.3 define scope – overview"), "Define scope");
        assert_eq!(clean_section_title("2 Risk—Identify"), "Risk");
        assert_eq!(clean_section_title("7.1 Plans and budgets"), "Plans");
        assert_eq!(clean_section_title("  Quality  "), "Quality");
        assert_eq!(clean_section_title(""), "");
    }

    #[test]
    fn test_groups_and_offsets() {
        let mut config = Config::default();
        config.books.push(BookConfig {
            name: Some("PMBOK Guide".to_string()),
            page_offset: 80,
            ..BookConfig::new("book1")
        });

        let response = assemble(&bundle(), &pages(), &config, &hits(&["4.3.1", "4.3.2", "5.1"]));
        let book = response.get("book1").unwrap();
        assert_eq!(book.name, "PMBOK Guide");
        assert_eq!(book.sections.len(), 2);

        let first = &book.sections[0];
        assert_eq!(first.id, 1);
        assert_eq!(first.number, id("4.3"));
        assert_eq!(first.title, "Define scope");
        assert_eq!(first.count, 2);
        assert_eq!(first.subsections[0].page, Some(91));
        assert_eq!(first.subsections[0].title, "4.3.1 Inputs");
        // Unlocated sections fall back to the parsed title.
        assert_eq!(first.subsections[1].page, None);
        assert_eq!(first.subsections[1].title, "Outputs");

        let second = &book.sections[1];
        assert_eq!(second.id, 2);
        assert_eq!(second.count, 1);
        assert_eq!(second.subsections[0].section, id("5.1"));
        assert_eq!(second.title, "Plan quality");
        assert_eq!(response.hit_count(), 3);
    }

    #[test]
    fn test_self_group_has_single_entry() {
        let config = Config::default();
        let response = assemble(&bundle(), &pages(), &config, &hits(&["4.3"]));
        let group = &response.get("book1").unwrap().sections[0];
        assert_eq!(group.count, 1);
        assert_eq!(group.subsections[0].page, Some(10));
    }

    #[test]
    fn test_unconfigured_lists_every_book() {
        let response = assemble(&bundle(), &pages(), &Config::default(), &hits(&["5.1"]));
        let keys: Vec<&str> = response.0.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["book1", "book2"]);
        assert!(response.get("book2").unwrap().sections.is_empty());
        assert_eq!(response.get("book2").unwrap().icon, "BookOpen");
    }

    #[test]
    fn test_configured_order_is_kept_in_json() {
        let mut config = Config::default();
        config.books = vec![BookConfig::new("book2"), BookConfig::new("book1")];
        let response = assemble(&bundle(), &pages(), &config, &SearchHits::new());

        let json = serde_json::to_string(&response).unwrap();
        let b2 = json.find("\"book2\"").unwrap();
        let b1 = json.find("\"book1\"").unwrap();
        assert!(b2 < b1);
    }
}
