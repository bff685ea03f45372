//! Keyword search with stemming and optional fuzzy expansion.
//!
//! A query is split into words, each word is stemmed, and in fuzzy mode the
//! stem is expanded to the most similar indexed terms. Per-word results are
//! then combined across the query by intersection (`match_all`) or union.

use crate::config::{IndexingConfig, SearchConfig};
use crate::indexer::{KeywordIndex, SectionSet};
use crate::section::SectionId;
use crate::tokenizer::Tokenizer;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Book name → matching sections in natural order.
pub type SearchHits = BTreeMap<String, Vec<SectionId>>;

type BookSections = BTreeMap<String, SectionSet>;

/// Absorbs rounding in `1 - d/n` so a threshold of 0.8 admits exactly 4/5.
const SIMILARITY_EPSILON: f64 = 1e-9;

/// An indexed term close to a query stem.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expansion {
    pub term: String,
    pub similarity: f64,
}

/// How one query word was resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordMatch {
    pub word: String,
    pub stem: String,
    pub expansions: Vec<Expansion>,
}

/// Searches a keyword index.
pub struct SearchEngine<'a> {
    index: &'a KeywordIndex,
    tokenizer: Tokenizer,
    options: SearchConfig,
}

impl<'a> SearchEngine<'a> {
    /// Create a search engine over an index.
    ///
    /// `indexing` must match the settings the index was built with so query
    /// words are stemmed the same way.
    pub fn new(index: &'a KeywordIndex, indexing: &IndexingConfig, options: SearchConfig) -> Self {
        // Queries keep stop words: they simply match nothing.
        let query_settings = IndexingConfig {
            remove_stop_words: false,
            ..indexing.clone()
        };

        Self {
            index,
            tokenizer: Tokenizer::new(&query_settings),
            options,
        }
    }

    /// Find the sections matching `query` in every book.
    ///
    /// The first word seeds the result; each further word is intersected
    /// (`match_all`) or unioned into it per book. In `match_all` mode a word
    /// matching nothing empties the result, including when it is the first.
    pub fn search(&self, query: &str, match_all: bool, fuzzy: bool) -> SearchHits {
        let mut accumulator: Option<BookSections> = None;

        for word in self.tokenizer.words(query) {
            let resolved = self.resolve_word(&word, fuzzy);
            let matches = self.word_sections(&resolved);

            accumulator = Some(match accumulator {
                None => matches,
                Some(acc) if match_all => intersect(acc, &matches),
                Some(acc) => union(acc, matches),
            });
        }

        let hits: SearchHits = accumulator
            .unwrap_or_default()
            .into_iter()
            .filter(|(_, sections)| !sections.is_empty())
            .map(|(book, sections)| (book, sections.into_iter().collect()))
            .collect();

        tracing::debug!(query, match_all, fuzzy, books = hits.len(), "Search complete");
        hits
    }

    /// Explain how each query word resolves to index terms.
    pub fn explain(&self, query: &str, fuzzy: bool) -> Vec<WordMatch> {
        self.tokenizer
            .words(query)
            .into_iter()
            .map(|word| self.resolve_word(&word, fuzzy))
            .collect()
    }

    fn resolve_word(&self, word: &str, fuzzy: bool) -> WordMatch {
        let stem = self.tokenizer.stem(word);
        let expansions = if fuzzy {
            self.expand(&stem)
        } else {
            Vec::new()
        };

        WordMatch {
            word: word.to_string(),
            stem,
            expansions,
        }
    }

    /// Indexed terms most similar to `stem`, best first.
    ///
    /// Ties on similarity are broken by term order so results are stable.
    pub fn expand(&self, stem: &str) -> Vec<Expansion> {
        let mut candidates: Vec<Expansion> = self
            .index
            .terms()
            .filter(|term| *term != stem)
            .filter_map(|term| {
                let similarity = similarity(stem, term);
                (similarity + SIMILARITY_EPSILON >= self.options.fuzzy_threshold).then(|| Expansion {
                    term: term.to_string(),
                    similarity,
                })
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.term.cmp(&b.term))
        });
        candidates.truncate(self.options.max_expansions);
        candidates
    }

    /// Union of the sections of a word's stem and expansions, per book.
    fn word_sections(&self, resolved: &WordMatch) -> BookSections {
        let terms = std::iter::once(resolved.stem.as_str())
            .chain(resolved.expansions.iter().map(|e| e.term.as_str()));

        let mut result = BookSections::new();
        for term in terms {
            for (book, sections) in self.index.postings(term) {
                result
                    .entry(book.clone())
                    .or_default()
                    .extend(sections.iter().cloned());
            }
        }
        result
    }
}

fn intersect(acc: BookSections, other: &BookSections) -> BookSections {
    acc.into_iter()
        .filter_map(|(book, sections)| {
            let other = other.get(&book)?;
            let kept: SectionSet = sections.intersection(other).cloned().collect();
            Some((book, kept))
        })
        .collect()
}

fn union(mut acc: BookSections, other: BookSections) -> BookSections {
    for (book, sections) in other {
        acc.entry(book).or_default().extend(sections);
    }
    acc
}

/// Normalized Levenshtein similarity in [0, 1].
///
/// `1 - distance / max(len_a, len_b)` over chars; two empty strings are 1.
pub fn similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein_distance(a, b) as f64 / longest as f64
}

/// Calculate Levenshtein distance between two strings
///
/// Uses dynamic programming with O(m*n) time and O(min(m,n)) space.
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();

    let (shorter, longer) = if s1_chars.len() <= s2_chars.len() {
        (&s1_chars, &s2_chars)
    } else {
        (&s2_chars, &s1_chars)
    };

    if shorter.is_empty() {
        return longer.len();
    }

    let mut prev_row: Vec<usize> = (0..=shorter.len()).collect();
    let mut curr_row = vec![0; shorter.len() + 1];

    for (i, long_char) in longer.iter().enumerate() {
        curr_row[0] = i + 1;

        for (j, short_char) in shorter.iter().enumerate() {
            let cost = usize::from(long_char != short_char);
            curr_row[j + 1] = (prev_row[j + 1] + 1) // deletion
                .min(curr_row[j] + 1) // insertion
                .min(prev_row[j] + cost); // substitution
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[shorter.len()]
}
