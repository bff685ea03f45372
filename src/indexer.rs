//! Keyword indexer - builds the term → book → sections inverted index.
//!
//! Each section's title and content are tokenized, stop words dropped,
//! and every remaining word is recorded under its stem. The index is built
//! in one pass over all books and never updated incrementally.

use crate::config::IndexingConfig;
use crate::section::{Book, SectionId};
use crate::tokenizer::Tokenizer;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Sections of one book containing a term.
pub type SectionSet = BTreeSet<SectionId>;

/// Index fragment for a single book: term → sections.
pub type BookTerms = BTreeMap<String, SectionSet>;

/// Book name → sections containing a term.
pub type Postings = BTreeMap<String, SectionSet>;

static NO_POSTINGS: Postings = BTreeMap::new();
static NO_SECTIONS: SectionSet = BTreeSet::new();

/// Inverted index over every indexed book.
///
/// Lookups never insert: a missing term or book reads as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordIndex {
    terms: BTreeMap<String, Postings>,
}

impl KeywordIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one book's fragment into the index.
    pub fn insert_book(&mut self, book: &str, fragment: BookTerms) {
        for (term, sections) in fragment {
            self.terms
                .entry(term)
                .or_default()
                .entry(book.to_string())
                .or_default()
                .extend(sections);
        }
    }

    /// Books and sections containing `term`.
    pub fn postings(&self, term: &str) -> &Postings {
        self.terms.get(term).unwrap_or(&NO_POSTINGS)
    }

    /// Sections of `book` containing `term`.
    pub fn sections(&self, term: &str, book: &str) -> &SectionSet {
        self.postings(term).get(book).unwrap_or(&NO_SECTIONS)
    }

    /// All indexed terms in lexical order.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.keys().map(String::as_str)
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Terms recorded for `book`.
    pub fn term_count_for(&self, book: &str) -> usize {
        self.terms.values().filter(|p| p.contains_key(book)).count()
    }
}

/// Original lowercase word → stem, collected while indexing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StemLookup(BTreeMap<String, String>);

impl StemLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, word: &str, stem: &str) {
        if !self.0.contains_key(word) {
            self.0.insert(word.to_string(), stem.to_string());
        }
    }

    pub fn stem_of(&self, word: &str) -> Option<&str> {
        self.0.get(word).map(String::as_str)
    }

    /// Words that reduce to `stem`.
    pub fn words_for<'a>(&'a self, stem: &'a str) -> impl Iterator<Item = &'a str> {
        self.0
            .iter()
            .filter(move |(_, s)| s.as_str() == stem)
            .map(|(w, _)| w.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Builds index fragments from parsed books.
pub struct KeywordIndexer {
    tokenizer: Tokenizer,
}

impl KeywordIndexer {
    /// Create a new keyword indexer.
    pub fn new(config: &IndexingConfig) -> Self {
        Self {
            tokenizer: Tokenizer::new(config),
        }
    }

    /// Index a single book, returning its fragment.
    pub fn index_book(&self, book: &Book) -> BookTerms {
        self.index_book_with_stems(book, &mut StemLookup::new())
    }

    fn index_book_with_stems(&self, book: &Book, stems: &mut StemLookup) -> BookTerms {
        let mut fragment = BookTerms::new();

        for (id, section) in &book.sections {
            for word in self.tokenizer.keywords(&section.full_text()) {
                let stem = self.tokenizer.stem(&word);
                stems.record(&word, &stem);
                fragment.entry(stem).or_default().insert(id.clone());
            }
        }

        tracing::debug!(
            book = %book.name,
            terms = fragment.len(),
            "Built index fragment"
        );
        fragment
    }

    /// Index every book in one pass.
    pub fn build<'a>(&self, books: impl IntoIterator<Item = &'a Book>) -> (KeywordIndex, StemLookup) {
        let mut index = KeywordIndex::new();
        let mut stems = StemLookup::new();

        for book in books {
            let fragment = self.index_book_with_stems(book, &mut stems);
            index.insert_book(&book.name, fragment);
        }

        (index, stems)
    }
}
