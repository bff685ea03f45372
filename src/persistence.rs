//! Persistence layer for saving/loading the index bundle and page maps.
//!
//! Supports both JSON (human-readable) and bincode (efficient binary) formats.
//! Files are always overwritten whole.

use crate::error::{IndexerError, Result};
use crate::indexer::{KeywordIndex, StemLookup};
use crate::section::{Book, SectionId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Default filename for the books + index + stems bundle.
pub const DEFAULT_BUNDLE_FILENAME: &str = "index.bin";

/// Default filename for the human-readable summary.
pub const DEFAULT_SUMMARY_FILENAME: &str = "index_summary.json";

/// Default filename for the per-book page maps.
pub const DEFAULT_PAGES_FILENAME: &str = "pages.bin";

/// Save format for persisted files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    /// JSON format (human-readable, larger).
    Json,
    /// Bincode format (binary, compact).
    Bincode,
}

impl SaveFormat {
    /// Determine format from file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => SaveFormat::Json,
            Some("bin") | Some("bincode") => SaveFormat::Bincode,
            _ => SaveFormat::Json, // Default to JSON
        }
    }
}

/// Everything a query needs: parsed books, the keyword index and stems.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexBundle {
    pub books: BTreeMap<String, Book>,
    pub index: KeywordIndex,
    pub stems: StemLookup,
}

impl IndexBundle {
    pub fn new(books: Vec<Book>, index: KeywordIndex, stems: StemLookup) -> Self {
        Self {
            books: books.into_iter().map(|b| (b.name.clone(), b)).collect(),
            index,
            stems,
        }
    }

    /// Look up a book by name.
    pub fn book(&self, name: &str) -> Result<&Book> {
        self.books
            .get(name)
            .ok_or_else(|| IndexerError::BookNotFound(name.to_string()))
    }

    /// Total sections across all books.
    pub fn section_count(&self) -> usize {
        self.books.values().map(Book::section_count).sum()
    }

    pub fn summary(&self) -> IndexSummary {
        IndexSummary::from_bundle(self)
    }
}

/// Located start of one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageEntry {
    /// Title variant found on the page, empty when unlocated.
    pub start_text: String,
    /// 1-indexed page, before any per-book offset.
    pub page: Option<usize>,
}

/// Section → located start, for one book.
pub type PageMap = BTreeMap<SectionId, PageEntry>;

/// Book name → page map.
pub type PageMaps = BTreeMap<String, PageMap>;

/// Per-book counts in a summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSummary {
    pub sections: usize,
    pub keywords: usize,
    pub words: usize,
}

/// Human-readable overview of a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSummary {
    pub books: Vec<String>,
    pub keyword_count: usize,
    pub section_count: usize,
    pub per_book: BTreeMap<String, BookSummary>,
}

impl IndexSummary {
    pub fn from_bundle(bundle: &IndexBundle) -> Self {
        let per_book = bundle
            .books
            .iter()
            .map(|(name, book)| {
                let summary = BookSummary {
                    sections: book.section_count(),
                    keywords: bundle.index.term_count_for(name),
                    words: book.word_count(),
                };
                (name.clone(), summary)
            })
            .collect();

        Self {
            books: bundle.books.keys().cloned().collect(),
            keyword_count: bundle.index.len(),
            section_count: bundle.section_count(),
            per_book,
        }
    }
}

/// Save a bundle, choosing the format from the extension.
pub fn save_bundle(bundle: &IndexBundle, path: &Path) -> Result<()> {
    save_with_format(bundle, path, SaveFormat::from_path(path))
}

/// Load a bundle, choosing the format from the extension.
pub fn load_bundle(path: &Path) -> Result<IndexBundle> {
    load_with_format(path, SaveFormat::from_path(path))
}

/// Save page maps, choosing the format from the extension.
pub fn save_pages(pages: &PageMaps, path: &Path) -> Result<()> {
    save_with_format(pages, path, SaveFormat::from_path(path))
}

/// Load page maps, choosing the format from the extension.
pub fn load_pages(path: &Path) -> Result<PageMaps> {
    load_with_format(path, SaveFormat::from_path(path))
}

/// Load page maps, treating a missing file as no located sections.
///
/// Any other failure, such as a corrupt file, is returned.
pub fn load_pages_or_empty(path: &Path) -> Result<PageMaps> {
    match load_pages(path) {
        Ok(pages) => Ok(pages),
        Err(IndexerError::IndexNotFound(path)) => {
            tracing::warn!("No page maps at {}, pages will be empty", path.display());
            Ok(PageMaps::new())
        }
        Err(e) => Err(e),
    }
}

/// Write the pretty JSON summary of a bundle.
pub fn write_summary(bundle: &IndexBundle, path: &Path) -> Result<IndexSummary> {
    let summary = bundle.summary();
    save_with_format(&summary, path, SaveFormat::Json)?;
    Ok(summary)
}

/// Serialize `value` to `path` in the given format.
pub fn save_with_format<T: Serialize>(value: &T, path: &Path, format: SaveFormat) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| IndexerError::io(parent, e))?;
        }
    }

    let data = match format {
        SaveFormat::Json => serde_json::to_string_pretty(value)?.into_bytes(),
        SaveFormat::Bincode => {
            let config = bincode::config::standard();
            bincode::serde::encode_to_vec(value, config)
                .map_err(|e| IndexerError::Serialization(e.to_string()))?
        }
    };

    fs::write(path, &data).map_err(|e| IndexerError::io(path, e))?;

    tracing::debug!(path = %path.display(), bytes = data.len(), "Saved");
    Ok(())
}

/// Deserialize a value from `path` in the given format.
pub fn load_with_format<T: DeserializeOwned>(path: &Path, format: SaveFormat) -> Result<T> {
    if !path.exists() {
        return Err(IndexerError::IndexNotFound(path.to_path_buf()));
    }

    let data = fs::read(path).map_err(|e| IndexerError::io(path, e))?;

    let value = match format {
        SaveFormat::Json => serde_json::from_slice(&data)?,
        SaveFormat::Bincode => {
            let config = bincode::config::standard();
            let (value, _): (T, usize) = bincode::serde::decode_from_slice(&data, config)
                .map_err(|e| IndexerError::Serialization(e.to_string()))?;
            value
        }
    };

    Ok(value)
}

/// Check if an index file exists at the given path.
pub fn bundle_exists(path: &Path) -> bool {
    path.exists() && path.is_file()
}

/// Get the size of a persisted file in bytes.
pub fn file_size(path: &Path) -> Result<u64> {
    let metadata = fs::metadata(path).map_err(|e| IndexerError::io(path, e))?;
    Ok(metadata.len())
}
