//! Document representation for the book indexer.
//!
//! Documents are represented as a collection of pages, where each page
//! has content and a page number. PDFs yield one page per PDF page; plain
//! text files are either a single page or split on form feeds.

use crate::error::{IndexerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Page separator emitted by `pdftotext`.
pub const FORM_FEED: &str = "\x0c";

/// A single page in a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// 1-indexed page number.
    pub number: usize,
    /// Text content of the page.
    pub content: String,
}

impl Page {
    /// Create a new page.
    pub fn new(number: usize, content: String) -> Self {
        Self { number, content }
    }

    /// Word count of the page text.
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

/// A document consisting of one or more pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Document name (the file stem when loaded from disk).
    pub name: String,
    /// Original file path (if loaded from file).
    pub path: Option<PathBuf>,
    /// Pages in the document.
    pub pages: Vec<Page>,
}

impl Document {
    /// Create a new document with given name and pages.
    pub fn new(name: impl Into<String>, pages: Vec<Page>) -> Self {
        Self {
            name: name.into(),
            path: None,
            pages,
        }
    }

    /// Load a document, choosing the reader from the file extension.
    ///
    /// `.pdf` goes through the PDF reader; anything else is read as text
    /// and split into pages on form feeds.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(IndexerError::DocumentNotFound(path.to_path_buf()));
        }

        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));

        if is_pdf {
            Self::from_pdf(path)
        } else {
            Self::from_text_file_with_delimiter(path, FORM_FEED)
        }
    }

    /// Extract page texts from a PDF file.
    ///
    /// A page whose text cannot be extracted is kept as an empty page so
    /// page numbers stay aligned with the PDF.
    pub fn from_pdf(path: &Path) -> Result<Self> {
        let pdf = lopdf::Document::load(path).map_err(|e| IndexerError::extraction(path, e))?;

        let mut pages = Vec::new();
        for (number, _object_id) in pdf.get_pages() {
            let content = match pdf.extract_text(&[number]) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(
                        "Error extracting page {} from {}: {}",
                        number,
                        path.display(),
                        e
                    );
                    String::new()
                }
            };
            pages.push(Page::new(number as usize, content));
        }

        Ok(Self {
            name: file_stem(path),
            path: Some(path.to_path_buf()),
            pages,
        })
    }

    /// Load a text file with custom page delimiter.
    ///
    /// Splits content on the delimiter and treats each part as a page.
    /// Blank parts still count as pages so numbering matches the source.
    pub fn from_text_file_with_delimiter(path: &Path, delimiter: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| IndexerError::io(path, e))?;

        let mut document = Self::from_text_with_delimiter(file_stem(path), &content, delimiter);
        document.path = Some(path.to_path_buf());
        Ok(document)
    }

    /// Create a single-page document from raw text content.
    pub fn from_text(name: impl Into<String>, content: String) -> Self {
        Self::new(name, vec![Page::new(1, content)])
    }

    /// Create a document from raw text split into pages on `delimiter`.
    pub fn from_text_with_delimiter(name: impl Into<String>, content: &str, delimiter: &str) -> Self {
        let mut parts: Vec<&str> = content.split(delimiter).collect();
        // A trailing delimiter does not open another page.
        if parts.len() > 1 && parts.last().is_some_and(|p| p.trim().is_empty()) {
            parts.pop();
        }

        let pages = parts
            .into_iter()
            .enumerate()
            .map(|(i, s)| Page::new(i + 1, s.to_string()))
            .collect();

        Self::new(name, pages)
    }

    /// Get total number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Get a specific page by number (1-indexed).
    pub fn get_page(&self, number: usize) -> Option<&Page> {
        self.pages.iter().find(|p| p.number == number)
    }

    /// True when no page carries any text.
    pub fn is_blank(&self) -> bool {
        self.pages.iter().all(|p| p.content.trim().is_empty())
    }

    /// Get raw content of all pages as one linear text.
    pub fn raw_content(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_page_creation() {
        let page = Page::new(1, "Hello world, this is a test.".to_string());
        assert_eq!(page.number, 1);
        assert_eq!(page.word_count(), 6);
    }

    #[test]
    fn test_document_from_text() {
        let doc = Document::from_text("Test Doc", "This is the content.".to_string());
        assert_eq!(doc.name, "Test Doc");
        assert_eq!(doc.page_count(), 1);
        assert!(doc.path.is_none());
    }

    #[test]
    fn test_document_page_access() {
        let doc = Document::from_text("Test", "Content".to_string());

        assert!(doc.get_page(0).is_none()); // 0 is invalid
        assert!(doc.get_page(1).is_some()); // Valid
        assert!(doc.get_page(2).is_none()); // Out of range
    }

    #[test]
    fn test_split_on_form_feed() {
        let doc = Document::from_text_with_delimiter("b", "one\x0c\x0cthree\x0c", FORM_FEED);
        assert_eq!(doc.page_count(), 3);
        assert_eq!(doc.get_page(3).unwrap().content, "three");
        assert!(doc.get_page(2).unwrap().content.is_empty());
    }

    #[test]
    fn test_raw_content_joins_pages() {
        let doc = Document::from_text_with_delimiter("b", "1 Intro\x0cbody", FORM_FEED);
        assert_eq!(doc.raw_content(), "1 Intro\nbody");
    }

    #[test]
    fn test_load_text_file_by_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("book2.txt");
        std::fs::write(&path, "page one\x0cpage two").unwrap();

        let doc = Document::load(&path).unwrap();
        assert_eq!(doc.name, "book2");
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Document::load(Path::new("/nonexistent/book.pdf"));
        assert!(matches!(result, Err(IndexerError::DocumentNotFound(_))));
    }

    #[test]
    fn test_corrupt_pdf_is_extraction_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf at all").unwrap();

        assert!(matches!(
            Document::load(&path),
            Err(IndexerError::Extraction { .. })
        ));
    }

    #[test]
    fn test_is_blank() {
        assert!(Document::from_text("b", "  \n".to_string()).is_blank());
        assert!(!Document::from_text("b", "x".to_string()).is_blank());
    }
}
