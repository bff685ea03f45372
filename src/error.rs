//! Error types for the book indexer.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our custom error.
pub type Result<T> = std::result::Result<T, IndexerError>;

/// Errors that can occur while building, persisting or querying an index.
#[derive(Error, Debug)]
pub enum IndexerError {
    /// Error reading or writing files.
    #[error("I/O error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error during serialization/deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The document path does not exist.
    #[error("Document not found at '{0}'")]
    DocumentNotFound(PathBuf),

    /// The corpus directory does not exist or is not a directory.
    #[error("Corpus path '{0}' does not exist or is not a directory")]
    InvalidCorpusPath(PathBuf),

    /// No documents found in the corpus.
    #[error("No documents found in corpus at '{0}'")]
    EmptyCorpus(PathBuf),

    /// The index file does not exist.
    #[error("Index file not found at '{0}'")]
    IndexNotFound(PathBuf),

    /// The PDF collaborator could not decode a document.
    #[error("Failed to extract text from '{path}': {message}")]
    Extraction { path: PathBuf, message: String },

    /// A string that is not a dotted numeric section identifier.
    #[error("Invalid section identifier '{0}'")]
    InvalidSectionId(String),

    /// No book with this name is indexed.
    #[error("Book '{0}' not found")]
    BookNotFound(String),

    /// The book exists but has no such section.
    #[error("Section '{section}' not found in '{book}'")]
    SectionNotFound { book: String, section: String },

    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl IndexerError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an extraction error with path context.
    pub fn extraction(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Extraction {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

impl From<serde_json::Error> for IndexerError {
    fn from(err: serde_json::Error) -> Self {
        IndexerError::Serialization(err.to_string())
    }
}
