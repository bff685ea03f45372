//! Configuration for the book indexer.
//!
//! Supports both environment variables and YAML config file.
//! Environment variables take precedence over config file values.

use crate::error::{IndexerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

/// Shortest index term allowed.
pub const MIN_KEYWORD_LENGTH: usize = 3;

/// Keyword extraction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexingConfig {
    /// Shortest word that becomes an index term.
    pub min_keyword_length: usize,
    /// Longest word that becomes an index term.
    pub max_keyword_length: usize,
    /// Index stems instead of raw words.
    pub stem: bool,
    /// Skip the built-in English stop words.
    pub remove_stop_words: bool,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            min_keyword_length: MIN_KEYWORD_LENGTH,
            max_keyword_length: 50,
            stem: true,
            remove_stop_words: true,
        }
    }
}

/// Query settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Expand query stems to similar index terms by default.
    pub fuzzy: bool,
    /// Minimum normalized similarity (0, 1] for a fuzzy expansion.
    pub fuzzy_threshold: f64,
    /// Maximum number of expansions per query word.
    pub max_expansions: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fuzzy: true,
            fuzzy_threshold: 0.8,
            max_expansions: 3,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Display and page-correction settings for one book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookConfig {
    /// Book name as indexed (the source file stem, e.g. "book1").
    pub key: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default = "default_color")]
    pub color: String,
    /// Added to every located page number when presenting results.
    #[serde(default)]
    pub page_offset: i64,
    /// Leading pages (cover, contents) ignored by the page locator.
    #[serde(default)]
    pub skip_pages: usize,
}

fn default_icon() -> String {
    "BookOpen".to_string()
}

fn default_color() -> String {
    "indigo".to_string()
}

impl BookConfig {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: None,
            icon: default_icon(),
            color: default_color(),
            page_offset: 0,
            skip_pages: 0,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.key)
    }
}

/// Full application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the persisted index files.
    pub data_dir: PathBuf,
    pub indexing: IndexingConfig,
    pub search: SearchConfig,
    pub server: ServerConfig,
    /// Books served by the query endpoint, in display order.
    pub books: Vec<BookConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            indexing: IndexingConfig::default(),
            search: SearchConfig::default(),
            server: ServerConfig::default(),
            books: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables and optional config file.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (BOOK_INDEXER_DATA_DIR, BOOK_INDEXER_HOST, ...)
    /// 2. Config file (explicit path, else ~/.config/book-indexer/config.yaml)
    /// 3. Default values
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => match Self::config_file_path() {
                Some(default_path) if default_path.exists() => {
                    Self::load_from_file(&default_path)?
                }
                _ => Config::default(),
            },
        };

        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| IndexerError::io(path, e))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| IndexerError::Config(format!("Failed to parse config file: {}", e)))
    }

    fn apply_env(&mut self) {
        if let Ok(data_dir) = env::var("BOOK_INDEXER_DATA_DIR") {
            self.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(host) = env::var("BOOK_INDEXER_HOST") {
            self.server.host = host;
        }

        if let Ok(port) = env::var("BOOK_INDEXER_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }

        if let Ok(threshold) = env::var("BOOK_INDEXER_FUZZY_THRESHOLD") {
            if let Ok(threshold) = threshold.parse() {
                self.search.fuzzy_threshold = threshold;
            }
        }
    }

    /// Get the default config file path.
    pub fn config_file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "book-indexer")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Validate value ranges and book entries.
    pub fn validate(&self) -> Result<()> {
        let indexing = &self.indexing;
        if indexing.min_keyword_length < MIN_KEYWORD_LENGTH {
            return Err(IndexerError::Config(format!(
                "min_keyword_length must be at least {}, got {}",
                MIN_KEYWORD_LENGTH, indexing.min_keyword_length
            )));
        }

        if indexing.min_keyword_length > indexing.max_keyword_length {
            return Err(IndexerError::Config(format!(
                "Keyword length bounds are invalid: min {} max {}",
                indexing.min_keyword_length, indexing.max_keyword_length
            )));
        }

        let threshold = self.search.fuzzy_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(IndexerError::Config(format!(
                "Fuzzy threshold must be in (0, 1], got {}",
                threshold
            )));
        }

        if self.search.max_expansions == 0 {
            return Err(IndexerError::Config(
                "max_expansions must be at least 1".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for book in &self.books {
            if !seen.insert(book.key.as_str()) {
                return Err(IndexerError::Config(format!(
                    "Book '{}' is configured more than once",
                    book.key
                )));
            }
        }

        Ok(())
    }

    /// Settings for an indexed book, falling back to defaults.
    pub fn book(&self, key: &str) -> BookConfig {
        self.books
            .iter()
            .find(|b| b.key == key)
            .cloned()
            .unwrap_or_else(|| BookConfig::new(key))
    }

    /// Path of the persisted bundle.
    pub fn bundle_path(&self) -> PathBuf {
        self.data_dir.join(crate::persistence::DEFAULT_BUNDLE_FILENAME)
    }

    /// Path of the persisted page maps.
    pub fn pages_path(&self) -> PathBuf {
        self.data_dir.join(crate::persistence::DEFAULT_PAGES_FILENAME)
    }
}
