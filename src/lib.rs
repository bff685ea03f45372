//! Book Indexer - section-aware keyword search over PDF books.
//!
//! Books are split into numbered sections (`1`, `1.2`, `6.2.4.3`, ...), every
//! section is indexed under the stems of its words, and queries return the
//! matching sections grouped by their two-level prefix together with the page
//! on which each section starts.
//!
//! # Quick Start
//!
//! ```no_run
//! use book_indexer::{
//!     config::Config,
//!     pipeline::{BuildPipeline, discover_sources},
//!     search::SearchEngine,
//! };
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load(None)?;
//!     config.validate()?;
//!
//!     // Extract, parse and index every book in a folder
//!     let sources = discover_sources(Path::new("books"), false)?;
//!     let output = BuildPipeline::new(&config).run(&sources);
//!     output.save(&config.data_dir)?;
//!
//!     // Search with stemming and fuzzy expansion
//!     let engine = SearchEngine::new(&output.bundle.index, &config.indexing, config.search.clone());
//!     for (book, sections) in engine.search("risk planning", false, true) {
//!         println!("{}: {:?}", book, sections);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **Document**: page texts extracted from a PDF or text file
//! - **Parser**: splits linear text into numbered sections
//! - **KeywordIndexer**: builds the term → book → sections index
//! - **SearchEngine**: stemmed, optionally fuzzy, AND/OR queries
//! - **Locator**: finds the page on which each section starts
//! - **Server**: HTTP query endpoint over a persisted index

pub mod assembly;
pub mod config;
pub mod document;
pub mod error;
pub mod hierarchy;
pub mod indexer;
pub mod locator;
pub mod parser;
pub mod persistence;
pub mod pipeline;
pub mod search;
pub mod section;
pub mod server;
pub mod tokenizer;

// Re-export commonly used types
pub use config::Config;
pub use document::Document;
pub use error::{IndexerError, Result};
pub use indexer::{KeywordIndex, KeywordIndexer};
pub use persistence::{IndexBundle, load_bundle, save_bundle};
pub use pipeline::BuildPipeline;
pub use search::{SearchEngine, SearchHits};
pub use section::{Book, Section, SectionId};
