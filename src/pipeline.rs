//! Build pipeline - turns source documents into a persisted index.
//!
//! For every source: extract page texts, parse numbered sections, then index
//! all books together and locate the start page of every section. A source
//! that fails to load or yields no sections is reported and skipped; the
//! rest of the run continues.

use crate::config::Config;
use crate::document::Document;
use crate::error::{IndexerError, Result};
use crate::indexer::KeywordIndexer;
use crate::locator::SearchablePages;
use crate::parser::parse_sections;
use crate::persistence::{
    IndexBundle, IndexSummary, PageEntry, PageMap, PageMaps, save_bundle, save_pages,
    write_summary,
};
use crate::section::Book;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use walkdir::WalkDir;

/// Extensions accepted as book sources.
pub const SOURCE_EXTENSIONS: &[&str] = &["pdf", "txt"];

/// Find book sources in a directory, sorted by file name.
pub fn discover_sources(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IndexerError::InvalidCorpusPath(dir.to_path_buf()));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut sources: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            entry.path().extension().and_then(|ext| {
                SOURCE_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
                    .then(|| entry.path().to_path_buf())
            })
        })
        .collect();

    if sources.is_empty() {
        return Err(IndexerError::EmptyCorpus(dir.to_path_buf()));
    }

    sources.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(sources)
}

/// Counters for one build run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessingStats {
    pub total_files: usize,
    pub successful_files: usize,
    pub failed_files: usize,
    /// Loaded but blank, without numbered sections, or replaced by a
    /// later source with the same book name.
    pub skipped_files: usize,
    pub total_sections: usize,
    pub total_keywords: usize,
    pub located_sections: usize,
    pub elapsed: Duration,
    pub failed_file_names: Vec<String>,
}

/// Everything produced by a build run.
#[derive(Debug)]
pub struct BuildOutput {
    pub bundle: IndexBundle,
    pub pages: PageMaps,
    pub stats: ProcessingStats,
}

impl BuildOutput {
    /// Persist the bundle, page maps and summary under `dir`.
    pub fn save(&self, dir: &Path) -> Result<IndexSummary> {
        save_bundle(&self.bundle, &dir.join(crate::persistence::DEFAULT_BUNDLE_FILENAME))?;
        save_pages(&self.pages, &dir.join(crate::persistence::DEFAULT_PAGES_FILENAME))?;
        let summary = write_summary(
            &self.bundle,
            &dir.join(crate::persistence::DEFAULT_SUMMARY_FILENAME),
        )?;

        tracing::info!(dir = %dir.display(), "Index files saved");
        Ok(summary)
    }
}

/// Runs extraction, parsing, indexing and page location over sources.
pub struct BuildPipeline {
    config: Config,
}

impl BuildPipeline {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn run(&self, sources: &[PathBuf]) -> BuildOutput {
        let start = Instant::now();
        let mut stats = ProcessingStats {
            total_files: sources.len(),
            ..Default::default()
        };

        tracing::info!("Found {} source files to process", sources.len());

        let mut loaded: Vec<(Book, Document)> = Vec::new();
        for (i, path) in sources.iter().enumerate() {
            tracing::info!("Progress: {}/{} files", i + 1, sources.len());

            let document = match Document::load(path) {
                Ok(document) => document,
                Err(e) => {
                    tracing::warn!("Failed to process {}: {}", path.display(), e);
                    stats.failed_files += 1;
                    stats.failed_file_names.push(display_name(path));
                    continue;
                }
            };

            if document.is_blank() {
                tracing::warn!("No text extracted from {}", document.name);
                stats.skipped_files += 1;
                continue;
            }

            let sections = parse_sections(&document.raw_content());
            if sections.is_empty() {
                tracing::warn!("No sections found in {}", document.name);
                stats.skipped_files += 1;
                continue;
            }

            if loaded.iter().any(|(book, _)| book.name == document.name) {
                tracing::warn!("Duplicate book name {}, keeping the later file", document.name);
                loaded.retain(|(book, _)| book.name != document.name);
                stats.skipped_files += 1;
            }

            tracing::info!(
                book = %document.name,
                pages = document.page_count(),
                sections = sections.len(),
                "Processed book"
            );
            loaded.push((Book::new(document.name.clone(), sections), document));
        }

        let indexer = KeywordIndexer::new(&self.config.indexing);
        let (index, stems) = indexer.build(loaded.iter().map(|(book, _)| book));

        let mut pages = PageMaps::new();
        for (book, document) in &loaded {
            let skip_pages = self.config.book(&book.name).skip_pages;
            let page_map = locate_sections(book, document, skip_pages);
            stats.located_sections += page_map.values().filter(|e| e.page.is_some()).count();
            pages.insert(book.name.clone(), page_map);
        }

        let books: Vec<Book> = loaded.into_iter().map(|(book, _)| book).collect();
        stats.successful_files = books.len();
        stats.total_sections = books.iter().map(Book::section_count).sum();
        stats.total_keywords = books.iter().map(|b| index.term_count_for(&b.name)).sum();
        stats.elapsed = start.elapsed();

        tracing::info!(
            successful = stats.successful_files,
            failed = stats.failed_files,
            skipped = stats.skipped_files,
            sections = stats.total_sections,
            keywords = stats.total_keywords,
            "Processing complete in {:.2?}",
            stats.elapsed
        );
        if !stats.failed_file_names.is_empty() {
            tracing::warn!("Failed files: {}", stats.failed_file_names.join(", "));
        }

        BuildOutput {
            bundle: IndexBundle::new(books, index, stems),
            pages,
            stats,
        }
    }
}

/// Find the start page of every section of `book`.
pub fn locate_sections(book: &Book, document: &Document, skip_pages: usize) -> PageMap {
    let pages = SearchablePages::new(document, skip_pages);
    book.sections
        .iter()
        .map(|(id, section)| {
            let found = pages.locate(&format!("{} {}", id, section.title));
            let entry = PageEntry {
                start_text: found.text,
                page: found.page,
            };
            (id.clone(), entry)
        })
        .collect()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string()
}
