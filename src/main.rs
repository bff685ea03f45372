//! Book Indexer CLI
//!
//! Section-aware keyword indexing and fuzzy search over PDF books.

use anyhow::{Context, Result};
use book_indexer::{
    assembly::assemble,
    config::Config,
    document::Document,
    hierarchy::SectionTree,
    locator::locate,
    persistence::{bundle_exists, file_size, load_bundle, load_pages_or_empty},
    pipeline::{BuildPipeline, discover_sources},
    search::SearchEngine,
    server::{AppState, serve},
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Book Indexer - section-aware keyword search over PDF books
#[derive(Parser)]
#[command(name = "book-indexer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract, parse and index books (PDF or text files, or folders of them)
    Build {
        /// Source files or directories
        #[arg(required = true)]
        sources: Vec<PathBuf>,

        /// Output directory for the index files (defaults to data_dir)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Descend into subdirectories of source folders
        #[arg(short, long)]
        recursive: bool,
    },

    /// Search the index
    Search {
        /// The search query
        query: String,

        /// Require every query word to match (AND)
        #[arg(long)]
        strict: bool,

        /// Disable fuzzy expansion
        #[arg(long)]
        exact: bool,

        /// Show how each query word was resolved
        #[arg(long)]
        explain: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Display the section outline of a book
    Show {
        /// Book name (source file stem)
        book: String,

        /// Output as JSON instead of formatted tree
        #[arg(long)]
        json: bool,
    },

    /// Print the content of one section
    Content {
        /// Book name (source file stem)
        book: String,

        /// Section identifier, e.g. 4.3.1
        section: String,
    },

    /// Show information about the index
    Info,

    /// Find the page on which a title starts in a document
    Locate {
        /// Path to the PDF or text file
        document: PathBuf,

        /// Section title to look for
        title: String,

        /// Leading pages to ignore
        #[arg(long, default_value_t = 0)]
        skip: usize,
    },

    /// Run the HTTP query endpoint
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    match cli.command {
        Commands::Build {
            sources,
            output,
            recursive,
        } => cmd_build(&config, sources, output, recursive),
        Commands::Search {
            query,
            strict,
            exact,
            explain,
            json,
        } => cmd_search(&config, &query, strict, exact, explain, json),
        Commands::Show { book, json } => cmd_show(&config, &book, json),
        Commands::Content { book, section } => cmd_content(&config, &book, &section),
        Commands::Info => cmd_info(&config),
        Commands::Locate {
            document,
            title,
            skip,
        } => cmd_locate(&document, &title, skip),
        Commands::Serve { host, port } => cmd_serve(config, host, port).await,
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("book_indexer=info,tower_http=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn cmd_build(
    config: &Config,
    sources: Vec<PathBuf>,
    output: Option<PathBuf>,
    recursive: bool,
) -> Result<()> {
    let mut files = Vec::new();
    for source in sources {
        if source.is_dir() {
            let found = discover_sources(&source, recursive)
                .with_context(|| format!("Failed to scan {}", source.display()))?;
            files.extend(found);
        } else {
            files.push(source);
        }
    }

    println!("Indexing {} source files", files.len());
    let output_dir = output.unwrap_or_else(|| config.data_dir.clone());

    let result = BuildPipeline::new(config).run(&files);
    let stats = &result.stats;

    if result.bundle.books.is_empty() {
        anyhow::bail!("No book produced any sections; nothing to save");
    }

    let summary = result.save(&output_dir).context("Failed to save index")?;

    println!("\nIndex Built:");
    println!("  Books:       {}", stats.successful_files);
    println!("  Failed:      {}", stats.failed_files);
    println!("  Skipped:     {}", stats.skipped_files);
    println!("  Sections:    {}", summary.section_count);
    println!("  Keywords:    {}", summary.keyword_count);
    println!(
        "  Located:     {}/{}",
        stats.located_sections, summary.section_count
    );
    println!("  Build time:  {:.2?}", stats.elapsed);

    if !stats.failed_file_names.is_empty() {
        println!("  Failed files: {}", stats.failed_file_names.join(", "));
    }

    println!("\nIndex saved to: {}", output_dir.display());
    Ok(())
}

fn load_state(config: &Config) -> Result<AppState> {
    let path = config.bundle_path();
    if !bundle_exists(&path) {
        anyhow::bail!(
            "Index not found at '{}'. Run 'build' command first.",
            path.display()
        );
    }

    AppState::load(config.clone()).context("Failed to load index")
}

fn cmd_search(
    config: &Config,
    query: &str,
    strict: bool,
    exact: bool,
    explain: bool,
    json: bool,
) -> Result<()> {
    let state = load_state(config)?;
    let fuzzy = config.search.fuzzy && !exact;
    let engine = SearchEngine::new(&state.bundle.index, &config.indexing, config.search.clone());

    let start = Instant::now();
    let hits = engine.search(query, strict, fuzzy);
    let response = assemble(&state.bundle, &state.pages, config, &hits);
    let search_duration = start.elapsed();

    if json {
        let json_str =
            serde_json::to_string_pretty(&response).context("Failed to serialize results")?;
        println!("{}", json_str);
        return Ok(());
    }

    if explain {
        for word in engine.explain(query, fuzzy) {
            let expansions: Vec<String> = word
                .expansions
                .iter()
                .map(|e| format!("{} ({:.2})", e.term, e.similarity))
                .collect();
            println!("  {} → {} [{}]", word.word, word.stem, expansions.join(", "));
        }
        println!();
    }

    if response.hit_count() == 0 {
        println!("No matching sections found.");
        return Ok(());
    }

    println!("Results for \"{}\":", query);
    println!("{}", "─".repeat(60));

    for (_, book) in &response.0 {
        if book.sections.is_empty() {
            continue;
        }
        println!("{}", book.name);
        for group in &book.sections {
            println!("  {:>2}. {} {}", group.id, group.number, group.title);
            for sub in &group.subsections {
                let page = sub
                    .page
                    .map(|p| format!("p. {}", p))
                    .unwrap_or_else(|| "p. ?".to_string());
                println!("        {:<12} {:<8} {}", sub.section.as_str(), page, sub.title);
            }
        }
        println!();
    }

    println!("{}", "─".repeat(60));
    println!(
        "Found {} sections in {:.2?}",
        response.hit_count(),
        search_duration
    );

    Ok(())
}

fn cmd_show(config: &Config, book_name: &str, json: bool) -> Result<()> {
    let bundle = load_bundle(&config.bundle_path()).context("Failed to load index")?;
    let book = bundle.book(book_name)?;
    let tree = SectionTree::from_book(book);

    if json {
        let json_str = serde_json::to_string_pretty(&tree).context("Failed to serialize tree")?;
        println!("{}", json_str);
    } else {
        println!("{}", tree.format());
    }

    Ok(())
}

fn cmd_content(config: &Config, book_name: &str, section_id: &str) -> Result<()> {
    let bundle = load_bundle(&config.bundle_path()).context("Failed to load index")?;
    let section = bundle.book(book_name)?.section(section_id)?;

    println!("{} {}", section_id, section.title);
    println!("{}", "─".repeat(60));
    println!("{}", section.content);
    println!("{}", "─".repeat(60));
    println!("{} words", section.word_count);

    Ok(())
}

fn cmd_info(config: &Config) -> Result<()> {
    let path = config.bundle_path();
    if !bundle_exists(&path) {
        anyhow::bail!(
            "Index not found at '{}'. Run 'build' command first.",
            path.display()
        );
    }

    let bundle = load_bundle(&path).context("Failed to load index")?;
    let summary = bundle.summary();
    let size = file_size(&path)?;
    let pages = load_pages_or_empty(&config.pages_path()).context("Failed to load page maps")?;

    println!("Index Information");
    println!("{}", "─".repeat(40));
    println!("  Books:        {}", summary.books.len());
    println!("  Sections:     {}", summary.section_count);
    println!("  Keywords:     {}", summary.keyword_count);
    println!("  Stems:        {}", bundle.stems.len());
    println!("  File size:    {:.1} KB", size as f64 / 1024.0);
    println!("  Index path:   {}", path.display());
    println!();

    for (name, book) in &summary.per_book {
        let located = pages
            .get(name)
            .map(|map| map.values().filter(|e| e.page.is_some()).count())
            .unwrap_or(0);
        println!(
            "  {:<16} {:>5} sections {:>6} keywords {:>8} words {:>5} located",
            name, book.sections, book.keywords, book.words, located
        );
    }

    Ok(())
}

fn cmd_locate(document_path: &Path, title: &str, skip: usize) -> Result<()> {
    let document = Document::load(document_path).context("Failed to load document")?;
    let found = locate(&document, title, skip);

    match found.page {
        Some(page) => println!("Page {}: \"{}\"", page, found.text),
        None => println!("\"{}\" not found in {}", title, document.name),
    }

    Ok(())
}

async fn cmd_serve(mut config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let state = load_state(&config)?;
    println!(
        "Serving {} books on http://{}",
        state.bundle.books.len(),
        config.server.address()
    );

    serve(state).await.context("Server error")
}
