use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use term_search_core::{
    DocumentCache, LoadReport, OrderingPolicy, SearchCoordinator, SearchOptions, SearchResults,
    DEFAULT_CATCH_ALL_PREFIX, DEFAULT_SNIPPET_RADIUS,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "term-search", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Folder holding the .pdf and .docx corpus
    #[arg(long, env = "TERM_SEARCH_FOLDER", default_value = "documents")]
    folder: String,

    /// Characters of context kept on each side of a match
    #[arg(long, env = "TERM_SEARCH_SNIPPET_RADIUS", default_value_t = DEFAULT_SNIPPET_RADIUS)]
    snippet_radius: usize,

    /// Maximum documents searched at the same time (defaults to available cores)
    #[arg(long, env = "TERM_SEARCH_MAX_WORKERS")]
    max_workers: Option<usize>,

    /// Upper bound on a single search, in seconds
    #[arg(long, env = "TERM_SEARCH_TIMEOUT_SECS", default_value = "30")]
    timeout_secs: u64,

    /// Documents whose name starts with this prefix are listed last
    #[arg(long, env = "TERM_SEARCH_CATCH_ALL_PREFIX", default_value = DEFAULT_CATCH_ALL_PREFIX)]
    catch_all_prefix: String,
}

#[derive(Subcommand)]
enum Command {
    /// Load the corpus and print the load report.
    Load,
    /// Count whole-word occurrences of a term in every document.
    Search {
        /// Term to search for
        #[arg(long)]
        term: String,
        /// Print the results as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the snippets of one document for a term.
    Snippets {
        /// Document file name, as listed by `search`
        #[arg(long)]
        document: String,
        /// Term to search for
        #[arg(long)]
        term: String,
    },
    /// Read terms from stdin against one warm cache (`:reload`, `:quit`).
    Interactive,
}

impl Cli {
    fn search_options(&self) -> SearchOptions {
        let defaults = SearchOptions::default();
        SearchOptions {
            snippet_radius: self.snippet_radius,
            max_workers: self.max_workers.unwrap_or(defaults.max_workers).max(1),
            search_timeout: Duration::from_secs(self.timeout_secs.max(1)),
            ordering: OrderingPolicy::new(self.catch_all_prefix.as_str()),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    let coordinator = SearchCoordinator::new(Arc::new(DocumentCache::default()), cli.search_options());
    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        folder = %cli.folder,
        "term-search boot"
    );

    let report = coordinator
        .reload_corpus(&cli.folder)
        .await
        .with_context(|| format!("failed to load corpus from {}", cli.folder))?;
    log_report(&report);

    match cli.command {
        Command::Load => print_report(&report),
        Command::Search { term, json } => {
            let results = coordinator.search(&term).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                print_results(&results);
            }
        }
        Command::Snippets { document, term } => {
            let snippets = coordinator.get_snippets(&document, &term)?;
            println!("document: {document} occurrences={}", snippets.len());
            for (index, snippet) in snippets.iter().enumerate() {
                println!("  [{}] ...{snippet}...", index + 1);
            }
        }
        Command::Interactive => {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                match line.trim() {
                    ":quit" | ":q" => break,
                    ":reload" => match coordinator.reload_corpus(&cli.folder).await {
                        Ok(report) => {
                            log_report(&report);
                            print_report(&report);
                        }
                        Err(error) => println!("reload failed: {error}"),
                    },
                    term => match coordinator.search(term).await {
                        Ok(results) => print_results(&results),
                        Err(error) => println!("search failed: {error}"),
                    },
                }
            }
        }
    }

    Ok(())
}

fn log_report(report: &LoadReport) {
    if !report.skipped.is_empty() {
        warn!(
            "skipped_documents={} for folder={}",
            report.skipped.len(),
            report.folder.display()
        );
        for skipped in &report.skipped {
            warn!(path = %skipped.path.display(), reason = %skipped.reason, "skipped document");
        }
    }
    info!(
        folder = %report.folder.display(),
        loaded = report.loaded,
        ignored = report.ignored,
        "corpus ready"
    );
}

fn print_report(report: &LoadReport) {
    println!(
        "{} documents loaded from {} at {}",
        report.loaded,
        report.folder.display(),
        report.loaded_at.to_rfc3339()
    );
    if report.ignored > 0 {
        println!("{} unsupported files ignored", report.ignored);
    }
    for skipped in &report.skipped {
        println!("skipped {}: {}", skipped.path.display(), skipped.reason);
    }
}

fn print_results(results: &SearchResults) {
    if results.term.is_empty() {
        println!("empty search term");
        return;
    }
    if results.is_empty() {
        println!("no results found for \"{}\"", results.term);
    }

    for hit in &results.hits {
        let modified = hit
            .modified_at
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{} type={} modified={} occurrences={}",
            hit.document_id,
            hit.kind.label(),
            modified,
            hit.count
        );
        for snippet in &hit.snippets {
            println!("  ...{snippet}...");
        }
    }

    if !results.is_empty() {
        println!(
            "summary: documents={} occurrences={}",
            results.hits.len(),
            results.total_occurrences()
        );
        for (kind, count) in results.kind_breakdown() {
            println!("  {}: {count}", kind.label());
        }

        let widest = results
            .frequency_series()
            .iter()
            .map(|(name, _)| name.chars().count())
            .max()
            .unwrap_or(0);
        println!("frequency by document:");
        for (name, count) in results.frequency_series() {
            println!("  {name:<widest$} {count}");
        }
    }

    for failure in &results.failures {
        println!("not searched {}: {}", failure.document_id, failure.reason);
    }
}
