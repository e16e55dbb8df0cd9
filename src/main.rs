use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use evidence_collector::collect::Collector;
use evidence_collector::config::Config;
use evidence_collector::db::Db;
use evidence_collector::parser::DocumentParser;
use evidence_collector::parser::chunker::SemanticChunker;
use evidence_collector::report;
use evidence_collector::sources::{HttpSources, ObservationSource};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex as TokioMutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Collects filing evidence and external AI-readiness signals for a fixed
/// set of companies.
#[derive(Parser)]
#[command(name = "evidence", version, about)]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(long, global = true, default_value = "config.json")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and chunk local filings, then fetch and score external signals.
    Collect {
        /// `all` or a comma-separated list of tickers.
        #[arg(long, default_value = "all")]
        companies: String,

        /// Skip local filings and only collect signals.
        #[arg(long)]
        signals_only: bool,
    },

    /// Write the Markdown and CSV signal reports.
    Report,

    /// Parse and chunk one local filing and print a summary of its chunks.
    Chunk {
        file: PathBuf,

        #[arg(long, default_value = "UNKNOWN")]
        ticker: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)?;
    config.apply_env();
    config.validate().context("Invalid configuration")?;

    match cli.command {
        Commands::Collect {
            companies,
            signals_only,
        } => run_collect(&config, &companies, signals_only),
        Commands::Report => run_report(&config),
        Commands::Chunk { file, ticker } => run_chunk(&config, &file, &ticker),
    }
}

fn run_collect(config: &Config, selection: &str, signals_only: bool) -> Result<()> {
    let companies = config.select_companies(selection);
    anyhow::ensure!(!companies.is_empty(), "no companies selected by '{selection}'");

    // The blocking HTTP client owns its own runtime; it is built and dropped
    // outside the async one.
    let sources = Arc::new(HttpSources::new(config).context("Failed to build HTTP client")?);
    info!(providers = ?sources.configured(), "configured providers");

    let db = Db::open(&config.db_path).context("Failed to open database")?;
    let db = Arc::new(TokioMutex::new(db));

    let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
    let source: Arc<dyn ObservationSource> = sources.clone();
    let collector = Collector::new(config, Arc::clone(&db), source);

    let (stats, totals) = runtime.block_on(async {
        let stats = collector.collect(&companies, signals_only).await;
        let totals = collector.db.lock().await.evidence_stats();
        (stats, totals)
    });
    drop(collector);
    drop(runtime);

    let totals = totals.context("Failed to read database totals")?;
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({ "run": stats, "database": totals }))?
    );
    Ok(())
}

fn run_report(config: &Config) -> Result<()> {
    let db = Db::open(&config.db_path).context("Failed to open database")?;
    let rows = report::build_rows(&db.list_summary_rows()?);

    if rows.is_empty() {
        println!("No signal summaries found. Run `evidence collect --signals-only` first.");
        return Ok(());
    }

    let (md, csv) = report::write_reports(Path::new(&config.report_dir), &rows)?;
    println!("{}", md.display());
    println!("{}", csv.display());
    Ok(())
}

fn run_chunk(config: &Config, file: &Path, ticker: &str) -> Result<()> {
    let doc = DocumentParser::default()
        .parse_filing(file, ticker)
        .with_context(|| format!("Failed to parse {}", file.display()))?;
    let chunker = SemanticChunker::new(
        config.chunk_size,
        config.chunk_overlap,
        config.min_chunk_size,
    );
    let chunks = chunker.chunk_document(&doc);

    let summary = json!({
        "ticker": doc.ticker,
        "filing_type": doc.filing_type,
        "filing_date": doc.filing_date,
        "content_hash": doc.content_hash,
        "word_count": doc.word_count,
        "sections": doc.sections.iter().map(|s| &s.name).collect::<Vec<_>>(),
        "chunk_count": chunks.len(),
        "chunks": chunks.iter().map(|c| json!({
            "index": c.chunk_index,
            "section": c.section,
            "start_char": c.start_char,
            "end_char": c.end_char,
            "word_count": c.word_count,
        })).collect::<Vec<_>>(),
    });

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
