//! lex command-line binary.
//!
//! Reads `lex.toml` (or the path specified with `--config`), opens the SQLite
//! store and ingests saved law pages or prints what is stored.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use lex_core::{history::DocumentVersions, store::LawStore};
use lex_ingest::{IngestConfig, pipeline, source};
use lex_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Consolidated law text normaliser")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "lex.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Ingest saved law pages (files or directories of *.html).
  Ingest {
    #[arg(required = true)]
    paths:      Vec<PathBuf>,
    /// Source link for pages that do not name their own canonical URL.
    #[arg(long)]
    source_url: Option<String>,
  },
  /// Show the stored versions of one document.
  Show {
    key:        String,
    /// Print JSON instead of a summary.
    #[arg(long)]
    json:       bool,
    /// Include the current paragraph rows.
    #[arg(long)]
    paragraphs: bool,
  },
  /// Print the most recent error ledger entries.
  Errors {
    #[arg(short = 'n', long, default_value_t = 20)]
    limit: usize,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config.clone()).required(false))
    .add_source(config::Environment::with_prefix("LEX"))
    .build()
    .context("failed to read config file")?;

  let cfg: IngestConfig = settings
    .try_deserialize()
    .context("failed to deserialise IngestConfig")?;

  let store_path = expand_tilde(&cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  match cli.command {
    Command::Ingest { paths, source_url } => ingest(&store, &cfg, &paths, source_url.as_deref()).await,
    Command::Show { key, json, paragraphs } => show(&store, &key, json, paragraphs).await,
    Command::Errors { limit } => errors(&store, limit).await,
  }
}

async fn ingest(
  store: &SqliteStore,
  cfg: &IngestConfig,
  paths: &[PathBuf],
  source_url: Option<&str>,
) -> anyhow::Result<()> {
  let pages = source::collect_pages(paths)?;
  let mut failed_pages = 0;

  for page in &pages {
    let document = match source::load_page(page, source_url) {
      Ok(document) => document,
      Err(e) => {
        tracing::error!(error = %e, "skipping page");
        failed_pages += 1;
        continue;
      }
    };
    let report = pipeline::ingest(store, &document, &cfg.extract).await;
    println!(
      "{}: document {} | {} paragraphs: {} new, {} updated, {} unchanged, {} failed | {} warnings",
      report.document_key,
      report.document.map_or("failed".to_owned(), |o| format!("{o:?}").to_lowercase()),
      report.paragraphs(),
      report.inserted,
      report.updated,
      report.unchanged,
      report.failed,
      report.warnings,
    );
  }

  if failed_pages > 0 {
    anyhow::bail!("{failed_pages} of {} pages could not be read", pages.len());
  }
  Ok(())
}

async fn show(store: &SqliteStore, key: &str, json: bool, paragraphs: bool) -> anyhow::Result<()> {
  let Some(versions) = store.document_versions(key).await? else {
    anyhow::bail!("no document stored under {key:?}");
  };
  let rows = if paragraphs { Some(store.list_paragraphs(key).await?) } else { None };

  if json {
    let value = serde_json::json!({ "document": versions, "paragraphs": rows });
    println!("{}", serde_json::to_string_pretty(&value)?);
    return Ok(());
  }

  print_versions(&versions);
  for row in rows.iter().flatten() {
    let p = &row.value;
    println!();
    println!("[{}] {} Abs. {} (Ziffer {:?})", row.row_id, p.article_id, p.clause_marker, p.ziffer.id);
    println!("{}", p.text);
  }
  Ok(())
}

fn print_versions(versions: &DocumentVersions) {
  let doc = &versions.current.value;
  println!("{} {}", doc.document_key, doc.title);
  println!("  status:    {}", doc.status);
  if let Some(short_name) = &doc.short_name {
    println!("  short:     {short_name}");
  }
  println!("  source:    {}", doc.source_link);
  println!("  stored:    {}", versions.current.inserted_at);
  for archived in &versions.archived {
    println!(
      "  archived:  {} (version of {})",
      archived.archived_at, archived.snapshot.inserted_at
    );
  }
}

async fn errors(store: &SqliteStore, limit: usize) -> anyhow::Result<()> {
  for entry in store.error_ledger(limit).await? {
    println!("{} {} {}", entry.logged_at, entry.key, entry.message);
  }
  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
