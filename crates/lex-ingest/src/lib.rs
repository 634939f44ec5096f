//! Ingest pipeline for lex.
//!
//! Connects the extractor to any [`LawStore`](lex_core::store::LawStore):
//! one [`SourceDocument`](lex_core::source::SourceDocument) in, one document
//! row and its paragraph rows upserted. The `lex` binary wraps this crate with
//! configuration, logging and a small CLI.

pub mod error;
pub mod pipeline;
pub mod source;

use std::path::PathBuf;

pub use error::{Error, Result};
use lex_extract::ExtractOptions;
use serde::Deserialize;

// ─── Configuration ───────────────────────────────────────────────────────────

fn default_store_path() -> PathBuf { PathBuf::from("lex.sqlite") }

/// Runtime configuration, deserialised from `lex.toml` and `LEX_*`
/// environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  #[serde(default)]
  pub extract:    ExtractOptions,
}

impl Default for IngestConfig {
  fn default() -> Self {
    Self { store_path: default_store_path(), extract: ExtractOptions::default() }
  }
}
