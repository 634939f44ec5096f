//! Law-text extraction for lex.
//!
//! Turns one [`SourceDocument`] into a normalised [`LawDocument`] plus the
//! ordered [`ParagraphRecord`]s of every article. Pure synchronous; no
//! database dependencies. [`parse_html`] adapts a consolidated-law HTML page
//! into a [`SourceDocument`].
//!
//! # Quick start
//!
//! ```no_run
//! use lex_extract::{ExtractOptions, extract, parse_html};
//!
//! let html = std::fs::read_to_string("101.html").unwrap();
//! let source = parse_html(&html, None).unwrap();
//! let extraction = extract(&source, &ExtractOptions::default());
//! println!("{} paragraphs", extraction.paragraphs().count());
//! ```

pub mod document;
pub mod error;
pub mod footnote;
pub mod heading;
pub mod html;
pub mod paragraph;
mod text;
pub mod warning;

pub use error::{Error, Result};
use lex_core::{
  record::{Article, LawDocument, ParagraphRecord},
  source::SourceDocument,
};
use serde::Deserialize;
pub use warning::Warning;

use crate::{
  document::DocumentAssembler, footnote::FootnoteResolver,
  paragraph::ParagraphAssembler, warning::Warnings,
};

// ─── Options ─────────────────────────────────────────────────────────────────

fn default_ziffer_keywords() -> Vec<String> {
  [
    "Übergangsbestimmung",
    "Übergangsbestimmungen",
    "Schlussbestimmung",
    "Schlussbestimmungen",
  ]
  .map(String::from)
  .to_vec()
}

/// Tunables of one extraction pass.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractOptions {
  /// Node texts that open a ziffer without starting with a digit. Matched
  /// exactly after whitespace normalisation.
  #[serde(default = "default_ziffer_keywords")]
  pub ziffer_keywords: Vec<String>,
}

impl Default for ExtractOptions {
  fn default() -> Self { Self { ziffer_keywords: default_ziffer_keywords() } }
}

// ─── Output ──────────────────────────────────────────────────────────────────

/// One article and the records it produced.
#[derive(Debug, Clone)]
pub struct ExtractedArticle {
  pub article:    Article,
  pub paragraphs: Vec<ParagraphRecord>,
}

/// The result of extracting one document.
#[derive(Debug, Clone)]
pub struct Extraction {
  pub document: LawDocument,
  /// Articles in document order.
  pub articles: Vec<ExtractedArticle>,
  pub warnings: Vec<Warning>,
}

impl Extraction {
  /// Every paragraph record in document order.
  pub fn paragraphs(&self) -> impl Iterator<Item = &ParagraphRecord> {
    self.articles.iter().flat_map(|a| a.paragraphs.iter())
  }
}

// ─── Public API ──────────────────────────────────────────────────────────────

/// Run one extraction pass over `source`.
///
/// Never fails: recoverable problems are collected in
/// [`Extraction::warnings`].
pub fn extract(source: &SourceDocument, options: &ExtractOptions) -> Extraction {
  let mut warnings = Warnings::default();
  let resolver = FootnoteResolver::new(&source.footnotes);

  let document = DocumentAssembler::new(resolver).assemble(&source.metadata, &mut warnings);
  let document_ref = document.document_ref();
  let assembler = ParagraphAssembler::new(&document_ref, resolver, options);

  let articles = source
    .articles
    .iter()
    .map(|article_source| {
      for tag in &article_source.skipped {
        let detail = format!("unclassifiable <{tag}> node skipped");
        warnings.ambiguity(&article_source.article_id, detail);
      }
      let article = heading::article(article_source, &resolver, &mut warnings);
      let paragraphs = assembler.assemble(&article, &article_source.nodes, &mut warnings);
      ExtractedArticle { article, paragraphs }
    })
    .collect::<Vec<_>>();

  tracing::debug!(
    document = %document.document_key,
    articles = articles.len(),
    warnings = warnings.len(),
    "document extracted"
  );

  Extraction { document, articles, warnings: warnings.into_vec() }
}

/// Parse a law-text HTML page. `fallback_url` is used as the source link
/// when the page does not name its own canonical URL.
pub fn parse_html(html: &str, fallback_url: Option<&str>) -> Result<SourceDocument> {
  html::parse_document(html, fallback_url)
}
