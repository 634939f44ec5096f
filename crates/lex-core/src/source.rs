//! The input contract: what an input adapter hands to the extractor for one
//! document.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
  hierarchy::HeadingLevel,
  node::{ContentNode, Inline},
};

// ─── Footnotes ───────────────────────────────────────────────────────────────

/// Footnote texts of one document, keyed by fragment identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FootnoteTable {
  entries: HashMap<String, String>,
}

impl FootnoteTable {
  pub fn new() -> Self { Self::default() }

  pub fn insert(&mut self, fragment: impl Into<String>, text: impl Into<String>) {
    self.entries.insert(fragment.into(), text.into());
  }

  pub fn get(&self, fragment: &str) -> Option<&str> {
    self.entries.get(fragment).map(String::as_str)
  }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FootnoteTable {
  fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
    Self {
      entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
    }
  }
}

// ─── Articles ────────────────────────────────────────────────────────────────

/// A sectioning container enclosing an article.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
  /// The container's heading markup, if it carries one.
  pub heading:        Option<Vec<Inline>>,
  /// Level declared explicitly by the source markup, when it does so.
  pub declared_level: Option<HeadingLevel>,
}

impl Container {
  pub fn headed(heading: Vec<Inline>) -> Self {
    Self { heading: Some(heading), declared_level: None }
  }
}

/// One article as supplied by the input adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSource {
  pub article_id: String,
  pub heading:    Vec<Inline>,
  /// Enclosing containers, nearest first.
  pub containers: Vec<Container>,
  /// Body nodes in document order.
  pub nodes:      Vec<ContentNode>,
  /// Tag names of body elements the adapter could not classify.
  #[serde(default)]
  pub skipped:    Vec<String>,
}

// ─── Document ────────────────────────────────────────────────────────────────

/// Raw document-level fields before normalisation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMetadata {
  pub document_key: String,
  pub title:        String,
  pub preface:      Option<Vec<Inline>>,
  pub preamble:     Option<Vec<Inline>>,
  /// `None` when the page carries no in-force indicator at all.
  pub in_force:     Option<bool>,
  /// Label/value pairs of the auxiliary block, in page order.
  pub auxiliary:    Vec<(String, String)>,
  pub source_url:   String,
}

/// Everything the extractor needs for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
  pub metadata:  RawMetadata,
  pub footnotes: FootnoteTable,
  pub articles:  Vec<ArticleSource>,
}
