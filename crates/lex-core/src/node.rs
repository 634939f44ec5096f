//! Content nodes: the markup units an article body is made of.
//!
//! Nodes are produced by an input adapter (e.g. the HTML adapter in
//! `lex-extract`) and consumed within one extraction pass. They are never
//! persisted.

use serde::{Deserialize, Serialize};

// ─── Inline tree ─────────────────────────────────────────────────────────────

/// One element of a node's inline markup tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Inline {
  Text(String),
  /// A superscript that is not a footnote anchor, e.g. a clause ordinal.
  Superscript(Vec<Inline>),
  /// An inline footnote marker pointing at `fragment` in the footnote table.
  /// `label` is the visible marker text ("1", "2", …).
  FootnoteRef { fragment: String, label: String },
  Link { href: String, children: Vec<Inline> },
  Emphasis(Vec<Inline>),
  LineBreak,
  /// Any other element whose children still count as text.
  Span(Vec<Inline>),
}

impl Inline {
  pub fn text(s: impl Into<String>) -> Self { Self::Text(s.into()) }

  /// Whether this inline contains no visible text at all.
  pub fn is_blank(&self) -> bool {
    match self {
      Self::Text(t) => t.trim().is_empty(),
      Self::LineBreak => true,
      _ => false,
    }
  }

  pub fn is_link(&self) -> bool {
    matches!(self, Self::Link { .. } | Self::FootnoteRef { .. })
  }

  /// The children of a container inline; empty for leaves.
  pub fn children(&self) -> &[Inline] {
    match self {
      Self::Superscript(c) | Self::Emphasis(c) | Self::Span(c) => c,
      Self::Link { children, .. } => children,
      Self::Text(_) | Self::FootnoteRef { .. } | Self::LineBreak => &[],
    }
  }

  fn push_text(&self, out: &mut String) {
    match self {
      Self::Text(t) => out.push_str(t),
      Self::LineBreak => out.push(' '),
      Self::FootnoteRef { label, .. } => out.push_str(label),
      other => {
        for child in other.children() {
          child.push_text(out);
        }
      }
    }
  }
}

/// Flatten an inline tree into its text content, untrimmed.
///
/// Unresolved footnote markers contribute their visible label.
pub fn flatten(inlines: &[Inline]) -> String {
  let mut out = String::new();
  for inline in inlines {
    inline.push_text(&mut out);
  }
  out
}

// ─── Nodes ───────────────────────────────────────────────────────────────────

/// One `term: description` pair of a definition list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionEntry {
  pub term:        Vec<Inline>,
  pub description: Vec<Inline>,
}

/// The kind of a content node together with its markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
  PlainBlock { inlines: Vec<Inline> },
  DefinitionList { entries: Vec<DefinitionEntry> },
  /// Rows of cells; each cell is an inline tree.
  Table { rows: Vec<Vec<Vec<Inline>>> },
  ItalicSpan { inlines: Vec<Inline> },
  ReferenceSpan { inlines: Vec<Inline> },
}

impl NodeKind {
  /// Short name used in log output.
  pub fn name(&self) -> &'static str {
    match self {
      Self::PlainBlock { .. } => "plain-block",
      Self::DefinitionList { .. } => "definition-list",
      Self::Table { .. } => "table",
      Self::ItalicSpan { .. } => "italic-span",
      Self::ReferenceSpan { .. } => "reference-span",
    }
  }
}

/// One markup unit of an article body, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentNode {
  /// Position of the node within its article, starting at zero.
  pub position: usize,
  pub kind:     NodeKind,
}

impl ContentNode {
  pub fn new(position: usize, kind: NodeKind) -> Self { Self { position, kind } }

  pub fn plain(position: usize, inlines: Vec<Inline>) -> Self {
    Self::new(position, NodeKind::PlainBlock { inlines })
  }

  pub fn italic(position: usize, inlines: Vec<Inline>) -> Self {
    Self::new(position, NodeKind::ItalicSpan { inlines })
  }

  pub fn reference(position: usize, inlines: Vec<Inline>) -> Self {
    Self::new(position, NodeKind::ReferenceSpan { inlines })
  }
}
