//! Inline footnote resolution.
//!
//! Every [`Inline::FootnoteRef`] whose fragment is in the table is replaced
//! by the literal text ` footnote{<text>}`. Markers that cannot be resolved
//! stay in the tree and surface as their visible label.

use lex_core::{
  node::{Inline, flatten},
  source::FootnoteTable,
};

use crate::warning::Warnings;

/// Resolves footnote markers against one document's footnote table.
#[derive(Debug, Clone, Copy)]
pub struct FootnoteResolver<'a> {
  table: &'a FootnoteTable,
}

impl<'a> FootnoteResolver<'a> {
  pub fn new(table: &'a FootnoteTable) -> Self { Self { table } }

  /// Return a copy of `inlines` with every resolvable marker replaced.
  ///
  /// Resolved output contains no markers for known fragments, so resolving
  /// it again yields the same tree.
  pub fn resolve_tree(&self, inlines: &[Inline], warnings: &mut Warnings) -> Vec<Inline> {
    inlines
      .iter()
      .map(|inline| self.resolve_inline(inline, warnings))
      .collect()
  }

  /// Resolve markers and flatten to text. Whitespace is left untouched.
  pub fn resolve(&self, inlines: &[Inline], warnings: &mut Warnings) -> String {
    flatten(&self.resolve_tree(inlines, warnings))
  }

  fn resolve_inline(&self, inline: &Inline, warnings: &mut Warnings) -> Inline {
    match inline {
      Inline::FootnoteRef { fragment, .. } => match self.table.get(fragment) {
        Some(text) => Inline::Text(format!(" footnote{{{}}}", text.trim())),
        None => {
          warnings.missing_footnote(fragment);
          inline.clone()
        }
      },
      Inline::Superscript(children) => {
        Inline::Superscript(self.resolve_tree(children, warnings))
      }
      Inline::Emphasis(children) => Inline::Emphasis(self.resolve_tree(children, warnings)),
      Inline::Span(children) => Inline::Span(self.resolve_tree(children, warnings)),
      Inline::Link { href, children } => Inline::Link {
        href:     href.clone(),
        children: self.resolve_tree(children, warnings),
      },
      Inline::Text(_) | Inline::LineBreak => inline.clone(),
    }
  }
}
