//! Normalised records: what the extractor emits and the store persists.

use serde::{Deserialize, Serialize};

use crate::hierarchy::HierarchyContext;

// ─── Article-level ───────────────────────────────────────────────────────────

/// A numbered sub-item marker ("1.", "2.") that groups paragraphs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ziffer {
  pub id:   String,
  pub name: String,
}

/// An article with its footnote-resolved name and heading context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
  pub article_id:   String,
  pub article_name: String,
  pub hierarchy:    HierarchyContext,
}

/// The document-level values every paragraph of a document carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
  pub document_key: String,
  pub short_name:   String,
}

// ─── Paragraph ───────────────────────────────────────────────────────────────

/// One normalised paragraph ("Absatz") of an article.
///
/// The hierarchy is a snapshot taken when the record was emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphRecord {
  pub document_key:  String,
  pub short_name:    String,
  pub hierarchy:     HierarchyContext,
  pub article_id:    String,
  pub article_name:  String,
  pub reference:     String,
  pub ziffer:        Ziffer,
  /// The superscript-derived paragraph ordinal ("1", "2", "3bis").
  pub clause_marker: String,
  pub text:          String,
}

impl ParagraphRecord {
  pub fn key(&self) -> ParagraphKey {
    ParagraphKey {
      document_key:  self.document_key.clone(),
      hierarchy:     self.hierarchy.clone(),
      article_id:    self.article_id.clone(),
      ziffer_id:     self.ziffer.id.clone(),
      clause_marker: self.clause_marker.clone(),
    }
  }
}

/// Natural key of a paragraph row. Every field is significant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParagraphKey {
  pub document_key:  String,
  pub hierarchy:     HierarchyContext,
  pub article_id:    String,
  pub ziffer_id:     String,
  pub clause_marker: String,
}

// ─── Document ────────────────────────────────────────────────────────────────

/// Document-level metadata of one law text, keyed by `document_key` (SRN).
///
/// Fields sourced from the optional auxiliary block are `Option`s: an absent
/// entry never overwrites a stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LawDocument {
  pub document_key:    String,
  pub title:           String,
  pub preface:         String,
  pub preamble:        String,
  pub status:          String,
  pub short_name:      Option<String>,
  pub decision_date:   Option<String>,
  pub effective_date:  Option<String>,
  pub source_name:     Option<String>,
  pub chronology_link: Option<String>,
  pub amendment_link:  Option<String>,
  pub source_link:     String,
  /// Canonical link derived from `source_link`.
  pub quelle_link:     String,
}

impl LawDocument {
  pub fn document_ref(&self) -> DocumentRef {
    DocumentRef {
      document_key: self.document_key.clone(),
      short_name:   self.short_name.clone().unwrap_or_default(),
    }
  }
}
