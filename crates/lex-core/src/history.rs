//! Stored rows, archived versions and the error ledger.
//!
//! Exactly one current row exists per natural key. Every overwrite first
//! copies the current row, verbatim, into an append-only history table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::{LawDocument, ParagraphRecord};

// ─── Upsert result ───────────────────────────────────────────────────────────

/// What an upsert did to the current row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
  Inserted,
  /// The prior version was archived and the changed fields were written.
  Updated,
  /// Nothing differed; no write happened.
  Unchanged,
}

// ─── Stored rows ─────────────────────────────────────────────────────────────

/// A current row together with its store-assigned metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stored<T> {
  pub row_id:      i64,
  pub inserted_at: DateTime<Utc>,
  pub value:       T,
}

pub type StoredDocument = Stored<LawDocument>;
pub type StoredParagraph = Stored<ParagraphRecord>;

/// A verbatim prior snapshot of a current row. Never mutated once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord<T> {
  pub history_id:  i64,
  /// The archived row as it was, including its own metadata.
  pub snapshot:    Stored<T>,
  pub archived_at: DateTime<Utc>,
}

/// The current version of a document plus every archived version, oldest
/// first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentVersions {
  pub current:  StoredDocument,
  pub archived: Vec<HistoryRecord<LawDocument>>,
}

// ─── Error ledger ────────────────────────────────────────────────────────────

/// One failed store operation, keyed by the business identifier involved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorLedgerEntry {
  pub entry_id:  i64,
  pub key:       String,
  pub message:   String,
  pub logged_at: DateTime<Utc>,
}
