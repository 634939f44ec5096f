//! The `LawStore` trait.
//!
//! Implemented by storage backends (e.g. `lex-store-sqlite`). The ingest
//! pipeline depends on this abstraction and receives the store as an explicit
//! argument.

use std::future::Future;

use crate::{
  history::{
    DocumentVersions, ErrorLedgerEntry, HistoryRecord, StoredParagraph,
    UpsertOutcome,
  },
  record::{LawDocument, ParagraphKey, ParagraphRecord},
};

/// Abstraction over a versioned, diff-aware record store.
///
/// Every upsert is atomic on its own: a failed call leaves no partial state
/// and records one entry in the error ledger before returning the error.
/// History tables are append-only.
pub trait LawStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Insert or diff-update the document row keyed by `document_key`.
  fn upsert_document(
    &self,
    document: LawDocument,
  ) -> impl Future<Output = Result<UpsertOutcome, Self::Error>> + Send + '_;

  /// Insert or diff-update the paragraph row keyed by
  /// [`ParagraphRecord::key`].
  fn upsert_paragraph(
    &self,
    record: ParagraphRecord,
  ) -> impl Future<Output = Result<UpsertOutcome, Self::Error>> + Send + '_;

  /// Append an entry to the error ledger.
  fn log_error(
    &self,
    key: String,
    message: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// The current document row and all of its archived versions. Returns
  /// `None` if no current row exists.
  fn document_versions<'a>(
    &'a self,
    document_key: &'a str,
  ) -> impl Future<Output = Result<Option<DocumentVersions>, Self::Error>> + Send + 'a;

  /// All current paragraph rows of a document, in insertion order.
  fn list_paragraphs<'a>(
    &'a self,
    document_key: &'a str,
  ) -> impl Future<Output = Result<Vec<StoredParagraph>, Self::Error>> + Send + 'a;

  /// Archived versions of one paragraph, oldest first.
  fn paragraph_history<'a>(
    &'a self,
    key: &'a ParagraphKey,
  ) -> impl Future<Output = Result<Vec<HistoryRecord<ParagraphRecord>>, Self::Error>>
  + Send
  + 'a;

  /// The most recent `limit` error ledger entries, newest first.
  fn error_ledger(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<ErrorLedgerEntry>, Self::Error>> + Send + '_;
}
