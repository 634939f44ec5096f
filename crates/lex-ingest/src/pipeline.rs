//! Extract one document and persist it, best effort.
//!
//! A failed upsert never stops the run: the store has already written its
//! ledger entry, the failure is counted and the next record is attempted.

use lex_core::{history::UpsertOutcome, source::SourceDocument, store::LawStore};
use lex_extract::{ExtractOptions, extract};
use serde::Serialize;

/// Per-document outcome counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
  pub document_key: String,
  /// `None` when the document upsert failed.
  pub document:     Option<UpsertOutcome>,
  pub inserted:     usize,
  pub updated:      usize,
  pub unchanged:    usize,
  pub failed:       usize,
  pub warnings:     usize,
}

impl IngestReport {
  fn count(&mut self, outcome: UpsertOutcome) {
    match outcome {
      UpsertOutcome::Inserted => self.inserted += 1,
      UpsertOutcome::Updated => self.updated += 1,
      UpsertOutcome::Unchanged => self.unchanged += 1,
    }
  }

  /// Paragraph rows attempted.
  pub fn paragraphs(&self) -> usize {
    self.inserted + self.updated + self.unchanged + self.failed
  }
}

/// Extract `source` and upsert its document and paragraph rows into `store`,
/// in document order.
pub async fn ingest<S: LawStore>(
  store: &S,
  source: &SourceDocument,
  options: &ExtractOptions,
) -> IngestReport {
  let extraction = extract(source, options);
  let mut report = IngestReport {
    document_key: extraction.document.document_key.clone(),
    warnings: extraction.warnings.len(),
    ..IngestReport::default()
  };

  match store.upsert_document(extraction.document).await {
    Ok(outcome) => report.document = Some(outcome),
    Err(e) => {
      tracing::error!(document = %report.document_key, error = %e, "document upsert failed");
    }
  }

  for record in extraction.articles.into_iter().flat_map(|a| a.paragraphs) {
    let article = record.article_id.clone();
    let clause = record.clause_marker.clone();
    match store.upsert_paragraph(record).await {
      Ok(outcome) => {
        tracing::debug!(%article, %clause, ?outcome, "paragraph stored");
        report.count(outcome);
      }
      Err(e) => {
        tracing::error!(%article, %clause, error = %e, "paragraph upsert failed");
        report.failed += 1;
      }
    }
  }

  tracing::info!(
    document = %report.document_key,
    inserted = report.inserted,
    updated = report.updated,
    unchanged = report.unchanged,
    failed = report.failed,
    warnings = report.warnings,
    "document ingested"
  );
  report
}
