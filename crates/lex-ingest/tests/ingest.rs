//! End-to-end: saved page → extraction → SQLite store.

use std::path::Path;

use lex_core::{
  hierarchy::HeadingLevel,
  history::{
    DocumentVersions, ErrorLedgerEntry, HistoryRecord, StoredParagraph, UpsertOutcome,
  },
  node::{ContentNode, Inline},
  record::{LawDocument, ParagraphKey, ParagraphRecord},
  source::SourceDocument,
  store::LawStore,
};
use lex_extract::ExtractOptions;
use lex_ingest::{pipeline::ingest, source::load_page};
use lex_store_sqlite::SqliteStore;

fn fixture() -> SourceDocument {
  let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/101-excerpt.html");
  load_page(&path, None).expect("fixture parses")
}

fn sup(s: &str) -> Inline { Inline::Superscript(vec![Inline::text(s)]) }

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

// ─── Happy path ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn fixture_ingests_document_and_paragraphs() {
  let s = store().await;
  let report = ingest(&s, &fixture(), &ExtractOptions::default()).await;

  assert_eq!(report.document_key, "101");
  assert_eq!(report.document, Some(UpsertOutcome::Inserted));
  assert_eq!(report.inserted, 7);
  assert_eq!(report.failed, 0);
  // The fixture carries one marker without a footnote.
  assert_eq!(report.warnings, 1);

  let doc = s.document_versions("101").await.unwrap().unwrap().current.value;
  assert_eq!(doc.title, "Bundesverfassung der Schweizerischen Eidgenossenschaft");
  assert_eq!(doc.status, "in Kraft");
  assert_eq!(doc.short_name.as_deref(), Some("BV"));
  assert_eq!(doc.quelle_link, "https://www.fedlex.admin.ch/eli/oc/1999/404/de");
  assert_eq!(doc.preamble, "Im Namen Gottes des Allmächtigen!");
  assert_eq!(doc.amendment_link, None);

  let paragraphs: Vec<_> = s
    .list_paragraphs("101")
    .await
    .unwrap()
    .into_iter()
    .map(|row| row.value)
    .collect();
  assert!(paragraphs.iter().all(|p| p.short_name == "BV"));

  let art1 = &paragraphs[0];
  assert_eq!(art1.hierarchy[HeadingLevel::Title].id, "1");
  assert!(art1.text.contains("footnote{Bereinigt gemäss Volksabstimmung vom 24. Sept. 1978.}"));

  let art2: Vec<_> = paragraphs.iter().filter(|p| p.article_id == "art_2").collect();
  assert_eq!(art2.len(), 3);
  assert_eq!(
    art2[0].text,
    "Die Schweizerische Eidgenossenschaft schützt die Freiheit und die Rechte des Volkes.\n\
     Sie wahrt die Unabhängigkeit und die Sicherheit des Landes.\n"
  );
  assert_eq!(
    art2[2].text,
    "SubTitle{ Insbesondere:}\n Sie sorgt für eine möglichst grosse Chancengleichheit."
  );

  let art197: Vec<_> = paragraphs.iter().filter(|p| p.article_id == "art_197").collect();
  assert_eq!(art197.len(), 3);
  assert_eq!(art197[0].ziffer.id, "1");
  assert_eq!(art197[0].hierarchy[HeadingLevel::Chapter].id, "2");
  assert_eq!(art197[0].hierarchy[HeadingLevel::Title].id, "6");
  assert!(art197[1].text.ends_with("\na.: an den Generalsekretär;\nb.: mit einer Erklärung."));
  assert_eq!(art197[2].ziffer.name, "2. Waffenrecht");
  assert_eq!(art197[2].reference, "SR 514.54");
  assert_eq!(art197[2].clause_marker, "1");
}

#[tokio::test]
async fn second_run_is_unchanged() {
  let s = store().await;
  let source = fixture();
  ingest(&s, &source, &ExtractOptions::default()).await;
  let report = ingest(&s, &source, &ExtractOptions::default()).await;

  assert_eq!(report.document, Some(UpsertOutcome::Unchanged));
  assert_eq!(report.unchanged, 7);
  assert_eq!(report.inserted + report.updated, 0);
  assert!(s.document_versions("101").await.unwrap().unwrap().archived.is_empty());
}

#[tokio::test]
async fn edited_paragraph_is_archived() {
  let s = store().await;
  let mut source = fixture();
  ingest(&s, &source, &ExtractOptions::default()).await;

  let article = source.articles.iter_mut().find(|a| a.article_id == "art_1").unwrap();
  article.nodes[0] = ContentNode::plain(0, vec![Inline::text(
    "Das Schweizervolk und die Kantone bilden die Eidgenossenschaft.",
  )]);
  let report = ingest(&s, &source, &ExtractOptions::default()).await;
  assert_eq!(report.updated, 1);
  assert_eq!(report.unchanged, 6);

  let key = s.list_paragraphs("101").await.unwrap()[0].value.key();
  let history = s.paragraph_history(&key).await.unwrap();
  assert_eq!(history.len(), 1);
  assert!(history[0].snapshot.value.text.contains("footnote{"));
}

#[tokio::test]
async fn repeated_key_is_merged_and_rerun_is_unchanged() {
  let s = store().await;
  let mut source = fixture();
  let article = source.articles.iter_mut().find(|a| a.article_id == "art_1").unwrap();
  article.nodes = vec![
    ContentNode::plain(0, vec![sup("1"), Inline::text(" Erster Absatz.")]),
    ContentNode::plain(1, vec![Inline::text("Übergangsbestimmung")]),
    ContentNode::plain(2, vec![sup("1"), Inline::text(" Übergangsabsatz.")]),
  ];

  let first = ingest(&s, &source, &ExtractOptions::default()).await;
  assert_eq!(first.inserted, 7);
  assert_eq!(first.updated, 0);
  // The fixture's missing footnote plus the repeated key.
  assert_eq!(first.warnings, 2);

  let second = ingest(&s, &source, &ExtractOptions::default()).await;
  assert_eq!(second.unchanged, 7);
  assert_eq!(second.updated, 0);

  let art1 = s
    .list_paragraphs("101")
    .await
    .unwrap()
    .into_iter()
    .find(|row| row.value.article_id == "art_1")
    .unwrap();
  assert_eq!(art1.value.text, "Erster Absatz.\nÜbergangsabsatz.\n");
  assert!(s.paragraph_history(&art1.value.key()).await.unwrap().is_empty());
}

// ─── Failure isolation ───────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
enum FlakyError {
  #[error("injected failure")]
  Injected,
  #[error(transparent)]
  Store(#[from] lex_store_sqlite::Error),
}

/// Fails every document upsert and every paragraph with clause marker `"2"`.
struct FlakyStore {
  inner: SqliteStore,
}

impl LawStore for FlakyStore {
  type Error = FlakyError;

  async fn upsert_document(&self, document: LawDocument) -> Result<UpsertOutcome, FlakyError> {
    self.log_error(document.document_key, "injected failure".into()).await?;
    Err(FlakyError::Injected)
  }

  async fn upsert_paragraph(&self, record: ParagraphRecord) -> Result<UpsertOutcome, FlakyError> {
    if record.clause_marker == "2" {
      self.log_error(record.document_key, "injected failure".into()).await?;
      return Err(FlakyError::Injected);
    }
    Ok(self.inner.upsert_paragraph(record).await?)
  }

  async fn log_error(&self, key: String, message: String) -> Result<(), FlakyError> {
    Ok(self.inner.log_error(key, message).await?)
  }

  async fn document_versions<'a>(
    &'a self,
    document_key: &'a str,
  ) -> Result<Option<DocumentVersions>, FlakyError> {
    Ok(self.inner.document_versions(document_key).await?)
  }

  async fn list_paragraphs<'a>(
    &'a self,
    document_key: &'a str,
  ) -> Result<Vec<StoredParagraph>, FlakyError> {
    Ok(self.inner.list_paragraphs(document_key).await?)
  }

  async fn paragraph_history<'a>(
    &'a self,
    key: &'a ParagraphKey,
  ) -> Result<Vec<HistoryRecord<ParagraphRecord>>, FlakyError> {
    Ok(self.inner.paragraph_history(key).await?)
  }

  async fn error_ledger(&self, limit: usize) -> Result<Vec<ErrorLedgerEntry>, FlakyError> {
    Ok(self.inner.error_ledger(limit).await?)
  }
}

#[tokio::test]
async fn failures_are_counted_and_the_run_continues() {
  let s = FlakyStore { inner: store().await };
  let report = ingest(&s, &fixture(), &ExtractOptions::default()).await;

  assert_eq!(report.document, None);
  // art_2 ¶2 and art_197 ¶2 fail; everything else still lands.
  assert_eq!(report.failed, 2);
  assert_eq!(report.inserted, 5);
  assert_eq!(report.paragraphs(), 7);

  let stored = s.list_paragraphs("101").await.unwrap();
  assert_eq!(stored.len(), 5);
  assert!(stored.iter().all(|row| row.value.clause_marker != "2"));

  let ledger = s.error_ledger(10).await.unwrap();
  assert_eq!(ledger.len(), 3);
  assert!(ledger.iter().all(|e| e.key == "101"));
}
