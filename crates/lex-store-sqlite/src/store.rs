//! SQLite backend for [`LawStore`]: current rows, archived versions, error ledger.

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, Transaction, params_from_iter, types::Value};

use lex_core::{
  diff::changed_fields,
  history::{DocumentVersions, ErrorLedgerEntry, HistoryRecord, StoredParagraph, UpsertOutcome},
  record::{LawDocument, ParagraphKey, ParagraphRecord},
  store::LawStore,
};

use crate::{
  Error, Result,
  encode::{
    RawDocument, RawHistory, RawLedgerEntry, RawParagraph, Row, document_columns, document_row,
    encode_dt, paragraph_columns, paragraph_key_row, paragraph_row,
  },
  schema::{DOCUMENTS, PARAGRAPHS, SCHEMA, Table},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// Versioned law store in one SQLite file.
///
/// Clones share one background connection.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open or create the database at `path` and apply the schema.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open a throwaway in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Write one ledger entry for a failed upsert and hand the error back.
  ///
  /// The ledger write happens after the failed transaction was rolled back.
  async fn record_failure(&self, key: String, err: Error) -> Error {
    tracing::error!(%key, error = %err, "upsert failed");
    if let Err(ledger_err) = self.log_error(key.clone(), err.to_string()).await {
      tracing::error!(%key, error = %ledger_err, "could not write error ledger entry");
    }
    err
  }

  /// Run one upsert in its own transaction. `key` names the business
  /// identifier used for the error ledger.
  async fn upsert_in<T: Send + 'static>(
    &self,
    table: Table,
    key: String,
    value: T,
    row: fn(&T) -> Row<'_>,
  ) -> Result<UpsertOutcome> {
    let now = encode_dt(Utc::now());
    let result = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let outcome = upsert_row(&tx, table, &row(&value), &now)?;
        tx.commit()?;
        Ok(outcome)
      })
      .await;

    match result {
      Ok(outcome) => {
        tracing::debug!(table = table.current, %key, ?outcome, "upserted");
        Ok(outcome)
      }
      Err(err) => Err(self.record_failure(key, err.into()).await),
    }
  }
}

/// Lookup, then insert or archive-and-update, inside `tx`.
fn upsert_row(
  tx: &Transaction<'_>,
  table: Table,
  row: &Row<'_>,
  now: &str,
) -> rusqlite::Result<UpsertOutcome> {
  let key_clause = row
    .key
    .iter()
    .enumerate()
    .map(|(i, (column, _))| format!("{column} = ?{}", i + 1))
    .collect::<Vec<_>>()
    .join(" AND ");
  let field_list = row.fields.iter().map(|(c, _)| *c).collect::<Vec<_>>().join(", ");

  let existing = tx
    .query_row(
      &format!("SELECT row_id, {field_list} FROM {} WHERE {key_clause}", table.current),
      params_from_iter(row.key.iter().map(|(_, v)| *v)),
      |r| {
        let row_id: i64 = r.get(0)?;
        let stored = (1..=row.fields.len())
          .map(|i| r.get::<_, String>(i))
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((row_id, stored))
      },
    )
    .optional()?;

  let Some((row_id, stored)) = existing else {
    let columns = row.columns().collect::<Vec<_>>();
    let placeholders = (2..=columns.len() + 1)
      .map(|i| format!("?{i}"))
      .collect::<Vec<_>>()
      .join(", ");
    let values = std::iter::once(now)
      .chain(row.key.iter().map(|(_, v)| *v))
      .chain(row.fields.iter().map(|(_, v)| v.unwrap_or_default()));
    tx.execute(
      &format!(
        "INSERT INTO {} (inserted_at, {}) VALUES (?1, {placeholders})",
        table.current,
        columns.join(", ")
      ),
      params_from_iter(values),
    )?;
    return Ok(UpsertOutcome::Inserted);
  };

  let changes = changed_fields(
    row
      .fields
      .iter()
      .zip(&stored)
      .map(|((column, offered), stored)| (*column, *offered, stored.as_str())),
  );
  if changes.is_empty() {
    return Ok(UpsertOutcome::Unchanged);
  }

  let all_columns = ["row_id", "inserted_at"]
    .into_iter()
    .chain(row.columns())
    .collect::<Vec<_>>()
    .join(", ");
  tx.execute(
    &format!(
      "INSERT INTO {history} ({all_columns}, archived_at)
       SELECT {all_columns}, ?1 FROM {current} WHERE row_id = ?2",
      history = table.history,
      current = table.current,
    ),
    rusqlite::params![now, row_id],
  )?;

  let assignments = changes
    .iter()
    .enumerate()
    .map(|(i, change)| format!("{} = ?{}", change.column, i + 1))
    .collect::<Vec<_>>()
    .join(", ");
  let row_param = changes.len() + 1;
  let values = changes
    .into_iter()
    .map(|change| Value::Text(change.value))
    .chain([Value::Integer(row_id)]);
  tx.execute(
    &format!("UPDATE {} SET {assignments} WHERE row_id = ?{row_param}", table.current),
    params_from_iter(values),
  )?;

  Ok(UpsertOutcome::Updated)
}

fn select_list(columns: &[&str]) -> String {
  ["row_id", "inserted_at"]
    .iter()
    .chain(columns)
    .copied()
    .collect::<Vec<_>>()
    .join(", ")
}

// ─── LawStore impl ───────────────────────────────────────────────────────────

impl LawStore for SqliteStore {
  type Error = Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn upsert_document(&self, document: LawDocument) -> Result<UpsertOutcome> {
    let key = document.document_key.clone();
    self.upsert_in(DOCUMENTS, key, document, document_row).await
  }

  async fn upsert_paragraph(&self, record: ParagraphRecord) -> Result<UpsertOutcome> {
    let key = record.document_key.clone();
    self.upsert_in(PARAGRAPHS, key, record, paragraph_row).await
  }

  async fn log_error(&self, key: String, message: String) -> Result<()> {
    let logged_at = encode_dt(Utc::now());
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO error_ledger (key, message, logged_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![key, message, logged_at],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn document_versions<'a>(
    &'a self,
    document_key: &'a str,
  ) -> Result<Option<DocumentVersions>> {
    let key = document_key.to_owned();
    let columns = select_list(&document_columns());

    let (current, archived) = self
      .conn
      .call(move |conn| {
        let current = conn
          .query_row(
            &format!("SELECT {columns} FROM documents WHERE document_key = ?1"),
            rusqlite::params![key],
            RawDocument::from_row,
          )
          .optional()?;

        let mut stmt = conn.prepare(&format!(
          "SELECT history_id, archived_at, {columns} FROM documents_history
           WHERE document_key = ?1 ORDER BY history_id"
        ))?;
        let archived = stmt
          .query_map(rusqlite::params![key], |r| RawHistory::from_row(r, RawDocument::from_row))?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((current, archived))
      })
      .await?;

    let Some(current) = current else { return Ok(None) };
    Ok(Some(DocumentVersions {
      current:  current.into_stored()?,
      archived: archived
        .into_iter()
        .map(|h| h.into_history(RawDocument::into_stored))
        .collect::<Result<_>>()?,
    }))
  }

  async fn list_paragraphs<'a>(&'a self, document_key: &'a str) -> Result<Vec<StoredParagraph>> {
    let key = document_key.to_owned();
    let columns = select_list(&paragraph_columns());

    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {columns} FROM paragraphs WHERE document_key = ?1 ORDER BY row_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![key], RawParagraph::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawParagraph::into_stored).collect()
  }

  async fn paragraph_history<'a>(
    &'a self,
    key: &'a ParagraphKey,
  ) -> Result<Vec<HistoryRecord<ParagraphRecord>>> {
    let key_values = paragraph_key_row(key);
    let key_clause = key_values
      .iter()
      .enumerate()
      .map(|(i, (column, _))| format!("{column} = ?{}", i + 1))
      .collect::<Vec<_>>()
      .join(" AND ");
    let params = key_values.iter().map(|(_, v)| (*v).to_owned()).collect::<Vec<_>>();
    let columns = select_list(&paragraph_columns());

    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT history_id, archived_at, {columns} FROM paragraphs_history
           WHERE {key_clause} ORDER BY history_id"
        ))?;
        let rows = stmt
          .query_map(params_from_iter(params), |r| RawHistory::from_row(r, RawParagraph::from_row))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|h| h.into_history(RawParagraph::into_stored))
      .collect()
  }

  async fn error_ledger(&self, limit: usize) -> Result<Vec<ErrorLedgerEntry>> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);

    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT entry_id, key, message, logged_at FROM error_ledger
           ORDER BY entry_id DESC LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![limit], |r| {
            Ok(RawLedgerEntry {
              entry_id:  r.get(0)?,
              key:       r.get(1)?,
              message:   r.get(2)?,
              logged_at: r.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLedgerEntry::into_entry).collect()
  }
}
