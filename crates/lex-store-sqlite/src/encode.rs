//! Encoding and decoding helpers between domain records and SQLite rows.
//!
//! All timestamps are stored as RFC 3339 strings. Every text column is
//! `NOT NULL`; an absent optional value is stored as the empty string and
//! read back as `None`.

use chrono::{DateTime, Utc};
use lex_core::{
  diff::candidate,
  hierarchy::{Heading, HierarchyContext},
  history::{ErrorLedgerEntry, HistoryRecord, Stored},
  record::{LawDocument, ParagraphKey, ParagraphRecord, Ziffer},
};

use crate::{
  Error, Result,
  schema::{DOCUMENT_FIELDS, PARAGRAPH_FIELDS, hierarchy_columns},
};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn optional(s: String) -> Option<String> { candidate(Some(&s)).map(str::to_owned) }

// ─── Upsert rows ─────────────────────────────────────────────────────────────

/// Columns and values of one upsert: the immutable natural key plus the
/// candidate value of every other column.
pub struct Row<'a> {
  pub key:    Vec<(&'static str, &'a str)>,
  pub fields: Vec<(&'static str, Option<&'a str>)>,
}

impl Row<'_> {
  /// Every key and field column, in that order.
  pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
    self
      .key
      .iter()
      .map(|(c, _)| *c)
      .chain(self.fields.iter().map(|(c, _)| *c))
  }
}

pub fn document_row(doc: &LawDocument) -> Row<'_> {
  let values = [
    Some(doc.title.as_str()),
    Some(doc.preface.as_str()),
    Some(doc.preamble.as_str()),
    Some(doc.status.as_str()),
    doc.short_name.as_deref(),
    doc.decision_date.as_deref(),
    doc.effective_date.as_deref(),
    doc.source_name.as_deref(),
    doc.chronology_link.as_deref(),
    doc.amendment_link.as_deref(),
    Some(doc.source_link.as_str()),
    Some(doc.quelle_link.as_str()),
  ];
  Row {
    key:    vec![("document_key", doc.document_key.as_str())],
    fields: DOCUMENT_FIELDS.into_iter().zip(values).collect(),
  }
}

pub fn paragraph_row(record: &ParagraphRecord) -> Row<'_> {
  let values = [
    Some(record.short_name.as_str()),
    Some(record.article_name.as_str()),
    Some(record.reference.as_str()),
    Some(record.ziffer.name.as_str()),
    Some(record.text.as_str()),
  ];
  Row {
    key:    paragraph_key_columns(
      &record.document_key,
      &record.hierarchy,
      &record.article_id,
      &record.ziffer.id,
      &record.clause_marker,
    ),
    fields: PARAGRAPH_FIELDS.into_iter().zip(values).collect(),
  }
}

pub fn paragraph_key_row(key: &ParagraphKey) -> Vec<(&'static str, &str)> {
  paragraph_key_columns(
    &key.document_key,
    &key.hierarchy,
    &key.article_id,
    &key.ziffer_id,
    &key.clause_marker,
  )
}

fn paragraph_key_columns<'a>(
  document_key: &'a str,
  hierarchy: &'a HierarchyContext,
  article_id: &'a str,
  ziffer_id: &'a str,
  clause_marker: &'a str,
) -> Vec<(&'static str, &'a str)> {
  let mut key = vec![("document_key", document_key)];
  for (level, id, name) in hierarchy_columns() {
    key.push((id, hierarchy[level].id.as_str()));
    key.push((name, hierarchy[level].name.as_str()));
  }
  key.extend([
    ("article_id", article_id),
    ("ziffer_id", ziffer_id),
    ("clause_marker", clause_marker),
  ]);
  key
}

/// Every column of a current paragraph row, for `SELECT` lists.
pub fn paragraph_columns() -> Vec<&'static str> {
  paragraph_row(&ParagraphRecord::default()).columns().collect()
}

/// Every column of a current document row, for `SELECT` lists.
pub fn document_columns() -> Vec<&'static str> {
  std::iter::once("document_key").chain(DOCUMENT_FIELDS).collect()
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `documents` (or history) row.
pub struct RawDocument {
  pub row_id:          i64,
  pub inserted_at:     String,
  pub document_key:    String,
  pub title:           String,
  pub preface:         String,
  pub preamble:        String,
  pub status:          String,
  pub short_name:      String,
  pub decision_date:   String,
  pub effective_date:  String,
  pub source_name:     String,
  pub chronology_link: String,
  pub amendment_link:  String,
  pub source_link:     String,
  pub quelle_link:     String,
}

impl RawDocument {
  pub fn from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      row_id:          r.get("row_id")?,
      inserted_at:     r.get("inserted_at")?,
      document_key:    r.get("document_key")?,
      title:           r.get("title")?,
      preface:         r.get("preface")?,
      preamble:        r.get("preamble")?,
      status:          r.get("status")?,
      short_name:      r.get("short_name")?,
      decision_date:   r.get("decision_date")?,
      effective_date:  r.get("effective_date")?,
      source_name:     r.get("source_name")?,
      chronology_link: r.get("chronology_link")?,
      amendment_link:  r.get("amendment_link")?,
      source_link:     r.get("source_link")?,
      quelle_link:     r.get("quelle_link")?,
    })
  }

  pub fn into_stored(self) -> Result<Stored<LawDocument>> {
    Ok(Stored {
      row_id:      self.row_id,
      inserted_at: decode_dt(&self.inserted_at)?,
      value:       LawDocument {
        document_key:    self.document_key,
        title:           self.title,
        preface:         self.preface,
        preamble:        self.preamble,
        status:          self.status,
        short_name:      optional(self.short_name),
        decision_date:   optional(self.decision_date),
        effective_date:  optional(self.effective_date),
        source_name:     optional(self.source_name),
        chronology_link: optional(self.chronology_link),
        amendment_link:  optional(self.amendment_link),
        source_link:     self.source_link,
        quelle_link:     self.quelle_link,
      },
    })
  }
}

/// Raw strings read directly from a `paragraphs` (or history) row.
pub struct RawParagraph {
  pub row_id:        i64,
  pub inserted_at:   String,
  pub document_key:  String,
  pub short_name:    String,
  pub hierarchy:     HierarchyContext,
  pub article_id:    String,
  pub article_name:  String,
  pub reference:     String,
  pub ziffer_id:     String,
  pub ziffer_name:   String,
  pub clause_marker: String,
  pub text:          String,
}

impl RawParagraph {
  pub fn from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    let mut hierarchy = HierarchyContext::default();
    for (level, id, name) in hierarchy_columns() {
      hierarchy[level] = Heading { id: r.get(id)?, name: r.get(name)? };
    }
    Ok(Self {
      row_id: r.get("row_id")?,
      inserted_at: r.get("inserted_at")?,
      document_key: r.get("document_key")?,
      short_name: r.get("short_name")?,
      hierarchy,
      article_id: r.get("article_id")?,
      article_name: r.get("article_name")?,
      reference: r.get("reference")?,
      ziffer_id: r.get("ziffer_id")?,
      ziffer_name: r.get("ziffer_name")?,
      clause_marker: r.get("clause_marker")?,
      text: r.get("text")?,
    })
  }

  pub fn into_stored(self) -> Result<Stored<ParagraphRecord>> {
    Ok(Stored {
      row_id:      self.row_id,
      inserted_at: decode_dt(&self.inserted_at)?,
      value:       ParagraphRecord {
        document_key:  self.document_key,
        short_name:    self.short_name,
        hierarchy:     self.hierarchy,
        article_id:    self.article_id,
        article_name:  self.article_name,
        reference:     self.reference,
        ziffer:        Ziffer { id: self.ziffer_id, name: self.ziffer_name },
        clause_marker: self.clause_marker,
        text:          self.text,
      },
    })
  }
}

/// A history row: the archived snapshot plus archive metadata.
pub struct RawHistory<T> {
  pub history_id:  i64,
  pub archived_at: String,
  pub snapshot:    T,
}

impl<T> RawHistory<T> {
  pub fn from_row(
    r: &rusqlite::Row<'_>,
    snapshot: impl FnOnce(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
  ) -> rusqlite::Result<Self> {
    Ok(Self {
      history_id:  r.get("history_id")?,
      archived_at: r.get("archived_at")?,
      snapshot:    snapshot(r)?,
    })
  }

  pub fn into_history<U>(
    self,
    stored: impl FnOnce(T) -> Result<Stored<U>>,
  ) -> Result<HistoryRecord<U>> {
    Ok(HistoryRecord {
      history_id:  self.history_id,
      snapshot:    stored(self.snapshot)?,
      archived_at: decode_dt(&self.archived_at)?,
    })
  }
}

/// Raw strings read directly from an `error_ledger` row.
pub struct RawLedgerEntry {
  pub entry_id:  i64,
  pub key:       String,
  pub message:   String,
  pub logged_at: String,
}

impl RawLedgerEntry {
  pub fn into_entry(self) -> Result<ErrorLedgerEntry> {
    Ok(ErrorLedgerEntry {
      entry_id:  self.entry_id,
      key:       self.key,
      message:   self.message,
      logged_at: decode_dt(&self.logged_at)?,
    })
  }
}
