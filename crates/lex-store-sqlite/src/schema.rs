//! SQL schema for the lex SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

use std::sync::LazyLock;

use lex_core::hierarchy::HeadingLevel;

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS documents (
    row_id          INTEGER PRIMARY KEY AUTOINCREMENT,
    inserted_at     TEXT NOT NULL,
    document_key    TEXT NOT NULL UNIQUE,   -- SRN
    title           TEXT NOT NULL DEFAULT '',
    preface         TEXT NOT NULL DEFAULT '',
    preamble        TEXT NOT NULL DEFAULT '',
    status          TEXT NOT NULL DEFAULT '',
    short_name      TEXT NOT NULL DEFAULT '',
    decision_date   TEXT NOT NULL DEFAULT '',
    effective_date  TEXT NOT NULL DEFAULT '',
    source_name     TEXT NOT NULL DEFAULT '',
    chronology_link TEXT NOT NULL DEFAULT '',
    amendment_link  TEXT NOT NULL DEFAULT '',
    source_link     TEXT NOT NULL DEFAULT '',
    quelle_link     TEXT NOT NULL DEFAULT ''
);

-- History tables are strictly append-only.
-- No UPDATE or DELETE is ever issued against them.
CREATE TABLE IF NOT EXISTS documents_history (
    history_id      INTEGER PRIMARY KEY AUTOINCREMENT,
    row_id          INTEGER NOT NULL,
    inserted_at     TEXT NOT NULL,
    document_key    TEXT NOT NULL,
    title           TEXT NOT NULL,
    preface         TEXT NOT NULL,
    preamble        TEXT NOT NULL,
    status          TEXT NOT NULL,
    short_name      TEXT NOT NULL,
    decision_date   TEXT NOT NULL,
    effective_date  TEXT NOT NULL,
    source_name     TEXT NOT NULL,
    chronology_link TEXT NOT NULL,
    amendment_link  TEXT NOT NULL,
    source_link     TEXT NOT NULL,
    quelle_link     TEXT NOT NULL,
    archived_at     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS paragraphs (
    row_id           INTEGER PRIMARY KEY AUTOINCREMENT,
    inserted_at      TEXT NOT NULL,
    document_key     TEXT NOT NULL,
    short_name       TEXT NOT NULL DEFAULT '',
    book_id          TEXT NOT NULL DEFAULT '',
    book_name        TEXT NOT NULL DEFAULT '',
    part_id          TEXT NOT NULL DEFAULT '',
    part_name        TEXT NOT NULL DEFAULT '',
    title_id         TEXT NOT NULL DEFAULT '',
    title_name       TEXT NOT NULL DEFAULT '',
    sub_title_id     TEXT NOT NULL DEFAULT '',
    sub_title_name   TEXT NOT NULL DEFAULT '',
    chapter_id       TEXT NOT NULL DEFAULT '',
    chapter_name     TEXT NOT NULL DEFAULT '',
    sub_chapter_id   TEXT NOT NULL DEFAULT '',
    sub_chapter_name TEXT NOT NULL DEFAULT '',
    section_id       TEXT NOT NULL DEFAULT '',
    section_name     TEXT NOT NULL DEFAULT '',
    sub_section_id   TEXT NOT NULL DEFAULT '',
    sub_section_name TEXT NOT NULL DEFAULT '',
    article_id       TEXT NOT NULL,
    article_name     TEXT NOT NULL DEFAULT '',
    reference        TEXT NOT NULL DEFAULT '',
    ziffer_id        TEXT NOT NULL DEFAULT '',
    ziffer_name      TEXT NOT NULL DEFAULT '',
    clause_marker    TEXT NOT NULL DEFAULT '',
    text             TEXT NOT NULL DEFAULT '',
    UNIQUE (
        document_key,
        book_id, book_name, part_id, part_name,
        title_id, title_name, sub_title_id, sub_title_name,
        chapter_id, chapter_name, sub_chapter_id, sub_chapter_name,
        section_id, section_name, sub_section_id, sub_section_name,
        article_id, ziffer_id, clause_marker
    )
);

CREATE TABLE IF NOT EXISTS paragraphs_history (
    history_id       INTEGER PRIMARY KEY AUTOINCREMENT,
    row_id           INTEGER NOT NULL,
    inserted_at      TEXT NOT NULL,
    document_key     TEXT NOT NULL,
    short_name       TEXT NOT NULL,
    book_id          TEXT NOT NULL,
    book_name        TEXT NOT NULL,
    part_id          TEXT NOT NULL,
    part_name        TEXT NOT NULL,
    title_id         TEXT NOT NULL,
    title_name       TEXT NOT NULL,
    sub_title_id     TEXT NOT NULL,
    sub_title_name   TEXT NOT NULL,
    chapter_id       TEXT NOT NULL,
    chapter_name     TEXT NOT NULL,
    sub_chapter_id   TEXT NOT NULL,
    sub_chapter_name TEXT NOT NULL,
    section_id       TEXT NOT NULL,
    section_name     TEXT NOT NULL,
    sub_section_id   TEXT NOT NULL,
    sub_section_name TEXT NOT NULL,
    article_id       TEXT NOT NULL,
    article_name     TEXT NOT NULL,
    reference        TEXT NOT NULL,
    ziffer_id        TEXT NOT NULL,
    ziffer_name      TEXT NOT NULL,
    clause_marker    TEXT NOT NULL,
    text             TEXT NOT NULL,
    archived_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS error_ledger (
    entry_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    key       TEXT NOT NULL,
    message   TEXT NOT NULL,
    logged_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS paragraphs_document_idx         ON paragraphs(document_key);
CREATE INDEX IF NOT EXISTS documents_history_key_idx       ON documents_history(document_key);
CREATE INDEX IF NOT EXISTS paragraphs_history_document_idx ON paragraphs_history(document_key);

PRAGMA user_version = 1;
";

/// A current table and its history table.
#[derive(Debug, Clone, Copy)]
pub struct Table {
  pub current: &'static str,
  pub history: &'static str,
}

pub const DOCUMENTS: Table = Table { current: "documents", history: "documents_history" };
pub const PARAGRAPHS: Table = Table { current: "paragraphs", history: "paragraphs_history" };

/// Non-key columns of `documents`, in table order.
pub const DOCUMENT_FIELDS: [&str; 12] = [
  "title",
  "preface",
  "preamble",
  "status",
  "short_name",
  "decision_date",
  "effective_date",
  "source_name",
  "chronology_link",
  "amendment_link",
  "source_link",
  "quelle_link",
];

/// Non-key columns of `paragraphs`.
pub const PARAGRAPH_FIELDS: [&str; 5] =
  ["short_name", "article_name", "reference", "ziffer_name", "text"];

/// `(level, id column, name column)` for every heading level.
static HIERARCHY_COLUMNS: LazyLock<Vec<(HeadingLevel, String, String)>> = LazyLock::new(|| {
  HeadingLevel::ordered()
    .map(|level| (level, format!("{}_id", level.as_str()), format!("{}_name", level.as_str())))
    .collect()
});

pub fn hierarchy_columns() -> impl Iterator<Item = (HeadingLevel, &'static str, &'static str)> {
  HIERARCHY_COLUMNS
    .iter()
    .map(|(level, id, name)| (*level, id.as_str(), name.as_str()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_hierarchy_column_is_in_the_schema() {
    assert_eq!(hierarchy_columns().count(), 8);
    for (_, id, name) in hierarchy_columns() {
      assert!(SCHEMA.contains(&format!("{id} ")), "{id}");
      assert!(SCHEMA.contains(&format!("{name} ")), "{name}");
    }
  }

  #[test]
  fn every_field_column_is_in_the_schema() {
    for column in DOCUMENT_FIELDS.iter().chain(&PARAGRAPH_FIELDS) {
      assert!(SCHEMA.contains(&format!("    {column} ")), "{column}");
    }
  }
}
