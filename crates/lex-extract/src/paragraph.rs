//! Folds an article's content nodes into paragraph records.
//!
//! The fold carries an [`Accumulator`]: the records emitted so far (the last
//! one receives continuations), a pending subtitle, the current ziffer and
//! the current reference. Node rules, in order:
//!
//! - italic node starting with a digit, or equal to a ziffer keyword:
//!   becomes the current ziffer, emits nothing
//! - other italic node: a subtitle if it ends with `:`, else appended to the
//!   last record
//! - reference node: becomes the current reference
//! - definition list / table: rendered as text and appended to the last record
//! - plain node without a new clause marker: appended to the last record
//! - anything else: a new record, unless an earlier record of the article
//!   has the same natural key; the text then joins that record with a warning

use lex_core::{
  node::{ContentNode, DefinitionEntry, Inline, NodeKind, flatten},
  record::{Article, DocumentRef, ParagraphRecord, Ziffer},
};

use crate::{ExtractOptions, footnote::FootnoteResolver, text, warning::Warnings};

#[derive(Debug, Default)]
struct Accumulator {
  records:         Vec<ParagraphRecord>,
  pending_prepend: String,
  ziffer:          Ziffer,
  reference:       String,
}

/// Emits [`ParagraphRecord`]s for the articles of one document.
pub struct ParagraphAssembler<'a> {
  document: &'a DocumentRef,
  resolver: FootnoteResolver<'a>,
  options:  &'a ExtractOptions,
}

impl<'a> ParagraphAssembler<'a> {
  pub fn new(
    document: &'a DocumentRef,
    resolver: FootnoteResolver<'a>,
    options: &'a ExtractOptions,
  ) -> Self {
    Self { document, resolver, options }
  }

  /// Fold `nodes` (in document order) into the article's records.
  pub fn assemble(
    &self,
    article: &Article,
    nodes: &[ContentNode],
    warnings: &mut Warnings,
  ) -> Vec<ParagraphRecord> {
    nodes
      .iter()
      .fold(Accumulator::default(), |acc, node| self.step(acc, article, node, warnings))
      .records
  }

  fn step(
    &self,
    mut acc: Accumulator,
    article: &Article,
    node: &ContentNode,
    warnings: &mut Warnings,
  ) -> Accumulator {
    match &node.kind {
      NodeKind::ItalicSpan { inlines } => {
        let text = self.text_of(inlines, warnings);
        self.italic(&mut acc, article, node, text, warnings);
      }
      NodeKind::ReferenceSpan { inlines } => {
        acc.reference = self.text_of(inlines, warnings);
      }
      NodeKind::DefinitionList { entries } => {
        let block = self.definition_list(entries, warnings);
        attach_block(&mut acc, article, node, block, warnings);
      }
      NodeKind::Table { rows } => {
        let block = self.table(rows, warnings);
        attach_block(&mut acc, article, node, block, warnings);
      }
      NodeKind::PlainBlock { inlines } => self.plain(&mut acc, article, node, inlines, warnings),
    }
    acc
  }

  fn italic(
    &self,
    acc: &mut Accumulator,
    article: &Article,
    node: &ContentNode,
    text: String,
    warnings: &mut Warnings,
  ) {
    if text.is_empty() {
      warnings.ambiguity(
        &article.article_id,
        format!("empty italic node at position {}", node.position),
      );
    } else if text::starts_with_digit(&text) || self.is_ziffer_keyword(&text) {
      acc.ziffer = Ziffer { id: text::first_numeric_token(&text), name: text };
    } else if text.ends_with(':') {
      acc.pending_prepend = text;
    } else if let Some(last) = acc.records.last_mut() {
      last.text.push('\n');
      last.text.push_str(&text);
      acc.pending_prepend.clear();
    } else {
      // Nothing to continue yet: keep it as the first record's subtitle.
      acc.pending_prepend = text;
    }
  }

  fn plain(
    &self,
    acc: &mut Accumulator,
    article: &Article,
    node: &ContentNode,
    inlines: &[Inline],
    warnings: &mut Warnings,
  ) {
    let (clause_marker, body) = split_clause_marker(inlines);
    let text = self.text_of(body, warnings);

    if clause_marker.is_empty() && self.is_ziffer_keyword(&text) {
      acc.ziffer = Ziffer { id: text::first_numeric_token(&text), name: text };
      return;
    }
    if text.is_empty() {
      warnings.ambiguity(
        &article.article_id,
        format!("paragraph without text at position {}", node.position),
      );
      return;
    }

    if let Some(last) = acc.records.last_mut()
      && (clause_marker.is_empty() || clause_marker == last.clause_marker)
      && last.article_id == article.article_id
      && last.ziffer == acc.ziffer
    {
      last.text.push('\n');
      last.text.push_str(&text);
      last.text.push('\n');
      return;
    }

    let text = if acc.pending_prepend.is_empty() {
      text
    } else {
      let prepend = std::mem::take(&mut acc.pending_prepend);
      format!("SubTitle{{ {prepend}}}\n {text}")
    };

    let record = ParagraphRecord {
      document_key: self.document.document_key.clone(),
      short_name: self.document.short_name.clone(),
      hierarchy: article.hierarchy.clone(),
      article_id: article.article_id.clone(),
      article_name: article.article_name.clone(),
      reference: acc.reference.clone(),
      ziffer: acc.ziffer.clone(),
      clause_marker,
      text,
    };

    // At most one record per natural key.
    let key = record.key();
    if let Some(earlier) = acc.records.iter_mut().find(|r| r.key() == key) {
      warnings.ambiguity(
        &article.article_id,
        format!(
          "paragraph {:?} at position {} repeats an earlier key; appended to it",
          key.clause_marker, node.position
        ),
      );
      earlier.text.push('\n');
      earlier.text.push_str(&record.text);
      earlier.text.push('\n');
      return;
    }

    tracing::trace!(
      article = %article.article_id,
      clause = %record.clause_marker,
      ziffer = %record.ziffer.id,
      "paragraph emitted"
    );
    acc.records.push(record);
  }

  /// Resolve footnotes, collapse whitespace.
  fn text_of(&self, inlines: &[Inline], warnings: &mut Warnings) -> String {
    text::normalize(&self.resolver.resolve(inlines, warnings))
  }

  fn is_ziffer_keyword(&self, text: &str) -> bool {
    self.options.ziffer_keywords.iter().any(|k| k == text)
  }

  /// One `\nterm: description` line per entry.
  fn definition_list(&self, entries: &[DefinitionEntry], warnings: &mut Warnings) -> String {
    entries
      .iter()
      .map(|entry| {
        format!(
          "\n{}: {}",
          self.text_of(&entry.term, warnings),
          self.text_of(&entry.description, warnings)
        )
      })
      .collect()
  }

  /// `|`-joined cells, one line per row.
  fn table(&self, rows: &[Vec<Vec<Inline>>], warnings: &mut Warnings) -> String {
    rows
      .iter()
      .map(|cells| {
        let line = cells
          .iter()
          .map(|cell| self.text_of(cell, warnings))
          .collect::<Vec<_>>()
          .join("|");
        format!("\n{line}")
      })
      .collect()
  }
}

/// Append a rendered definition list or table to the last record. Blocks
/// never start a record of their own.
fn attach_block(
  acc: &mut Accumulator,
  article: &Article,
  node: &ContentNode,
  block: String,
  warnings: &mut Warnings,
) {
  match acc.records.last_mut() {
    Some(last) => last.text.push_str(&block),
    None => warnings.ambiguity(
      &article.article_id,
      format!("{} before the first paragraph dropped", node.kind.name()),
    ),
  }
}

/// Split a leading clause marker off a node's inlines.
///
/// The marker is the text of a leading superscript. A directly following
/// superscript that holds no link is part of the same marker ("3" + "bis").
/// Returns the marker and the remaining inlines.
pub fn split_clause_marker(inlines: &[Inline]) -> (String, &[Inline]) {
  let Some(first) = inlines.iter().position(|i| !i.is_blank()) else {
    return (String::new(), inlines);
  };
  let Inline::Superscript(children) = &inlines[first] else {
    return (String::new(), inlines);
  };

  let mut marker = flatten(children).trim().to_owned();
  let mut rest = first + 1;
  if let Some(Inline::Superscript(next)) = inlines.get(rest)
    && !next.iter().any(Inline::is_link)
  {
    marker.push_str(flatten(next).trim());
    rest += 1;
  }
  (marker, &inlines[rest..])
}

#[cfg(test)]
mod tests {
  use lex_core::{
    hierarchy::{Heading, HeadingLevel, HierarchyContext},
    source::FootnoteTable,
  };

  use super::*;
  use crate::warning::Warning;

  fn sup(s: &str) -> Inline { Inline::Superscript(vec![Inline::text(s)]) }

  fn doc() -> DocumentRef {
    DocumentRef { document_key: "101".into(), short_name: "BV".into() }
  }

  fn article() -> Article {
    Article {
      article_id:   "art_1".into(),
      article_name: "Art. 1 Zweck".into(),
      hierarchy:    HierarchyContext::default()
        .with(HeadingLevel::SubSection, Heading::new("1", "1. Kapitel")),
    }
  }

  fn assemble_with(
    nodes: Vec<ContentNode>,
    table: &FootnoteTable,
    options: &ExtractOptions,
  ) -> (Vec<ParagraphRecord>, Warnings) {
    let doc = doc();
    let assembler = ParagraphAssembler::new(&doc, FootnoteResolver::new(table), options);
    let mut warnings = Warnings::default();
    let records = assembler.assemble(&article(), &nodes, &mut warnings);
    (records, warnings)
  }

  fn assemble(nodes: Vec<ContentNode>) -> Vec<ParagraphRecord> {
    assemble_with(nodes, &FootnoteTable::new(), &ExtractOptions::default()).0
  }

  #[test]
  fn unmarked_paragraph_continues_previous_record() {
    let records = assemble(vec![
      ContentNode::plain(0, vec![sup("¹"), Inline::text(" first sentence")]),
      ContentNode::plain(1, vec![Inline::text("second sentence")]),
    ]);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].clause_marker, "¹");
    assert_eq!(records[0].text, "first sentence\nsecond sentence\n");
  }

  #[test]
  fn new_clause_marker_starts_new_record() {
    let records = assemble(vec![
      ContentNode::plain(0, vec![sup("1"), Inline::text(" Erster Absatz.")]),
      ContentNode::plain(1, vec![sup("2"), Inline::text(" Zweiter Absatz.")]),
      ContentNode::plain(2, vec![sup("2"), Inline::text(" Nachtrag.")]),
    ]);
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].clause_marker, "2");
    assert_eq!(records[1].text, "Zweiter Absatz.\nNachtrag.\n");
  }

  #[test]
  fn ziffer_node_sets_context_without_emitting() {
    let records = assemble(vec![
      ContentNode::italic(0, vec![Inline::text("1. Transitional")]),
      ContentNode::plain(1, vec![Inline::text("Text body")]),
    ]);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].ziffer, Ziffer { id: "1".into(), name: "1. Transitional".into() });
    assert_eq!(records[0].text, "Text body");
  }

  #[test]
  fn ziffer_change_starts_new_record() {
    let records = assemble(vec![
      ContentNode::italic(0, vec![Inline::text("1. Erste Ziffer")]),
      ContentNode::plain(1, vec![Inline::text("Text eins")]),
      ContentNode::italic(2, vec![Inline::text("2. Zweite Ziffer")]),
      ContentNode::plain(3, vec![Inline::text("Text zwei")]),
    ]);
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].ziffer.id, "2");
    assert_eq!(records[1].text, "Text zwei");
  }

  #[test]
  fn ziffer_keyword_matches_exactly() {
    let options = ExtractOptions { ziffer_keywords: vec!["Schlussbestimmungen".into()] };
    let (records, _) = assemble_with(
      vec![
        ContentNode::plain(0, vec![Inline::text("Schlussbestimmungen")]),
        ContentNode::plain(1, vec![Inline::text("Diese Verordnung tritt in Kraft.")]),
      ],
      &FootnoteTable::new(),
      &options,
    );
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].ziffer.name, "Schlussbestimmungen");
    assert_eq!(records[0].ziffer.id, "");
  }

  #[test]
  fn colon_subtitle_prefixes_next_record() {
    let records = assemble(vec![
      ContentNode::plain(0, vec![sup("1"), Inline::text(" Einleitung.")]),
      ContentNode::italic(1, vec![Inline::text("Ausnahmen:")]),
      ContentNode::plain(2, vec![sup("2"), Inline::text(" Keine.")]),
    ]);
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].text, "SubTitle{ Ausnahmen:}\n Keine.");
    assert_eq!(records[0].text, "Einleitung.");
  }

  #[test]
  fn italic_without_colon_continues_last_record() {
    let records = assemble(vec![
      ContentNode::plain(0, vec![sup("1"), Inline::text(" Satz.")]),
      ContentNode::italic(1, vec![Inline::text("aufgehoben")]),
    ]);
    assert_eq!(records[0].text, "Satz.\naufgehoben");
  }

  #[test]
  fn reference_is_captured_by_next_emission() {
    let records = assemble(vec![
      ContentNode::reference(0, vec![Inline::text("(Art. 3 BV)")]),
      ContentNode::plain(1, vec![sup("1"), Inline::text(" Text.")]),
      ContentNode::plain(2, vec![sup("2"), Inline::text(" Mehr.")]),
    ]);
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.reference == "(Art. 3 BV)"));
  }

  #[test]
  fn definition_list_and_table_append_to_last_record() {
    let records = assemble(vec![
      ContentNode::plain(0, vec![sup("1"), Inline::text(" Es bedeuten:")]),
      ContentNode::new(1, NodeKind::DefinitionList {
        entries: vec![DefinitionEntry {
          term:        vec![Inline::text("a.")],
          description: vec![Inline::text("Betrieb")],
        }],
      }),
      ContentNode::new(2, NodeKind::Table {
        rows: vec![
          vec![vec![Inline::text("Stufe")], vec![Inline::text("Satz")]],
          vec![vec![Inline::text("1")], vec![Inline::text("7.7 %")]],
        ],
      }),
    ]);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].text, "Es bedeuten:\na.: Betrieb\nStufe|Satz\n1|7.7 %");
  }

  #[test]
  fn block_before_first_record_is_dropped_with_warning() {
    let (records, warnings) = assemble_with(
      vec![ContentNode::new(0, NodeKind::Table { rows: vec![] })],
      &FootnoteTable::new(),
      &ExtractOptions::default(),
    );
    assert!(records.is_empty());
    assert_eq!(warnings.len(), 1);
  }

  #[test]
  fn empty_paragraph_is_never_emitted() {
    let records = assemble(vec![ContentNode::plain(0, vec![sup("3"), Inline::text("  ")])]);
    assert!(records.is_empty());
  }

  #[test]
  fn repeated_key_appends_to_earlier_record_with_warning() {
    let (records, warnings) = assemble_with(
      vec![
        ContentNode::plain(0, vec![sup("1"), Inline::text(" Erster Absatz.")]),
        ContentNode::plain(1, vec![Inline::text("Übergangsbestimmung")]),
        ContentNode::plain(2, vec![sup("1"), Inline::text(" Übergangsabsatz.")]),
      ],
      &FootnoteTable::new(),
      &ExtractOptions::default(),
    );
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].text, "Erster Absatz.\nÜbergangsabsatz.\n");
    assert_eq!(warnings.len(), 1);
    assert!(matches!(
      &warnings.into_vec()[0],
      Warning::ExtractionAmbiguity { article_id, .. } if article_id == "art_1"
    ));
  }

  #[test]
  fn compound_clause_marker() {
    let inlines = [sup("3"), sup("bis"), Inline::text(" Text")];
    let (marker, rest) = split_clause_marker(&inlines);
    assert_eq!(marker, "3bis");
    assert_eq!(rest, &[Inline::text(" Text")]);
  }

  #[test]
  fn footnote_superscript_is_not_part_of_marker() {
    let inlines = [
      sup("1"),
      Inline::FootnoteRef { fragment: "fn1".into(), label: "1".into() },
      Inline::text(" Text"),
    ];
    let (marker, rest) = split_clause_marker(&inlines);
    assert_eq!(marker, "1");
    assert_eq!(rest.len(), 2);
  }

  #[test]
  fn records_snapshot_document_and_article() {
    let table: FootnoteTable = [("fn1", "SR 101")].into_iter().collect();
    let (records, _) = assemble_with(
      vec![ContentNode::plain(0, vec![
        sup("1"),
        Inline::text(" Gemäss Verfassung"),
        Inline::FootnoteRef { fragment: "fn1".into(), label: "1".into() },
      ])],
      &table,
      &ExtractOptions::default(),
    );
    let r = &records[0];
    assert_eq!(r.document_key, "101");
    assert_eq!(r.short_name, "BV");
    assert_eq!(r.article_name, "Art. 1 Zweck");
    assert_eq!(r.hierarchy[HeadingLevel::SubSection].id, "1");
    assert_eq!(r.text, "Gemäss Verfassung footnote{SR 101}");
  }
}
