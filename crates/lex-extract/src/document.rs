//! Document-level metadata assembly.

use std::sync::LazyLock;

use lex_core::{node::Inline, record::LawDocument, source::RawMetadata};
use regex::Regex;

use crate::{footnote::FootnoteResolver, text, warning::Warnings};

pub const STATUS_IN_FORCE: &str = "in Kraft";
pub const STATUS_NOT_IN_FORCE: &str = "nicht in Kraft";

static ELI_CONSOLIDATED: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(eli/)cc/").expect("valid regex"));

/// Auxiliary-block fields, addressed by the label the page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuxField {
  ShortName,
  DecisionDate,
  EffectiveDate,
  SourceName,
  ChronologyLink,
  AmendmentLink,
}

impl AuxField {
  fn from_label(label: &str) -> Option<Self> {
    match label.trim() {
      "Abkürzung" => Some(Self::ShortName),
      "Beschluss" => Some(Self::DecisionDate),
      "Inkrafttreten" => Some(Self::EffectiveDate),
      "Quelle" => Some(Self::SourceName),
      "Chronologie" => Some(Self::ChronologyLink),
      "Änderungen" => Some(Self::AmendmentLink),
      _ => None,
    }
  }

  fn slot(self, doc: &mut LawDocument) -> &mut Option<String> {
    match self {
      Self::ShortName => &mut doc.short_name,
      Self::DecisionDate => &mut doc.decision_date,
      Self::EffectiveDate => &mut doc.effective_date,
      Self::SourceName => &mut doc.source_name,
      Self::ChronologyLink => &mut doc.chronology_link,
      Self::AmendmentLink => &mut doc.amendment_link,
    }
  }
}

/// Derive the canonical ("oc") link from a consolidated-collection source
/// link. Links without an `eli/cc/` segment are returned unchanged.
pub fn quelle_link(source_link: &str) -> String {
  ELI_CONSOLIDATED.replace(source_link, "${1}oc/").into_owned()
}

/// Builds the single [`LawDocument`] of a page.
pub struct DocumentAssembler<'a> {
  resolver: FootnoteResolver<'a>,
}

impl<'a> DocumentAssembler<'a> {
  pub fn new(resolver: FootnoteResolver<'a>) -> Self { Self { resolver } }

  /// Missing sections degrade to defaults: empty preface and preamble,
  /// [`STATUS_NOT_IN_FORCE`] without an indicator, absent auxiliary fields.
  pub fn assemble(&self, raw: &RawMetadata, warnings: &mut Warnings) -> LawDocument {
    let mut doc = LawDocument {
      document_key: raw.document_key.trim().to_owned(),
      title: text::normalize(&raw.title),
      preface: self.section(raw.preface.as_deref(), warnings),
      preamble: self.section(raw.preamble.as_deref(), warnings),
      status: match raw.in_force {
        Some(true) => STATUS_IN_FORCE,
        Some(false) | None => STATUS_NOT_IN_FORCE,
      }
      .to_owned(),
      source_link: raw.source_url.clone(),
      quelle_link: quelle_link(&raw.source_url),
      ..LawDocument::default()
    };

    for (label, value) in &raw.auxiliary {
      let Some(field) = AuxField::from_label(label) else {
        tracing::debug!(%label, "unmapped auxiliary label");
        continue;
      };
      let value = value.trim();
      if !value.is_empty() {
        *field.slot(&mut doc) = Some(value.to_owned());
      }
    }

    doc
  }

  fn section(&self, markup: Option<&[Inline]>, warnings: &mut Warnings) -> String {
    markup
      .map(|m| text::normalize(&self.resolver.resolve(m, warnings)))
      .unwrap_or_default()
  }
}
