//! Locally recovered extraction problems.
//!
//! Warnings never abort a pass. Each one is logged when raised and kept so
//! callers can report how clean a document was.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Warning {
  /// A footnote marker points at a fragment the table does not contain.
  #[error("footnote fragment {fragment:?} not found")]
  MissingFootnote { fragment: String },
  /// A heading or node could not be placed unambiguously.
  #[error("{article_id}: {detail}")]
  ExtractionAmbiguity { article_id: String, detail: String },
}

/// Collects warnings for one document, logging each as it arrives.
#[derive(Debug, Default)]
pub struct Warnings {
  items: Vec<Warning>,
}

impl Warnings {
  pub fn missing_footnote(&mut self, fragment: &str) {
    self.push(Warning::MissingFootnote { fragment: fragment.to_owned() });
  }

  pub fn ambiguity(&mut self, article_id: &str, detail: impl Into<String>) {
    self.push(Warning::ExtractionAmbiguity {
      article_id: article_id.to_owned(),
      detail:     detail.into(),
    });
  }

  fn push(&mut self, warning: Warning) {
    tracing::warn!(%warning, "extraction warning");
    self.items.push(warning);
  }

  pub fn len(&self) -> usize { self.items.len() }

  pub fn is_empty(&self) -> bool { self.items.is_empty() }

  pub fn into_vec(self) -> Vec<Warning> { self.items }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn warnings_render_their_context() {
    let mut warnings = Warnings::default();
    warnings.missing_footnote("fn-9");
    warnings.ambiguity("art_3", "extra heading dropped");

    let rendered: Vec<_> = warnings.into_vec().iter().map(ToString::to_string).collect();
    assert_eq!(rendered, [
      r#"footnote fragment "fn-9" not found"#,
      "art_3: extra heading dropped"
    ]);
  }

  #[test]
  fn warning_is_an_error_value() {
    let warning: Box<dyn std::error::Error> =
      Box::new(Warning::MissingFootnote { fragment: "fn-1".into() });
    assert!(warning.source().is_none());
  }
}
