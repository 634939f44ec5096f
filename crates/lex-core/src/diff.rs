//! Field-level change detection for upserts.
//!
//! A stored field is overwritten only when the candidate value is present
//! and differs from what is stored. Whether an empty string counts as
//! "present" is decided in [`candidate`] and nowhere else.

/// One column whose stored value must be replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
  pub column: &'static str,
  pub value:  String,
}

/// The update policy for a single candidate value.
///
/// Empty strings are treated exactly like absent values: they never clear a
/// stored field.
pub fn candidate(value: Option<&str>) -> Option<&str> {
  value.filter(|v| !v.is_empty())
}

/// Compute the changed set from `(column, candidate, stored)` triples.
///
/// Key columns must not be passed in; they are immutable.
pub fn changed_fields<'a, I>(fields: I) -> Vec<FieldChange>
where
  I: IntoIterator<Item = (&'static str, Option<&'a str>, &'a str)>,
{
  fields
    .into_iter()
    .filter_map(|(column, offered, stored)| {
      let value = candidate(offered)?;
      (value != stored).then(|| FieldChange { column, value: value.to_owned() })
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_and_absent_never_clear() {
    let changes = changed_fields([
      ("title", Some(""), "T"),
      ("preamble", None, "P"),
    ]);
    assert!(changes.is_empty());
  }

  #[test]
  fn only_differing_present_values_change() {
    let changes = changed_fields([
      ("status", Some("active"), "draft"),
      ("title", Some("T"), "T"),
      ("preface", Some("new"), ""),
    ]);
    assert_eq!(
      changes,
      vec![
        FieldChange { column: "status", value: "active".into() },
        FieldChange { column: "preface", value: "new".into() },
      ]
    );
  }
}
