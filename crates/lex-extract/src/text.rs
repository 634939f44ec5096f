//! Small text helpers shared by the assemblers.

use std::sync::LazyLock;

use regex::Regex;

static NUMERIC_TOKEN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));

/// Collapse every whitespace run to one space and trim the ends.
pub fn normalize(s: &str) -> String {
  s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The first run of ASCII digits in `s`, or an empty string.
pub fn first_numeric_token(s: &str) -> String {
  NUMERIC_TOKEN
    .find(s)
    .map(|m| m.as_str().to_owned())
    .unwrap_or_default()
}

pub fn starts_with_digit(s: &str) -> bool {
  s.chars().next().is_some_and(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalize_collapses_runs() {
    assert_eq!(normalize("  Art. 1\n   Zweck \t"), "Art. 1 Zweck");
  }

  #[test]
  fn numeric_token_is_first_digit_run() {
    assert_eq!(first_numeric_token("2. Kapitel: 14 Artikel"), "2");
    assert_eq!(first_numeric_token("Art. 12a"), "12");
    assert_eq!(first_numeric_token("Schlussbestimmungen"), "");
  }
}
