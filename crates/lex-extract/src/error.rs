//! Error types for the lex-extract crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The page lacks an element without which no document can be keyed.
  #[error("page has no {0} element")]
  MissingElement(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
