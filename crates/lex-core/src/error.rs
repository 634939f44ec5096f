//! Error types for `lex-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown heading level: {0:?}")]
  UnknownHeadingLevel(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
