//! Error type for `lex-ingest`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to read {path:?}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to extract {path:?}: {source}")]
  Extract {
    path:   PathBuf,
    #[source]
    source: lex_extract::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
