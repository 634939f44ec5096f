//! Saved law pages on disk.

use std::{
  fs,
  path::{Path, PathBuf},
};

use lex_core::source::SourceDocument;

use crate::{Error, Result};

fn is_page(path: &Path) -> bool {
  path
    .extension()
    .and_then(|e| e.to_str())
    .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
}

/// Expand `paths` into the list of page files to ingest.
///
/// Files are taken as given; directories are walked recursively for
/// `*.html` / `*.htm`, each directory's entries in name order.
pub fn collect_pages(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
  let mut pages = Vec::new();
  for path in paths {
    if path.is_dir() {
      walk(path, &mut pages)?;
    } else {
      pages.push(path.clone());
    }
  }
  Ok(pages)
}

fn walk(dir: &Path, pages: &mut Vec<PathBuf>) -> Result<()> {
  let io = |source| Error::Io { path: dir.to_path_buf(), source };

  let mut entries = fs::read_dir(dir)
    .map_err(io)?
    .map(|entry| entry.map(|e| e.path()))
    .collect::<std::io::Result<Vec<_>>>()
    .map_err(io)?;
  entries.sort();

  for path in entries {
    if path.is_dir() {
      walk(&path, pages)?;
    } else if is_page(&path) {
      pages.push(path);
    }
  }
  Ok(())
}

/// Read and parse one saved page.
pub fn load_page(path: &Path, fallback_url: Option<&str>) -> Result<SourceDocument> {
  let html = fs::read_to_string(path).map_err(|source| Error::Io {
    path: path.to_path_buf(),
    source,
  })?;
  lex_extract::parse_html(&html, fallback_url).map_err(|source| Error::Extract {
    path: path.to_path_buf(),
    source,
  })
}
