//! The eight-level heading hierarchy an article sits in.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};
use strum::{EnumCount, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::{Error, Result};

/// A structural level of a law text, ordered from most specific to broadest.
///
/// The `snake_case` name doubles as the column prefix in the store
/// (`sub_section_id`, `sub_section_name`, …).
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  EnumIter,
  EnumCount,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HeadingLevel {
  SubSection,
  Section,
  SubChapter,
  Chapter,
  SubTitle,
  Title,
  Part,
  Book,
}

impl HeadingLevel {
  /// All levels, most specific first.
  pub fn ordered() -> impl Iterator<Item = Self> { Self::iter() }

  pub fn as_str(self) -> &'static str { self.into() }

  /// Parse a `snake_case` level name such as `"sub_chapter"`.
  pub fn parse(s: &str) -> Result<Self> {
    s.trim()
      .parse()
      .map_err(|_| Error::UnknownHeadingLevel(s.to_owned()))
  }

  /// Whether this is the broadest level; the heading walk ends here.
  pub fn is_top(self) -> bool { self == Self::Book }

  fn index(self) -> usize { self as usize }
}

/// A heading label: the first numeric token as `id` plus the full text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Heading {
  pub id:   String,
  pub name: String,
}

impl Heading {
  pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
    Self { id: id.into(), name: name.into() }
  }

  pub fn is_empty(&self) -> bool { self.id.is_empty() && self.name.is_empty() }
}

/// One heading per [`HeadingLevel`]; unfilled levels hold an empty heading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HierarchyContext {
  levels: [Heading; HeadingLevel::COUNT],
}

impl HierarchyContext {
  pub fn is_filled(&self, level: HeadingLevel) -> bool {
    !self[level].is_empty()
  }

  /// The most specific level that is still empty.
  pub fn first_unfilled(&self) -> Option<HeadingLevel> {
    HeadingLevel::ordered().find(|l| !self.is_filled(*l))
  }

  pub fn iter(&self) -> impl Iterator<Item = (HeadingLevel, &Heading)> {
    HeadingLevel::ordered().map(move |l| (l, &self[l]))
  }

  /// Builder-style setter, mostly for tests and fixtures.
  pub fn with(mut self, level: HeadingLevel, heading: Heading) -> Self {
    self[level] = heading;
    self
  }
}

impl Index<HeadingLevel> for HierarchyContext {
  type Output = Heading;

  fn index(&self, level: HeadingLevel) -> &Heading { &self.levels[level.index()] }
}

impl IndexMut<HeadingLevel> for HierarchyContext {
  fn index_mut(&mut self, level: HeadingLevel) -> &mut Heading {
    &mut self.levels[level.index()]
  }
}
