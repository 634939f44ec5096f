//! Heading context: which book, part, title, … an article belongs to.
//!
//! Containers are walked from the article outwards. A container that
//! declares its level fills exactly that slot. Otherwise the heading goes to
//! the most specific slot that is still empty ([`fill_positional`]), so the
//! nearest containers end up in the most specific levels. Irregular nesting
//! can therefore mis-assign levels; no attempt is made to guess depth.

use lex_core::{
  hierarchy::{Heading, HeadingLevel, HierarchyContext},
  node::Inline,
  record::Article,
  source::ArticleSource,
};

use crate::{footnote::FootnoteResolver, text, warning::Warnings};

/// Build the [`Article`] for `source`: resolved name plus heading context.
pub fn article(
  source: &ArticleSource,
  resolver: &FootnoteResolver<'_>,
  warnings: &mut Warnings,
) -> Article {
  Article {
    article_id:   source.article_id.clone(),
    article_name: text::normalize(&resolver.resolve(&source.heading, warnings)),
    hierarchy:    context_for(source, resolver, warnings),
  }
}

/// Derive the eight-level heading context of one article.
pub fn context_for(
  source: &ArticleSource,
  resolver: &FootnoteResolver<'_>,
  warnings: &mut Warnings,
) -> HierarchyContext {
  let mut ctx = HierarchyContext::default();
  let mut containers = source.containers.iter();

  for container in containers.by_ref() {
    let Some(markup) = &container.heading else { continue };
    let heading = heading_from(markup, resolver, warnings);
    if heading.is_empty() {
      continue;
    }

    let placed = match container.declared_level {
      Some(level) if ctx.is_filled(level) => {
        warnings.ambiguity(
          &source.article_id,
          format!("heading {:?} declares {} which is already filled", heading.name, level.as_str()),
        );
        None
      }
      Some(level) => {
        ctx[level] = heading;
        Some(level)
      }
      None => {
        let name = heading.name.clone();
        let placed = fill_positional(&mut ctx, heading);
        if placed.is_none() {
          warnings.ambiguity(
            &source.article_id,
            format!("no free heading level left for {name:?}"),
          );
        }
        placed
      }
    };

    if placed.is_some_and(HeadingLevel::is_top) {
      break;
    }
  }

  let beyond_top = containers
    .filter(|c| c.heading.as_ref().is_some_and(|h| !h.iter().all(Inline::is_blank)))
    .count();
  if beyond_top > 0 {
    warnings.ambiguity(
      &source.article_id,
      format!("{beyond_top} heading(s) above the book level ignored"),
    );
  }

  ctx
}

/// Put `heading` into the first unfilled slot, scanning from
/// [`HeadingLevel::SubSection`] to [`HeadingLevel::Book`].
///
/// Returns the slot used, or `None` if every slot is already filled.
pub fn fill_positional(ctx: &mut HierarchyContext, heading: Heading) -> Option<HeadingLevel> {
  let level = ctx.first_unfilled()?;
  ctx[level] = heading;
  Some(level)
}

/// Label text (footnotes resolved, whitespace collapsed) and its first
/// numeric token as id.
pub fn heading_from(
  markup: &[Inline],
  resolver: &FootnoteResolver<'_>,
  warnings: &mut Warnings,
) -> Heading {
  let name = text::normalize(&resolver.resolve(markup, warnings));
  Heading { id: text::first_numeric_token(&name), name }
}
