//! HTML input adapter.
//!
//! Maps one saved consolidated-law page onto a [`SourceDocument`]. Only the
//! DOM is read; no normalisation happens here beyond trimming footnote and
//! auxiliary values.

use std::sync::LazyLock;

use lex_core::{
  hierarchy::HeadingLevel,
  node::{ContentNode, DefinitionEntry, Inline, NodeKind, flatten},
  source::{ArticleSource, Container, FootnoteTable, RawMetadata, SourceDocument},
};
use scraper::{ElementRef, Html, Node, Selector};

use crate::{
  error::{Error, Result},
  text,
};

fn selector(css: &str) -> Selector {
  Selector::parse(css).expect("valid selector")
}

static SRN: LazyLock<Selector> = LazyLock::new(|| selector("#preface .srnummer"));
static PREFACE: LazyLock<Selector> = LazyLock::new(|| selector("#preface"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("#preface h1"));
static PREAMBLE: LazyLock<Selector> = LazyLock::new(|| selector("#preamble"));
static SIDEBAR: LazyLock<Selector> = LazyLock::new(|| selector("#sidebar"));
static IN_FORCE: LazyLock<Selector> =
  LazyLock::new(|| selector("#sidebar app-in-force-status .soft-green"));
static ANNEXE: LazyLock<Selector> = LazyLock::new(|| selector("#annexeContent > div"));
static STRONG: LazyLock<Selector> = LazyLock::new(|| selector("strong"));
static P_ANCHOR: LazyLock<Selector> = LazyLock::new(|| selector("p a"));
static P: LazyLock<Selector> = LazyLock::new(|| selector("p"));
static FOOTNOTES: LazyLock<Selector> = LazyLock::new(|| selector("div.footnotes [id]"));
static ARTICLE: LazyLock<Selector> = LazyLock::new(|| selector("article"));
static ARTICLE_HEADING: LazyLock<Selector> = LazyLock::new(|| selector("h6.heading"));
static COLLAPSEABLE: LazyLock<Selector> = LazyLock::new(|| selector("div.collapseable"));
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));
static ROW: LazyLock<Selector> = LazyLock::new(|| selector("tr"));
static CELL: LazyLock<Selector> = LazyLock::new(|| selector("th, td"));
static CANONICAL: LazyLock<Selector> = LazyLock::new(|| selector(r#"link[rel="canonical"]"#));
static OG_URL: LazyLock<Selector> = LazyLock::new(|| selector(r#"meta[property="og:url"]"#));

const HEADING_LEVEL_ATTR: &str = "data-heading-level";

/// Parse a full law page.
pub fn parse_document(html: &str, fallback_url: Option<&str>) -> Result<SourceDocument> {
  let page = Html::parse_document(html);

  let document_key = page
    .select(&SRN)
    .next()
    .map(text_content)
    .filter(|key| !key.is_empty())
    .ok_or(Error::MissingElement("#preface .srnummer"))?;

  let metadata = RawMetadata {
    title: page
      .select(&TITLE)
      .next()
      .map(|h1| flatten(&inlines(h1)).trim().to_owned())
      .unwrap_or_default(),
    preface: page.select(&PREFACE).next().map(preface_inlines),
    preamble: page.select(&PREAMBLE).next().map(inlines),
    in_force: in_force(&page),
    auxiliary: page.select(&ANNEXE).filter_map(auxiliary_entry).collect(),
    source_url: source_url(&page, fallback_url),
    document_key,
  };

  let footnotes = page
    .select(&FOOTNOTES)
    .filter_map(|el| Some((el.value().attr("id")?, text::normalize(&text_content(el)))))
    .collect::<FootnoteTable>();

  let articles = page.select(&ARTICLE).map(article).collect::<Vec<_>>();

  tracing::debug!(
    document = %metadata.document_key,
    footnotes = footnotes.len(),
    articles = articles.len(),
    "page parsed"
  );

  Ok(SourceDocument { metadata, footnotes, articles })
}

// ─── Metadata ────────────────────────────────────────────────────────────────

fn preface_inlines(preface: ElementRef<'_>) -> Vec<Inline> {
  children_inlines(preface, |el| {
    el.value().name() != "h1" && !el.value().classes().any(|c| c == "srnummer")
  })
}

fn in_force(page: &Html) -> Option<bool> {
  if page.select(&IN_FORCE).next().is_some() {
    Some(true)
  } else if page.select(&SIDEBAR).next().is_some() {
    Some(false)
  } else {
    None
  }
}

fn auxiliary_entry(div: ElementRef<'_>) -> Option<(String, String)> {
  let label = text_content(div.select(&STRONG).next()?);
  let value = div
    .select(&P_ANCHOR)
    .find_map(|a| a.value().attr("href").map(str::to_owned))
    .or_else(|| div.select(&P).next().map(text_content))
    .unwrap_or_default();
  Some((label, value))
}

fn source_url(page: &Html, fallback: Option<&str>) -> String {
  page
    .select(&CANONICAL)
    .find_map(|l| l.value().attr("href"))
    .or_else(|| page.select(&OG_URL).find_map(|m| m.value().attr("content")))
    .or(fallback)
    .unwrap_or_default()
    .trim()
    .to_owned()
}

// ─── Articles ────────────────────────────────────────────────────────────────

fn article(el: ElementRef<'_>) -> ArticleSource {
  let article_id = el.value().attr("id").unwrap_or_default().to_owned();
  let mut nodes = Vec::new();
  let mut skipped = Vec::new();

  for child in el
    .select(&COLLAPSEABLE)
    .next()
    .into_iter()
    .flat_map(|body| body.children().filter_map(ElementRef::wrap))
  {
    match content_kind(child) {
      Some(kind) => nodes.push(ContentNode::new(nodes.len(), kind)),
      None => {
        let tag = child.value().name();
        tracing::debug!(article = %article_id, %tag, "unclassifiable body element skipped");
        skipped.push(tag.to_owned());
      }
    }
  }

  ArticleSource {
    article_id,
    heading: el.select(&ARTICLE_HEADING).next().map(inlines).unwrap_or_default(),
    containers: el
      .ancestors()
      .filter_map(ElementRef::wrap)
      .filter(|a| a.value().name() == "section")
      .map(container)
      .collect(),
    nodes,
    skipped,
  }
}

fn container(section: ElementRef<'_>) -> Container {
  let heading = section
    .children()
    .filter_map(ElementRef::wrap)
    .find(|c| matches!(c.value().name(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6"))
    .map(inlines);

  let declared_level = section.value().attr(HEADING_LEVEL_ATTR).and_then(|value| {
    HeadingLevel::parse(value)
      .inspect_err(|e| tracing::warn!(error = %e, "ignoring declared heading level"))
      .ok()
  });

  Container { heading, declared_level }
}

fn content_kind(el: ElementRef<'_>) -> Option<NodeKind> {
  match el.value().name() {
    "p" => Some(paragraph_kind(el)),
    "dl" => Some(NodeKind::DefinitionList { entries: definition_entries(el) }),
    "table" => Some(NodeKind::Table {
      rows: el
        .select(&ROW)
        .map(|row| row.select(&CELL).map(inlines).collect())
        .collect(),
    }),
    _ => None,
  }
}

/// Italic when the only visible content (footnote markers aside) is
/// emphasised; reference when the class says so.
fn paragraph_kind(p: ElementRef<'_>) -> NodeKind {
  let inlines = inlines(p);

  if p
    .value()
    .classes()
    .any(|c| c.contains("reference") || c.contains("referenz"))
  {
    return NodeKind::ReferenceSpan { inlines };
  }

  let mut visible = inlines
    .iter()
    .filter(|i| !i.is_blank() && !matches!(i, Inline::FootnoteRef { .. }));
  let italic = matches!(
    (visible.next(), visible.next()),
    (Some(Inline::Emphasis(_)), None)
  );

  if italic {
    NodeKind::ItalicSpan { inlines }
  } else {
    NodeKind::PlainBlock { inlines }
  }
}

fn definition_entries(dl: ElementRef<'_>) -> Vec<DefinitionEntry> {
  let mut entries: Vec<DefinitionEntry> = Vec::new();
  for child in dl.children().filter_map(ElementRef::wrap) {
    match child.value().name() {
      "dt" => entries.push(DefinitionEntry { term: inlines(child), description: vec![] }),
      "dd" => match entries.last_mut() {
        Some(last) if last.description.is_empty() => last.description = inlines(child),
        _ => entries.push(DefinitionEntry { term: vec![], description: inlines(child) }),
      },
      _ => {}
    }
  }
  entries
}

// ─── Inline tree ─────────────────────────────────────────────────────────────

fn inlines(el: ElementRef<'_>) -> Vec<Inline> { children_inlines(el, |_| true) }

fn children_inlines(el: ElementRef<'_>, keep: impl Fn(ElementRef<'_>) -> bool) -> Vec<Inline> {
  el.children()
    .filter_map(|child| match child.value() {
      Node::Text(t) => Some(Inline::text(&**t)),
      Node::Element(_) => ElementRef::wrap(child).filter(|e| keep(*e)).map(inline_element),
      _ => None,
    })
    .collect()
}

fn inline_element(el: ElementRef<'_>) -> Inline {
  match el.value().name() {
    "sup" => footnote_ref(el).unwrap_or_else(|| Inline::Superscript(inlines(el))),
    "a" => Inline::Link {
      href:     el.value().attr("href").unwrap_or_default().to_owned(),
      children: inlines(el),
    },
    "i" | "em" => Inline::Emphasis(inlines(el)),
    "br" => Inline::LineBreak,
    _ => Inline::Span(inlines(el)),
  }
}

/// A `sup` wrapping an anchor to `#fragment`.
fn footnote_ref(sup: ElementRef<'_>) -> Option<Inline> {
  let fragment = sup.select(&ANCHOR).find_map(|a| {
    let (_, fragment) = a.value().attr("href")?.split_once('#')?;
    (!fragment.is_empty()).then(|| fragment.to_owned())
  })?;
  Some(Inline::FootnoteRef { fragment, label: text_content(sup) })
}

fn text_content(el: ElementRef<'_>) -> String {
  el.text().collect::<String>().trim().to_owned()
}

#[cfg(test)]
mod tests {
  use super::*;

  const PAGE: &str = r##"<!DOCTYPE html>
<html>
<head>
  <link rel="canonical" href="https://www.fedlex.admin.ch/eli/cc/1999/404/de">
</head>
<body>
  <div id="sidebar"><app-in-force-status><span class="soft-green">In Kraft</span></app-in-force-status></div>
  <div id="preface">
    <p class="srnummer">101</p>
    <h1>Bundesverfassung<br>der Schweizerischen Eidgenossenschaft</h1>
    <p>vom 18. April 1999 (Stand am 3. März 2024)<sup><a href="#fn-1">1</a></sup></p>
  </div>
  <div id="preamble"><p>Im Namen Gottes des Allmächtigen!</p></div>
  <div id="annexeContent">
    <div><strong>Abkürzung</strong><p>BV</p></div>
    <div><strong>Chronologie</strong><p><a href="https://example.org/chrono">Chronologie</a></p></div>
  </div>
  <section data-heading-level="title">
    <h1>1. Titel: Allgemeine Bestimmungen</h1>
    <section data-heading-level="volume">
      <h2>1. Kapitel</h2>
      <article id="art_1">
        <h6 class="heading">Art. 1 Schweizerische Eidgenossenschaft</h6>
        <div class="collapseable">
          <p><sup>1</sup> Das Schweizervolk und die Kantone<sup><a href="#fn-2">2</a></sup> bilden die Eidgenossenschaft.</p>
          <p><i>1. Allgemeines</i></p>
          <p class="referenz">SR 101.1</p>
          <dl><dt>a.</dt><dd>Zürich</dd><dt>b.</dt><dd>Bern</dd></dl>
          <table><tr><th>Stufe</th><th>Satz</th></tr><tr><td>1</td><td>7.7 %</td></tr></table>
          <div>ignored</div>
        </div>
      </article>
    </section>
  </section>
  <div class="footnotes">
    <p id="fn-1"> Angenommen in der Volksabstimmung </p>
    <p id="fn-2">Fassung gemäss BB</p>
  </div>
</body>
</html>"##;

  fn parsed() -> SourceDocument { parse_document(PAGE, None).unwrap() }

  #[test]
  fn metadata_is_read_from_the_page() {
    let doc = parsed();
    let meta = &doc.metadata;
    assert_eq!(meta.document_key, "101");
    assert_eq!(meta.title, "Bundesverfassung der Schweizerischen Eidgenossenschaft");
    assert_eq!(meta.in_force, Some(true));
    assert_eq!(meta.source_url, "https://www.fedlex.admin.ch/eli/cc/1999/404/de");
    assert_eq!(meta.auxiliary, vec![
      ("Abkürzung".to_owned(), "BV".to_owned()),
      ("Chronologie".to_owned(), "https://example.org/chrono".to_owned()),
    ]);

    let preface = flatten(meta.preface.as_deref().unwrap());
    assert!(!preface.contains("101"), "{preface}");
    assert!(!preface.contains("Bundesverfassung"), "{preface}");
    assert!(preface.contains("vom 18. April 1999"));
    assert_eq!(flatten(meta.preamble.as_deref().unwrap()).trim(), "Im Namen Gottes des Allmächtigen!");
  }

  #[test]
  fn footnotes_are_keyed_by_id() {
    let doc = parsed();
    assert_eq!(doc.footnotes.len(), 2);
    assert_eq!(doc.footnotes.get("fn-1"), Some("Angenommen in der Volksabstimmung"));
  }

  #[test]
  fn article_nodes_are_classified_in_order() {
    let doc = parsed();
    let [article] = doc.articles.as_slice() else { panic!("expected one article") };
    assert_eq!(article.article_id, "art_1");
    assert_eq!(flatten(&article.heading), "Art. 1 Schweizerische Eidgenossenschaft");

    let kinds: Vec<_> = article.nodes.iter().map(|n| n.kind.name()).collect();
    assert_eq!(kinds, [
      "plain-block",
      "italic-span",
      "reference-span",
      "definition-list",
      "table"
    ]);
    assert!(article.nodes.iter().enumerate().all(|(i, n)| n.position == i));
    assert_eq!(article.skipped, ["div"]);

    let NodeKind::PlainBlock { inlines } = &article.nodes[0].kind else { unreachable!() };
    assert_eq!(inlines[0], Inline::Superscript(vec![Inline::text("1")]));
    assert!(inlines.contains(&Inline::FootnoteRef { fragment: "fn-2".into(), label: "2".into() }));

    let NodeKind::DefinitionList { entries } = &article.nodes[3].kind else { unreachable!() };
    assert_eq!(entries.len(), 2);
    assert_eq!(flatten(&entries[1].description), "Bern");

    let NodeKind::Table { rows } = &article.nodes[4].kind else { unreachable!() };
    assert_eq!(rows.len(), 2);
    assert_eq!(flatten(&rows[1][1]), "7.7 %");
  }

  #[test]
  fn containers_run_nearest_first() {
    let doc = parsed();
    let containers = &doc.articles[0].containers;
    assert_eq!(containers.len(), 2);
    assert_eq!(flatten(containers[0].heading.as_deref().unwrap()), "1. Kapitel");
    // "volume" is not a heading level and is dropped.
    assert_eq!(containers[0].declared_level, None);
    assert_eq!(containers[1].declared_level, Some(HeadingLevel::Title));
  }

  #[test]
  fn page_without_key_is_rejected() {
    let err = parse_document("<html><body><p>nothing</p></body></html>", None).unwrap_err();
    assert!(matches!(err, Error::MissingElement(_)));
  }

  #[test]
  fn missing_sidebar_and_canonical_fall_back() {
    let html = r#"<div id="preface"><p class="srnummer">0.101</p></div>"#;
    let doc = parse_document(html, Some("https://example.org/0.101")).unwrap();
    assert_eq!(doc.metadata.in_force, None);
    assert_eq!(doc.metadata.preamble, None);
    assert_eq!(doc.metadata.source_url, "https://example.org/0.101");
    assert!(doc.articles.is_empty());
  }
}
