//! Extraction of the interesting bits of a mirror's document page.
//!
//! A mirror answers `{mirror}/{doi}` with an HTML page that embeds the PDF viewer:
//!
//! ```html
//! <embed type="application/pdf" src="//host.example/downloads/file.pdf">
//! <div id="citation"><i>Paper Title</i></div>
//! ```
//!
//! When the mirror suspects a bot it serves an interstitial instead, recognisable by
//! `DDoS-Guard` in the page title.

use lazy_static::lazy_static;
use scraper::{Html, Selector};

use super::*;

/// Marker in the `<title>` of a bot-blocking interstitial, compared case-insensitively.
pub const BLOCKING_MARKER: &str = "ddos-guard";

lazy_static! {
  static ref TITLE: Selector = Selector::parse("title").expect("valid selector");
  static ref PDF_EMBED: Selector =
    Selector::parse(r#"embed[type="application/pdf"]"#).expect("valid selector");
  static ref CITATION_TITLE: Selector = Selector::parse("#citation i").expect("valid selector");
}

/// What a mirror page tells us, detached from the parsed document.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct MirrorPage {
  /// The page is a bot-blocking interstitial
  pub blocked:  bool,
  /// Raw `src` of the first PDF embed, if any
  pub pdf_src:  Option<String>,
  /// Text of the citation title, if any
  pub citation: Option<String>,
}

impl MirrorPage {
  /// Parses a mirror response body.
  ///
  /// A blocking page is reported as such and nothing else is extracted from it. Empty
  /// `src` values and blank citation titles count as absent.
  pub fn parse(html: &str) -> Self {
    let document = Html::parse_document(html);

    if is_blocking_page(&document) {
      return Self { blocked: true, ..Self::default() };
    }

    let pdf_src = document
      .select(&PDF_EMBED)
      .next()
      .and_then(|embed| embed.value().attr("src"))
      .map(str::trim)
      .filter(|src| !src.is_empty())
      .map(str::to_string);

    let citation = document
      .select(&CITATION_TITLE)
      .next()
      .map(|el| el.text().collect::<Vec<_>>().join(" "))
      .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
      .filter(|text| !text.is_empty());

    Self { blocked: false, pdf_src, citation }
  }

  /// The PDF link with `policy` applied, when the page had one.
  pub fn pdf_url(&self, policy: ProtocolRelative) -> Option<String> {
    self.pdf_src.as_deref().map(|src| policy.apply(src))
  }
}

/// Whether the document title carries the blocking marker.
fn is_blocking_page(document: &Html) -> bool {
  document
    .select(&TITLE)
    .any(|title| title.text().collect::<String>().to_lowercase().contains(BLOCKING_MARKER))
}
