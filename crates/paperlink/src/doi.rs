//! Parsing of user-supplied document identifiers.
//!
//! The resolver itself takes whatever string it is given and appends it to each mirror.
//! Callers that accept free-form input (like the command-line tool) run it through
//! [`Doi::parse`] first, which accepts:
//! - a bare DOI (`10.1145/1327452.1327492`)
//! - a `doi:` prefixed DOI (`doi:10.1145/1327452.1327492`)
//! - a resolver URL (`https://doi.org/10.1145/1327452.1327492`, `dx.doi.org` too)
//!
//! # Examples
//!
//! ```
//! use paperlink::doi::Doi;
//!
//! let doi = Doi::parse("https://doi.org/10.1145/1327452.1327492").unwrap();
//! assert_eq!(doi.as_str(), "10.1145/1327452.1327492");
//! assert_eq!(doi.prefix(), "10.1145");
//! ```

use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use super::*;

lazy_static! {
  static ref DOI: Regex = Regex::new(r"^10\.\d{4,9}/[-._;()/:<>\[\]\w]+$").expect("valid regex");
}

/// A syntactically valid Digital Object Identifier.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Doi(String);

impl Doi {
  /// Parses a DOI from a bare identifier, a `doi:` string, or a DOI resolver URL.
  ///
  /// # Errors
  ///
  /// Returns [`PaperlinkError::InvalidIdentifier`] when the input is not a DOI, or is a URL
  /// on a host other than `doi.org`/`dx.doi.org`.
  pub fn parse(input: &str) -> Result<Self, PaperlinkError> {
    let input = input.trim();

    if let Some(rest) = strip_prefix_ignore_case(input, "doi:") {
      return Self::from_bare(rest.trim());
    }

    if let Ok(url) = Url::parse(input) {
      return match url.host_str() {
        Some("doi.org" | "dx.doi.org" | "www.doi.org") => Self::from_bare(&extract_doi(&url)?),
        _ => Err(PaperlinkError::InvalidIdentifier),
      };
    }

    Self::from_bare(input)
  }

  /// The DOI as it is appended to mirror URLs.
  pub fn as_str(&self) -> &str { &self.0 }

  /// The registrant prefix, e.g. `10.1145`.
  pub fn prefix(&self) -> &str { self.0.split_once('/').map_or(self.0.as_str(), |(p, _)| p) }

  /// Validates an identifier that carries no scheme or prefix.
  fn from_bare(candidate: &str) -> Result<Self, PaperlinkError> {
    if DOI.is_match(candidate) {
      Ok(Self(candidate.to_string()))
    } else {
      debug!("Rejected identifier: {candidate}");
      Err(PaperlinkError::InvalidIdentifier)
    }
  }
}

impl std::fmt::Display for Doi {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}

impl FromStr for Doi {
  type Err = PaperlinkError;

  fn from_str(s: &str) -> Result<Self, Self::Err> { Self::parse(s) }
}

/// Extracts the DOI from a resolver URL's path.
///
/// Parses URLs like "https://doi.org/10.1145/1327452.1327492" to extract the DOI.
fn extract_doi(url: &Url) -> Result<String, PaperlinkError> {
  url
    .path()
    .strip_prefix('/')
    .filter(|s| !s.is_empty())
    .map(|s| s.to_string())
    .ok_or(PaperlinkError::InvalidIdentifier)
}

/// `str::strip_prefix`, but ASCII case-insensitive.
fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
  let head = s.get(..prefix.len())?;
  head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}
