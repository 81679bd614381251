//! Error types for the paperlink library.
//!
//! Most of these never reach a caller of [`MirrorResolver::resolve`](crate::MirrorResolver):
//! the per-mirror variants (`Network`, `HttpStatus`, `PageTooLarge`, `Blocked`, `NoPdf`) are produced
//! while sweeping the mirror list, logged, and then discarded in favour of the next
//! mirror. They surface directly only from the operations that stand on their own:
//! building a resolver, parsing an identifier, and downloading a PDF.
//!
//! # Examples
//!
//! ```
//! use paperlink::{doi::Doi, errors::PaperlinkError};
//!
//! match Doi::parse("not a doi") {
//!   Err(PaperlinkError::InvalidIdentifier) => println!("Invalid DOI format"),
//!   Err(e) => println!("Other error: {}", e),
//!   Ok(doi) => println!("Parsed {}", doi),
//! }
//! ```

use thiserror::Error;

/// Errors that can occur when resolving or downloading papers.
#[derive(Error, Debug)]
pub enum PaperlinkError {
  /// The provided input is neither a DOI nor a DOI URL.
  #[error("Invalid identifier format")]
  InvalidIdentifier,

  /// A resolver was configured without any mirrors to ask.
  #[error("Mirror list is empty")]
  EmptyMirrorList,

  /// A network request failed.
  ///
  /// This covers unreachable hosts, DNS failures, TLS errors and requests that ran
  /// past the configured timeout.
  #[error(transparent)]
  Network(#[from] reqwest::Error),

  /// A server answered with a non-success status code.
  #[error("HTTP {status} from {url}")]
  HttpStatus {
    /// The requested URL
    url:    String,
    /// The status code the server returned
    status: u16,
  },

  /// A mirror page was larger than the configured limit.
  #[error("Page at {url} exceeds {limit} bytes")]
  PageTooLarge {
    /// The requested URL
    url:   String,
    /// The limit in bytes
    limit: usize,
  },

  /// The mirror served a bot-blocking interstitial instead of the document page.
  ///
  /// The string parameter holds the URL that was blocked.
  #[error("Blocked by anti-bot page at {0}")]
  Blocked(String),

  /// The mirror answered, but its page carried no embedded PDF.
  ///
  /// The string parameter holds the URL that was inspected.
  #[error("No embedded PDF found at {0}")]
  NoPdf(String),

  /// Failed to parse a URL.
  #[error(transparent)]
  InvalidUrl(#[from] url::ParseError),

  /// A file system operation failed while writing a download.
  #[error(transparent)]
  Path(#[from] std::io::Error),
}
