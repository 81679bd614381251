//! Configuration for a [`MirrorResolver`](crate::MirrorResolver).
//!
//! The defaults reproduce the stock behaviour: four mirrors tried in order, a ten second
//! bound on every request, a three second pause after hitting a bot-blocking page, a
//! browser-like user agent, protocol-relative PDF links upgraded to `https:`, and mirror
//! pages capped at five megabytes.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//!
//! use paperlink::{ProtocolRelative, ResolverConfig};
//!
//! let config = ResolverConfig::default()
//!   .with_mirrors(["https://mirror.example"])
//!   .with_timeout(Duration::from_secs(5))
//!   .with_protocol_relative(ProtocolRelative::Keep);
//!
//! assert_eq!(config.mirrors, vec!["https://mirror.example".to_string()]);
//! ```

use super::*;

/// Mirrors asked for a document, in the order they are tried.
pub const DEFAULT_MIRRORS: [&str; 4] =
  ["https://sci-hub.ru", "https://sci-hub.se", "https://sci-hub.st", "https://sci-hub.wf"];

/// Upper bound on a single mirror request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// How long to wait after a mirror served a bot-blocking page.
pub const DEFAULT_BLOCK_PAUSE: Duration = Duration::from_secs(3);

/// Largest mirror page that will be read, in bytes.
pub const DEFAULT_MAX_PAGE_BYTES: usize = 5 * 1024 * 1024;

/// User agent sent with every request. Basic bot filters let browsers through.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                                      AppleWebKit/537.36 (KHTML, like Gecko) \
                                      Chrome/124.0.0.0 Safari/537.36";

/// What to do with a PDF `src` of the form `//host/path`.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolRelative {
  /// Rewrite to `https://host/path`
  #[default]
  Https,
  /// Return the link exactly as the page declared it
  Keep,
}

impl ProtocolRelative {
  /// Applies the policy to a raw `src` attribute value.
  ///
  /// ```
  /// use paperlink::ProtocolRelative;
  ///
  /// assert_eq!(ProtocolRelative::Https.apply("//a.example/x.pdf"), "https://a.example/x.pdf");
  /// assert_eq!(ProtocolRelative::Keep.apply("//a.example/x.pdf"), "//a.example/x.pdf");
  /// assert_eq!(ProtocolRelative::Https.apply("http://a.example/x.pdf"), "http://a.example/x.pdf");
  /// ```
  pub fn apply(self, src: &str) -> String {
    match self {
      ProtocolRelative::Https if src.starts_with("//") => format!("https:{src}"),
      _ => src.to_string(),
    }
  }
}

/// Settings shared by every lookup a resolver performs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
  /// Mirror base URLs, tried in order
  pub mirrors:           Vec<String>,
  /// Timeout applied to each mirror request
  pub timeout:           Duration,
  /// Pause after a mirror served a blocking page
  pub block_pause:       Duration,
  /// `User-Agent` header value
  pub user_agent:        String,
  /// Handling of protocol-relative PDF links
  pub protocol_relative: ProtocolRelative,
  /// Mirror pages larger than this are skipped unread
  pub max_page_bytes:    usize,
}

impl Default for ResolverConfig {
  fn default() -> Self {
    Self {
      mirrors:           DEFAULT_MIRRORS.iter().map(|m| m.to_string()).collect(),
      timeout:           DEFAULT_TIMEOUT,
      block_pause:       DEFAULT_BLOCK_PAUSE,
      user_agent:        DEFAULT_USER_AGENT.to_string(),
      protocol_relative: ProtocolRelative::default(),
      max_page_bytes:    DEFAULT_MAX_PAGE_BYTES,
    }
  }
}

impl ResolverConfig {
  /// Replaces the mirror list.
  pub fn with_mirrors<I, S>(mut self, mirrors: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>, {
    self.mirrors = mirrors.into_iter().map(Into::into).collect();
    self
  }

  /// Sets the per-request timeout.
  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  /// Sets the pause taken after a blocking page.
  pub fn with_block_pause(mut self, pause: Duration) -> Self {
    self.block_pause = pause;
    self
  }

  /// Sets the `User-Agent` header.
  pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
    self.user_agent = user_agent.into();
    self
  }

  /// Sets the protocol-relative link policy.
  pub fn with_protocol_relative(mut self, policy: ProtocolRelative) -> Self {
    self.protocol_relative = policy;
    self
  }

  /// Sets the largest mirror page that will be read.
  pub fn with_max_page_bytes(mut self, limit: usize) -> Self {
    self.max_page_bytes = limit;
    self
  }

  /// Builds the URL asked of `mirror` for `identifier`.
  ///
  /// ```
  /// use paperlink::ResolverConfig;
  ///
  /// assert_eq!(
  ///   ResolverConfig::mirror_url("https://mirror.example/", "10.1000/xyz123"),
  ///   "https://mirror.example/10.1000/xyz123"
  /// );
  /// ```
  pub fn mirror_url(mirror: &str, identifier: &str) -> String {
    format!("{}/{}", mirror.trim_end_matches('/'), identifier)
  }
}
