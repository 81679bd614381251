//! The mirror sweep: ask each mirror in turn, stop at the first PDF link.
//!
//! # Examples
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use paperlink::{MirrorResolver, ResolverConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ResolverConfig::default().with_timeout(Duration::from_secs(5));
//! let resolver = MirrorResolver::with_config(config)?;
//!
//! if let Some(found) = resolver.resolve("10.1145/1327452.1327492").await {
//!   println!("PDF: {}", found.pdf_url);
//!   if let Some(title) = &found.title {
//!     println!("Title: {}", title);
//!   }
//! }
//! # Ok(())
//! # }
//! ```

use super::*;

/// A PDF link found on one of the mirrors.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct LookupResult {
  /// Direct link to the PDF, never empty
  pub pdf_url: String,
  /// Citation title shown on the mirror page, if it had one
  pub title:   Option<String>,
  /// Base URL of the mirror that answered
  pub mirror:  String,
}

/// Resolves identifiers to PDF links by sweeping a fixed, ordered list of mirrors.
///
/// Mirrors are tried strictly one after another. Any failure on a mirror (network
/// error, timeout, error status, oversized page, blocking page, page without a PDF) is logged and the
/// next mirror is tried. Only when the whole list is exhausted does
/// [`resolve`](MirrorResolver::resolve) report that nothing was found.
#[derive(Debug, Clone)]
pub struct MirrorResolver {
  /// HTTP client carrying the timeout and user agent, shared by every request.
  client: reqwest::Client,
  /// The settings this resolver was built with.
  config: ResolverConfig,
}

impl MirrorResolver {
  /// Creates a resolver over the default mirrors with default settings.
  ///
  /// # Errors
  ///
  /// Fails only when the underlying HTTP client cannot be initialised.
  pub fn new() -> Result<Self, PaperlinkError> { Self::with_config(ResolverConfig::default()) }

  /// Creates a resolver with explicit settings.
  ///
  /// # Errors
  ///
  /// Returns [`PaperlinkError::EmptyMirrorList`] if `config.mirrors` is empty, or
  /// [`PaperlinkError::Network`] if the HTTP client cannot be initialised.
  pub fn with_config(config: ResolverConfig) -> Result<Self, PaperlinkError> {
    if config.mirrors.is_empty() {
      return Err(PaperlinkError::EmptyMirrorList);
    }

    let client = reqwest::Client::builder()
      .user_agent(config.user_agent.as_str())
      .timeout(config.timeout)
      .build()?;

    Ok(Self { client, config })
  }

  /// The settings this resolver uses.
  pub fn config(&self) -> &ResolverConfig { &self.config }

  /// The mirrors this resolver asks, in order.
  pub fn mirrors(&self) -> &[String] { &self.config.mirrors }

  /// Looks `identifier` up on each mirror in order and returns the first PDF link found.
  ///
  /// The identifier is appended to every mirror URL as-is; nothing validates it here.
  /// Returns `None` once every mirror has failed or come back without a PDF. Per-mirror
  /// failures are logged and never returned.
  pub async fn resolve(&self, identifier: &str) -> Option<LookupResult> {
    for mirror in &self.config.mirrors {
      match self.try_mirror(mirror, identifier).await {
        Ok(found) => {
          info!("Found PDF URL on {}: {}", mirror, found.pdf_url);
          return Some(found);
        },
        Err(PaperlinkError::Blocked(url)) => {
          warn!("Blocking page at {url}, pausing {:?} before the next mirror", self.config.block_pause);
          tokio::time::sleep(self.config.block_pause).await;
        },
        Err(e) => {
          warn!("Mirror {} failed for {}: {}", mirror, identifier, e);
        },
      }
    }

    warn!("PDF for {} not found on any of {} mirrors", identifier, self.config.mirrors.len());
    None
  }

  /// Asks a single mirror for `identifier`.
  async fn try_mirror(
    &self,
    mirror: &str,
    identifier: &str,
  ) -> Result<LookupResult, PaperlinkError> {
    let url = ResolverConfig::mirror_url(mirror, identifier);
    info!("Connecting to: {url}");

    let response = self.client.get(&url).send().await?;
    let status = response.status();
    debug!("{url} response status: {status}");

    let body = self.read_page(&url, response).await?;
    trace!("{url} response body: {} bytes", body.len());

    // Interstitials often come back with an error status, so look at the page first.
    let page = MirrorPage::parse(&body);
    if page.blocked {
      return Err(PaperlinkError::Blocked(url));
    }

    if !status.is_success() {
      return Err(PaperlinkError::HttpStatus { url, status: status.as_u16() });
    }

    debug!("Parsed page from {url}: {page:?}");

    let pdf_url =
      page.pdf_url(self.config.protocol_relative).ok_or(PaperlinkError::NoPdf(url))?;

    Ok(LookupResult { pdf_url, title: page.citation, mirror: mirror.to_string() })
  }

  /// Reads a mirror page body, refusing anything over `max_page_bytes`.
  async fn read_page(
    &self,
    url: &str,
    mut response: reqwest::Response,
  ) -> Result<String, PaperlinkError> {
    let limit = self.config.max_page_bytes;
    let too_large = || PaperlinkError::PageTooLarge { url: url.to_string(), limit };

    if response.content_length().is_some_and(|len| len > limit as u64) {
      return Err(too_large());
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
      if body.len() + chunk.len() > limit {
        return Err(too_large());
      }
      body.extend_from_slice(&chunk);
    }

    Ok(String::from_utf8_lossy(&body).into_owned())
  }

  /// The absolute URL to fetch for `found`.
  ///
  /// Links that are not absolute (`//host/path` kept verbatim, or `/path`) are resolved
  /// against the mirror that served them, the same way the mirror page would.
  fn download_url(found: &LookupResult) -> Result<url::Url, PaperlinkError> {
    match url::Url::parse(&found.pdf_url) {
      Ok(url) => Ok(url),
      Err(url::ParseError::RelativeUrlWithoutBase) =>
        Ok(url::Url::parse(&found.mirror)?.join(&found.pdf_url)?),
      Err(e) => Err(e.into()),
    }
  }

  /// Downloads the PDF behind `found` to `path`, returning the number of bytes written.
  ///
  /// The request goes through the same client as the lookups, so it carries the same
  /// user agent and timeout.
  ///
  /// # Errors
  ///
  /// Returns an error if the link cannot be made absolute, the request fails, the server
  /// answers with a non-success status, or the file cannot be written.
  pub async fn download(
    &self,
    found: &LookupResult,
    path: impl AsRef<Path>,
  ) -> Result<u64, PaperlinkError> {
    let url = Self::download_url(found)?;
    let path = path.as_ref();

    debug!("Downloading {url} to {}", path.display());
    let response = self.client.get(url.clone()).send().await?;
    let status = response.status();
    if !status.is_success() {
      return Err(PaperlinkError::HttpStatus { url: url.to_string(), status: status.as_u16() });
    }

    let bytes = response.bytes().await?;
    trace!("{url} returned {} bytes", bytes.len());

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &bytes)?;

    Ok(bytes.len() as u64)
  }
}

#[cfg(test)]
mod tests {
  use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
  };

  use super::*;

  /// A config pointing at the given mirrors, with short pauses and timeouts.
  fn test_config(mirrors: &[&MockServer]) -> ResolverConfig {
    ResolverConfig::default()
      .with_mirrors(mirrors.iter().map(|m| m.uri()))
      .with_timeout(Duration::from_millis(500))
      .with_block_pause(Duration::ZERO)
  }

  fn pdf_page(src: &str) -> String {
    format!(r#"<html><body><embed type="application/pdf" src="{src}"></body></html>"#)
  }

  #[test]
  fn test_empty_mirror_list_is_rejected() {
    let config = ResolverConfig::default().with_mirrors(Vec::<String>::new());
    assert!(matches!(MirrorResolver::with_config(config), Err(PaperlinkError::EmptyMirrorList)));
  }

  #[test]
  fn test_default_resolver_uses_default_mirrors() -> anyhow::Result<()> {
    let resolver = MirrorResolver::new()?;
    assert_eq!(resolver.mirrors(), DEFAULT_MIRRORS);
    Ok(())
  }

  #[tokio::test]
  async fn test_sends_user_agent() -> anyhow::Result<()> {
    let mirror = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/10.1000/ua"))
      .and(header("user-agent", "paperlink-test/1.0"))
      .respond_with(ResponseTemplate::new(200).set_body_string(pdf_page("https://a.example/ua.pdf")))
      .expect(1)
      .mount(&mirror)
      .await;

    let resolver =
      MirrorResolver::with_config(test_config(&[&mirror]).with_user_agent("paperlink-test/1.0"))?;
    let found = resolver.resolve("10.1000/ua").await.expect("found");
    assert_eq!(found.pdf_url, "https://a.example/ua.pdf");
    assert_eq!(found.mirror, mirror.uri());
    Ok(())
  }

  #[tokio::test]
  async fn test_error_status_is_skipped() -> anyhow::Result<()> {
    let failing = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(503).set_body_string(pdf_page("https://bad.example/x.pdf")))
      .expect(1)
      .mount(&failing)
      .await;

    let healthy = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(200).set_body_string(pdf_page("https://ok.example/x.pdf")))
      .expect(1)
      .mount(&healthy)
      .await;

    let resolver = MirrorResolver::with_config(test_config(&[&failing, &healthy]))?;
    let found = resolver.resolve("10.1000/status").await.expect("found");
    assert_eq!(found.pdf_url, "https://ok.example/x.pdf");
    assert_eq!(found.mirror, healthy.uri());
    Ok(())
  }

  #[tokio::test]
  async fn test_keep_protocol_relative() -> anyhow::Result<()> {
    let mirror = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(200).set_body_string(pdf_page("//cdn.example/k.pdf")))
      .mount(&mirror)
      .await;

    let config = test_config(&[&mirror]).with_protocol_relative(ProtocolRelative::Keep);
    let found = MirrorResolver::with_config(config)?.resolve("10.1000/keep").await.expect("found");
    assert_eq!(found.pdf_url, "//cdn.example/k.pdf");
    Ok(())
  }

  #[tokio::test]
  async fn test_download_writes_file() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/files/paper.pdf"))
      .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.7 test".to_vec()))
      .expect(1)
      .mount(&server)
      .await;

    let found = LookupResult {
      pdf_url: format!("{}/files/paper.pdf", server.uri()),
      title:   Some("Paper".into()),
      mirror:  server.uri(),
    };
    let dir = tempfile::tempdir()?;
    let target = dir.path().join("nested").join("paper.pdf");

    let resolver = MirrorResolver::with_config(test_config(&[&server]))?;
    let written = resolver.download(&found, &target).await?;

    assert_eq!(written, 13);
    assert_eq!(std::fs::read(&target)?, b"%PDF-1.7 test");
    Ok(())
  }

  #[tokio::test]
  async fn test_download_error_status() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET")).respond_with(ResponseTemplate::new(404)).mount(&server).await;

    let found = LookupResult {
      pdf_url: format!("{}/missing.pdf", server.uri()),
      title:   None,
      mirror:  server.uri(),
    };
    let dir = tempfile::tempdir()?;
    let target = dir.path().join("missing.pdf");

    let resolver = MirrorResolver::with_config(test_config(&[&server]))?;
    let err = resolver.download(&found, &target).await.unwrap_err();

    assert!(matches!(err, PaperlinkError::HttpStatus { status: 404, .. }));
    assert!(!target.exists());
    Ok(())
  }

  #[test]
  fn test_download_url_resolves_against_mirror() -> anyhow::Result<()> {
    let found = |pdf_url: &str, mirror: &str| LookupResult {
      pdf_url: pdf_url.into(),
      title:   None,
      mirror:  mirror.into(),
    };

    let url = MirrorResolver::download_url(&found("//cdn.example/k.pdf", "https://m.example"))?;
    assert_eq!(url.as_str(), "https://cdn.example/k.pdf");

    let url = MirrorResolver::download_url(&found("//cdn.example/k.pdf", "http://m.example"))?;
    assert_eq!(url.as_str(), "http://cdn.example/k.pdf");

    let url = MirrorResolver::download_url(&found("/downloads/k.pdf", "https://m.example/"))?;
    assert_eq!(url.as_str(), "https://m.example/downloads/k.pdf");

    let url = MirrorResolver::download_url(&found("https://a.example/x.pdf", "not a url"))?;
    assert_eq!(url.as_str(), "https://a.example/x.pdf");

    assert!(matches!(
      MirrorResolver::download_url(&found("//cdn.example/k.pdf", "not a url")),
      Err(PaperlinkError::InvalidUrl(_))
    ));
    Ok(())
  }

  #[tokio::test]
  async fn test_oversized_page_is_skipped() -> anyhow::Result<()> {
    let padded = format!("{}{}", pdf_page("https://big.example/x.pdf"), " ".repeat(4096));
    let oversized = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(200).set_body_string(padded))
      .expect(1)
      .mount(&oversized)
      .await;

    let small = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(200).set_body_string(pdf_page("https://ok.example/x.pdf")))
      .expect(1)
      .mount(&small)
      .await;

    let config = test_config(&[&oversized, &small]).with_max_page_bytes(1024);
    let found = MirrorResolver::with_config(config)?.resolve("10.1000/big").await.expect("found");
    assert_eq!(found.pdf_url, "https://ok.example/x.pdf");
    assert_eq!(found.mirror, small.uri());
    Ok(())
  }
}
