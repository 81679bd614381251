//! A library for turning Digital Object Identifiers (DOIs) into direct PDF links by
//! querying a list of mirror sites one after another.
//!
//! Each mirror is asked for `{mirror}/{doi}`; the returned HTML page is searched for an
//! embedded PDF and an optional citation title. The first mirror that yields a PDF link
//! wins, and every per-mirror failure is logged and skipped.
//!
//! # Example
//! ```rust,no_run
//! use paperlink::{doi::Doi, MirrorResolver};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!   let doi = Doi::parse("https://doi.org/10.1145/1327452.1327492")?;
//!   let resolver = MirrorResolver::new()?;
//!
//!   match resolver.resolve(doi.as_str()).await {
//!     Some(found) => println!("PDF: {}", found.pdf_url),
//!     None => println!("No mirror had it"),
//!   }
//!
//!   Ok(())
//! }
//! ```

#![warn(missing_docs, clippy::missing_docs_in_private_items)]
use std::{path::Path, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};
#[cfg(test)] use tracing_test::traced_test;

pub mod config;
pub mod doi;
pub mod errors;
pub mod format;
pub mod page;
pub mod resolver;

pub use config::{ProtocolRelative, ResolverConfig, DEFAULT_MIRRORS};
use errors::PaperlinkError;
use page::MirrorPage;
pub use resolver::{LookupResult, MirrorResolver};
