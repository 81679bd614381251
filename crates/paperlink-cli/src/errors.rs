//! Error types for the paperlink command-line tool.
//!
//! Everything is `transparent`, so the underlying message is what the user sees when a
//! command fails.

use thiserror::Error;

/// Errors that can occur while running a CLI command.
#[derive(Error, Debug)]
pub enum PaperlinkCliError {
  /// Errors from user interaction dialogs
  #[error(transparent)]
  Dialoguer(#[from] dialoguer::Error),

  /// Errors from the underlying paperlink library
  #[error(transparent)]
  Paperlink(#[from] paperlink::errors::PaperlinkError),

  /// File system and IO operation errors
  #[error(transparent)]
  IO(#[from] std::io::Error),

  /// Failures rendering JSON output
  #[error(transparent)]
  Json(#[from] serde_json::Error),
}
