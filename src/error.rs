//! Fatal conditions a backup run can hit.
//!
//! These are raised through `color_eyre::Result`, so callers that care about the
//! kind of failure can `downcast_ref::<BackupError>()` on the report.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackupError {
  /// Nothing cached yet and no feed URL to start from
  #[error("Must specify JSON RSS URL with '--url'")]
  MissingUrl,

  /// Several accounts are cached and none was picked
  #[error("Must specify user with '--user'. Options: {0:?}")]
  AmbiguousAccount(Vec<String>),

  /// Account names end up in file names
  #[error("Invalid user name '{0}': must be non-empty and contain no path separators")]
  InvalidAccount(String),

  #[error("Invalid feed URL '{url}': {source}")]
  InvalidUrl {
    url: String,
    #[source]
    source: url::ParseError,
  },

  #[error("Feed URL '{0}' has no 'user' query parameter")]
  MissingUserParam(String),

  /// The URL registry exists but has no entry for the account
  #[error("No cached URL for user '{0}'")]
  UnknownAccount(String),

  #[error("Failed to fetch '{url}': {source}")]
  Transport {
    url: String,
    #[source]
    source: reqwest::Error,
  },

  #[error("Feed '{url}' returned HTTP {status}")]
  HttpStatus {
    url: String,
    status: reqwest::StatusCode,
  },

  #[error("Failed to parse feed: {0}")]
  Parse(String),
}
