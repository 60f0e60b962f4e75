use color_eyre::{eyre::eyre, Result};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::config::Config;
use crate::error::BackupError;

use super::api_types::parse_listing;
use super::types::SavedItem;

/// HTTP client for the saved-items JSON feed
#[derive(Clone)]
pub struct FeedClient {
  client: reqwest::Client,
}

impl FeedClient {
  pub fn new(config: &Config) -> Result<Self> {
    let mut headers = HeaderMap::new();
    headers.insert(
      USER_AGENT,
      HeaderValue::from_str(&config.user_agent)
        .map_err(|e| eyre!("Invalid user agent '{}': {}", config.user_agent, e))?,
    );

    let client = reqwest::Client::builder()
      .default_headers(headers)
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { client })
  }

  /// Fetch the single feed page at `url` and parse its items.
  ///
  /// One attempt, no retry. Only the page the URL returns is read.
  pub async fn fetch_saved(&self, url: &str) -> Result<Vec<SavedItem>> {
    tracing::info!("Fetching URL: '{}'", url);

    let transport = |source| BackupError::Transport {
      url: url.to_string(),
      source,
    };

    let response = self.client.get(url).send().await.map_err(transport)?;

    let status = response.status();
    if !status.is_success() {
      return Err(
        BackupError::HttpStatus {
          url: url.to_string(),
          status,
        }
        .into(),
      );
    }

    let body = response.bytes().await.map_err(transport)?;

    tracing::info!("Parsing");
    Ok(parse_listing(&body)?)
  }
}
