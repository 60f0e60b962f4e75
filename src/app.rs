//! A single backup run: resolve the account, find its feed, fetch, merge, persist.

use color_eyre::Result;
use std::future::Future;

use crate::error::BackupError;
use crate::identity::resolve_account;
use crate::reddit::types::SavedItem;
use crate::store::{merge_items, SavedStorage, UrlRegistry, FEED_PAGE_LIMIT};

/// What the user asked for on the command line
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
  pub user: Option<String>,
  pub url: Option<String>,
}

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
  pub account: String,
  pub new_items: usize,
  pub total: usize,
  pub saturated: bool,
}

pub struct App<S: SavedStorage> {
  storage: S,
}

impl<S: SavedStorage> App<S> {
  pub fn new(storage: S) -> Self {
    Self { storage }
  }

  /// Run one backup pass.
  ///
  /// `fetcher` receives the feed URL and returns the items on the feed's
  /// current page. Any error before the merge leaves the saved collection
  /// untouched.
  pub async fn run<F, Fut>(&self, request: &RunRequest, fetcher: F) -> Result<RunReport>
  where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<Vec<SavedItem>>>,
  {
    let cached = self.storage.list_accounts()?;
    let account = resolve_account(request.user.as_deref(), request.url.as_deref(), &cached)?;

    let feed_url = self.feed_url(&account, request.url.as_deref())?;
    let fresh = fetcher(feed_url).await?;

    let mut saved = self.storage.load_collection(&account)?.unwrap_or_default();
    let outcome = merge_items(&mut saved, fresh);

    tracing::info!("Found {} new saved posts", outcome.new_keys.len());
    if outcome.saturated() {
      tracing::warn!(
        "More than {} saved posts, which means you may have rolled over Reddit's limit",
        FEED_PAGE_LIMIT
      );
    }
    tracing::info!("Total saved posts: {}", outcome.total);

    self.storage.store_collection(&account, &saved)?;
    tracing::info!(
      "Saved to disk: '{}'",
      self.storage.collection_location(&account)
    );

    Ok(RunReport {
      saturated: outcome.saturated(),
      new_items: outcome.new_keys.len(),
      total: outcome.total,
      account,
    })
  }

  /// Look up the feed URL for `account`, creating the registry on first run.
  ///
  /// Once the registry exists it is authoritative and `url` is ignored.
  fn feed_url(&self, account: &str, url: Option<&str>) -> Result<String> {
    match self.storage.load_registry()? {
      Some(registry) => {
        tracing::info!("Loading cached URL for '{}'", account);
        registry.url_for(account).map(String::from).ok_or_else(|| {
          tracing::debug!(
            "Registry has: {:?}",
            registry.accounts().collect::<Vec<_>>()
          );
          BackupError::UnknownAccount(account.to_string()).into()
        })
      }
      None => {
        let url = url.ok_or(BackupError::MissingUrl)?;
        self
          .storage
          .store_registry(&UrlRegistry::with_entry(account, url))?;
        Ok(url.to_string())
      }
    }
  }
}
