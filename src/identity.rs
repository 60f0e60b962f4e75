//! Resolution of the account a run operates on.

use color_eyre::Result;
use url::Url;

use crate::error::BackupError;

/// Pick the single active account for this run.
///
/// `cached` is the set of accounts that already have a saved collection on disk.
///
/// 1. Nothing cached and no URL: fail, there is nothing to fetch
/// 2. Several accounts cached and no hint: fail, listing the candidates
/// 3. Explicit hint: used as given
/// 4. URL given: the `user` query parameter of the URL
/// 5. Otherwise the one cached account
pub fn resolve_account(hint: Option<&str>, url: Option<&str>, cached: &[String]) -> Result<String> {
  if cached.is_empty() && url.is_none() {
    return Err(BackupError::MissingUrl.into());
  }

  if cached.len() > 1 && hint.is_none() {
    let mut candidates = cached.to_vec();
    candidates.sort();
    return Err(BackupError::AmbiguousAccount(candidates).into());
  }

  if let Some(user) = hint {
    return checked_account(user.to_string());
  }

  let account = match url {
    Some(url) => user_from_url(url)?,
    // cached has exactly one entry here
    None => cached[0].clone(),
  };
  tracing::info!("Using cached user '{}'", account);

  checked_account(account)
}

/// Whether `account` can be used as part of a file name in the config directory.
pub fn is_valid_account(account: &str) -> bool {
  !account.is_empty()
    && account != ".."
    && !account.contains(|c: char| c == '/' || c == '\\' || c == '\0')
}

fn checked_account(account: String) -> Result<String> {
  if is_valid_account(&account) {
    Ok(account)
  } else {
    Err(BackupError::InvalidAccount(account).into())
  }
}

/// Extract the `user` query parameter from a feed URL.
///
/// An empty value is treated the same as a missing one.
pub fn user_from_url(url: &str) -> Result<String> {
  let parsed = Url::parse(url).map_err(|source| BackupError::InvalidUrl {
    url: url.to_string(),
    source,
  })?;

  parsed
    .query_pairs()
    .find(|(key, value)| key == "user" && !value.is_empty())
    .map(|(_, value)| value.into_owned())
    .ok_or_else(|| BackupError::MissingUserParam(url.to_string()).into())
}
