//! Core types and the storage trait for persisted backup state.

use color_eyre::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Saved items of one account, item key -> payload, in insertion order.
pub type Collection = Map<String, Value>;

/// Account -> feed URL mapping, persisted as `urls.json`.
///
/// Entries are only ever added. Values are kept as raw JSON so a hand-edited
/// file with odd values still loads; see [`UrlRegistry::url_for`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UrlRegistry(Map<String, Value>);

impl UrlRegistry {
  /// Registry holding a single account.
  pub fn with_entry(account: &str, url: &str) -> Self {
    let mut entries = Map::new();
    entries.insert(account.to_string(), Value::String(url.to_string()));
    Self(entries)
  }

  /// The feed URL stored for `account`, if it is present and a string.
  pub fn url_for(&self, account: &str) -> Option<&str> {
    self.0.get(account).and_then(Value::as_str)
  }

  pub fn accounts(&self) -> impl Iterator<Item = &str> {
    self.0.keys().map(String::as_str)
  }
}

/// Trait for backup storage backends.
///
/// Reads return `None` when nothing has been stored yet. Writes replace the
/// whole document.
pub trait SavedStorage: Send + Sync {
  /// Accounts that have a saved collection, sorted.
  fn list_accounts(&self) -> Result<Vec<String>>;

  fn load_registry(&self) -> Result<Option<UrlRegistry>>;

  fn store_registry(&self, registry: &UrlRegistry) -> Result<()>;

  fn load_collection(&self, account: &str) -> Result<Option<Collection>>;

  fn store_collection(&self, account: &str, collection: &Collection) -> Result<()>;

  /// Human-readable location of an account's collection, for logging.
  fn collection_location(&self, account: &str) -> String;
}
