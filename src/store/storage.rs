//! JSON file storage and an in-memory implementation.

use color_eyre::{eyre::eyre, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use super::traits::{Collection, SavedStorage, UrlRegistry};
use crate::identity::is_valid_account;

const REGISTRY_FILE_NAME: &str = "urls.json";
const COLLECTION_PREFIX: &str = "saved_";
const COLLECTION_SUFFIX: &str = ".json";

/// Mode for written files, what a plain create would give under the usual umask
#[cfg(unix)]
const FILE_MODE: u32 = 0o644;

/// Storage as pretty-printed JSON files in a single directory.
///
/// Layout:
/// - `urls.json`: account -> feed URL
/// - `saved_<account>.json`: item key -> payload
pub struct JsonFileStorage {
  dir: PathBuf,
}

impl JsonFileStorage {
  /// Open storage rooted at `dir`, creating the directory if needed.
  pub fn open(dir: &Path) -> Result<Self> {
    std::fs::create_dir_all(dir)
      .map_err(|e| eyre!("Failed to create storage directory {}: {}", dir.display(), e))?;

    Ok(Self {
      dir: dir.to_path_buf(),
    })
  }

  fn registry_path(&self) -> PathBuf {
    self.dir.join(REGISTRY_FILE_NAME)
  }

  fn collection_path(&self, account: &str) -> PathBuf {
    self
      .dir
      .join(format!("{}{}{}", COLLECTION_PREFIX, account, COLLECTION_SUFFIX))
  }

  /// Collection path for an account that must stay inside the storage directory.
  fn checked_collection_path(&self, account: &str) -> Result<PathBuf> {
    if !is_valid_account(account) {
      return Err(eyre!("Refusing to use '{}' as a user name", account));
    }
    Ok(self.collection_path(account))
  }

  fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
      return Ok(None);
    }

    let contents = std::fs::read(path)
      .map_err(|e| eyre!("Failed to read {}: {}", path.display(), e))?;

    let value = serde_json::from_slice(&contents)
      .map_err(|e| eyre!("Failed to parse {}: {}", path.display(), e))?;

    Ok(Some(value))
  }

  /// Write `value` to `path` through a temp file in the same directory.
  ///
  /// The target is either left untouched or fully replaced. If anything fails
  /// before the rename, dropping the temp file removes it.
  fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
    let tmp = NamedTempFile::new_in(&self.dir)
      .map_err(|e| eyre!("Failed to create temp file in {}: {}", self.dir.display(), e))?;

    {
      let mut writer = BufWriter::new(tmp.as_file());
      serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|e| eyre!("Failed to serialize {}: {}", path.display(), e))?;
      writer
        .flush()
        .map_err(|e| eyre!("Failed to write {}: {}", path.display(), e))?;
    }

    // Temp files are created 0600
    #[cfg(unix)]
    {
      use std::os::unix::fs::PermissionsExt as _;
      tmp
        .as_file()
        .set_permissions(std::fs::Permissions::from_mode(FILE_MODE))
        .map_err(|e| eyre!("Failed to set permissions on {}: {}", path.display(), e))?;
    }

    tmp
      .as_file()
      .sync_all()
      .map_err(|e| eyre!("Failed to sync {}: {}", path.display(), e))?;

    tmp
      .persist(path)
      .map_err(|e| eyre!("Failed to replace {}: {}", path.display(), e.error))?;

    Ok(())
  }
}

/// Account name encoded in a collection file name, if it is one.
fn account_from_file_name(name: &str) -> Option<&str> {
  name
    .strip_prefix(COLLECTION_PREFIX)?
    .strip_suffix(COLLECTION_SUFFIX)
}

impl SavedStorage for JsonFileStorage {
  fn list_accounts(&self) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(&self.dir)
      .map_err(|e| eyre!("Failed to list {}: {}", self.dir.display(), e))?;

    let mut accounts = Vec::new();
    for entry in entries {
      let entry = entry.map_err(|e| eyre!("Failed to list {}: {}", self.dir.display(), e))?;
      if !entry.path().is_file() {
        continue;
      }
      let name = entry.file_name();
      if let Some(account) = name.to_str().and_then(account_from_file_name) {
        accounts.push(account.to_string());
      }
    }

    accounts.sort();
    Ok(accounts)
  }

  fn load_registry(&self) -> Result<Option<UrlRegistry>> {
    Self::read_json(&self.registry_path())
  }

  fn store_registry(&self, registry: &UrlRegistry) -> Result<()> {
    self.write_json(&self.registry_path(), registry)
  }

  fn load_collection(&self, account: &str) -> Result<Option<Collection>> {
    Self::read_json(&self.checked_collection_path(account)?)
  }

  fn store_collection(&self, account: &str, collection: &Collection) -> Result<()> {
    self.write_json(&self.checked_collection_path(account)?, collection)
  }

  fn collection_location(&self, account: &str) -> String {
    self.collection_path(account).display().to_string()
  }
}

/// Storage kept in memory. Nothing touches the filesystem.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStorage {
  registry: std::sync::Mutex<Option<UrlRegistry>>,
  collections: std::sync::Mutex<std::collections::BTreeMap<String, Collection>>,
}

#[cfg(test)]
impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }
}

#[cfg(test)]
impl SavedStorage for MemoryStorage {
  fn list_accounts(&self) -> Result<Vec<String>> {
    let collections = self
      .collections
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    Ok(collections.keys().cloned().collect())
  }

  fn load_registry(&self) -> Result<Option<UrlRegistry>> {
    let registry = self
      .registry
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    Ok(registry.clone())
  }

  fn store_registry(&self, registry: &UrlRegistry) -> Result<()> {
    let mut stored = self
      .registry
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    *stored = Some(registry.clone());
    Ok(())
  }

  fn load_collection(&self, account: &str) -> Result<Option<Collection>> {
    let collections = self
      .collections
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    Ok(collections.get(account).cloned())
  }

  fn store_collection(&self, account: &str, collection: &Collection) -> Result<()> {
    let mut collections = self
      .collections
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    collections.insert(account.to_string(), collection.clone());
    Ok(())
  }

  fn collection_location(&self, account: &str) -> String {
    format!("memory:{}", account)
  }
}
