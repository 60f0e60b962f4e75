use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Browser-like identification; the feed rejects default client user agents.
pub const DEFAULT_USER_AGENT: &str =
  "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:84.0) Gecko/20100101 Firefox/84.0";

const APP_DIR_NAME: &str = "reddit_save_backup";
const CONFIG_FILE_NAME: &str = "config.yaml";

#[derive(Debug, Clone)]
pub struct Config {
  /// Directory holding urls.json and the saved_<user>.json files
  pub config_dir: PathBuf,
  pub user_agent: String,
}

/// Optional overrides read from `config.yaml` in the config directory.
#[derive(Debug, Clone, Default, Deserialize)]
struct FileConfig {
  user_agent: Option<String>,
}

impl Config {
  /// Load configuration.
  ///
  /// The config directory is `$RSB_CONFIG_DIR` when set, otherwise
  /// `$XDG_CONFIG_HOME/reddit_save_backup`. It is created if missing.
  pub fn load() -> Result<Self> {
    let config_dir = Self::config_dir()?;
    Self::load_from_dir(&config_dir)
  }

  /// Load configuration rooted at an explicit directory.
  pub fn load_from_dir(config_dir: &Path) -> Result<Self> {
    std::fs::create_dir_all(config_dir).map_err(|e| {
      eyre!(
        "Failed to create config directory {}: {}",
        config_dir.display(),
        e
      )
    })?;

    let file_config = Self::read_file_config(&config_dir.join(CONFIG_FILE_NAME))?;

    Ok(Self {
      config_dir: config_dir.to_path_buf(),
      user_agent: file_config
        .user_agent
        .map(|ua| ua.trim().to_string())
        .filter(|ua| !ua.is_empty())
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
    })
  }

  fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("RSB_CONFIG_DIR") {
      let dir = dir.trim();
      if !dir.is_empty() {
        return Ok(PathBuf::from(dir));
      }
    }

    dirs::config_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".config")))
      .map(|p| p.join(APP_DIR_NAME))
      .ok_or_else(|| eyre!("Could not determine config directory"))
  }

  fn read_file_config(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
      return Ok(FileConfig::default());
    }

    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    // An empty file deserializes to unit, not a mapping
    if contents.trim().is_empty() {
      return Ok(FileConfig::default());
    }

    serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn test_defaults_without_config_file() {
    let dir = TempDir::new().unwrap();
    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    assert_eq!(config.config_dir, dir.path());
  }

  #[test]
  fn test_creates_missing_directory() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("a").join("b");
    Config::load_from_dir(&nested).unwrap();
    assert!(nested.is_dir());
  }

  #[test]
  fn test_user_agent_override() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), "user_agent: my-agent/1.0\n").unwrap();
    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.user_agent, "my-agent/1.0");
  }

  #[test]
  fn test_blank_user_agent_falls_back() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), "user_agent: \"  \"\n").unwrap();
    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
  }

  #[test]
  fn test_malformed_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), "user_agent: [unclosed\n").unwrap();
    let err = Config::load_from_dir(dir.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
  }
}
