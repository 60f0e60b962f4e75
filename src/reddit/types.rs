use serde_json::Value;

/// Host prefix every item key starts with. Existing backups depend on it.
pub const ITEM_KEY_PREFIX: &str = "https://www.reddit.com";

/// A saved post or comment as returned by the feed
#[derive(Debug, Clone, PartialEq)]
pub struct SavedItem {
  /// Canonical absolute URL, derived from the permalink
  pub key: String,
  /// The child's `data` object, stored untouched
  pub payload: Value,
}

impl SavedItem {
  pub fn new(permalink: &str, payload: Value) -> Self {
    Self {
      key: item_key(permalink),
      payload,
    }
  }
}

/// Derive the stable key for an item from its permalink.
pub fn item_key(permalink: &str) -> String {
  format!("{}{}", ITEM_KEY_PREFIX, permalink)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_item_key_is_plain_concatenation() {
    assert_eq!(item_key("/a"), "https://www.reddit.com/a");
    assert_eq!(
      item_key("/r/rust/comments/xyz/title/"),
      "https://www.reddit.com/r/rust/comments/xyz/title/"
    );
  }
}
