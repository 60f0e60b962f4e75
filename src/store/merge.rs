//! Diff and merge of freshly fetched items into a saved collection.

use std::collections::HashSet;

use crate::reddit::types::SavedItem;

use super::traits::Collection;

/// Items the feed returns per page. Finding this many new items in one run
/// means older saves may have scrolled out of reach.
pub const FEED_PAGE_LIMIT: usize = 1000;

/// What a merge changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
  /// Keys that were not in the collection before, in feed order
  pub new_keys: Vec<String>,
  /// Size of the collection after the merge
  pub total: usize,
}

impl MergeOutcome {
  /// Whether the new-item count hit the feed's page limit.
  pub fn saturated(&self) -> bool {
    self.new_keys.len() >= FEED_PAGE_LIMIT
  }
}

/// Merge `fresh` into `saved`.
///
/// Every fetched item overwrites the stored payload under its key, so known
/// items get refreshed too. Keys are never removed. Existing keys keep their
/// position, new keys are appended in feed order.
pub fn merge_items(saved: &mut Collection, fresh: Vec<SavedItem>) -> MergeOutcome {
  let new_keys: Vec<String> = {
    let mut seen = HashSet::new();
    fresh
      .iter()
      .filter(|item| !saved.contains_key(&item.key))
      .filter(|item| seen.insert(item.key.as_str()))
      .map(|item| item.key.clone())
      .collect()
  };

  for item in fresh {
    saved.insert(item.key, item.payload);
  }

  MergeOutcome {
    new_keys,
    total: saved.len(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::{json, Value};

  fn item(permalink: &str, payload: Value) -> SavedItem {
    SavedItem::new(permalink, payload)
  }

  fn collection(value: Value) -> Collection {
    value.as_object().unwrap().clone()
  }

  #[test]
  fn test_new_keys_are_set_difference() {
    let mut saved = collection(json!({"https://www.reddit.com/a": {"v": 1}}));
    let outcome = merge_items(
      &mut saved,
      vec![item("/a", json!({"v": 1})), item("/b", json!({"v": 2}))],
    );

    assert_eq!(outcome.new_keys, vec!["https://www.reddit.com/b"]);
    assert_eq!(outcome.total, 2);
    assert!(saved.contains_key("https://www.reddit.com/a"));
    assert!(saved.contains_key("https://www.reddit.com/b"));
  }

  #[test]
  fn test_last_write_wins_for_known_keys() {
    let mut saved = collection(json!({"https://www.reddit.com/a": {"score": 1}}));
    let outcome = merge_items(&mut saved, vec![item("/a", json!({"score": 99}))]);

    assert!(outcome.new_keys.is_empty());
    assert_eq!(saved["https://www.reddit.com/a"], json!({"score": 99}));
  }

  #[test]
  fn test_keys_never_removed() {
    let mut saved = collection(json!({
      "https://www.reddit.com/old1": {},
      "https://www.reddit.com/old2": {}
    }));
    let outcome = merge_items(&mut saved, vec![item("/new", json!({}))]);

    assert_eq!(outcome.total, 3);
    assert!(saved.contains_key("https://www.reddit.com/old1"));
    assert!(saved.contains_key("https://www.reddit.com/old2"));
  }

  #[test]
  fn test_merge_is_idempotent() {
    let fresh = vec![item("/a", json!({"v": 1})), item("/b", json!({"v": 2}))];
    let mut saved = Collection::new();

    merge_items(&mut saved, fresh.clone());
    let after_first = saved.clone();
    let outcome = merge_items(&mut saved, fresh);

    assert_eq!(saved, after_first);
    assert!(outcome.new_keys.is_empty());
  }

  #[test]
  fn test_order_existing_first_then_feed_order() {
    let mut saved = collection(json!({"https://www.reddit.com/m": 0}));
    merge_items(
      &mut saved,
      vec![
        item("/z", json!(1)),
        item("/m", json!(2)),
        item("/a", json!(3)),
      ],
    );

    let keys: Vec<&str> = saved.keys().map(String::as_str).collect();
    assert_eq!(
      keys,
      vec![
        "https://www.reddit.com/m",
        "https://www.reddit.com/z",
        "https://www.reddit.com/a"
      ]
    );
  }

  #[test]
  fn test_duplicate_fetched_keys_counted_once_last_payload_kept() {
    let mut saved = Collection::new();
    let outcome = merge_items(
      &mut saved,
      vec![item("/a", json!("first")), item("/a", json!("second"))],
    );

    assert_eq!(outcome.new_keys.len(), 1);
    assert_eq!(saved["https://www.reddit.com/a"], json!("second"));
  }

  fn fetch_of(n: usize) -> Vec<SavedItem> {
    (0..n).map(|i| item(&format!("/p/{}", i), json!(i))).collect()
  }

  #[test]
  fn test_saturation_threshold() {
    let mut saved = Collection::new();
    let below = merge_items(&mut saved, fetch_of(FEED_PAGE_LIMIT - 1));
    assert_eq!(below.new_keys.len(), 999);
    assert!(!below.saturated());

    let mut saved = Collection::new();
    let at = merge_items(&mut saved, fetch_of(FEED_PAGE_LIMIT));
    assert_eq!(at.new_keys.len(), 1000);
    assert!(at.saturated());
    assert_eq!(at.total, 1000);
  }

  #[test]
  fn test_empty_fetch_changes_nothing() {
    let mut saved = collection(json!({"https://www.reddit.com/a": 1}));
    let outcome = merge_items(&mut saved, Vec::new());
    assert!(outcome.new_keys.is_empty());
    assert_eq!(outcome.total, 1);
  }
}
