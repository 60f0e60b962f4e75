//! Serde-deserializable types matching the saved-items listing response.
//!
//! Only the envelope is typed. Each child's `data` object is kept as raw JSON
//! because it is stored verbatim as the item payload.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::types::SavedItem;
use crate::error::BackupError;

#[derive(Debug, Deserialize)]
pub struct ApiListing {
  pub data: ApiListingData,
}

#[derive(Debug, Deserialize)]
pub struct ApiListingData {
  pub children: Vec<ApiChild>,
}

#[derive(Debug, Deserialize)]
pub struct ApiChild {
  pub data: Map<String, Value>,
}

impl ApiChild {
  /// Convert into a domain item, deriving its key from `permalink`.
  pub fn into_item(self) -> Result<SavedItem, BackupError> {
    let permalink = self
      .data
      .get("permalink")
      .and_then(Value::as_str)
      .ok_or_else(|| BackupError::Parse("child without a string 'permalink'".to_string()))?
      .to_string();

    Ok(SavedItem::new(&permalink, Value::Object(self.data)))
  }
}

/// Parse a raw listing body into saved items, in feed order.
pub fn parse_listing(body: &[u8]) -> Result<Vec<SavedItem>, BackupError> {
  let listing: ApiListing =
    serde_json::from_slice(body).map_err(|e| BackupError::Parse(e.to_string()))?;

  listing
    .data
    .children
    .into_iter()
    .map(ApiChild::into_item)
    .collect()
}
