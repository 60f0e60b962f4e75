//! Persistent backup state.
//!
//! - A URL registry mapping each account to its feed URL
//! - One saved collection per account, item key -> payload
//! - Pure diff/merge of fetched items into a collection
//!
//! Storage sits behind [`SavedStorage`] so the engine can run against an
//! in-memory backend in tests.

mod merge;
mod storage;
mod traits;

pub use merge::{merge_items, FEED_PAGE_LIMIT};
#[cfg(test)]
pub use storage::MemoryStorage;
pub use storage::JsonFileStorage;
pub use traits::{Collection, SavedStorage, UrlRegistry};
