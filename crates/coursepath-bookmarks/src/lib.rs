//! Learner bookmarks for Coursepath.
//!
//! A bookmark pins a content block for a learner and carries the block's
//! breadcrumb path, read from the path cache when the bookmark is created.

pub mod api;
pub mod store;
pub mod types;

pub use api::BookmarkService;
pub use store::{BookmarkStore, MemoryBookmarkStore, sort_newest_first};
pub use types::Bookmark;
