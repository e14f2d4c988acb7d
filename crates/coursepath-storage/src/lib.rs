//! redb-backed storage for Coursepath.
//!
//! One [`RedbStore`] file implements every store contract: the path cache,
//! bookmarks, and credit requirements. Values are stored as JSON.

pub mod bookmarks;
pub mod credit;
pub mod database;
pub mod path_cache;
pub mod tables;

pub use database::RedbStore;
