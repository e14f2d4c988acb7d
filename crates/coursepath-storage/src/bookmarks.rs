//! [`BookmarkStore`] over redb.
//!
//! Bookmarks are keyed by `"<username>\0<usage>"`, so listing a user's
//! bookmarks reads one key range.

use async_trait::async_trait;
use coursepath_bookmarks::{Bookmark, BookmarkStore, sort_newest_first};
use coursepath_core::{CourseKey, Result, UsageKey};
use redb::ReadableDatabase;

use crate::database::{RedbStore, StorageResultExt};
use crate::tables::{BOOKMARKS, compound_key, compound_range};

fn bookmark_key(username: &str, usage_key: &UsageKey) -> String {
    compound_key(username, usage_key.as_str())
}

#[async_trait]
impl BookmarkStore for RedbStore {
    async fn get(&self, username: &str, usage_key: &UsageKey) -> Result<Option<Bookmark>> {
        let key = bookmark_key(username, usage_key);
        self.run(move |db| {
            let txn = db.begin_read().or_storage()?;
            let table = txn.open_table(BOOKMARKS).or_storage()?;
            let bookmark = match table.get(key.as_str()).or_storage()? {
                Some(guard) => Some(serde_json::from_str(guard.value())?),
                None => None,
            };
            Ok(bookmark)
        })
        .await
    }

    async fn insert(&self, bookmark: Bookmark) -> Result<()> {
        self.run(move |db| {
            let key = bookmark_key(&bookmark.username, &bookmark.usage_key);
            let json = serde_json::to_string(&bookmark)?;
            let txn = db.begin_write().or_storage()?;
            {
                let mut table = txn.open_table(BOOKMARKS).or_storage()?;
                table.insert(key.as_str(), json.as_str()).or_storage()?;
            }
            txn.commit().or_storage()
        })
        .await
    }

    async fn delete(&self, username: &str, usage_key: &UsageKey) -> Result<bool> {
        let key = bookmark_key(username, usage_key);
        self.run(move |db| {
            let txn = db.begin_write().or_storage()?;
            let existed = {
                let mut table = txn.open_table(BOOKMARKS).or_storage()?;
                table.remove(key.as_str()).or_storage()?.is_some()
            };
            txn.commit().or_storage()?;
            Ok(existed)
        })
        .await
    }

    async fn list(&self, username: &str, course: Option<&CourseKey>) -> Result<Vec<Bookmark>> {
        let (start, end) = compound_range(username);
        let course = course.cloned();
        self.run(move |db| {
            let txn = db.begin_read().or_storage()?;
            let table = txn.open_table(BOOKMARKS).or_storage()?;

            let mut found = Vec::new();
            for item in table.range(start.as_str()..end.as_str()).or_storage()? {
                let (_, value) = item.or_storage()?;
                let bookmark: Bookmark = serde_json::from_str(value.value())?;
                if course.as_ref().is_none_or(|c| &bookmark.course_key == c) {
                    found.push(bookmark);
                }
            }
            sort_newest_first(&mut found);
            Ok(found)
        })
        .await
    }
}
