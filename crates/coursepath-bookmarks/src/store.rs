//! BookmarkStore trait and in-memory implementation.

use async_trait::async_trait;
use coursepath_core::{CourseKey, Result, UsageKey};
use tokio::sync::RwLock;

use crate::Bookmark;

/// Persistence for bookmarks, unique per `(username, usage_key)`.
#[async_trait]
pub trait BookmarkStore: Send + Sync {
    /// Fetch a user's bookmark on a block.
    async fn get(&self, username: &str, usage_key: &UsageKey) -> Result<Option<Bookmark>>;

    /// Insert a bookmark, replacing any with the same id.
    async fn insert(&self, bookmark: Bookmark) -> Result<()>;

    /// Remove a user's bookmark on a block. Returns whether it existed.
    async fn delete(&self, username: &str, usage_key: &UsageKey) -> Result<bool>;

    /// A user's bookmarks, newest first, optionally limited to one course.
    ///
    /// Bookmarks created at the same instant are ordered by usage key.
    async fn list(&self, username: &str, course: Option<&CourseKey>) -> Result<Vec<Bookmark>>;
}

/// Bookmarks held in memory.
#[derive(Default)]
pub struct MemoryBookmarkStore {
    bookmarks: RwLock<Vec<Bookmark>>,
}

impl MemoryBookmarkStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookmarkStore for MemoryBookmarkStore {
    async fn get(&self, username: &str, usage_key: &UsageKey) -> Result<Option<Bookmark>> {
        let id = Bookmark::id_for(username, usage_key);
        Ok(self
            .bookmarks
            .read()
            .await
            .iter()
            .find(|b| b.id == id)
            .cloned())
    }

    async fn insert(&self, bookmark: Bookmark) -> Result<()> {
        let mut bookmarks = self.bookmarks.write().await;
        bookmarks.retain(|b| b.id != bookmark.id);
        bookmarks.push(bookmark);
        Ok(())
    }

    async fn delete(&self, username: &str, usage_key: &UsageKey) -> Result<bool> {
        let id = Bookmark::id_for(username, usage_key);
        let mut bookmarks = self.bookmarks.write().await;
        let before = bookmarks.len();
        bookmarks.retain(|b| b.id != id);
        Ok(bookmarks.len() != before)
    }

    async fn list(&self, username: &str, course: Option<&CourseKey>) -> Result<Vec<Bookmark>> {
        let bookmarks = self.bookmarks.read().await;
        let mut found: Vec<Bookmark> = bookmarks
            .iter()
            .filter(|b| b.username == username)
            .filter(|b| course.is_none_or(|c| &b.course_key == c))
            .cloned()
            .collect();
        sort_newest_first(&mut found);
        Ok(found)
    }
}

/// Order bookmarks newest first, then by usage key.
///
/// Shared by every [`BookmarkStore`] so they agree on ties.
pub fn sort_newest_first(bookmarks: &mut [Bookmark]) {
    bookmarks.sort_by(|a, b| {
        b.created
            .cmp(&a.created)
            .then_with(|| a.usage_key.cmp(&b.usage_key))
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn bookmark(username: &str, course: &str, usage: &str, age_secs: i64) -> Bookmark {
        let usage_key = UsageKey::parse(usage).unwrap();
        Bookmark {
            id: Bookmark::id_for(username, &usage_key),
            username: username.to_string(),
            course_key: CourseKey::parse(course).unwrap(),
            usage_key,
            display_name: usage.to_string(),
            path: Vec::new(),
            created: Utc::now() - Duration::seconds(age_secs),
        }
    }

    #[tokio::test]
    async fn test_insert_replaces_same_id() {
        let store = MemoryBookmarkStore::new();
        store
            .insert(bookmark("alice", "course-v1:a+b+c", "i4x://a/b/html/one", 10))
            .await
            .unwrap();
        let mut replacement = bookmark("alice", "course-v1:a+b+c", "i4x://a/b/html/one", 0);
        replacement.display_name = "renamed".to_string();
        store.insert(replacement).await.unwrap();

        let all = store.list("alice", None).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].display_name, "renamed");
    }

    #[tokio::test]
    async fn test_list_orders_by_created_desc() {
        let store = MemoryBookmarkStore::new();
        store
            .insert(bookmark("alice", "course-v1:a+b+c", "i4x://a/b/html/new", 1))
            .await
            .unwrap();
        store
            .insert(bookmark("alice", "course-v1:a+b+c", "i4x://a/b/html/old", 100))
            .await
            .unwrap();
        store
            .insert(bookmark("alice", "course-v1:x+y+z", "i4x://x/y/html/mid", 50))
            .await
            .unwrap();

        let names: Vec<_> = store
            .list("alice", None)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.display_name)
            .collect();
        assert_eq!(
            names,
            vec!["i4x://a/b/html/new", "i4x://x/y/html/mid", "i4x://a/b/html/old"]
        );

        let course = CourseKey::parse("course-v1:x+y+z").unwrap();
        assert_eq!(store.list("alice", Some(&course)).await.unwrap().len(), 1);
        assert!(store.list("bob", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_ties_ordered_by_usage_key() {
        let store = MemoryBookmarkStore::new();
        let created = Utc::now();
        for usage in ["i4x://a/b/html/c", "i4x://a/b/html/a", "i4x://a/b/html/b"] {
            let mut b = bookmark("alice", "course-v1:a+b+c", usage, 0);
            b.created = created;
            store.insert(b).await.unwrap();
        }

        let names: Vec<_> = store
            .list("alice", None)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.display_name)
            .collect();
        assert_eq!(
            names,
            vec!["i4x://a/b/html/a", "i4x://a/b/html/b", "i4x://a/b/html/c"]
        );
    }

    #[tokio::test]
    async fn test_delete_reports_existence() {
        let store = MemoryBookmarkStore::new();
        let b = bookmark("alice", "course-v1:a+b+c", "i4x://a/b/html/one", 0);
        let key = b.usage_key.clone();
        store.insert(b).await.unwrap();

        assert!(!store.delete("bob", &key).await.unwrap());
        assert!(store.delete("alice", &key).await.unwrap());
        assert!(store.get("alice", &key).await.unwrap().is_none());
    }
}
