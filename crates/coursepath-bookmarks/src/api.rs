//! Bookmark operations.
//!
//! Usage ids arrive as raw strings from callers and are validated before any
//! store is touched.

use std::sync::Arc;

use chrono::Utc;
use coursepath_cache::PathCacheStore;
use coursepath_core::{CourseKey, Error, Result, UsageKey};
use coursepath_tree::ContentStore;

use crate::{Bookmark, BookmarkStore};

/// Bookmark API over a content store, the path cache, and a bookmark store.
pub struct BookmarkService {
    content: Arc<dyn ContentStore>,
    cache: Arc<dyn PathCacheStore>,
    store: Arc<dyn BookmarkStore>,
}

impl BookmarkService {
    /// Create the service.
    pub fn new(
        content: Arc<dyn ContentStore>,
        cache: Arc<dyn PathCacheStore>,
        store: Arc<dyn BookmarkStore>,
    ) -> Self {
        Self {
            content,
            cache,
            store,
        }
    }

    /// Bookmark a block for a user.
    ///
    /// Bookmarking an already bookmarked block returns the existing bookmark.
    /// The breadcrumb path is the block's first cached path; it is empty when
    /// the course has not been materialized yet.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidKey`] for a malformed usage id
    /// - [`Error::NotFound`] when the block does not exist
    pub async fn create_bookmark(&self, username: &str, usage_id: &str) -> Result<Bookmark> {
        let usage_key = UsageKey::parse(usage_id)?;
        let block = self.content.get_block(&usage_key).await?;

        if let Some(existing) = self.store.get(username, &usage_key).await? {
            return Ok(existing);
        }

        let path = self
            .cache
            .get(&usage_key)
            .await?
            .map(|entry| entry.first_path())
            .unwrap_or_default();

        let bookmark = Bookmark {
            id: Bookmark::id_for(username, &usage_key),
            username: username.to_string(),
            course_key: block.course_key,
            usage_key,
            display_name: block.display_name,
            path,
            created: Utc::now(),
        };
        self.store.insert(bookmark.clone()).await?;

        log::info!(
            "Bookmark added: {} in {} ({})",
            bookmark.id,
            bookmark.course_key,
            block.block_type
        );
        Ok(bookmark)
    }

    /// Fetch a user's bookmark.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the user has no bookmark on the block.
    pub async fn get_bookmark(&self, username: &str, usage_id: &str) -> Result<Bookmark> {
        let usage_key = UsageKey::parse(usage_id)?;
        self.store
            .get(username, &usage_key)
            .await?
            .ok_or_else(|| not_found(username, &usage_key))
    }

    /// A user's bookmarks, newest first, optionally limited to one course.
    pub async fn get_bookmarks(
        &self,
        username: &str,
        course: Option<&CourseKey>,
    ) -> Result<Vec<Bookmark>> {
        self.store.list(username, course).await
    }

    /// Remove a user's bookmark.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the user has no bookmark on the block.
    pub async fn delete_bookmark(&self, username: &str, usage_id: &str) -> Result<()> {
        let usage_key = UsageKey::parse(usage_id)?;
        if !self.store.delete(username, &usage_key).await? {
            return Err(not_found(username, &usage_key));
        }
        log::info!("Bookmark removed: {}", Bookmark::id_for(username, &usage_key));
        Ok(())
    }
}

fn not_found(username: &str, usage_key: &UsageKey) -> Error {
    Error::not_found(format!(
        "Bookmark with usage_id: {usage_key} does not exist for user {username}"
    ))
}
