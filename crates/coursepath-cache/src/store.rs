//! PathCacheStore trait: persistence for breadcrumb paths.

use async_trait::async_trait;
use coursepath_core::{CourseKey, Result, UsageKey};

use crate::PathCacheEntry;

/// Persistent store of path cache entries, keyed by block.
///
/// Implementations must support course-scoped enumeration and per-key
/// upsert. Relational, document, and key-value backings all fit.
#[async_trait]
pub trait PathCacheStore: Send + Sync {
    /// Fetch the entry of a block.
    async fn get(&self, key: &UsageKey) -> Result<Option<PathCacheEntry>>;

    /// Insert or replace the entry of `entry.usage_key`.
    async fn upsert(&self, entry: PathCacheEntry) -> Result<()>;

    /// Remove the entry of a block. Returns whether an entry existed.
    async fn delete(&self, key: &UsageKey) -> Result<bool>;

    /// All entries of a course, ordered by block key.
    async fn filter_by_course(&self, course: &CourseKey) -> Result<Vec<PathCacheEntry>>;

    /// Apply one course's rebuild: write `upserts`, then remove `deletes`.
    ///
    /// The default applies each change separately. Stores with transactions
    /// should override it to apply the whole set atomically.
    async fn reconcile(
        &self,
        _course: &CourseKey,
        upserts: Vec<PathCacheEntry>,
        deletes: Vec<UsageKey>,
    ) -> Result<()> {
        for entry in upserts {
            self.upsert(entry).await?;
        }
        for key in &deletes {
            self.delete(key).await?;
        }
        Ok(())
    }

    /// Returns the name of this store for logging/debugging.
    fn name(&self) -> &str {
        "unnamed"
    }
}
