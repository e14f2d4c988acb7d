//! In-memory path cache.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use coursepath_core::{CourseKey, Result, UsageKey};
use tokio::sync::RwLock;

use crate::{PathCacheEntry, PathCacheStore};

/// Path cache held in a `BTreeMap`, with a write counter for tests.
#[derive(Default)]
pub struct MemoryPathCache {
    entries: RwLock<BTreeMap<UsageKey, PathCacheEntry>>,
    writes: AtomicUsize,
}

impl MemoryPathCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of upserts and deletes applied so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    /// Snapshot of every entry, ordered by block key.
    pub async fn snapshot(&self) -> Vec<PathCacheEntry> {
        self.entries.read().await.values().cloned().collect()
    }

    /// Total number of entries across all courses.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl PathCacheStore for MemoryPathCache {
    async fn get(&self, key: &UsageKey) -> Result<Option<PathCacheEntry>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn upsert(&self, entry: PathCacheEntry) -> Result<()> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.entries
            .write()
            .await
            .insert(entry.usage_key.clone(), entry);
        Ok(())
    }

    async fn delete(&self, key: &UsageKey) -> Result<bool> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn filter_by_course(&self, course: &CourseKey) -> Result<Vec<PathCacheEntry>> {
        Ok(self
            .entries
            .read()
            .await
            .values()
            .filter(|entry| &entry.course_key == course)
            .cloned()
            .collect())
    }

    async fn reconcile(
        &self,
        _course: &CourseKey,
        upserts: Vec<PathCacheEntry>,
        deletes: Vec<UsageKey>,
    ) -> Result<()> {
        let mut entries = self.entries.write().await;
        self.writes
            .fetch_add(upserts.len() + deletes.len(), Ordering::Relaxed);
        for entry in upserts {
            entries.insert(entry.usage_key.clone(), entry);
        }
        for key in &deletes {
            entries.remove(key);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
