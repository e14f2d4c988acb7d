//! [`PathCacheStore`] over redb.
//!
//! Entries live in [`PATH_ENTRIES`]; [`PATHS_BY_COURSE`] indexes them by
//! course so a course's entries come back as one key range. A course
//! reconciliation runs in a single write transaction.

use std::collections::BTreeMap;

use async_trait::async_trait;
use coursepath_cache::{PathCacheEntry, PathCacheStore};
use coursepath_core::{CourseKey, Result, UsageKey};
use redb::{ReadableDatabase, ReadableTable, Table};

use crate::database::{RedbStore, StorageResultExt};
use crate::tables::{
    PATH_ENTRIES, PATHS_BY_COURSE, course_index_key, course_index_range, split_index_key,
};

type EntriesTable<'txn> = Table<'txn, &'static str, &'static str>;
type IndexTable<'txn> = Table<'txn, &'static str, ()>;

fn decode(json: &str) -> Result<PathCacheEntry> {
    Ok(serde_json::from_str(json)?)
}

fn put_entry(
    entries: &mut EntriesTable<'_>,
    index: &mut IndexTable<'_>,
    entry: &PathCacheEntry,
) -> Result<()> {
    let key = entry.usage_key.as_str();
    let previous = entries
        .get(key)
        .or_storage()?
        .map(|guard| decode(guard.value()))
        .transpose()?;
    if let Some(previous) = previous
        && previous.course_key != entry.course_key
    {
        index
            .remove(course_index_key(&previous.course_key, &entry.usage_key).as_str())
            .or_storage()?;
    }

    let json = serde_json::to_string(entry)?;
    entries.insert(key, json.as_str()).or_storage()?;
    index
        .insert(course_index_key(&entry.course_key, &entry.usage_key).as_str(), ())
        .or_storage()?;
    Ok(())
}

fn remove_entry(
    entries: &mut EntriesTable<'_>,
    index: &mut IndexTable<'_>,
    key: &UsageKey,
) -> Result<bool> {
    let removed = entries
        .remove(key.as_str())
        .or_storage()?
        .map(|guard| decode(guard.value()))
        .transpose()?;
    match removed {
        Some(entry) => {
            index
                .remove(course_index_key(&entry.course_key, key).as_str())
                .or_storage()?;
            Ok(true)
        }
        None => Ok(false),
    }
}

impl RedbStore {
    /// Courses with cached paths, with their entry counts, ordered by key.
    pub async fn cached_courses(&self) -> Result<Vec<(CourseKey, usize)>> {
        self.run(|db| {
            let txn = db.begin_read().or_storage()?;
            let index = txn.open_table(PATHS_BY_COURSE).or_storage()?;

            let mut counts: BTreeMap<String, usize> = BTreeMap::new();
            for item in index.iter().or_storage()? {
                let (key, _) = item.or_storage()?;
                if let Some((course, _)) = split_index_key(key.value()) {
                    *counts.entry(course.to_string()).or_default() += 1;
                }
            }

            counts
                .into_iter()
                .map(|(course, count)| CourseKey::parse(course).map(|key| (key, count)))
                .collect()
        })
        .await
    }
}

#[async_trait]
impl PathCacheStore for RedbStore {
    async fn get(&self, key: &UsageKey) -> Result<Option<PathCacheEntry>> {
        let key = key.clone();
        self.run(move |db| {
            let txn = db.begin_read().or_storage()?;
            let entries = txn.open_table(PATH_ENTRIES).or_storage()?;
            let entry = entries
                .get(key.as_str())
                .or_storage()?
                .map(|guard| decode(guard.value()))
                .transpose()?;
            Ok(entry)
        })
        .await
    }

    async fn upsert(&self, entry: PathCacheEntry) -> Result<()> {
        self.run(move |db| {
            let txn = db.begin_write().or_storage()?;
            {
                let mut entries = txn.open_table(PATH_ENTRIES).or_storage()?;
                let mut index = txn.open_table(PATHS_BY_COURSE).or_storage()?;
                put_entry(&mut entries, &mut index, &entry)?;
            }
            txn.commit().or_storage()
        })
        .await
    }

    async fn delete(&self, key: &UsageKey) -> Result<bool> {
        let key = key.clone();
        self.run(move |db| {
            let txn = db.begin_write().or_storage()?;
            let existed = {
                let mut entries = txn.open_table(PATH_ENTRIES).or_storage()?;
                let mut index = txn.open_table(PATHS_BY_COURSE).or_storage()?;
                remove_entry(&mut entries, &mut index, &key)?
            };
            txn.commit().or_storage()?;
            Ok(existed)
        })
        .await
    }

    async fn filter_by_course(&self, course: &CourseKey) -> Result<Vec<PathCacheEntry>> {
        let (start, end) = course_index_range(course);
        self.run(move |db| {
            let txn = db.begin_read().or_storage()?;
            let index = txn.open_table(PATHS_BY_COURSE).or_storage()?;
            let entries = txn.open_table(PATH_ENTRIES).or_storage()?;

            let mut found = Vec::new();
            for item in index.range(start.as_str()..end.as_str()).or_storage()? {
                let (key, _) = item.or_storage()?;
                let Some((_, usage)) = split_index_key(key.value()) else {
                    continue;
                };
                if let Some(guard) = entries.get(usage).or_storage()? {
                    found.push(decode(guard.value())?);
                }
            }
            Ok(found)
        })
        .await
    }

    async fn reconcile(
        &self,
        course: &CourseKey,
        upserts: Vec<PathCacheEntry>,
        deletes: Vec<UsageKey>,
    ) -> Result<()> {
        let course = course.clone();
        self.run(move |db| {
            let txn = db.begin_write().or_storage()?;
            {
                let mut entries = txn.open_table(PATH_ENTRIES).or_storage()?;
                let mut index = txn.open_table(PATHS_BY_COURSE).or_storage()?;
                for entry in &upserts {
                    put_entry(&mut entries, &mut index, entry)?;
                }
                for key in &deletes {
                    remove_entry(&mut entries, &mut index, key)?;
                }
            }
            txn.commit().or_storage()?;
            log::debug!(
                "Reconciled {course}: {} upserts, {} deletes",
                upserts.len(),
                deletes.len()
            );
            Ok(())
        })
        .await
    }

    fn name(&self) -> &str {
        "redb"
    }
}
