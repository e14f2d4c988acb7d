//! In-memory content store.
//!
//! Serves course outlines from memory and counts round trips, so traversal
//! cost can be asserted in tests. [`FetchMode`] selects whether the store
//! answers whole-course bulk fetches or forces level-by-level traversal.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use coursepath_core::{CourseKey, Error, Result, UsageKey};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::{Block, ContentStore, CourseOutline};

/// How a [`MemoryContentStore`] answers whole-course fetches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchMode {
    /// Serve [`ContentStore::get_course_blocks`] in one round trip.
    #[default]
    Bulk,
    /// Refuse bulk fetches; callers fetch one tree level per round trip.
    PerLevel,
}

impl FetchMode {
    /// The configuration spelling of this mode.
    pub fn as_str(self) -> &'static str {
        match self {
            FetchMode::Bulk => "bulk",
            FetchMode::PerLevel => "per-level",
        }
    }
}

#[derive(Default)]
struct Contents {
    roots: HashMap<CourseKey, UsageKey>,
    blocks: HashMap<UsageKey, Block>,
}

/// Content store backed by in-memory course outlines.
#[derive(Default)]
pub struct MemoryContentStore {
    contents: RwLock<Contents>,
    mode: FetchMode,
    round_trips: AtomicUsize,
}

impl MemoryContentStore {
    /// Create an empty store.
    pub fn new(mode: FetchMode) -> Self {
        Self {
            contents: RwLock::default(),
            mode,
            round_trips: AtomicUsize::new(0),
        }
    }

    /// Add a course while constructing the store.
    ///
    /// Fails with [`Error::InvalidData`] if a block key already belongs to
    /// another course.
    pub fn with_course(mut self, outline: &CourseOutline) -> Result<Self> {
        let contents = self.contents.get_mut();
        Self::check_clash(contents, outline)?;
        Self::remove_from(contents, &outline.course_key);
        Self::insert_into(contents, outline);
        Ok(self)
    }

    /// Add or replace a course.
    ///
    /// Blocks of the previous version of the course that are absent from the
    /// new outline are dropped. A block key owned by another course is
    /// rejected and leaves the store unchanged.
    pub async fn put_course(&self, outline: &CourseOutline) -> Result<()> {
        let mut contents = self.contents.write().await;
        Self::check_clash(&contents, outline)?;
        Self::remove_from(&mut contents, &outline.course_key);
        Self::insert_into(&mut contents, outline);
        Ok(())
    }

    /// Remove a course and all its blocks.
    pub async fn remove_course(&self, course: &CourseKey) {
        let mut contents = self.contents.write().await;
        Self::remove_from(&mut contents, course);
    }

    /// Keys of all courses in the store, sorted.
    pub async fn course_keys(&self) -> Vec<CourseKey> {
        let contents = self.contents.read().await;
        let mut keys: Vec<CourseKey> = contents.roots.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// The fetch mode of this store.
    pub fn mode(&self) -> FetchMode {
        self.mode
    }

    /// Number of round trips served since creation or the last reset.
    pub fn round_trips(&self) -> usize {
        self.round_trips.load(Ordering::Relaxed)
    }

    /// Reset the round-trip counter.
    pub fn reset_round_trips(&self) {
        self.round_trips.store(0, Ordering::Relaxed);
    }

    fn record_round_trip(&self) {
        self.round_trips.fetch_add(1, Ordering::Relaxed);
    }

    fn check_clash(contents: &Contents, outline: &CourseOutline) -> Result<()> {
        for block in outline.to_blocks() {
            if let Some(existing) = contents.blocks.get(&block.key)
                && existing.course_key != outline.course_key
            {
                return Err(Error::invalid_data(format!(
                    "Block {} of course {} already belongs to course {}",
                    block.key, outline.course_key, existing.course_key
                )));
            }
        }
        Ok(())
    }

    fn insert_into(contents: &mut Contents, outline: &CourseOutline) {
        contents
            .roots
            .insert(outline.course_key.clone(), outline.root.clone());
        for block in outline.to_blocks() {
            contents.blocks.insert(block.key.clone(), block);
        }
    }

    fn remove_from(contents: &mut Contents, course: &CourseKey) {
        if contents.roots.remove(course).is_some() {
            contents.blocks.retain(|_, block| &block.course_key != course);
        }
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn get_root(&self, course: &CourseKey) -> Result<Block> {
        self.record_round_trip();
        let contents = self.contents.read().await;
        contents
            .roots
            .get(course)
            .and_then(|root| contents.blocks.get(root))
            .cloned()
            .ok_or_else(|| Error::not_found(format!("Course {course} does not exist")))
    }

    async fn get_blocks(&self, keys: &[UsageKey]) -> Result<Vec<Block>> {
        self.record_round_trip();
        let contents = self.contents.read().await;
        keys.iter()
            .map(|key| {
                contents
                    .blocks
                    .get(key)
                    .cloned()
                    .ok_or_else(|| Error::not_found(format!("Block {key} does not exist")))
            })
            .collect()
    }

    async fn get_course_blocks(&self, course: &CourseKey) -> Result<Option<Vec<Block>>> {
        if self.mode == FetchMode::PerLevel {
            return Ok(None);
        }
        self.record_round_trip();
        let contents = self.contents.read().await;
        if !contents.roots.contains_key(course) {
            return Err(Error::not_found(format!("Course {course} does not exist")));
        }
        let blocks = contents
            .blocks
            .values()
            .filter(|block| &block.course_key == course)
            .cloned()
            .collect();
        Ok(Some(blocks))
    }

    fn name(&self) -> &str {
        match self.mode {
            FetchMode::Bulk => "memory-bulk",
            FetchMode::PerLevel => "memory-per-level",
        }
    }
}
