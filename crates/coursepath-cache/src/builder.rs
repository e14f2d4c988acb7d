//! Path cache materialization.
//!
//! [`PathCacheBuilder::materialize`] recomputes a course's ancestor paths from
//! the content store and reconciles the cache with them: changed entries are
//! written, unchanged entries are left alone, and entries of blocks no longer
//! reachable from the course root are removed.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use coursepath_core::{CourseKey, Result, UsageKey};
use coursepath_tree::{AncestorPath, BlockPaths, ContentStore, CourseTree, compute_course_paths};
use serde::{Deserialize, Serialize};

use crate::{BreadcrumbPath, PathCacheEntry, PathCacheStore, PathItem};

/// Outcome of one materialization.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializeReport {
    /// Blocks reachable from the course root.
    pub blocks: usize,
    /// Entries inserted or replaced.
    pub written: usize,
    /// Entries already up to date.
    pub unchanged: usize,
    /// Stale entries removed.
    pub removed: usize,
}

/// Rebuilds the path cache of a course from the content store.
pub struct PathCacheBuilder {
    content: Arc<dyn ContentStore>,
    cache: Arc<dyn PathCacheStore>,
}

impl PathCacheBuilder {
    /// Create a builder over a content store and a cache store.
    pub fn new(content: Arc<dyn ContentStore>, cache: Arc<dyn PathCacheStore>) -> Self {
        Self { content, cache }
    }

    /// The cache store this builder writes to.
    pub fn cache(&self) -> &Arc<dyn PathCacheStore> {
        &self.cache
    }

    /// Compute the cache entries of a course without writing them.
    pub async fn compute(&self, course: &CourseKey) -> Result<Vec<PathCacheEntry>> {
        let (tree, paths) = compute_course_paths(&*self.content, course).await?;
        Ok(entries_from_paths(&tree, &paths))
    }

    /// Recompute and persist the path cache of `course`.
    ///
    /// All paths are computed before the first write, so a missing course or
    /// a malformed tree leaves the cache untouched.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`](coursepath_core::Error::NotFound) when the course
    ///   does not exist
    /// - [`Error::CycleDetected`](coursepath_core::Error::CycleDetected) when
    ///   the tree contains a cycle
    /// - storage errors from the cache store
    pub async fn materialize(&self, course: &CourseKey) -> Result<MaterializeReport> {
        let fresh = self.compute(course).await?;
        let existing: HashMap<UsageKey, PathCacheEntry> = self
            .cache
            .filter_by_course(course)
            .await?
            .into_iter()
            .map(|entry| (entry.usage_key.clone(), entry))
            .collect();

        let mut report = MaterializeReport {
            blocks: fresh.len(),
            ..Default::default()
        };

        let mut upserts = Vec::new();
        for entry in &fresh {
            if existing.get(&entry.usage_key) == Some(entry) {
                report.unchanged += 1;
            } else {
                upserts.push(entry.clone());
            }
        }
        report.written = upserts.len();

        let reachable: std::collections::HashSet<&UsageKey> =
            fresh.iter().map(|entry| &entry.usage_key).collect();
        let mut deletes: Vec<UsageKey> = existing
            .into_keys()
            .filter(|key| !reachable.contains(key))
            .collect();
        deletes.sort();
        report.removed = deletes.len();

        if !upserts.is_empty() || !deletes.is_empty() {
            self.cache.reconcile(course, upserts, deletes).await?;
        }

        log::info!(
            "Materialized path cache for {course}: {} block(s), {} written, {} unchanged, {} removed ({})",
            report.blocks,
            report.written,
            report.unchanged,
            report.removed,
            self.cache.name()
        );
        Ok(report)
    }
}

/// Turn computed ancestor paths into cache entries, ordered by block key.
///
/// The course root is dropped from every path: breadcrumbs start at the
/// first level below the course.
pub fn entries_from_paths(tree: &CourseTree, paths: &BlockPaths) -> Vec<PathCacheEntry> {
    let ordered: BTreeMap<&UsageKey, &Vec<AncestorPath>> = paths.iter().collect();
    ordered
        .into_iter()
        .filter_map(|(key, block_paths)| {
            let block = tree.get_block(key)?;
            Some(PathCacheEntry {
                usage_key: key.clone(),
                course_key: tree.course_key.clone(),
                display_name: block.display_name.clone(),
                paths: block_paths
                    .iter()
                    .map(|path| breadcrumb(tree, path))
                    .collect(),
            })
        })
        .collect()
}

fn breadcrumb(tree: &CourseTree, path: &AncestorPath) -> BreadcrumbPath {
    path.iter()
        .skip(1)
        .filter_map(|key| {
            tree.get_block(key)
                .map(|block| PathItem::new(key.clone(), block.display_name.clone()))
        })
        .collect()
}
