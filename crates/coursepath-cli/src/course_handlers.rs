//! Handler functions for course CLI commands.
//!
//! These functions implement `materialize`, `paths`, and `courses` against
//! the outline directory and redb database named by a [`ConfigProvider`].

use std::path::Path;
use std::sync::Arc;

use coursepath_cache::{
    MemoryPathCache, PathCacheBuilder, PathCacheStore, RebuildWorker, RetryPolicy,
};
use coursepath_core::traits::ConfigProvider;
use coursepath_core::{CourseKey, Error, Result, UsageKey};
use coursepath_storage::RedbStore;
use coursepath_tree::{FetchMode, MemoryContentStore, load_outline_dir};

// ============================================================================
// Option types
// ============================================================================

/// Options for `materialize`.
#[derive(Debug, Clone)]
pub struct MaterializeOptions {
    /// Course to rebuild; `None` rebuilds every course.
    pub course: Option<String>,
    /// If true, compute paths without writing the cache.
    pub dry_run: bool,
    /// How the content store serves course trees.
    pub fetch_mode: FetchMode,
    /// Retry policy for rebuilding every course.
    pub retry: RetryPolicy,
}

// ============================================================================
// Helpers
// ============================================================================

/// Load every course outline under the configured content directory.
fn load_content<C: ConfigProvider>(config: &C, mode: FetchMode) -> Result<MemoryContentStore> {
    let dir = config.content_path()?;
    if !dir.is_dir() {
        return Err(Error::config(format!(
            "Content directory not found: {}",
            dir.display()
        )));
    }

    let mut store = MemoryContentStore::new(mode);
    let outlines = load_outline_dir(&dir)?;
    log::debug!("Loaded {} course outlines from {}", outlines.len(), dir.display());
    for outline in &outlines {
        store = store.with_course(outline)?;
    }
    Ok(store)
}

/// Open the configured database, creating its directory if needed.
fn open_store<C: ConfigProvider>(config: &C) -> Result<RedbStore> {
    let path = config.database_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }
    RedbStore::open(&path)
}

fn open_existing_store(path: &Path) -> Result<Option<RedbStore>> {
    if path.exists() {
        RedbStore::open(path).map(Some)
    } else {
        Ok(None)
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Rebuild the path cache of one course or of every course.
pub async fn handle_materialize<C: ConfigProvider>(
    config: &C,
    options: MaterializeOptions,
) -> Result<()> {
    let content = Arc::new(load_content(config, options.fetch_mode)?);

    if options.dry_run {
        let courses = match &options.course {
            Some(course) => vec![CourseKey::parse(course.as_str())?],
            None => content.course_keys().await,
        };
        let builder = PathCacheBuilder::new(content.clone(), Arc::new(MemoryPathCache::new()));
        for course in &courses {
            content.reset_round_trips();
            let entries = builder.compute(course).await?;
            let paths: usize = entries.iter().map(|e| e.paths.len()).sum();
            println!("{course}:");
            println!("  Blocks:      {}", entries.len());
            println!("  Paths:       {paths}");
            println!("  Round trips: {}", content.round_trips());
        }
        println!("\nDry run: cache not written.");
        return Ok(());
    }

    let store = Arc::new(open_store(config)?);
    let builder = Arc::new(PathCacheBuilder::new(content.clone(), store.clone()));

    match options.course {
        Some(course) => {
            let course = CourseKey::parse(course)?;
            let report = builder.materialize(&course).await?;
            println!("Materialized {course}:");
            println!("  Blocks:    {}", report.blocks);
            println!("  Written:   {}", report.written);
            println!("  Unchanged: {}", report.unchanged);
            println!("  Removed:   {}", report.removed);
        }
        None => {
            let courses = content.course_keys().await;
            let (handle, task) = RebuildWorker::spawn(builder, options.retry, courses.len());
            for course in &courses {
                handle.publish(course.clone()).await?;
            }
            drop(handle);

            let summary = task.await.map_err(Error::storage)?;
            println!(
                "Materialized {} courses ({} failed)",
                summary.succeeded, summary.failed
            );
            if summary.failed > 0 {
                return Err(Error::storage(format!(
                    "{} course rebuilds failed",
                    summary.failed
                )));
            }
        }
    }

    println!("Cache: {}", store.path().display());
    Ok(())
}

/// Print the cached breadcrumb paths of a block.
pub async fn handle_paths<C: ConfigProvider>(config: &C, usage_key: &str) -> Result<()> {
    let key = UsageKey::parse(usage_key)?;
    let path = config.database_path()?;
    let store = open_existing_store(&path)?
        .ok_or_else(|| Error::not_found(format!("No path cache at {}", path.display())))?;

    let entry = store
        .get(&key)
        .await?
        .ok_or_else(|| Error::not_found(format!("No cached paths for {key}")))?;

    println!("{} ({})", entry.display_name, entry.course_key);
    for crumbs in &entry.paths {
        if crumbs.is_empty() {
            println!("  (top level)");
        } else {
            let names: Vec<&str> = crumbs.iter().map(|i| i.display_name.as_str()).collect();
            println!("  {}", names.join(" > "));
        }
    }
    Ok(())
}

/// List courses in the content directory with their cached entry counts.
pub async fn handle_courses<C: ConfigProvider>(config: &C, mode: FetchMode) -> Result<()> {
    let content = load_content(config, mode)?;
    let courses = content.course_keys().await;

    let cached = match open_existing_store(&config.database_path()?)? {
        Some(store) => store.cached_courses().await?,
        None => Vec::new(),
    };

    if courses.is_empty() {
        println!("No courses found.");
        return Ok(());
    }
    for course in &courses {
        let count = cached
            .iter()
            .find(|(key, _)| key == course)
            .map_or(0, |(_, count)| *count);
        println!("{course}  {count} cached entries");
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
