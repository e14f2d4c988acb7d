//! Breadcrumb path cache for Coursepath.
//!
//! Materializes every block's ancestor paths into a persistent cache so
//! bookmark breadcrumbs can be rendered without walking the course tree.
//!
//! # Key Abstractions
//!
//! - [`PathCacheStore`] trait: persistence for cache entries
//! - [`PathCacheBuilder`]: recompute and reconcile one course
//! - [`RebuildWorker`]: background rebuilds on course publish, with retry

pub mod builder;
pub mod memory;
pub mod store;
pub mod types;
pub mod worker;

pub use builder::{MaterializeReport, PathCacheBuilder, entries_from_paths};
pub use memory::MemoryPathCache;
pub use store::PathCacheStore;
pub use types::{BreadcrumbPath, PathCacheEntry, PathItem};
pub use worker::{CoursePublished, RebuildHandle, RebuildSummary, RebuildWorker, RetryPolicy};
