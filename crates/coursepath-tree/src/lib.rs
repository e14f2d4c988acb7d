//! Course content trees for Coursepath.
//!
//! This crate provides the boundary to the course content system and the
//! ancestor path computation that the path cache is built from.
//!
//! # Features
//!
//! - `test-utils`: Export course fixtures for downstream tests
//!
//! # Key Abstractions
//!
//! - [`ContentStore`] trait: the content system implements this to serve
//!   blocks, with optional whole-course bulk fetch
//! - [`CourseTree`]: reachable blocks of one course as a petgraph DAG
//! - [`compute_paths`]: every block's ancestor paths, in pre-order

pub mod memory;
pub mod outline;
pub mod paths;
pub mod store;
pub mod tree;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod fixtures;

pub use memory::{FetchMode, MemoryContentStore};
pub use outline::{
    CourseOutline, OutlineBlock, load_outline, load_outline_dir, load_outline_from_str,
    save_outline,
};
pub use paths::{AncestorPath, BlockPaths, compute_course_paths, compute_paths};
pub use store::ContentStore;
pub use tree::CourseTree;
pub use types::Block;
