//! Coursepath Core: shared types, traits, and errors.
//!
//! This crate provides the foundational types used across all Coursepath
//! crates. It has no internal Coursepath dependencies.
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`keys`]: Course and usage key newtypes
//! - [`traits`]: Configuration abstraction

pub mod error;
pub mod keys;
pub mod traits;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};
pub use keys::{CourseKey, UsageKey};
pub use traits::ConfigProvider;
