//! Error types for Coursepath operations.
//!
//! This module provides a common `Error` type and `Result<T>` alias used across
//! all Coursepath crates. Uses `thiserror` for derive macros.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur in Coursepath operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error tied to a specific file.
    #[error("I/O error at {path}: {source}")]
    IoWithPath {
        /// The file that could not be read or written.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A course, block, bookmark, or cache entry does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A course or usage key could not be parsed.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// A block appears as its own descendant.
    #[error("Cycle detected at block {0}")]
    CycleDetected(String),

    /// Invalid data or format.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Backing store failure (unavailable, corrupt, transaction aborted).
    #[error("Storage error: {0}")]
    Storage(String),

    /// One or more credit requirements are missing parameters.
    #[error("Invalid credit requirements: {0}")]
    InvalidCreditRequirements(String),

    /// The course is not an enabled credit course.
    #[error("Invalid credit course: {0}")]
    InvalidCreditCourse(String),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid key error.
    pub fn invalid_key(msg: impl Into<String>) -> Self {
        Self::InvalidKey(msg.into())
    }

    /// Create an invalid data error.
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Create a storage error from anything displayable.
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }

    /// Wrap an I/O error with the path that caused it.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Self::IoWithPath {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Whether this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether retrying the failed operation could succeed.
    ///
    /// Only storage and I/O failures are transient; a missing course or a
    /// malformed tree fails the same way on every attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Io(_) | Self::IoWithPath { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias using Coursepath's Error type.
pub type Result<T> = std::result::Result<T, Error>;
