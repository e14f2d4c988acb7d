//! Core traits for Coursepath.
//!
//! The primary trait is [`ConfigProvider`], which abstracts where an
//! application keeps its course outlines and its path cache database.

use std::path::PathBuf;

use crate::Result;

/// Trait for application configuration.
///
/// Every Coursepath front end implements this trait to tell the storage and
/// content layers where their data lives.
///
/// # Bounds
///
/// - `Send + Sync`: Configuration must be shareable across threads
/// - `Clone`: Configuration can be duplicated for passing to subsystems
/// - `'static`: Configuration lifetime is not borrowed
///
/// # Example
///
/// ```
/// use std::path::PathBuf;
/// use coursepath_core::traits::ConfigProvider;
/// use coursepath_core::Result;
///
/// #[derive(Clone)]
/// struct LmsConfig {
///     data_dir: PathBuf,
/// }
///
/// impl ConfigProvider for LmsConfig {
///     fn project_name(&self) -> &str {
///         "lms"
///     }
///
///     fn base_path(&self) -> Result<PathBuf> {
///         Ok(self.data_dir.clone())
///     }
///
///     fn content_path(&self) -> Result<PathBuf> {
///         Ok(self.data_dir.join("courses"))
///     }
/// }
///
/// let config = LmsConfig { data_dir: PathBuf::from("/srv/lms") };
/// assert_eq!(
///     config.database_path().unwrap(),
///     PathBuf::from("/srv/lms/coursepath.redb")
/// );
/// ```
pub trait ConfigProvider: Send + Sync + Clone + 'static {
    /// The project name, used for env var prefixes and default paths.
    fn project_name(&self) -> &str;

    /// Base path for all project data.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be determined.
    fn base_path(&self) -> Result<PathBuf>;

    /// Directory holding course outline files (one JSON file per course).
    fn content_path(&self) -> Result<PathBuf>;

    /// Path of the redb database holding the path cache, bookmarks, and
    /// credit requirements.
    ///
    /// Defaults to `coursepath.redb` under [`base_path`](Self::base_path).
    fn database_path(&self) -> Result<PathBuf> {
        Ok(self.base_path()?.join("coursepath.redb"))
    }
}
