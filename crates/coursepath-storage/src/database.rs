//! The redb database handle shared by every store implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use coursepath_core::{Error, Result};
use redb::Database;

use crate::tables::{
    BOOKMARKS, CREDIT_COURSES, CREDIT_ELIGIBILITY, CREDIT_REQUIREMENTS, PATHS_BY_COURSE,
    PATH_ENTRIES,
};

/// Map any redb error into [`Error::Storage`].
pub(crate) trait StorageResultExt<T> {
    fn or_storage(self) -> Result<T>;
}

impl<T, E: std::fmt::Display> StorageResultExt<T> for std::result::Result<T, E> {
    fn or_storage(self) -> Result<T> {
        self.map_err(Error::storage)
    }
}

/// A redb database file holding the path cache, bookmarks, and credit data.
///
/// Cloning is cheap; clones share the same database. Every operation runs
/// on tokio's blocking pool in its own transaction.
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
    path: PathBuf,
}

impl RedbStore {
    /// Open the database at `path`, creating the file and tables if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] when the file cannot be opened or is not a
    /// redb database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let db = Database::create(&path).or_storage()?;

        let txn = db.begin_write().or_storage()?;
        {
            txn.open_table(PATH_ENTRIES).or_storage()?;
            txn.open_table(PATHS_BY_COURSE).or_storage()?;
            txn.open_table(BOOKMARKS).or_storage()?;
            txn.open_table(CREDIT_COURSES).or_storage()?;
            txn.open_table(CREDIT_REQUIREMENTS).or_storage()?;
            txn.open_table(CREDIT_ELIGIBILITY).or_storage()?;
        }
        txn.commit().or_storage()?;

        log::debug!("Opened redb store at {}", path.display());
        Ok(Self {
            db: Arc::new(db),
            path,
        })
    }

    /// Path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` against the database on the blocking pool.
    pub(crate) async fn run<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(Error::storage)?
    }
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
