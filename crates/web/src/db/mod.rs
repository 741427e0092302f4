//! Flat-file persistence for Speaker Lab.
//!
//! # Layout (`SPEAKERLAB_DATA_DIR`)
//!
//! - `users.json` - accounts keyed by lower-cased email
//! - `history.json` - append-only list of analyses
//! - `pdf/` - generated scorecards and chart images
//!
//! Each store is one JSON document behind a [`JsonFile`]. Every
//! read-modify-write on a file holds that file's lock, and writes replace the
//! file atomically (temp file + rename), so concurrent requests in this process
//! never interleave or truncate each other. Another process writing the same
//! files at the same time (e.g. `sl-cli` against a live server) is not
//! coordinated and can lose the other's update.

pub mod history;
pub mod users;

use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::models::history::HistoryEntry;
use crate::models::user::UserTable;

pub use history::HistoryRepository;
pub use users::UserRepository;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Reading or writing a store file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A store file exists but does not hold the expected JSON.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., existing email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// A JSON document on disk with a single-writer lock.
pub struct JsonFile<T> {
    path: PathBuf,
    lock: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFile<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    /// Bind to `path`. Nothing is read until first use.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
            _marker: PhantomData,
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current document. A missing or blank file reads as `T::default()`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Io` if the file cannot be read and
    /// `RepositoryError::DataCorruption` if it is not valid JSON for `T`.
    pub async fn read(&self) -> Result<T, RepositoryError> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    /// Apply `change` to the document and persist the result.
    ///
    /// The lock is held from read to rename. If `change` fails nothing is
    /// written.
    ///
    /// # Errors
    ///
    /// Returns whatever `change` returns, or any load/store error.
    pub async fn update<R>(
        &self,
        change: impl FnOnce(&mut T) -> Result<R, RepositoryError>,
    ) -> Result<R, RepositoryError> {
        let _guard = self.lock.lock().await;
        let mut document = self.load().await?;
        let output = change(&mut document)?;
        self.store(&document).await?;
        Ok(output)
    }

    async fn load(&self) -> Result<T, RepositoryError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => return Err(e.into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(T::default());
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            RepositoryError::DataCorruption(format!("{}: {e}", self.path.display()))
        })
    }

    async fn store(&self, document: &T) -> Result<(), RepositoryError> {
        let bytes = serde_json::to_vec_pretty(document).map_err(|e| {
            RepositoryError::DataCorruption(format!("{}: {e}", self.path.display()))
        })?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// Handle to the data directory's stores.
pub struct Database {
    root: PathBuf,
    users: JsonFile<UserTable>,
    history: JsonFile<Vec<HistoryEntry>>,
}

impl Database {
    /// Open (creating if needed) the data directory.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Io` if the directory cannot be created.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;

        Ok(Self {
            users: JsonFile::new(root.join("users.json")),
            history: JsonFile::new(root.join("history.json")),
            root,
        })
    }

    /// The data directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Account store.
    #[must_use]
    pub const fn users(&self) -> UserRepository<'_> {
        UserRepository::new(&self.users)
    }

    /// Analysis history store.
    #[must_use]
    pub const fn history(&self) -> HistoryRepository<'_> {
        HistoryRepository::new(&self.history)
    }

    /// Check that both stores are readable.
    ///
    /// # Errors
    ///
    /// Returns the first store error encountered.
    pub async fn check(&self) -> Result<(), RepositoryError> {
        self.users.read().await?;
        self.history.read().await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    type Counters = BTreeMap<String, u32>;

    #[tokio::test]
    async fn test_missing_file_reads_default() {
        let dir = tempfile::tempdir().unwrap();
        let file: JsonFile<Counters> = JsonFile::new(dir.path().join("absent.json"));
        assert!(file.read().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_file_reads_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.json");
        std::fs::write(&path, "  \n").unwrap();
        let file: JsonFile<Counters> = JsonFile::new(path);
        assert!(file.read().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_persists_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counters.json");
        let file: JsonFile<Counters> = JsonFile::new(&path);

        file.update(|c| {
            c.insert("a".to_string(), 1);
            Ok(())
        })
        .await
        .unwrap();

        let reopened: JsonFile<Counters> = JsonFile::new(&path);
        assert_eq!(reopened.read().await.unwrap().get("a"), Some(&1));
        assert!(!dir.path().join("counters.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_failed_update_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counters.json");
        let file: JsonFile<Counters> = JsonFile::new(&path);

        let result: Result<(), _> = file
            .update(|c| {
                c.insert("a".to_string(), 1);
                Err(RepositoryError::NotFound)
            })
            .await;

        assert!(matches!(result, Err(RepositoryError::NotFound)));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();
        let file: JsonFile<Counters> = JsonFile::new(path);
        assert!(matches!(
            file.read().await,
            Err(RepositoryError::DataCorruption(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_updates_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let file: std::sync::Arc<JsonFile<Counters>> =
            std::sync::Arc::new(JsonFile::new(dir.path().join("counters.json")));

        let mut tasks = Vec::new();
        for _ in 0..20 {
            let file = file.clone();
            tasks.push(tokio::spawn(async move {
                file.update(|c| {
                    *c.entry("hits".to_string()).or_insert(0) += 1;
                    Ok(())
                })
                .await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(file.read().await.unwrap().get("hits"), Some(&20));
    }

    #[tokio::test]
    async fn test_open_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("data");
        let db = Database::open(&root).await.unwrap();
        assert!(root.is_dir());
        db.check().await.unwrap();
    }
}
