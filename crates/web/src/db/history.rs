//! History repository over `history.json`.
//!
//! Entries are only ever appended.

use chrono::{DateTime, Utc};

use super::{JsonFile, RepositoryError};
use crate::models::history::HistoryEntry;

/// Repository for analysis history.
pub struct HistoryRepository<'a> {
    file: &'a JsonFile<Vec<HistoryEntry>>,
}

impl<'a> HistoryRepository<'a> {
    /// Create a new history repository.
    #[must_use]
    pub const fn new(file: &'a JsonFile<Vec<HistoryEntry>>) -> Self {
        Self { file }
    }

    /// Append an entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store cannot be read or written.
    pub async fn append(&self, entry: HistoryEntry) -> Result<(), RepositoryError> {
        self.file
            .update(|entries| {
                entries.push(entry);
                Ok(())
            })
            .await
    }

    /// Most recent entries for an account, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store cannot be read.
    pub async fn recent_for_user(
        &self,
        email: &str,
        limit: usize,
    ) -> Result<Vec<HistoryEntry>, RepositoryError> {
        let entries = self.file.read().await?;
        Ok(entries
            .into_iter()
            .rev()
            .filter(|entry| entry.email == email)
            .take(limit)
            .collect())
    }

    /// Number of analyses an account ran at or after `since`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store cannot be read.
    pub async fn count_for_user_since(
        &self,
        email: &str,
        since: DateTime<Utc>,
    ) -> Result<usize, RepositoryError> {
        let entries = self.file.read().await?;
        Ok(entries
            .iter()
            .filter(|entry| entry.email == email && entry.timestamp >= since)
            .count())
    }

    /// Account that generated a scorecard file, if any entry references it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store cannot be read.
    pub async fn find_report_owner(
        &self,
        file_name: &str,
    ) -> Result<Option<String>, RepositoryError> {
        let entries = self.file.read().await?;
        Ok(entries
            .into_iter()
            .find(|entry| entry.report_file.as_deref() == Some(file_name))
            .map(|entry| entry.email))
    }
}
