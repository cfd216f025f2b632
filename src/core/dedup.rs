//! Durable deduplication store.
//!
//! Append-only JSONL file holding the ids of artifacts that have been fully
//! delivered. State is derived by replaying the file, one JSON record per
//! line. The set grows monotonically; there is no removal operation.
//! Single-writer assumption: no cross-process locking is provided.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Errors that can occur with the dedup store
#[derive(Debug, Error)]
pub enum DedupError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// One committed artifact id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupRecord {
    /// Artifact identifier (as reported by the external store)
    pub id: String,

    /// When the artifact was committed as fully delivered
    pub committed_at: DateTime<Utc>,
}

/// JSONL-backed set of already-delivered artifact ids
pub struct DedupStore {
    log_path: PathBuf,
}

impl DedupStore {
    /// Create a store over the given log file (the file may not exist yet)
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    /// Open a store, ensuring the parent directory exists
    pub async fn open(log_path: PathBuf) -> Result<Self, DedupError> {
        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(Self::new(log_path))
    }

    /// Path to the backing log file
    pub fn log_path(&self) -> &PathBuf {
        &self.log_path
    }

    /// Replay the log into the full list of records, in commit order
    pub async fn records(&self) -> Result<Vec<DedupRecord>, DedupError> {
        let mut records = Vec::new();

        if !self.log_path.exists() {
            return Ok(records);
        }

        let file = File::open(&self.log_path).await?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let record: DedupRecord = serde_json::from_str(&line)?;
            records.push(record);
        }

        Ok(records)
    }

    /// Current set of committed ids
    pub async fn snapshot(&self) -> Result<HashSet<String>, DedupError> {
        let records = self.records().await?;
        Ok(records.into_iter().map(|r| r.id).collect())
    }

    /// Whether the given artifact id has already been fully delivered
    pub async fn contains(&self, id: &str) -> Result<bool, DedupError> {
        let snapshot = self.snapshot().await?;
        Ok(snapshot.contains(id))
    }

    /// Commit an artifact id as fully delivered.
    ///
    /// Idempotent: inserting an id that is already present appends nothing.
    pub async fn insert(&self, id: &str) -> Result<(), DedupError> {
        if self.contains(id).await? {
            return Ok(());
        }

        let record = DedupRecord {
            id: id.to_string(),
            committed_at: Utc::now(),
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .await?;

        let json = serde_json::to_string(&record)?;
        file.write_all(format!("{}\n", json).as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }

    /// Number of committed ids
    pub async fn len(&self) -> Result<usize, DedupError> {
        Ok(self.snapshot().await?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store(temp: &TempDir) -> DedupStore {
        DedupStore::new(temp.path().join("processed.jsonl"))
    }

    #[tokio::test]
    async fn test_contains_before_and_after_insert() {
        let temp = TempDir::new().unwrap();
        let store = create_test_store(&temp);

        assert!(!store.contains("file-a").await.unwrap());

        store.insert("file-a").await.unwrap();

        assert!(store.contains("file-a").await.unwrap());
        assert!(!store.contains("file-b").await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let store = create_test_store(&temp);

        store.insert("file-a").await.unwrap();
        store.insert("file-a").await.unwrap();

        assert!(store.contains("file-a").await.unwrap());
        assert_eq!(store.len().await.unwrap(), 1);

        // No duplicate line on disk either
        let records = store.records().await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let temp = TempDir::new().unwrap();
        let log_path = temp.path().join("processed.jsonl");

        let store = DedupStore::new(log_path.clone());
        store.insert("file-a").await.unwrap();
        store.insert("file-b").await.unwrap();
        drop(store);

        let reopened = DedupStore::new(log_path);
        assert!(reopened.contains("file-a").await.unwrap());
        assert!(reopened.contains("file-b").await.unwrap());
        assert_eq!(reopened.len().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_open_creates_parent_dir() {
        let temp = TempDir::new().unwrap();
        let log_path = temp.path().join("state").join("processed.jsonl");

        let store = DedupStore::open(log_path).await.unwrap();
        store.insert("file-a").await.unwrap();

        assert!(store.contains("file-a").await.unwrap());
    }
}
