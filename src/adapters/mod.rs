//! Collaborator interfaces for external systems.
//!
//! Each capability the pipeline consumes is a trait: transcription,
//! summarization, storage, notification. Concrete adapters live in
//! submodules; stages only see the traits, so every collaborator is
//! replaceable (and mockable in tests).

pub mod drive;
pub mod openai;
pub mod resend;

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tempfile::TempPath;
use thiserror::Error;

use crate::domain::{Attachment, RemoteArtifact};

// Re-export concrete adapters
pub use drive::DriveClient;
pub use openai::OpenAiClient;
pub use resend::ResendClient;

/// Errors from the speech-to-text collaborator
#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("transcription request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("transcription API error: {0}")]
    Api(String),

    #[error("audio preprocessing failed: {0}")]
    Preprocess(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the summarization collaborator
#[derive(Debug, Error)]
pub enum SummarizationError {
    #[error("summarization request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("summarization API error: {0}")]
    Api(String),
}

/// Errors from the storage collaborator
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("storage API error: {0}")]
    Api(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from the notification collaborator
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("notification request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("notification API error: {0}")]
    Api(String),
}

/// Speech-to-text capability
#[async_trait]
pub trait TranscriptionService: Send + Sync {
    /// Transcribe a local audio file. Implementations pre-process oversized
    /// inputs (format/bitrate conversion) before calling the backend.
    async fn transcribe(
        &self,
        audio_path: &Path,
        model: &str,
    ) -> Result<String, TranscriptionError>;
}

/// Text summarization capability
#[async_trait]
pub trait SummarizationService: Send + Sync {
    async fn summarize(
        &self,
        transcript: &str,
        language: &str,
        model: &str,
    ) -> Result<String, SummarizationError>;
}

/// Remote file store capability
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// List audio artifacts in a folder, optionally only those modified
    /// after `since`. Ordering is up to the store (typically most recent
    /// first); the pipeline does not re-sort.
    async fn list(
        &self,
        folder_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<RemoteArtifact>, StorageError>;

    /// Download an artifact to local scratch storage. The returned
    /// `TempPath` deletes the file when dropped, so the scratch copy is
    /// released regardless of how processing ends.
    async fn download(&self, id: &str, filename: &str) -> Result<TempPath, StorageError>;

    /// Upload text content as a new file, returning the new file's id
    async fn upload(
        &self,
        folder_id: &str,
        filename: &str,
        content: &str,
    ) -> Result<String, StorageError>;

    /// Mark an artifact processed on the store's own side. Advisory only;
    /// the authoritative dedup commit is the local DedupStore.
    async fn mark_processed(&self, id: &str) -> Result<(), StorageError>;
}

/// Outbound notification capability
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Send a notification, returning the delivery id
    async fn send(
        &self,
        subject: &str,
        body: &str,
        attachments: &[Attachment],
    ) -> Result<String, NotificationError>;
}
