//! Artifacts discovered in the external store and delivery outputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An audio file discovered in the external store.
///
/// Produced by `StorageProvider::list` and recreated on every poll;
/// only the `id` is stable across listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteArtifact {
    /// Opaque identifier, stable across listings
    pub id: String,

    /// Display name (original filename)
    pub name: String,

    /// Content type reported by the store
    pub mime_type: String,

    /// Last modification time reported by the store
    pub modified_at: DateTime<Utc>,
}

/// What a fully successful pipeline run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRecord {
    /// ID of the uploaded summary file (if an upload destination is configured)
    pub remote_file_id: Option<String>,

    /// ID returned by the notification service
    pub notification_id: Option<String>,

    /// Name of the generated summary file
    pub summary_filename: String,
}

/// A notification attachment (text content).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content: String,
}
