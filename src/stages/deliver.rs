//! Delivery stage.
//!
//! Uploads the summary to the configured store folder (if any), sends a
//! notification with summary and transcript attached, and signals the store
//! to mark the originating artifact processed on its own side. That last
//! call is advisory; the authoritative "already delivered" record is the
//! watcher's DedupStore commit, which happens after this stage succeeds.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use crate::adapters::{NotificationService, StorageProvider};
use crate::core::Stage;
use crate::domain::{Attachment, DeliveryRecord};

/// Input for the delivery stage
#[derive(Debug, Clone)]
pub struct DeliveryRequest {
    pub summary: String,
    pub transcript: String,
    pub original_filename: String,

    /// Set when the artifact originated from the external store
    pub remote_id: Option<String>,
}

/// Delivers the summary via storage upload and notification
pub struct DeliverStage {
    storage: Arc<dyn StorageProvider>,
    notifier: Arc<dyn NotificationService>,

    /// Destination folder for the summary file; upload is skipped when None
    upload_folder_id: Option<String>,
}

impl DeliverStage {
    pub fn new(
        storage: Arc<dyn StorageProvider>,
        notifier: Arc<dyn NotificationService>,
        upload_folder_id: Option<String>,
    ) -> Self {
        Self {
            storage,
            notifier,
            upload_folder_id,
        }
    }
}

/// Generate the summary filename: `<stem>_<YYYY-MM-DD>_summary.txt`
pub fn summary_filename(original_filename: &str, date: NaiveDate) -> String {
    let stem = Path::new(original_filename)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();
    format!("{}_{}_summary.txt", stem, date.format("%Y-%m-%d"))
}

fn transcript_filename(original_filename: &str) -> String {
    let stem = Path::new(original_filename)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();
    format!("{}_transcript.txt", stem)
}

#[async_trait]
impl Stage for DeliverStage {
    type Input = DeliveryRequest;
    type Output = DeliveryRecord;

    fn name(&self) -> &'static str {
        "delivery"
    }

    async fn process(&self, input: DeliveryRequest) -> Result<DeliveryRecord> {
        let filename = summary_filename(&input.original_filename, Utc::now().date_naive());

        let mut remote_file_id = None;
        if let Some(folder_id) = &self.upload_folder_id {
            info!(file = %filename, "Uploading summary");
            let file_id = self
                .storage
                .upload(folder_id, &filename, &input.summary)
                .await?;
            remote_file_id = Some(file_id);
        }

        let subject = format!("Meeting Summary: {}", input.original_filename);
        let attachments = vec![
            Attachment {
                filename: filename.clone(),
                content: input.summary.clone(),
            },
            Attachment {
                filename: transcript_filename(&input.original_filename),
                content: input.transcript.clone(),
            },
        ];

        info!(%subject, "Sending notification");
        let notification_id = self
            .notifier
            .send(&subject, &input.summary, &attachments)
            .await?;

        // Best-effort remote-side marker; a failure here must not undo an
        // already-sent notification, so it is logged and swallowed.
        if let Some(remote_id) = &input.remote_id {
            if let Err(e) = self.storage.mark_processed(remote_id).await {
                warn!(
                    artifact_id = %remote_id,
                    error = ?e,
                    "Failed to mark remote artifact processed"
                );
            }
        }

        Ok(DeliveryRecord {
            remote_file_id,
            notification_id: Some(notification_id),
            summary_filename: filename,
        })
    }
}
