//! Main orchestrator for the audio pipeline.
//!
//! Composes the three stages (transcribe → summarize → deliver) into a
//! short-circuiting sequence: once a stage fails, no later stage runs.
//! The orchestrator holds no per-artifact state, so one instance is safe
//! to reuse for successive artifacts.

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info, instrument};

use crate::adapters::{
    NotificationService, StorageProvider, SummarizationService, TranscriptionService,
};
use crate::config::Config;
use crate::core::Stage;
use crate::domain::{PipelineOutcome, StageOutcome};
use crate::stages::{DeliverStage, DeliveryRequest, SummarizeStage, TranscribeStage};

/// Three-stage audio summarization pipeline
pub struct Orchestrator {
    transcriber: TranscribeStage,
    summarizer: SummarizeStage,
    deliverer: DeliverStage,
}

impl Orchestrator {
    /// Wire the pipeline from its collaborators and configuration
    pub fn new(
        config: &Config,
        transcription: Arc<dyn TranscriptionService>,
        summarization: Arc<dyn SummarizationService>,
        storage: Arc<dyn StorageProvider>,
        notifier: Arc<dyn NotificationService>,
    ) -> Self {
        let upload_folder_id = if config.drive_folder_id.is_empty() {
            None
        } else {
            Some(config.drive_folder_id.clone())
        };

        Self {
            transcriber: TranscribeStage::new(transcription, config.transcription_model.clone()),
            summarizer: SummarizeStage::new(
                summarization,
                config.summarization_model.clone(),
                config.summary_language.clone(),
            ),
            deliverer: DeliverStage::new(storage, notifier, upload_folder_id),
        }
    }

    /// Build an orchestrator from already-constructed stages (used in tests
    /// and by callers that want non-default wiring)
    pub fn from_stages(
        transcriber: TranscribeStage,
        summarizer: SummarizeStage,
        deliverer: DeliverStage,
    ) -> Self {
        Self {
            transcriber,
            summarizer,
            deliverer,
        }
    }

    /// Process one audio file through the full pipeline.
    ///
    /// `remote_id` is set when the file originated from the external store;
    /// the delivery stage then signals the store to mark it processed on its
    /// own side. Per-artifact failures are returned as `PipelineOutcome`,
    /// never as an error.
    #[instrument(skip(self, local_path), fields(file = %original_filename))]
    pub async fn process_file(
        &self,
        local_path: &Path,
        original_filename: &str,
        remote_id: Option<&str>,
    ) -> PipelineOutcome {
        info!("Starting pipeline");

        let transcript = match self.transcriber.execute(local_path.to_path_buf()).await {
            StageOutcome::Success(text) => text,
            StageOutcome::Failure(reason) => {
                let reason = format!("Transcription failed: {}", reason);
                error!(%reason, "Pipeline failed");
                return PipelineOutcome::failed(reason);
            }
        };
        info!(chars = transcript.len(), "Transcription complete");

        let summary = match self.summarizer.execute(transcript.clone()).await {
            StageOutcome::Success(text) => text,
            StageOutcome::Failure(reason) => {
                let reason = format!("Summarization failed: {}", reason);
                error!(%reason, "Pipeline failed");
                return PipelineOutcome::failed(reason);
            }
        };
        info!(chars = summary.len(), "Summary complete");

        let request = DeliveryRequest {
            summary,
            transcript,
            original_filename: original_filename.to_string(),
            remote_id: remote_id.map(String::from),
        };

        match self.deliverer.execute(request).await {
            StageOutcome::Success(record) => {
                info!(summary_file = %record.summary_filename, "Pipeline complete");
                PipelineOutcome::Delivered(record)
            }
            StageOutcome::Failure(reason) => {
                let reason = format!("Delivery failed: {}", reason);
                error!(%reason, "Pipeline failed");
                PipelineOutcome::failed(reason)
            }
        }
    }
}
