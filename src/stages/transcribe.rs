//! Transcription stage.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::adapters::TranscriptionService;
use crate::core::Stage;

/// Turns an audio file into a transcript via the transcription collaborator
pub struct TranscribeStage {
    service: Arc<dyn TranscriptionService>,
    model: String,
}

impl TranscribeStage {
    pub fn new(service: Arc<dyn TranscriptionService>, model: String) -> Self {
        Self { service, model }
    }
}

#[async_trait]
impl Stage for TranscribeStage {
    type Input = PathBuf;
    type Output = String;

    fn name(&self) -> &'static str {
        "transcription"
    }

    async fn process(&self, audio_path: PathBuf) -> Result<String> {
        info!(
            file = %audio_path.display(),
            model = %self.model,
            "Transcribing audio"
        );

        let transcript = self.service.transcribe(&audio_path, &self.model).await?;
        Ok(transcript)
    }
}
