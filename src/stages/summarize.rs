//! Summarization stage.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::adapters::SummarizationService;
use crate::core::Stage;

/// Turns a transcript into a structured summary via the summarization
/// collaborator
pub struct SummarizeStage {
    service: Arc<dyn SummarizationService>,
    model: String,
    language: String,
}

impl SummarizeStage {
    pub fn new(service: Arc<dyn SummarizationService>, model: String, language: String) -> Self {
        Self {
            service,
            model,
            language,
        }
    }
}

#[async_trait]
impl Stage for SummarizeStage {
    type Input = String;
    type Output = String;

    fn name(&self) -> &'static str {
        "summarization"
    }

    async fn process(&self, transcript: String) -> Result<String> {
        info!(
            chars = transcript.len(),
            model = %self.model,
            "Summarizing transcript"
        );

        let summary = self
            .service
            .summarize(&transcript, &self.language, &self.model)
            .await?;
        Ok(summary)
    }
}
