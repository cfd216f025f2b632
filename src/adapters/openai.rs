//! OpenAI adapter: Whisper transcription and chat-completion summarization.
//!
//! Audio files above the API upload limit are first recompressed with
//! ffmpeg (mono, 16 kHz, 40 kbps mp3 — sufficient for speech) via a
//! subprocess, into a scratch file that is deleted when dropped.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tempfile::TempPath;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::{SummarizationError, SummarizationService, TranscriptionError, TranscriptionService};

const API_BASE: &str = "https://api.openai.com/v1";

/// Leave margin below the 25MB API limit
const MAX_UPLOAD_BYTES: u64 = 24 * 1024 * 1024;

const SUMMARY_PROMPT: &str = "\
Analyze this meeting transcript and create a summary with:
- Participants
- Main discussion points
- Action items with owners
- Overall summary

Language: ";

/// OpenAI API client (transcription + summarization)
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

impl OpenAiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
        }
    }

    /// Recompress audio to a speech-grade mp3 so it fits the upload limit
    async fn compress_audio(&self, audio_path: &Path) -> Result<TempPath, TranscriptionError> {
        let scratch = tempfile::Builder::new()
            .prefix("voxum-compressed-")
            .suffix(".mp3")
            .tempfile()?
            .into_temp_path();

        info!(file = %audio_path.display(), "Compressing audio for upload");

        let output = Command::new("ffmpeg")
            .arg("-y")
            .arg("-i")
            .arg(audio_path)
            .args(["-ac", "1", "-ar", "16000", "-b:a", "40k"])
            .arg(&scratch)
            .output()
            .await
            .map_err(|e| TranscriptionError::Preprocess(format!("failed to run ffmpeg: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TranscriptionError::Preprocess(format!(
                "ffmpeg exited with {}: {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }

        let compressed_size = tokio::fs::metadata(&scratch).await?.len();
        debug!(bytes = compressed_size, "Compression complete");

        Ok(scratch)
    }
}

/// Build the summarization prompt: template + language hint + transcript
pub fn build_summary_prompt(transcript: &str, language: &str) -> String {
    format!(
        "{}{}\n\n---\n\nTranscript:\n{}",
        SUMMARY_PROMPT, language, transcript
    )
}

#[async_trait]
impl TranscriptionService for OpenAiClient {
    async fn transcribe(
        &self,
        audio_path: &Path,
        model: &str,
    ) -> Result<String, TranscriptionError> {
        let file_size = tokio::fs::metadata(audio_path).await?.len();

        let compressed = if file_size > MAX_UPLOAD_BYTES {
            warn!(
                bytes = file_size,
                limit = MAX_UPLOAD_BYTES,
                "Audio exceeds upload limit, compressing"
            );
            Some(self.compress_audio(audio_path).await?)
        } else {
            None
        };
        let upload_path: &Path = compressed.as_deref().unwrap_or(audio_path);

        let file_name = upload_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let bytes = tokio::fs::read(upload_path).await?;

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/octet-stream")?;
        let form = reqwest::multipart::Form::new()
            .text("model", model.to_string())
            .part("file", part);

        let response = self
            .http
            .post(format!("{}/audio/transcriptions", API_BASE))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TranscriptionError::Api(format!("{}: {}", status, body)));
        }

        let parsed: TranscriptionResponse = response.json().await?;
        Ok(parsed.text.trim().to_string())
    }
}

#[async_trait]
impl SummarizationService for OpenAiClient {
    async fn summarize(
        &self,
        transcript: &str,
        language: &str,
        model: &str,
    ) -> Result<String, SummarizationError> {
        let prompt = build_summary_prompt(transcript, language);

        let response = self
            .http
            .post(format!("{}/chat/completions", API_BASE))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": model,
                "messages": [{ "role": "user", "content": prompt }],
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizationError::Api(format!("{}: {}", status, body)));
        }

        let parsed: ChatResponse = response.json().await?;
        let summary = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| SummarizationError::Api("response contained no choices".to_string()))?
            .message
            .content;

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_language_and_transcript() {
        let prompt = build_summary_prompt("Hello world", "de");

        assert!(prompt.contains("Language: de"));
        assert!(prompt.ends_with("Transcript:\nHello world"));
        assert!(prompt.contains("Action items with owners"));
    }
}
