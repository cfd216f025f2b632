//! Configuration for voxum.
//!
//! Loaded once at process start from the environment (with `.env` support)
//! and passed by reference into the watcher, orchestrator, and adapter
//! constructors. There is no global configuration singleton.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Raised when configuration is invalid or missing; fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "missing required environment variables: {}\nSet them in your .env file or environment.",
        .0.join(", ")
    )]
    Missing(Vec<String>),

    #[error("invalid value for {key}: {message}")]
    Invalid { key: String, message: String },
}

/// Typed configuration, built once in `main`
#[derive(Debug, Clone)]
pub struct Config {
    /// Google Drive folder to watch; also the upload destination
    pub drive_folder_id: String,

    /// Path to the OAuth client secrets file
    pub client_secrets_path: PathBuf,

    /// State directory (token, processed log); default ~/.voxum
    pub state_dir: PathBuf,

    /// OpenAI API key (transcription + summarization)
    pub openai_api_key: String,

    pub transcription_model: String,
    pub summarization_model: String,

    /// Resend (email notification)
    pub resend_api_key: String,
    pub email_to: String,
    pub email_from: String,

    /// Language hint for the summary
    pub summary_language: String,

    pub poll_interval_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the current directory or a parent is honored if
    /// present. All missing required variables are reported together.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Best effort: absence of a .env file is not an error
        let _ = dotenvy::dotenv();

        let mut missing: Vec<String> = Vec::new();

        let mut required = |key: &str| -> String {
            match std::env::var(key) {
                Ok(value) if !value.is_empty() => value,
                _ => {
                    missing.push(key.to_string());
                    String::new()
                }
            }
        };

        let drive_folder_id = required("GOOGLE_DRIVE_FOLDER_ID");
        let openai_api_key = required("OPENAI_API_KEY");
        let resend_api_key = required("RESEND_API_KEY");
        let email_to = required("EMAIL_TO");
        let email_from = required("EMAIL_FROM");

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let client_secrets_path = PathBuf::from(optional(
            "GOOGLE_CLIENT_SECRETS_PATH",
            "client_secrets.json",
        ));

        let state_dir = std::env::var("VOXUM_STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_state_dir());

        let poll_raw = optional("POLL_INTERVAL_SECONDS", "60");
        let poll_interval_secs: u64 =
            poll_raw.parse().map_err(|_| ConfigError::Invalid {
                key: "POLL_INTERVAL_SECONDS".to_string(),
                message: format!("expected a number of seconds, got '{}'", poll_raw),
            })?;

        Ok(Self {
            drive_folder_id,
            client_secrets_path,
            state_dir,
            openai_api_key,
            transcription_model: optional("TRANSCRIPTION_MODEL", "whisper-1"),
            summarization_model: optional("SUMMARIZATION_MODEL", "gpt-4o-mini"),
            resend_api_key,
            email_to,
            email_from,
            summary_language: optional("SUMMARY_LANGUAGE", "en"),
            poll_interval_secs,
        })
    }

    /// Path to the stored OAuth token
    pub fn token_path(&self) -> PathBuf {
        self.state_dir.join("token.json")
    }

    /// Path to the dedup store's append-only log
    pub fn processed_log_path(&self) -> PathBuf {
        self.state_dir.join("processed.jsonl")
    }

    /// Poll interval as a Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

fn optional(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn default_state_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".voxum")
}

/// Redact a secret for display: first four characters, then an ellipsis
pub fn redact(secret: &str) -> String {
    if secret.len() <= 4 {
        "****".to_string()
    } else {
        format!("{}…", &secret[..4])
    }
}
