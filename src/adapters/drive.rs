//! Google Drive adapter.
//!
//! Implements the storage capability against the Drive v3 REST API:
//! list audio files in a folder, download to scratch, upload the summary,
//! and set an advisory "processed" app property on delivered artifacts.
//!
//! OAuth: tokens live in `token.json` under the state dir. Expired access
//! tokens are refreshed with the stored refresh token; the initial grant
//! uses the manual paste-the-code flow (`voxum auth`).

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{StorageError, StorageProvider};
use crate::domain::RemoteArtifact;

const DRIVE_API: &str = "https://www.googleapis.com/drive/v3";
const UPLOAD_API: &str = "https://www.googleapis.com/upload/drive/v3";
const AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";
const SCOPE: &str = "https://www.googleapis.com/auth/drive";

/// Audio content types the watcher cares about
pub const AUDIO_MIME_TYPES: &[&str] = &[
    "audio/mpeg",
    "audio/mp3",
    "audio/wav",
    "audio/x-wav",
    "audio/ogg",
    "audio/flac",
    "audio/mp4",
    "audio/x-m4a",
    "audio/webm",
];

/// OAuth client secrets file (installed-app schema)
#[derive(Debug, Clone, Deserialize)]
struct ClientSecretsFile {
    installed: ClientSecrets,
}

#[derive(Debug, Clone, Deserialize)]
struct ClientSecrets {
    client_id: String,
    client_secret: String,
}

/// Token material persisted to token.json
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredToken {
    access_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

impl StoredToken {
    fn is_expired(&self) -> bool {
        // One-minute margin so a token never expires mid-request
        self.expires_at <= Utc::now() + Duration::seconds(60)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
    name: String,
    #[serde(rename = "mimeType")]
    mime_type: String,
    #[serde(rename = "modifiedTime")]
    modified_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct CreatedFile {
    id: String,
}

/// Google Drive client
pub struct DriveClient {
    http: reqwest::Client,
    secrets: ClientSecrets,
    token_path: PathBuf,
    token: Mutex<Option<StoredToken>>,
}

/// Build the Drive search query for audio files in a folder
fn list_query(folder_id: &str, since: Option<DateTime<Utc>>) -> String {
    let mime_clause = AUDIO_MIME_TYPES
        .iter()
        .map(|mt| format!("mimeType='{}'", mt))
        .collect::<Vec<_>>()
        .join(" or ");

    let mut query = format!(
        "'{}' in parents and ({}) and trashed=false",
        folder_id, mime_clause
    );

    if let Some(since) = since {
        query.push_str(&format!(
            " and modifiedTime > '{}'",
            since.format("%Y-%m-%dT%H:%M:%S")
        ));
    }

    query
}

fn urlencode(value: &str) -> String {
    value.replace(':', "%3A").replace('/', "%2F")
}

impl DriveClient {
    /// Load client secrets and set up the client. Does not touch the
    /// network; authentication happens lazily on the first API call.
    pub async fn new(
        client_secrets_path: &Path,
        token_path: PathBuf,
    ) -> Result<Self, StorageError> {
        let raw = tokio::fs::read_to_string(client_secrets_path)
            .await
            .map_err(|e| {
                StorageError::Auth(format!(
                    "failed to read client secrets file {}: {}",
                    client_secrets_path.display(),
                    e
                ))
            })?;
        let secrets: ClientSecretsFile = serde_json::from_str(&raw)?;

        Ok(Self {
            http: reqwest::Client::new(),
            secrets: secrets.installed,
            token_path,
            token: Mutex::new(None),
        })
    }

    /// Consent URL for the manual authorization flow
    pub fn authorize_url(&self) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            AUTH_URI,
            self.secrets.client_id,
            urlencode(REDIRECT_URI),
            urlencode(SCOPE),
        )
    }

    /// Exchange a pasted authorization code for tokens and persist them
    pub async fn exchange_code(&self, code: &str) -> Result<(), StorageError> {
        let response = self
            .http
            .post(TOKEN_URI)
            .form(&[
                ("client_id", self.secrets.client_id.as_str()),
                ("client_secret", self.secrets.client_secret.as_str()),
                ("code", code.trim()),
                ("grant_type", "authorization_code"),
                ("redirect_uri", REDIRECT_URI),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Auth(format!(
                "code exchange failed: {}",
                body
            )));
        }

        let parsed: TokenResponse = response.json().await?;
        let refresh_token = parsed.refresh_token.ok_or_else(|| {
            StorageError::Auth("authorization response carried no refresh token".to_string())
        })?;

        let token = StoredToken {
            access_token: parsed.access_token,
            refresh_token,
            expires_at: Utc::now() + Duration::seconds(parsed.expires_in),
        };
        self.save_token(&token).await?;

        let mut cached = self.token.lock().await;
        *cached = Some(token);

        info!(path = %self.token_path.display(), "Credentials saved");
        Ok(())
    }

    async fn save_token(&self, token: &StoredToken) -> Result<(), StorageError> {
        if let Some(parent) = self.token_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(token)?;
        tokio::fs::write(&self.token_path, json).await?;
        Ok(())
    }

    async fn refresh_token(&self, token: &StoredToken) -> Result<StoredToken, StorageError> {
        info!("Refreshing expired credentials");

        let response = self
            .http
            .post(TOKEN_URI)
            .form(&[
                ("client_id", self.secrets.client_id.as_str()),
                ("client_secret", self.secrets.client_secret.as_str()),
                ("refresh_token", token.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Auth(format!("token refresh failed: {}", body)));
        }

        let parsed: TokenResponse = response.json().await?;
        Ok(StoredToken {
            access_token: parsed.access_token,
            refresh_token: parsed
                .refresh_token
                .unwrap_or_else(|| token.refresh_token.clone()),
            expires_at: Utc::now() + Duration::seconds(parsed.expires_in),
        })
    }

    /// Current access token, loading from disk and refreshing as needed
    async fn access_token(&self) -> Result<String, StorageError> {
        let mut cached = self.token.lock().await;

        if cached.is_none() {
            if !self.token_path.exists() {
                return Err(StorageError::Auth(
                    "no stored credentials; run `voxum auth` first".to_string(),
                ));
            }
            let raw = tokio::fs::read_to_string(&self.token_path).await?;
            *cached = Some(serde_json::from_str(&raw)?);
        }

        let token = cached
            .clone()
            .ok_or_else(|| StorageError::Auth("credential state unavailable".to_string()))?;

        if token.is_expired() {
            let refreshed = self.refresh_token(&token).await?;
            self.save_token(&refreshed).await?;
            let access = refreshed.access_token.clone();
            *cached = Some(refreshed);
            return Ok(access);
        }

        Ok(token.access_token)
    }
}

#[async_trait]
impl StorageProvider for DriveClient {
    async fn list(
        &self,
        folder_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<RemoteArtifact>, StorageError> {
        let token = self.access_token().await?;
        let query = list_query(folder_id, since);

        let response = self
            .http
            .get(format!("{}/files", DRIVE_API))
            .bearer_auth(&token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id, name, mimeType, modifiedTime)"),
                ("orderBy", "modifiedTime desc"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Api(format!("list failed {}: {}", status, body)));
        }

        let list: FileList = response.json().await?;
        debug!(files = list.files.len(), "Listed audio files in folder");

        Ok(list
            .files
            .into_iter()
            .map(|f| RemoteArtifact {
                id: f.id,
                name: f.name,
                mime_type: f.mime_type,
                modified_at: f.modified_time,
            })
            .collect())
    }

    async fn download(&self, id: &str, filename: &str) -> Result<TempPath, StorageError> {
        let token = self.access_token().await?;

        let suffix = Path::new(filename)
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_else(|| ".mp3".to_string());

        let scratch = tempfile::Builder::new()
            .prefix("voxum-")
            .suffix(&suffix)
            .tempfile()?
            .into_temp_path();

        let mut response = self
            .http
            .get(format!("{}/files/{}", DRIVE_API, id))
            .bearer_auth(&token)
            .query(&[("alt", "media")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Api(format!(
                "download failed {}: {}",
                status, body
            )));
        }

        let mut out = tokio::fs::File::create(&scratch).await?;
        while let Some(chunk) = response.chunk().await? {
            out.write_all(&chunk).await?;
        }
        out.flush().await?;

        info!(file = %filename, scratch = %scratch.display(), "Downloaded artifact");
        Ok(scratch)
    }

    async fn upload(
        &self,
        folder_id: &str,
        filename: &str,
        content: &str,
    ) -> Result<String, StorageError> {
        let token = self.access_token().await?;

        let metadata = serde_json::json!({
            "name": filename,
            "parents": [folder_id],
            "mimeType": "text/plain",
        });

        // Drive multipart upload wants multipart/related, which reqwest's
        // Form does not produce; the body is small so we assemble it here.
        let boundary = "voxum-upload-boundary";
        let body = format!(
            "--{b}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{meta}\r\n--{b}\r\nContent-Type: text/plain\r\n\r\n{content}\r\n--{b}--",
            b = boundary,
            meta = metadata,
            content = content,
        );

        let response = self
            .http
            .post(format!("{}/files", UPLOAD_API))
            .bearer_auth(&token)
            .query(&[("uploadType", "multipart"), ("fields", "id")])
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Api(format!("upload failed {}: {}", status, body)));
        }

        let created: CreatedFile = response.json().await?;
        info!(file = %filename, file_id = %created.id, "Uploaded summary");
        Ok(created.id)
    }

    async fn mark_processed(&self, id: &str) -> Result<(), StorageError> {
        let token = self.access_token().await?;

        let response = self
            .http
            .patch(format!("{}/files/{}", DRIVE_API, id))
            .bearer_auth(&token)
            .json(&serde_json::json!({
                "appProperties": { "voxumProcessed": "true" }
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Api(format!(
                "mark processed failed {}: {}",
                status, body
            )));
        }

        debug!(artifact_id = %id, "Marked processed on remote side");
        Ok(())
    }
}
