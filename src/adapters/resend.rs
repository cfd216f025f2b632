//! Resend email adapter.
//!
//! Sends the summary notification as a plain-text email with the summary
//! and transcript attached.

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use tracing::info;

use super::{NotificationError, NotificationService};
use crate::domain::Attachment;

const API_URL: &str = "https://api.resend.com/emails";

/// Resend API client
pub struct ResendClient {
    http: reqwest::Client,
    api_key: String,
    from: String,
    to: String,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

impl ResendClient {
    pub fn new(api_key: String, from: String, to: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            from,
            to,
        }
    }
}

/// Attachment JSON for the Resend API (content is base64)
fn attachment_json(attachment: &Attachment) -> serde_json::Value {
    serde_json::json!({
        "filename": attachment.filename,
        "content": general_purpose::STANDARD.encode(attachment.content.as_bytes()),
    })
}

#[async_trait]
impl NotificationService for ResendClient {
    async fn send(
        &self,
        subject: &str,
        body: &str,
        attachments: &[Attachment],
    ) -> Result<String, NotificationError> {
        let payload = serde_json::json!({
            "from": self.from,
            "to": [self.to],
            "subject": subject,
            "text": body,
            "attachments": attachments.iter().map(attachment_json).collect::<Vec<_>>(),
        });

        let response = self
            .http
            .post(API_URL)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::Api(format!("{}: {}", status, body)));
        }

        let parsed: SendResponse = response
            .json()
            .await
            .map_err(NotificationError::Request)?;

        info!(email_id = %parsed.id, to = %self.to, "Email sent");
        Ok(parsed.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_content_is_base64() {
        let attachment = Attachment {
            filename: "summary.txt".to_string(),
            content: "Hello world".to_string(),
        };

        let json = attachment_json(&attachment);
        assert_eq!(json["filename"], "summary.txt");
        assert_eq!(json["content"], "SGVsbG8gd29ybGQ=");
    }
}
