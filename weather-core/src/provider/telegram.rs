use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{multipart, Client};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::ReplyTarget;

use super::{truncate_body, Messenger};

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    reply_to_message_id: i64,
}

#[derive(Serialize)]
struct GetFileRequest<'a> {
    file_id: &'a str,
}

#[derive(Deserialize)]
struct TelegramResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Deserialize)]
struct TelegramFile {
    file_path: Option<String>,
}

/// Telegram Bot API client.
#[derive(Debug, Clone)]
pub struct TelegramGateway {
    http: Client,
    api_url: String,
    file_url: String,
}

impl TelegramGateway {
    pub fn new(http: Client, base_url: &str, bot_token: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        Self {
            http,
            api_url: format!("{base_url}/bot{bot_token}"),
            file_url: format!("{base_url}/file/bot{bot_token}"),
        }
    }

    /// Replies are fire-and-forget: the status is only logged.
    fn log_rejected(method: &str, status: reqwest::StatusCode, body: &str) {
        warn!(method, %status, body = %truncate_body(body), "Telegram rejected reply");
    }
}

#[async_trait]
impl Messenger for TelegramGateway {
    async fn send_message(&self, target: ReplyTarget, text: &str) -> Result<()> {
        let request = SendMessageRequest {
            chat_id: target.chat_id,
            text,
            reply_to_message_id: target.message_id,
        };

        let url = format!("{}/sendMessage", self.api_url);
        let res = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("Failed to send sendMessage request to Telegram")?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            Self::log_rejected("sendMessage", status, &body);
        }

        Ok(())
    }

    async fn send_voice(&self, target: ReplyTarget, audio: Vec<u8>) -> Result<()> {
        let form = multipart::Form::new()
            .text("chat_id", target.chat_id.to_string())
            .text("reply_to_message_id", target.message_id.to_string())
            .part(
                "voice",
                multipart::Part::bytes(audio)
                    .file_name("audio.ogg")
                    .mime_str("audio/ogg")?,
            );

        let url = format!("{}/sendVoice", self.api_url);
        let res = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .context("Failed to send sendVoice request to Telegram")?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            Self::log_rejected("sendVoice", status, &body);
        }

        Ok(())
    }

    async fn get_file(&self, file_id: &str) -> Result<String> {
        let url = format!("{}/getFile", self.api_url);
        let response_text = self
            .http
            .post(&url)
            .json(&GetFileRequest { file_id })
            .send()
            .await
            .context("Failed to send getFile request to Telegram")?
            .text()
            .await
            .context("Failed to read Telegram getFile response body")?;

        let response: TelegramResponse<TelegramFile> = serde_json::from_str(&response_text)
            .with_context(|| {
                format!("Failed to parse Telegram getFile response: {}", truncate_body(&response_text))
            })?;

        if !response.ok {
            return Err(anyhow!("Telegram getFile error: {:?}", response.description));
        }

        response
            .result
            .and_then(|file| file.file_path)
            .ok_or_else(|| anyhow!("Telegram getFile returned no file_path for {file_id}"))
    }

    async fn download_file(&self, file_path: &str) -> Result<Vec<u8>> {
        let url = format!("{}/{}", self.file_url, file_path.trim_start_matches('/'));
        let res = self
            .http
            .get(&url)
            .send()
            .await
            .context("Failed to download file from Telegram")?;

        let status = res.status();
        if !status.is_success() {
            return Err(anyhow!("Telegram file download failed with status {status}"));
        }

        let bytes = res.bytes().await.context("Failed to read Telegram file body")?;
        Ok(bytes.to_vec())
    }
}
