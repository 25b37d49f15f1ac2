use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, Client};
use serde::Deserialize;
use tracing::debug;

use super::{truncate_body, SpeechProvider};

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    result: Option<String>,
}

/// Yandex SpeechKit v1: short-audio recognition and synthesis.
#[derive(Debug, Clone)]
pub struct SpeechKitProvider {
    http: Client,
    auth_header: String,
    folder_id: String,
    lang: String,
    stt_url: String,
    tts_url: String,
}

impl SpeechKitProvider {
    pub fn new(
        http: Client,
        api_key: &str,
        folder_id: &str,
        lang: &str,
        stt_base_url: &str,
        tts_base_url: &str,
    ) -> Self {
        Self {
            http,
            auth_header: format!("Api-Key {api_key}"),
            folder_id: folder_id.to_string(),
            lang: lang.to_string(),
            stt_url: format!("{}/speech/v1/stt:recognize", stt_base_url.trim_end_matches('/')),
            tts_url: format!("{}/speech/v1/tts:synthesize", tts_base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl SpeechProvider for SpeechKitProvider {
    async fn recognize(&self, audio: Vec<u8>) -> Result<Option<String>> {
        debug!(bytes = audio.len(), "Submitting audio for recognition");

        let res = self
            .http
            .post(&self.stt_url)
            .header(AUTHORIZATION, &self.auth_header)
            .body(audio)
            .send()
            .await
            .context("Failed to send request to SpeechKit (recognize)")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read SpeechKit recognize response body")?;

        if !status.is_success() {
            debug!(%status, body = %truncate_body(&body), "SpeechKit declined recognition");
            return Ok(None);
        }

        let parsed: RecognizeResponse =
            serde_json::from_str(&body).context("Failed to parse SpeechKit recognize JSON")?;

        if let Some(text) = &parsed.result {
            debug!(transcript = %text, "Recognized speech");
        }
        Ok(parsed.result)
    }

    async fn synthesize(&self, text: &str) -> Result<Option<Vec<u8>>> {
        let res = self
            .http
            .post(&self.tts_url)
            .header(AUTHORIZATION, &self.auth_header)
            .form(&[
                ("text", text),
                ("lang", self.lang.as_str()),
                ("folderId", self.folder_id.as_str()),
            ])
            .send()
            .await
            .context("Failed to send request to SpeechKit (synthesize)")?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            debug!(%status, body = %truncate_body(&body), "SpeechKit declined synthesis");
            return Ok(None);
        }

        let audio = res.bytes().await.context("Failed to read SpeechKit synthesized audio")?;
        Ok(Some(audio.to_vec()))
    }
}
