//! `ApiTranscriber` — cloud speech-to-text over an OpenAI-compatible API.
//!
//! Uploads the finished recording as a multipart form to
//! `/audio/transcriptions` and extracts the `text` field of the JSON
//! response.  Works with OpenAI Whisper and any server that mirrors its wire
//! format (Groq, LocalAI, faster-whisper-server, …).  All connection details
//! come from [`SttConfig`]; nothing is hardcoded.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::config::SttConfig;
use crate::stt::transcriber::{SttError, Transcriber};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Successful transcription response body.
#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

// ---------------------------------------------------------------------------
// ApiTranscriber
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/audio/transcriptions` endpoint.
///
/// # No hardcoded URLs
/// All connection details (`base_url`, `api_key`, `model`) come exclusively
/// from the [`SttConfig`] passed to [`ApiTranscriber::from_config`].
pub struct ApiTranscriber {
    client: reqwest::Client,
    config: SttConfig,
}

impl ApiTranscriber {
    /// Build an `ApiTranscriber` from application config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`.  A default (no-timeout) client is used as a
    /// last-resort fallback if the builder fails (should never happen in
    /// practice).
    pub fn from_config(config: &SttConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }
}

#[async_trait]
impl Transcriber for ApiTranscriber {
    /// Upload `audio` for transcription.
    ///
    /// The `Authorization: Bearer …` header is attached **only** when
    /// `config.api_key` is `Some(key)` and `key` is non-empty — safe for
    /// local providers that require no authentication.
    async fn transcribe(
        &self,
        audio: &[u8],
        language: &str,
    ) -> Result<Option<String>, SttError> {
        if audio.is_empty() {
            return Err(SttError::EmptyAudio);
        }

        let url = format!("{}/audio/transcriptions", self.config.base_url);

        // The endpoint sniffs the container from the bytes; the filename
        // only needs a plausible extension.
        let file_part = Part::bytes(audio.to_vec())
            .file_name("recording.webm")
            .mime_str("audio/webm")
            .map_err(|e| SttError::Request(e.to_string()))?;

        let form = Form::new()
            .part("file", file_part)
            .text("model", self.config.model.clone())
            .text("language", language.to_string());

        let mut req = self.client.post(&url).multipart(form);

        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SttError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| SttError::Parse(e.to_string()))?;

        let text = body.text.trim().to_string();

        // A blank transcript means the service heard nothing it is confident
        // about — the "no confident result" outcome, not an error.
        if text.is_empty() {
            return Ok(None);
        }

        Ok(Some(text))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
