//! `ApiSynthesizer` — cloud text-to-speech over an OpenAI-compatible API.
//!
//! Posts JSON to `/audio/speech` and returns the raw audio bytes of the
//! response.  Works with OpenAI TTS and any server that mirrors its wire
//! format.  All connection details come from [`TtsConfig`]; nothing is
//! hardcoded.

use async_trait::async_trait;
use serde::Serialize;

use crate::config::TtsConfig;
use crate::tts::synthesizer::{AudioClip, Synthesizer, TtsError};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Synthesis request body.
#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    speed: Option<f32>,
}

/// MIME type for the configured response format.
fn mime_for_format(format: &str) -> &'static str {
    match format {
        "wav" | "pcm" => "audio/wav",
        "opus" => "audio/ogg",
        "aac" => "audio/aac",
        "flac" => "audio/flac",
        _ => "audio/mpeg",
    }
}

// ---------------------------------------------------------------------------
// ApiSynthesizer
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/audio/speech` endpoint.
///
/// # No hardcoded URLs
/// All connection details (`base_url`, `api_key`, `model`, `voice`) come
/// exclusively from the [`TtsConfig`] passed to
/// [`ApiSynthesizer::from_config`].
pub struct ApiSynthesizer {
    client: reqwest::Client,
    config: TtsConfig,
}

impl ApiSynthesizer {
    /// Build an `ApiSynthesizer` from application config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`.  A default (no-timeout) client is used as a
    /// last-resort fallback if the builder fails (should never happen in
    /// practice).
    pub fn from_config(config: &TtsConfig) -> Self {
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
impl Synthesizer for ApiSynthesizer {
    /// Synthesize `text` with the configured model, voice and format.
    ///
    /// The `Authorization: Bearer …` header is attached **only** when
    /// `config.api_key` is `Some(key)` and `key` is non-empty.
    async fn synthesize(&self, text: &str) -> Result<AudioClip, TtsError> {
        if text.trim().is_empty() {
            return Err(TtsError::EmptyText);
        }

        let url = format!("{}/audio/speech", self.config.base_url);

        let body = SpeechRequest {
            model: &self.config.model,
            input: text,
            voice: &self.config.voice,
            response_format: &self.config.format,
            speed: if (self.config.speed - 1.0).abs() < f32::EPSILON {
                None
            } else {
                Some(self.config.speed)
            },
        };

        let mut req = self.client.post(&url).json(&body);

        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TtsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| TtsError::Request(e.to_string()))?
            .to_vec();

        Ok(AudioClip::new(data, mime_for_format(&self.config.format)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
