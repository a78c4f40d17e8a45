//! Core transcription trait and error type.
//!
//! # Overview
//!
//! [`Transcriber`] is the public interface used by the exam engine.  It is
//! object-safe and `Send + Sync` so it can be held behind an
//! `Arc<dyn Transcriber>`.
//!
//! The production implementation is [`ApiTranscriber`](crate::stt::ApiTranscriber),
//! which uploads the recording to a cloud endpoint.  [`MockTranscriber`]
//! (available under `#[cfg(test)]`) returns a pre-configured response so the
//! exam engine can be unit-tested without any network access.

use async_trait::async_trait;
use thiserror::Error;

// ---------------------------------------------------------------------------
// SttError
// ---------------------------------------------------------------------------

/// All errors that can arise from the transcription subsystem.
///
/// Note that "the service heard nothing it is confident about" is **not** an
/// error — [`Transcriber::transcribe`] returns `Ok(None)` for that case so
/// callers can re-prompt the user without treating it as a failure.
#[derive(Debug, Clone, Error)]
pub enum SttError {
    /// HTTP transport or connection error.
    #[error("transcription request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("transcription request timed out")]
    Timeout,

    /// The service answered with a non-success status.
    #[error("transcription service error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse transcription response: {0}")]
    Parse(String),

    /// The supplied recording contained no audio bytes at all.
    #[error("recording is empty")]
    EmptyAudio,
}

impl From<reqwest::Error> for SttError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SttError::Timeout
        } else {
            SttError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Transcriber trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for speech-to-text services.
///
/// # Contract
///
/// - `audio` is a finished recording in a container format the service
///   accepts (the browser recorder produces webm/ogg; wav also works).
/// - `language` is an ISO-639-1 hint (e.g. `"en"`).
/// - Returns `Ok(Some(text))` with a non-blank transcript on success.
/// - Returns `Ok(None)` when the service produced no confident result —
///   a blank or whitespace-only transcript is normalised to this case.
/// - Returns `Err(SttError::EmptyAudio)` when `audio` is empty.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe a finished recording and return the transcript, if any.
    async fn transcribe(&self, audio: &[u8], language: &str)
        -> Result<Option<String>, SttError>;
}

// Compile-time assertion: Box<dyn Transcriber> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn Transcriber>) {}
};

// ---------------------------------------------------------------------------
// MockTranscriber  (test-only)
// ---------------------------------------------------------------------------

/// A test double that returns a pre-configured response without any network
/// access.
///
/// # Example
///
/// ```ignore
/// let stt = MockTranscriber::ok("I went to the beach");
/// let result = stt.transcribe(&[0u8; 64], "en").await;
/// assert_eq!(result.unwrap().as_deref(), Some("I went to the beach"));
/// ```
#[cfg(test)]
pub struct MockTranscriber {
    response: Result<Option<String>, SttError>,
}

#[cfg(test)]
impl MockTranscriber {
    /// Create a mock that always returns `Ok(Some(text))`.
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            response: Ok(Some(text.into())),
        }
    }

    /// Create a mock that always returns `Ok(None)` (nothing understood).
    pub fn silent() -> Self {
        Self { response: Ok(None) }
    }

    /// Create a mock that always returns `Err(error)`.
    pub fn err(error: SttError) -> Self {
        Self {
            response: Err(error),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(
        &self,
        audio: &[u8],
        _language: &str,
    ) -> Result<Option<String>, SttError> {
        // Enforce the empty-audio contract even in the mock so that callers
        // are tested against it.
        if audio.is_empty() {
            return Err(SttError::EmptyAudio);
        }
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
