//! Core speech-synthesis trait, clip type and error type.
//!
//! [`Synthesizer`] is object-safe and `Send + Sync` so the exam engine can
//! hold it behind an `Arc<dyn Synthesizer>`.  Synthesis failures are always
//! non-fatal to a turn — the engine downgrades them and the text is still
//! shown — so implementations should report honest errors rather than
//! swallow them here.

use async_trait::async_trait;
use thiserror::Error;

// ---------------------------------------------------------------------------
// AudioClip
// ---------------------------------------------------------------------------

/// One synthesized utterance, ready for a single playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    /// Encoded audio bytes in the container named by `mime`.
    pub data: Vec<u8>,
    /// MIME type of `data` (e.g. `"audio/mpeg"`).
    pub mime: &'static str,
}

impl AudioClip {
    pub fn new(data: Vec<u8>, mime: &'static str) -> Self {
        Self { data, mime }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

// ---------------------------------------------------------------------------
// TtsError
// ---------------------------------------------------------------------------

/// All errors that can arise from the synthesis subsystem.
#[derive(Debug, Clone, Error)]
pub enum TtsError {
    /// HTTP transport or connection error.
    #[error("synthesis request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("synthesis request timed out")]
    Timeout,

    /// The service answered with a non-success status.
    #[error("synthesis service error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Nothing to speak.
    #[error("no text to synthesize")]
    EmptyText,
}

impl From<reqwest::Error> for TtsError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TtsError::Timeout
        } else {
            TtsError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Synthesizer trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for text-to-speech services.
///
/// # Contract
///
/// - `text` is the plain spoken question; returns `Err(TtsError::EmptyText)`
///   when it is blank.
/// - On success returns a non-empty [`AudioClip`] in a standard container
///   format the browser can play back directly.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Synthesize `text` into a playable clip.
    async fn synthesize(&self, text: &str) -> Result<AudioClip, TtsError>;
}

// Compile-time assertion: Box<dyn Synthesizer> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn Synthesizer>) {}
};

// ---------------------------------------------------------------------------
// MockSynthesizer  (test-only)
// ---------------------------------------------------------------------------

/// A test double that returns a pre-configured response without any network
/// access.
#[cfg(test)]
pub struct MockSynthesizer {
    response: Result<AudioClip, TtsError>,
}

#[cfg(test)]
impl MockSynthesizer {
    /// Create a mock that always returns a small fixed clip.
    pub fn ok() -> Self {
        Self {
            response: Ok(AudioClip::new(vec![0xDE, 0xAD, 0xBE, 0xEF], "audio/mpeg")),
        }
    }

    /// Create a mock that always returns `Err(error)`.
    pub fn err(error: TtsError) -> Self {
        Self {
            response: Err(error),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl Synthesizer for MockSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<AudioClip, TtsError> {
        // Enforce the empty-text contract even in the mock.
        if text.trim().is_empty() {
            return Err(TtsError::EmptyText);
        }
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
