//! TTS (Text-to-Speech) adapter module.
//!
//! The exam engine speaks each next question through a [`Synthesizer`].
//! A failed synthesis never fails a turn — the caller logs it, shows the
//! text anyway and moves on.

pub mod api;
pub mod synthesizer;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use api::ApiSynthesizer;
pub use synthesizer::{AudioClip, Synthesizer, TtsError};

#[cfg(test)]
pub use synthesizer::MockSynthesizer;
