//! STT (Speech-to-Text) adapter module.
//!
//! [`Transcriber`] is the interface the exam engine talks to; the service
//! behind it is an opaque cloud endpoint.  The trait distinguishes "the
//! service heard nothing" (`Ok(None)`) from transport or service failures
//! (`Err`), because the dialogue treats the two very differently: the first
//! re-prompts the user, the second aborts the turn.

pub mod api;
pub mod transcriber;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use api::ApiTranscriber;
pub use transcriber::{SttError, Transcriber};

// test-only re-export so other modules' test code can import MockTranscriber
// without `use speaking_examiner::stt::transcriber::MockTranscriber`.
#[cfg(test)]
pub use transcriber::MockTranscriber;
