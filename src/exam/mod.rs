//! Exam dialogue module — the turn-management core.
//!
//! ```text
//! recording finished (UI)
//!   └─▶ Transcriber ─▶ RepairTagger ─▶ ChatClient ─▶ split_reply
//!         └─▶ Conversation (append) ─▶ Synthesizer ─▶ pending clip
//! ```
//!
//! [`Examiner`] drives the loop; [`SessionState`] carries everything one
//! session owns.  The two pure parsers ([`split_reply`] here,
//! [`split_annotated`](crate::llm::split_annotated) in `llm`) are kept free
//! of I/O so the whole protocol is unit-testable without network access.

pub mod history;
pub mod reply;
pub mod session;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use history::{Conversation, RecorderNonce, Role, Turn};
pub use reply::{split_reply, ExaminerReply, REPLY_DELIMITER};
pub use session::{Examiner, SessionPhase, SessionState, TurnOutcome, TurnReport};
