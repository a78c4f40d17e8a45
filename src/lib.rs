//! Speaking Examiner — voice-driven speaking-exam practice.
//!
//! The examiner asks a question out loud, the learner answers into the
//! microphone, and the reply comes back as written feedback plus the next
//! spoken question:
//!
//! ```text
//! recording (browser) ─▶ stt ─▶ llm (repair) ─▶ llm (grade) ─▶ tts
//!                                   │                │
//!                                   └── exam::Conversation ◀──┘
//! ```
//!
//! Module map:
//! * [`config`] — settings structs, TOML persistence, platform paths.
//! * [`stt`]    — speech-to-text adapter ([`stt::Transcriber`]).
//! * [`llm`]    — chat-completion client, examiner/repair prompts, tag parser.
//! * [`tts`]    — speech-synthesis adapter ([`tts::Synthesizer`]).
//! * [`exam`]   — the turn-management core: splitter, history, state machine.
//! * [`web`]    — axum recorder page and session API.

pub mod config;
pub mod exam;
pub mod llm;
pub mod stt;
pub mod tts;
pub mod web;
