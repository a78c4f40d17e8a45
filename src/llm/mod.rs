//! Text-generation module.
//!
//! This module provides:
//! * [`ChatClient`] — async trait implemented by all chat-completion backends.
//! * [`ApiChatClient`] — OpenAI-compatible REST API client.
//! * [`RepairTagger`] — mishearing-repair pass; returns raw text on failure.
//! * [`split_annotated`] — pure parser for the pronunciation tag.
//! * [`EXAMINER_INSTRUCTION`] / [`REPAIR_INSTRUCTION`] — the fixed prompts.
//! * [`LlmError`] — error variants for LLM operations.

pub mod chat;
pub mod prompt;
pub mod repair;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use chat::{ApiChatClient, ChatClient, ChatMessage, ChatRole, LlmError};
pub use prompt::{repair_request, EXAMINER_INSTRUCTION, REPAIR_INSTRUCTION};
pub use repair::{split_annotated, RepairTagger, RepairedTranscript, PRONUNCIATION_TAG_MARKER};
