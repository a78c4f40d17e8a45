//! Mishearing-repair pass — annotate a raw transcript, then parse the tag.
//!
//! [`RepairTagger`] wraps any [`ChatClient`] with the fixed
//! [`REPAIR_INSTRUCTION`] and **never fails**: when the underlying call
//! errors for any reason it returns the raw transcript unchanged, so a flaky
//! repair model can never abort an exam turn.
//!
//! [`split_annotated`] is the pure counterpart: it takes whatever the model
//! produced (untrusted text) and separates the displayable transcript from
//! the optional pronunciation note.  It tolerates malformed tags by falling
//! back to "no tag detected".

use std::sync::Arc;

use crate::llm::chat::{ChatClient, ChatMessage};
use crate::llm::prompt::{repair_request, REPAIR_INSTRUCTION};

// ---------------------------------------------------------------------------
// Tag parsing (pure, no network)
// ---------------------------------------------------------------------------

/// Opening marker of the pronunciation tag appended by the repair model.
pub const PRONUNCIATION_TAG_MARKER: &str = "[PRONUNCIATION ERROR";

/// A transcript after tag extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairedTranscript {
    /// Text safe to show to the user (tag stripped).
    pub display: String,
    /// Human-readable detail from inside the tag (e.g. `": bitch -> beach"`),
    /// or `None` when no well-formed tag was found.
    pub note: Option<String>,
}

/// Separate the displayable transcript from the trailing pronunciation tag.
///
/// Policy (first marker wins, at most one tag):
/// * No marker ⇒ the whole string is displayed, no note.
/// * Marker without a following `]` ⇒ malformed, treated as no tag.
/// * Marker with nothing displayable before it ⇒ treated as no tag (a
///   tag-only reply would otherwise blank the user's turn).
/// * Otherwise the display text is everything before the marker (trailing
///   whitespace trimmed) and the note is the text between the marker and
///   the first following `]`.
pub fn split_annotated(annotated: &str) -> RepairedTranscript {
    let untagged = || RepairedTranscript {
        display: annotated.to_string(),
        note: None,
    };

    let Some(start) = annotated.find(PRONUNCIATION_TAG_MARKER) else {
        return untagged();
    };

    let after_marker = &annotated[start + PRONUNCIATION_TAG_MARKER.len()..];
    let Some(close) = after_marker.find(']') else {
        return untagged();
    };

    let display = annotated[..start].trim_end();
    if display.is_empty() {
        return untagged();
    }

    RepairedTranscript {
        display: display.to_string(),
        note: Some(after_marker[..close].trim().to_string()),
    }
}

// ---------------------------------------------------------------------------
// RepairTagger
// ---------------------------------------------------------------------------

/// Sends a raw transcript through the repair model; falls back to the raw
/// text on any failure.
///
/// This is advisory output: the caller still runs the result through
/// [`split_annotated`] before showing anything to the user.
pub struct RepairTagger {
    chat: Arc<dyn ChatClient>,
}

impl RepairTagger {
    /// Wrap `chat` with the repair instruction.
    pub fn new(chat: Arc<dyn ChatClient>) -> Self {
        Self { chat }
    }

    /// Annotate `raw`; returns `raw` unchanged if the model call fails.
    ///
    /// This method **never** reports an error.
    pub async fn annotate(&self, raw: &str) -> String {
        let messages = [
            ChatMessage::system(REPAIR_INSTRUCTION),
            ChatMessage::user(repair_request(raw)),
        ];

        match self.chat.complete(&messages).await {
            Ok(annotated) => annotated,
            Err(e) => {
                log::warn!("repair pass failed — using raw transcript ({e})");
                raw.to_string()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::chat::LlmError;
    use async_trait::async_trait;

    // -----------------------------------------------------------------------
    // split_annotated
    // -----------------------------------------------------------------------

    #[test]
    fn well_formed_tag_is_split() {
        let parsed = split_annotated("I saw a beach [PRONUNCIATION ERROR: bitch -> beach]");
        assert_eq!(parsed.display, "I saw a beach");
        assert_eq!(parsed.note.as_deref(), Some(": bitch -> beach"));
    }

    #[test]
    fn untagged_text_passes_through() {
        let parsed = split_annotated("I saw a beach");
        assert_eq!(parsed.display, "I saw a beach");
        assert!(parsed.note.is_none());
    }

    #[test]
    fn missing_closing_bracket_is_treated_as_no_tag() {
        let text = "I saw a beach [PRONUNCIATION ERROR: bitch -> beach";
        let parsed = split_annotated(text);
        assert_eq!(parsed.display, text);
        assert!(parsed.note.is_none());
    }

    #[test]
    fn tag_only_reply_is_treated_as_no_tag() {
        let text = "[PRONUNCIATION ERROR: bitch -> beach]";
        let parsed = split_annotated(text);
        assert_eq!(parsed.display, text);
        assert!(parsed.note.is_none());
    }

    #[test]
    fn first_marker_wins_when_repeated() {
        let parsed = split_annotated(
            "word [PRONUNCIATION ERROR: a -> b] tail [PRONUNCIATION ERROR: c -> d]",
        );
        assert_eq!(parsed.display, "word");
        assert_eq!(parsed.note.as_deref(), Some(": a -> b"));
    }

    #[test]
    fn empty_input_yields_empty_display() {
        let parsed = split_annotated("");
        assert_eq!(parsed.display, "");
        assert!(parsed.note.is_none());
    }

    // -----------------------------------------------------------------------
    // RepairTagger — test doubles per the ChatClient seam
    // -----------------------------------------------------------------------

    /// Always succeeds with a fixed annotated string.
    struct AlwaysOk(String);

    #[async_trait]
    impl ChatClient for AlwaysOk {
        async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, LlmError> {
            Ok(self.0.clone())
        }
    }

    /// Always returns the given error kind.
    struct AlwaysFails(LlmError);

    #[async_trait]
    impl ChatClient for AlwaysFails {
        async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, LlmError> {
            Err(self.0.clone())
        }
    }

    #[tokio::test]
    async fn annotate_passes_through_success() {
        let tagger = RepairTagger::new(Arc::new(AlwaysOk(
            "I saw a beach [PRONUNCIATION ERROR: bitch -> beach]".into(),
        )));
        let annotated = tagger.annotate("I saw a bitch").await;
        assert!(annotated.contains("PRONUNCIATION ERROR"));
    }

    #[tokio::test]
    async fn annotate_returns_raw_on_request_error() {
        let tagger = RepairTagger::new(Arc::new(AlwaysFails(LlmError::Request(
            "connection refused".into(),
        ))));
        let annotated = tagger.annotate("I saw a bitch").await;
        assert_eq!(annotated, "I saw a bitch");
    }

    #[tokio::test]
    async fn annotate_returns_raw_on_timeout() {
        let tagger = RepairTagger::new(Arc::new(AlwaysFails(LlmError::Timeout)));
        let annotated = tagger.annotate("original words").await;
        assert_eq!(annotated, "original words");
    }

    #[tokio::test]
    async fn annotate_returns_raw_on_empty_response() {
        let tagger = RepairTagger::new(Arc::new(AlwaysFails(LlmError::EmptyResponse)));
        let annotated = tagger.annotate("original words").await;
        assert_eq!(annotated, "original words");
    }
}
