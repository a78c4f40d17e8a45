//! Conversation log and recorder nonce.
//!
//! [`Conversation`] is an append-only ordered sequence of [`Turn`]s;
//! insertion order is display order is chronological order.  Turns are never
//! edited or removed — the log lives exactly as long as its session.
//!
//! [`RecorderNonce`] is the opaque token the recording widget is keyed by.
//! It must change after every accepted recording so the widget resets to a
//! ready state; its numeric value carries no other meaning.

use serde::Serialize;

// ---------------------------------------------------------------------------
// Role / Turn
// ---------------------------------------------------------------------------

/// Who a turn belongs to in the conversation log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The learner's (transcribed) answer.
    User,
    /// The examiner's spoken question.
    Assistant,
    /// Written grading feedback — shown, never spoken.
    Feedback,
}

impl Role {
    /// A short human-readable label for the UI.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Assistant => "Examiner",
            Role::Feedback => "Feedback",
        }
    }
}

/// One labeled utterance.  Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }

    pub fn feedback(text: impl Into<String>) -> Self {
        Self {
            role: Role::Feedback,
            text: text.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

/// Append-only ordered log of turns.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn.  There is deliberately no way to edit or remove one.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// All turns, oldest first.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

// ---------------------------------------------------------------------------
// RecorderNonce
// ---------------------------------------------------------------------------

/// Opaque token that keys the recording widget.
///
/// The only guarantee is that [`advance`](Self::advance) yields a value
/// different from the previous one, which forces the widget to remount in a
/// ready state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RecorderNonce(u64);

impl RecorderNonce {
    pub fn initial() -> Self {
        Self(0)
    }

    /// Produce the next token.  Always differs from the current value.
    pub fn advance(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Default for RecorderNonce {
    fn default() -> Self {
        Self::initial()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
