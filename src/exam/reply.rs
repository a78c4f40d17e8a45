//! Response splitter — separates written feedback from the spoken question.
//!
//! The examiner model is instructed to answer as
//! `feedback ||| next question`.  Its output is untrusted text, so the
//! split lives here as a pure function with no network access.
//!
//! Policy: split on the **first** delimiter only.  When the delimiter
//! appears more than once, everything after the first occurrence is treated
//! as one spoken segment.

/// Delimiter between the feedback segment and the spoken segment.
pub const REPLY_DELIMITER: &str = "|||";

/// One examiner reply after splitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExaminerReply {
    /// Written feedback — present only when the reply contained the
    /// delimiter.  May be an empty string (delimiter with nothing before it).
    pub feedback: Option<String>,
    /// Text to show as the examiner's turn and read aloud.
    pub spoken: String,
}

/// Split a raw examiner reply into feedback and spoken segments.
///
/// Never fails; an empty input yields an empty spoken segment.
///
/// ```
/// use speaking_examiner::exam::split_reply;
///
/// let reply = split_reply("Good job ||| Tell me about your hometown.");
/// assert_eq!(reply.feedback.as_deref(), Some("Good job"));
/// assert_eq!(reply.spoken, "Tell me about your hometown.");
/// ```
pub fn split_reply(raw: &str) -> ExaminerReply {
    match raw.split_once(REPLY_DELIMITER) {
        Some((feedback, spoken)) => ExaminerReply {
            feedback: Some(feedback.trim().to_string()),
            spoken: spoken.trim().to_string(),
        },
        None => ExaminerReply {
            feedback: None,
            spoken: raw.trim().to_string(),
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
