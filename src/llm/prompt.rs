//! Fixed instructions sent to the text-generation model.
//!
//! Two prompts live here:
//! * [`EXAMINER_INSTRUCTION`] — opens the exam conversation and pins the
//!   `|||` response-format contract for every later reply.
//! * [`REPAIR_INSTRUCTION`] plus [`repair_request`] — the one-shot
//!   mishearing-repair prompt applied to each raw transcript.
//!
//! Both are plain prompt text consumed by a single process; the model's
//! replies are untrusted and go through the pure parsers in
//! [`crate::exam::reply`] and [`crate::llm::repair`].

// ---------------------------------------------------------------------------
// Examiner instruction
// ---------------------------------------------------------------------------

/// Opening instruction for the examiner conversation.
///
/// The part after `"|||"` in every reply is read aloud; the part before it
/// is shown as written feedback only.
pub const EXAMINER_INSTRUCTION: &str = "\
You are a strict IELTS Speaking Examiner.
Your GOAL: Test the user's speaking ability naturally.

RULES FOR RESPONSE FORMAT:
1. IF USER MAKES A MISTAKE:
   Output format: [Brief Correction] ||| [Next Question]
   Example: You said \"I go\". Correct: \"I went\". ||| What did you do there?

2. IF USER IS CORRECT:
   Output format: [Next Question]
   Example: Interesting. ||| Do you prefer working alone or in a team?

IMPORTANT:
- Use \"|||\" to separate feedback (text only) and speech (voice).
- The part AFTER \"|||\" will be spoken by voice. Keep it natural.
- Start with a Part 1 question about Work, Study, or Hobbies.";

// ---------------------------------------------------------------------------
// Repair instruction
// ---------------------------------------------------------------------------

/// System instruction for the mishearing-repair pass.
///
/// The model must either echo the transcript unchanged or correct a phonetic
/// mis-transcription and flag it with a single trailing
/// `[PRONUNCIATION ERROR: <wrong> -> <right>]` tag.
pub const REPAIR_INSTRUCTION: &str = "\
You are a transcript repair assistant for a speaking exam.
The text you receive is a raw speech-to-text transcript of a learner's answer.

Rules:
1. Fix ONLY words that were clearly mis-heard phonetically (e.g. \"bitch\"
   when the speaker meant \"beach\").
2. Do NOT fix grammar, word choice, or style — the examiner grades those.
3. If you correct a word, append exactly one tag at the end of the text:
   [PRONUNCIATION ERROR: <wrong word> -> <corrected word>]
4. If nothing was mis-heard, return the transcript completely unchanged.
5. Reply with the transcript only — no explanation.";

/// Build the user message for one repair request.
pub fn repair_request(raw_transcript: &str) -> String {
    format!("Transcript:\n{raw_transcript}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn examiner_instruction_pins_delimiter_contract() {
        assert!(EXAMINER_INSTRUCTION.contains("|||"));
        assert!(EXAMINER_INSTRUCTION.contains("IELTS"));
        assert!(
            EXAMINER_INSTRUCTION.contains("Part 1"),
            "opening must request a Part 1 question"
        );
    }

    #[test]
    fn repair_instruction_names_the_tag_format() {
        assert!(REPAIR_INSTRUCTION.contains("[PRONUNCIATION ERROR:"));
        assert!(
            REPAIR_INSTRUCTION.contains("unchanged"),
            "instruction must allow the no-op case"
        );
    }

    #[test]
    fn repair_request_embeds_the_transcript() {
        let msg = repair_request("I saw a bitch yesterday");
        assert!(msg.contains("I saw a bitch yesterday"));
        assert!(msg.starts_with("Transcript:"));
    }
}
