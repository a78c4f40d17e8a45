//! Exam dialogue engine — drives the full record → transcribe → grade →
//! speak loop for one session.
//!
//! [`Examiner`] owns the external-service handles and is shared by all
//! sessions; [`SessionState`] is the explicit per-session context object
//! (conversation log, LLM transcript, recorder nonce, pending audio) passed
//! into every turn-processing call.  Nothing session-scoped lives in
//! process-wide state, so concurrent sessions stay isolated.
//!
//! # Turn flow
//!
//! ```text
//! greet()
//!   └─▶ examiner instruction → chat        [AwaitingGreeting → AwaitingAnswer]
//!         └─▶ split reply → assistant Turn → queue clip
//!
//! answer(audio)
//!   └─▶ transcribe
//!         ├─ Ok(None) → NotUnderstood (nothing changes, nonce kept)
//!         ├─ Err      → TranscriptionFailed (nonce advanced)
//!         └─ Ok(text) → repair tag → user Turn
//!               └─▶ chat with running transcript
//!                     ├─ Err → GenerationFailed (nonce advanced)
//!                     └─ Ok  → split reply → feedback/assistant Turns
//!                           → nonce advanced → synthesize → queue clip
//! ```
//!
//! Every external call is handled at its call site; no failure is fatal to
//! the session and a failed turn always leaves the recorder usable.

use std::sync::Arc;

use crate::exam::history::{Conversation, RecorderNonce, Turn};
use crate::exam::reply::split_reply;
use crate::llm::{split_annotated, ChatClient, ChatMessage, RepairTagger, EXAMINER_INSTRUCTION};
use crate::stt::{SttError, Transcriber};
use crate::tts::{AudioClip, Synthesizer};

// ---------------------------------------------------------------------------
// SessionPhase
// ---------------------------------------------------------------------------

/// Where a session currently stands.
///
/// There is no terminal phase — a session only ends when it is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// The examiner has not spoken yet; the next step is [`Examiner::greet`].
    AwaitingGreeting,
    /// The examiner asked a question and is waiting for a recording.
    AwaitingAnswer,
}

// ---------------------------------------------------------------------------
// TurnOutcome / TurnReport
// ---------------------------------------------------------------------------

/// Typed result of one turn-processing call.
///
/// The UI shows these as transient notices; tests assert on them directly
/// instead of parsing display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Transcription, grading and synthesis all succeeded.
    Completed,
    /// The recording was empty or the service produced no confident
    /// transcript.  Nothing changed; the user should simply try again.
    NotUnderstood,
    /// The transcription service failed.  Turn aborted, recorder reset.
    TranscriptionFailed(String),
    /// The text-generation service failed.  Turn aborted, recorder reset.
    GenerationFailed(String),
    /// Grading succeeded but the question could not be spoken.  The turn
    /// still counts as complete; the text is shown without audio.
    SynthesisFailed(String),
}

impl TurnOutcome {
    /// `true` when the grading exchange went through (with or without audio).
    pub fn is_complete(&self) -> bool {
        matches!(self, TurnOutcome::Completed | TurnOutcome::SynthesisFailed(_))
    }

    /// Transient message to show the user, if any.
    ///
    /// Synthesis failures are deliberately silent — the question text is on
    /// screen and the turn went through.
    pub fn notice(&self) -> Option<String> {
        match self {
            TurnOutcome::Completed | TurnOutcome::SynthesisFailed(_) => None,
            TurnOutcome::NotUnderstood => {
                Some("Didn't catch that — please record your answer again.".into())
            }
            TurnOutcome::TranscriptionFailed(msg) => {
                Some(format!("Could not transcribe the recording: {msg}"))
            }
            TurnOutcome::GenerationFailed(msg) => {
                Some(format!("The examiner is unavailable: {msg}"))
            }
        }
    }
}

/// Outcome of a turn plus any advisory detail produced along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    pub outcome: TurnOutcome,
    /// Human-readable pronunciation note extracted from the repair tag
    /// (e.g. `": bitch -> beach"`), when one was present.
    pub pronunciation_note: Option<String>,
}

impl TurnReport {
    fn of(outcome: TurnOutcome) -> Self {
        Self {
            outcome,
            pronunciation_note: None,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Everything one session owns.  Created per user, mutated only by the
/// session's own sequential turn calls.
#[derive(Debug)]
pub struct SessionState {
    conversation: Conversation,
    /// Running chat-completions transcript (instruction + prior exchanges).
    transcript: Vec<ChatMessage>,
    phase: SessionPhase,
    nonce: RecorderNonce,
    /// At most one clip awaiting its single playback.
    pending_clip: Option<AudioClip>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            conversation: Conversation::new(),
            transcript: Vec::new(),
            phase: SessionPhase::AwaitingGreeting,
            nonce: RecorderNonce::initial(),
            pending_clip: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn recorder_nonce(&self) -> RecorderNonce {
        self.nonce
    }

    /// Hand over the pending clip, clearing it.
    ///
    /// Rendering the same session again without a new turn therefore never
    /// replays audio — at-most-once playback per turn.
    pub fn take_pending_clip(&mut self) -> Option<AudioClip> {
        self.pending_clip.take()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Examiner
// ---------------------------------------------------------------------------

/// Shared dialogue engine: external-service handles plus the exam settings.
///
/// All handles are `Arc<dyn …>` trait objects so tests can substitute mocks
/// and the engine can be shared across sessions.
pub struct Examiner {
    stt: Arc<dyn Transcriber>,
    chat: Arc<dyn ChatClient>,
    repair: Option<RepairTagger>,
    tts: Arc<dyn Synthesizer>,
    language: String,
}

impl Examiner {
    /// Build the engine.
    ///
    /// # Arguments
    /// * `stt`      — transcription service handle.
    /// * `chat`     — text-generation handle, used for both grading and the
    ///                repair pass.
    /// * `tts`      — synthesis service handle.
    /// * `language` — ISO-639-1 hint forwarded to transcription.
    /// * `repair_enabled` — whether the mishearing-repair pass runs.
    pub fn new(
        stt: Arc<dyn Transcriber>,
        chat: Arc<dyn ChatClient>,
        tts: Arc<dyn Synthesizer>,
        language: impl Into<String>,
        repair_enabled: bool,
    ) -> Self {
        let repair = repair_enabled.then(|| RepairTagger::new(Arc::clone(&chat)));
        Self {
            stt,
            chat,
            repair,
            tts,
            language: language.into(),
        }
    }

    // -----------------------------------------------------------------------
    // Greeting
    // -----------------------------------------------------------------------

    /// Open the conversation: send the examiner instruction and speak the
    /// first question.
    ///
    /// On success the spoken segment becomes the first assistant turn and a
    /// clip is queued; a feedback segment in the greeting (models sometimes
    /// produce one) is discarded.  On failure the session stays at
    /// `AwaitingGreeting` so the next render retries.
    pub async fn greet(&self, state: &mut SessionState) -> TurnReport {
        if state.phase != SessionPhase::AwaitingGreeting {
            log::debug!("greet called on an already-opened session — ignoring");
            return TurnReport::of(TurnOutcome::Completed);
        }

        let opening = [ChatMessage::system(EXAMINER_INSTRUCTION)];

        let raw = match self.chat.complete(&opening).await {
            Ok(raw) => raw,
            Err(e) => {
                log::error!("greeting failed: {e}");
                return TurnReport::of(TurnOutcome::GenerationFailed(e.to_string()));
            }
        };

        // Commit the exchange to the running transcript only now that the
        // call succeeded, so a retried greeting never duplicates messages.
        state.transcript.push(ChatMessage::system(EXAMINER_INSTRUCTION));
        state.transcript.push(ChatMessage::assistant(raw.clone()));

        let reply = split_reply(&raw);
        state
            .conversation
            .push(Turn::assistant(reply.spoken.clone()));
        state.phase = SessionPhase::AwaitingAnswer;

        self.speak(state, &reply.spoken).await
    }

    // -----------------------------------------------------------------------
    // Answer turn
    // -----------------------------------------------------------------------

    /// Process one finished recording: transcribe, repair, grade, speak.
    ///
    /// See the module docs for the full flow and which failures advance the
    /// recorder nonce.
    pub async fn answer(&self, state: &mut SessionState, audio: &[u8]) -> TurnReport {
        // A recording can only arrive through a rendered page, which implies
        // a greeting — but guard anyway so the machine is never stuck.
        if state.phase == SessionPhase::AwaitingGreeting {
            let report = self.greet(state).await;
            if !report.outcome.is_complete() {
                return report;
            }
        }

        // ── 1. Transcribe ────────────────────────────────────────────────
        if audio.is_empty() {
            log::debug!("answer: empty recording");
            return TurnReport::of(TurnOutcome::NotUnderstood);
        }

        let raw_transcript = match self.stt.transcribe(audio, &self.language).await {
            Ok(Some(text)) => text,
            Ok(None) => {
                log::debug!("answer: no confident transcript");
                return TurnReport::of(TurnOutcome::NotUnderstood);
            }
            Err(SttError::EmptyAudio) => {
                return TurnReport::of(TurnOutcome::NotUnderstood);
            }
            Err(e) => {
                log::error!("transcription failed: {e}");
                // Reset the recorder even though the turn aborted — input
                // must never be permanently stuck.
                state.nonce.advance();
                return TurnReport::of(TurnOutcome::TranscriptionFailed(e.to_string()));
            }
        };

        log::debug!("answer: transcript = {raw_transcript:?}");

        // ── 2. Repair pass (never fails; optional) ───────────────────────
        let annotated = match &self.repair {
            Some(tagger) => tagger.annotate(&raw_transcript).await,
            None => raw_transcript.clone(),
        };
        let repaired = split_annotated(&annotated);

        state.conversation.push(Turn::user(repaired.display.clone()));

        // ── 3. Grade and ask the next question ───────────────────────────
        let mut messages = state.transcript.clone();
        messages.push(ChatMessage::user(annotated.clone()));

        let raw_reply = match self.chat.complete(&messages).await {
            Ok(raw) => raw,
            Err(e) => {
                log::error!("grading failed: {e}");
                state.nonce.advance();
                return TurnReport {
                    outcome: TurnOutcome::GenerationFailed(e.to_string()),
                    pronunciation_note: repaired.note,
                };
            }
        };

        state.transcript.push(ChatMessage::user(annotated));
        state.transcript.push(ChatMessage::assistant(raw_reply.clone()));

        // ── 4. Split and append ──────────────────────────────────────────
        let reply = split_reply(&raw_reply);
        if let Some(feedback) = &reply.feedback {
            state.conversation.push(Turn::feedback(feedback.clone()));
        }
        state
            .conversation
            .push(Turn::assistant(reply.spoken.clone()));

        // The turn is accepted — the recorder must reset.
        state.nonce.advance();

        // ── 5. Speak the next question ───────────────────────────────────
        let mut report = self.speak(state, &reply.spoken).await;
        report.pronunciation_note = repaired.note;
        report
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Synthesize `text` and queue it for a single playback.
    ///
    /// Failure is downgraded: the turn stays complete, no clip is queued.
    async fn speak(&self, state: &mut SessionState, text: &str) -> TurnReport {
        match self.tts.synthesize(text).await {
            Ok(clip) => {
                state.pending_clip = Some(clip);
                TurnReport::of(TurnOutcome::Completed)
            }
            Err(e) => {
                log::warn!("synthesis failed — question shown without audio: {e}");
                TurnReport::of(TurnOutcome::SynthesisFailed(e.to_string()))
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
    use crate::exam::history::Role;
    use crate::llm::LlmError;
    use crate::stt::MockTranscriber;
    use crate::tts::{MockSynthesizer, TtsError};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Chat double that plays back a fixed list of replies in order.
    ///
    /// With the repair pass enabled the engine makes one extra `complete`
    /// call per answer, so scripts must account for it.
    struct ScriptedChat {
        replies: Mutex<VecDeque<Result<String, LlmError>>>,
    }

    impl ScriptedChat {
        fn new(replies: Vec<Result<String, LlmError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
            })
        }
    }

    #[async_trait]
    impl ChatClient for ScriptedChat {
        async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, LlmError> {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(LlmError::EmptyResponse))
        }
    }

    const GREETING: &str = "Hello, welcome to your speaking test. ||| Do you work or study?";

    fn make_examiner(
        stt: MockTranscriber,
        chat: Arc<ScriptedChat>,
        tts: MockSynthesizer,
        repair_enabled: bool,
    ) -> Examiner {
        Examiner::new(Arc::new(stt), chat, Arc::new(tts), "en", repair_enabled)
    }

    /// A greeted session plus an engine scripted with `answer_replies`.
    async fn greeted_session(
        stt: MockTranscriber,
        tts: MockSynthesizer,
        answer_replies: Vec<Result<String, LlmError>>,
    ) -> (Examiner, SessionState) {
        let mut replies = vec![Ok(GREETING.to_string())];
        replies.extend(answer_replies);
        let examiner = make_examiner(stt, ScriptedChat::new(replies), tts, false);

        let mut state = SessionState::new();
        let report = examiner.greet(&mut state).await;
        assert_eq!(report.outcome, TurnOutcome::Completed);
        // Consume the greeting clip so tests start from a clean slate.
        assert!(state.take_pending_clip().is_some());

        (examiner, state)
    }

    fn recording() -> Vec<u8> {
        vec![1u8; 256]
    }

    // -----------------------------------------------------------------------
    // Greeting
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn greet_appends_one_assistant_turn_and_queues_audio() {
        let examiner = make_examiner(
            MockTranscriber::ok("unused"),
            ScriptedChat::new(vec![Ok(GREETING.into())]),
            MockSynthesizer::ok(),
            false,
        );
        let mut state = SessionState::new();

        let report = examiner.greet(&mut state).await;

        assert_eq!(report.outcome, TurnOutcome::Completed);
        assert_eq!(state.phase(), SessionPhase::AwaitingAnswer);

        // The greeting's feedback segment is discarded; only the question
        // enters the log.
        let turns = state.conversation().turns();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role, Role::Assistant);
        assert_eq!(turns[0].text, "Do you work or study?");

        assert!(state.take_pending_clip().is_some());
    }

    #[tokio::test]
    async fn greet_without_delimiter_speaks_whole_reply() {
        let examiner = make_examiner(
            MockTranscriber::ok("unused"),
            ScriptedChat::new(vec![Ok("What is your favourite hobby?".into())]),
            MockSynthesizer::ok(),
            false,
        );
        let mut state = SessionState::new();

        examiner.greet(&mut state).await;

        assert_eq!(
            state.conversation().turns()[0].text,
            "What is your favourite hobby?"
        );
    }

    #[tokio::test]
    async fn greet_failure_keeps_session_ungreeted() {
        let examiner = make_examiner(
            MockTranscriber::ok("unused"),
            ScriptedChat::new(vec![Err(LlmError::Timeout)]),
            MockSynthesizer::ok(),
            false,
        );
        let mut state = SessionState::new();

        let report = examiner.greet(&mut state).await;

        assert!(matches!(report.outcome, TurnOutcome::GenerationFailed(_)));
        assert_eq!(state.phase(), SessionPhase::AwaitingGreeting);
        assert!(state.conversation().is_empty());
        assert!(state.take_pending_clip().is_none());
    }

    #[tokio::test]
    async fn greet_twice_is_a_no_op() {
        let (examiner, mut state) = greeted_session(
            MockTranscriber::ok("unused"),
            MockSynthesizer::ok(),
            vec![],
        )
        .await;

        let len_before = state.conversation().len();
        let report = examiner.greet(&mut state).await;

        assert_eq!(report.outcome, TurnOutcome::Completed);
        assert_eq!(state.conversation().len(), len_before);
        assert!(state.take_pending_clip().is_none());
    }

    // -----------------------------------------------------------------------
    // Completed turns
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn completed_turn_appends_feedback_and_assistant_turns() {
        let (examiner, mut state) = greeted_session(
            MockTranscriber::ok("I am work in a hospital"),
            MockSynthesizer::ok(),
            vec![Ok("Say \"I work\", not \"I am work\". ||| What do you do there?".into())],
        )
        .await;

        let nonce_before = state.recorder_nonce();
        let report = examiner.answer(&mut state, &recording()).await;

        assert_eq!(report.outcome, TurnOutcome::Completed);
        assert!(report.outcome.is_complete());

        let turns = state.conversation().turns();
        // greeting question, user answer, feedback, next question
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[1].role, Role::User);
        assert_eq!(turns[1].text, "I am work in a hospital");
        assert_eq!(turns[2].role, Role::Feedback);
        assert_eq!(turns[2].text, "Say \"I work\", not \"I am work\".");
        assert_eq!(turns[3].role, Role::Assistant);
        assert_eq!(turns[3].text, "What do you do there?");

        // A completed turn resets the recorder and queues exactly one clip.
        assert_ne!(state.recorder_nonce(), nonce_before);
        assert!(state.take_pending_clip().is_some());
        assert!(state.take_pending_clip().is_none());
    }

    #[tokio::test]
    async fn reply_without_delimiter_appends_single_assistant_turn() {
        let (examiner, mut state) = greeted_session(
            MockTranscriber::ok("I like hiking"),
            MockSynthesizer::ok(),
            vec![Ok("Where do you usually go hiking?".into())],
        )
        .await;

        examiner.answer(&mut state, &recording()).await;

        let turns = state.conversation().turns();
        // greeting, user, assistant — no feedback turn
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[2].role, Role::Assistant);
        assert_eq!(turns[2].text, "Where do you usually go hiking?");
    }

    #[tokio::test]
    async fn empty_feedback_segment_still_appends_a_feedback_turn() {
        let (examiner, mut state) = greeted_session(
            MockTranscriber::ok("I like hiking"),
            MockSynthesizer::ok(),
            vec![Ok("||| Where do you usually go hiking?".into())],
        )
        .await;

        examiner.answer(&mut state, &recording()).await;

        let turns = state.conversation().turns();
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[2].role, Role::Feedback);
        assert_eq!(turns[2].text, "");
    }

    // -----------------------------------------------------------------------
    // Not understood
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn silent_recording_changes_nothing() {
        let (examiner, mut state) = greeted_session(
            MockTranscriber::silent(),
            MockSynthesizer::ok(),
            vec![Ok("unreachable".into())],
        )
        .await;

        let len_before = state.conversation().len();
        let nonce_before = state.recorder_nonce();

        let report = examiner.answer(&mut state, &recording()).await;

        assert_eq!(report.outcome, TurnOutcome::NotUnderstood);
        assert!(report.outcome.notice().is_some());
        assert_eq!(state.conversation().len(), len_before);
        // The nonce must NOT change — the same recorder is re-used.
        assert_eq!(state.recorder_nonce(), nonce_before);
        assert!(state.take_pending_clip().is_none());
    }

    #[tokio::test]
    async fn empty_recording_is_not_understood() {
        let (examiner, mut state) = greeted_session(
            MockTranscriber::ok("unused"),
            MockSynthesizer::ok(),
            vec![Ok("unreachable".into())],
        )
        .await;

        let report = examiner.answer(&mut state, &[]).await;

        assert_eq!(report.outcome, TurnOutcome::NotUnderstood);
        assert_eq!(state.conversation().len(), 1);
    }

    // -----------------------------------------------------------------------
    // External failures
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn transcription_error_aborts_turn_but_resets_recorder() {
        let (examiner, mut state) = greeted_session(
            MockTranscriber::err(SttError::Timeout),
            MockSynthesizer::ok(),
            vec![Ok("unreachable".into())],
        )
        .await;

        let nonce_before = state.recorder_nonce();
        let report = examiner.answer(&mut state, &recording()).await;

        assert!(matches!(
            report.outcome,
            TurnOutcome::TranscriptionFailed(_)
        ));
        assert!(report.outcome.notice().is_some());
        assert_eq!(state.conversation().len(), 1);
        // The recorder must never be left stuck after a failure.
        assert_ne!(state.recorder_nonce(), nonce_before);
    }

    #[tokio::test]
    async fn generation_failure_keeps_user_turn_and_resets_recorder() {
        let (examiner, mut state) = greeted_session(
            MockTranscriber::ok("I am a nurse"),
            MockSynthesizer::ok(),
            vec![Err(LlmError::Request("connection refused".into()))],
        )
        .await;

        let nonce_before = state.recorder_nonce();
        let report = examiner.answer(&mut state, &recording()).await;

        assert!(matches!(report.outcome, TurnOutcome::GenerationFailed(_)));

        // The user's turn was already appended when grading failed.
        let turns = state.conversation().turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1].role, Role::User);
        assert_eq!(turns[1].text, "I am a nurse");

        assert_ne!(state.recorder_nonce(), nonce_before);
        assert!(state.take_pending_clip().is_none());
    }

    #[tokio::test]
    async fn synthesis_failure_still_completes_the_turn() {
        // Built long-hand: the erring synthesizer applies to the greeting
        // too, so the greeted_session helper's assertions don't fit here.
        let chat = ScriptedChat::new(vec![
            Ok(GREETING.into()),
            Ok("Good. ||| How long have you worked there?".into()),
        ]);
        let examiner = make_examiner(
            MockTranscriber::ok("I am a nurse"),
            chat,
            MockSynthesizer::err(TtsError::Api {
                status: 500,
                message: "boom".into(),
            }),
            false,
        );

        let mut state = SessionState::new();
        let greet_report = examiner.greet(&mut state).await;
        // Even the greeting goes through without audio.
        assert!(matches!(
            greet_report.outcome,
            TurnOutcome::SynthesisFailed(_)
        ));
        assert_eq!(state.phase(), SessionPhase::AwaitingAnswer);

        let nonce_before = state.recorder_nonce();
        let report = examiner.answer(&mut state, &recording()).await;

        assert!(matches!(report.outcome, TurnOutcome::SynthesisFailed(_)));
        assert!(report.outcome.is_complete());
        // Swallowed: no user-facing notice for a synthesis failure.
        assert!(report.outcome.notice().is_none());

        // Text still landed in the log; only the audio is missing.
        let turns = state.conversation().turns();
        assert_eq!(turns.len(), 4);
        assert!(state.take_pending_clip().is_none());
        assert_ne!(state.recorder_nonce(), nonce_before);
    }

    // -----------------------------------------------------------------------
    // Repair pass
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn repair_tag_is_stripped_from_the_displayed_turn() {
        // With repair enabled the script order is:
        // greet, repair(answer), grade(answer).
        let chat = ScriptedChat::new(vec![
            Ok(GREETING.into()),
            Ok("I saw a beach [PRONUNCIATION ERROR: bitch -> beach]".into()),
            Ok("Lovely. ||| What did you do at the beach?".into()),
        ]);
        let examiner = make_examiner(
            MockTranscriber::ok("I saw a bitch"),
            chat,
            MockSynthesizer::ok(),
            true,
        );

        let mut state = SessionState::new();
        examiner.greet(&mut state).await;

        let report = examiner.answer(&mut state, &recording()).await;

        assert_eq!(report.outcome, TurnOutcome::Completed);
        assert_eq!(report.pronunciation_note.as_deref(), Some(": bitch -> beach"));

        let turns = state.conversation().turns();
        assert_eq!(turns[1].role, Role::User);
        // The tag never reaches the visible log.
        assert_eq!(turns[1].text, "I saw a beach");
    }

    #[tokio::test]
    async fn failed_repair_falls_back_to_raw_transcript() {
        let chat = ScriptedChat::new(vec![
            Ok(GREETING.into()),
            Err(LlmError::Timeout), // repair call fails
            Ok("Okay. ||| Tell me more.".into()),
        ]);
        let examiner = make_examiner(
            MockTranscriber::ok("I saw a bitch"),
            chat,
            MockSynthesizer::ok(),
            true,
        );

        let mut state = SessionState::new();
        examiner.greet(&mut state).await;

        let report = examiner.answer(&mut state, &recording()).await;

        // The turn still completes with the raw transcript on display.
        assert_eq!(report.outcome, TurnOutcome::Completed);
        assert!(report.pronunciation_note.is_none());
        assert_eq!(state.conversation().turns()[1].text, "I saw a bitch");
    }

    #[tokio::test]
    async fn repair_disabled_skips_the_extra_call() {
        // Only two replies: greet and grade.  A repair call would exhaust
        // the script and fail the grading step.
        let chat = ScriptedChat::new(vec![
            Ok(GREETING.into()),
            Ok("Fine. ||| Next question?".into()),
        ]);
        let examiner = make_examiner(
            MockTranscriber::ok("hello"),
            chat,
            MockSynthesizer::ok(),
            false,
        );

        let mut state = SessionState::new();
        examiner.greet(&mut state).await;
        let report = examiner.answer(&mut state, &recording()).await;

        assert_eq!(report.outcome, TurnOutcome::Completed);
    }

    // -----------------------------------------------------------------------
    // Pending clip idempotence
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn pending_clip_is_taken_at_most_once() {
        let examiner = make_examiner(
            MockTranscriber::ok("unused"),
            ScriptedChat::new(vec![Ok(GREETING.into())]),
            MockSynthesizer::ok(),
            false,
        );
        let mut state = SessionState::new();
        examiner.greet(&mut state).await;

        assert!(state.take_pending_clip().is_some());
        // A second render of the same state must not replay.
        assert!(state.take_pending_clip().is_none());
    }
}
