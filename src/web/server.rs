//! HTTP boundary — one recorder page plus a small session API.
//!
//! Routes:
//! * `GET  /`                        — the recorder page.
//! * `POST /api/session`             — open a session (examiner greets).
//! * `GET  /api/session/{id}`        — re-render the current view.
//! * `POST /api/session/{id}/answer` — body = finished recording bytes.
//!
//! Each response carries a [`SessionView`]: the ordered turn list, the
//! recorder nonce, an optional transient notice and an optional audio clip
//! as a base64 data URL.  The clip is consumed by the render that returns
//! it, so refreshing the page never replays a question.
//!
//! Sessions live in an in-memory map; each holds its own lock so turns
//! within one session run strictly one after another while separate
//! sessions proceed independently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::Engine;
use serde::Serialize;
use uuid::Uuid;

use crate::exam::{Examiner, SessionState, Turn, TurnReport};

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Shared server state: the dialogue engine plus the live sessions.
pub struct AppState {
    examiner: Examiner,
    /// The outer lock guards the map only; the per-session lock is held for
    /// the whole turn so a session is always processed sequentially.
    sessions: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<SessionState>>>>,
}

impl AppState {
    pub fn new(examiner: Examiner) -> Self {
        Self {
            examiner,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn insert_session(&self) -> (Uuid, Arc<tokio::sync::Mutex<SessionState>>) {
        let id = Uuid::new_v4();
        let session = Arc::new(tokio::sync::Mutex::new(SessionState::new()));
        self.sessions
            .lock()
            .unwrap()
            .insert(id, Arc::clone(&session));
        (id, session)
    }

    fn find_session(&self, id: Uuid) -> Option<Arc<tokio::sync::Mutex<SessionState>>> {
        self.sessions.lock().unwrap().get(&id).cloned()
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/session", post(create_session))
        .route("/api/session/{id}", get(render_session))
        .route("/api/session/{id}/answer", post(submit_answer))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// SessionView
// ---------------------------------------------------------------------------

/// What the page needs to render one state of the conversation.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    /// Ordered turn list, oldest first.
    pub turns: Vec<Turn>,
    /// Current recorder key — a changed value remounts the recorder.
    pub recorder_nonce: u64,
    /// Base64 data URL of the clip to auto-play once, when one is pending.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    /// Transient message (not-understood, service failures, pronunciation
    /// note) — shown once, not part of the log.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// Render the session, consuming the pending clip (at most once).
fn render_view(id: Uuid, state: &mut SessionState, report: Option<&TurnReport>) -> SessionView {
    let audio = state.take_pending_clip().map(|clip| {
        format!(
            "data:{};base64,{}",
            clip.mime,
            base64::engine::general_purpose::STANDARD.encode(&clip.data)
        )
    });

    let notice = report.and_then(|r| {
        let mut parts = Vec::new();
        if let Some(note) = &r.pronunciation_note {
            parts.push(format!("Pronunciation{note}"));
        }
        if let Some(msg) = r.outcome.notice() {
            parts.push(msg);
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" — "))
        }
    });

    SessionView {
        session_id: id,
        turns: state.conversation().turns().to_vec(),
        recorder_nonce: state.recorder_nonce().value(),
        audio,
        notice,
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn index() -> Html<&'static str> {
    Html(include_str!("index.html"))
}

/// Open a new session and let the examiner speak first.
async fn create_session(State(state): State<Arc<AppState>>) -> Json<SessionView> {
    let (id, session) = state.insert_session();
    let mut session = session.lock().await;

    let report = state.examiner.greet(&mut session).await;
    log::info!("session {id}: opened ({:?})", report.outcome);

    Json(render_view(id, &mut session, Some(&report)))
}

/// Re-render an existing session (page refresh).
async fn render_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let session = state.find_session(id).ok_or(ApiError::UnknownSession)?;
    let mut session = session.lock().await;

    // A failed greeting leaves the session un-opened; a reload retries it.
    let report = match session.phase() {
        crate::exam::SessionPhase::AwaitingGreeting => {
            Some(state.examiner.greet(&mut session).await)
        }
        crate::exam::SessionPhase::AwaitingAnswer => None,
    };

    Ok(Json(render_view(id, &mut session, report.as_ref())))
}

/// Accept one finished recording and run the full exam turn.
async fn submit_answer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<SessionView>, ApiError> {
    let session = state.find_session(id).ok_or(ApiError::UnknownSession)?;
    let mut session = session.lock().await;

    let report = state.examiner.answer(&mut session, &body).await;
    log::info!("session {id}: turn finished ({:?})", report.outcome);

    Ok(Json(render_view(id, &mut session, Some(&report))))
}

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// Request-level errors (turn-level failures travel inside `SessionView`).
#[derive(Debug)]
pub enum ApiError {
    UnknownSession,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorBody {
            error: &'static str,
        }

        let (status, error) = match self {
            Self::UnknownSession => (StatusCode::NOT_FOUND, "unknown session"),
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
