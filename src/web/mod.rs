//! Web UI boundary — the recorder page and the session API.
//!
//! Everything in here is presentation plumbing around the exam engine; the
//! dialogue logic itself lives in [`crate::exam`].

pub mod server;

pub use server::{router, AppState, SessionView};
