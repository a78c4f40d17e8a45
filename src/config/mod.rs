//! Configuration module for the speaking examiner.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each external
//! endpoint, `AppPaths` for cross-platform data directories, and TOML
//! persistence via `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, ExamConfig, LlmConfig, ServerConfig, SttConfig, TtsConfig};
