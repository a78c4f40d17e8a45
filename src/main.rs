//! Application entry point — Speaking Examiner.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run) and fill
//!    missing API keys from `OPENAI_API_KEY`.
//! 3. Build the three service adapters and the [`Examiner`] engine.
//! 4. Bind the configured address and serve the recorder page — blocks
//!    until the process is terminated.

use std::sync::Arc;

use anyhow::Context;

use speaking_examiner::{
    config::AppConfig,
    exam::Examiner,
    llm::ApiChatClient,
    stt::ApiTranscriber,
    tts::ApiSynthesizer,
    web::{self, AppState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Speaking Examiner starting up");

    // 2. Configuration
    let config = AppConfig::load()
        .unwrap_or_else(|e| {
            log::warn!("Failed to load config ({e}); using defaults");
            AppConfig::default()
        })
        .with_env_api_key();

    if config.llm.api_key.is_none() {
        log::warn!(
            "No LLM API key configured — set OPENAI_API_KEY or add api_key to settings.toml"
        );
    }

    // 3. Engine
    let examiner = Examiner::new(
        Arc::new(ApiTranscriber::from_config(&config.stt)),
        Arc::new(ApiChatClient::from_config(&config.llm)),
        Arc::new(ApiSynthesizer::from_config(&config.tts)),
        config.stt.language.clone(),
        config.exam.repair_enabled,
    );

    let state = Arc::new(AppState::new(examiner));
    let app = web::router(state);

    // 4. Serve
    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    log::info!("Listening on http://{}", config.server.bind_addr);

    axum::serve(listener, app)
        .await
        .context("server terminated unexpectedly")?;

    Ok(())
}
