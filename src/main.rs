//! triage-intake: symptom intake client for a remote triage service
//!
//! Wires the terminal shell, the configured speech recognizer and the HTTP
//! triage client around one intake session.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use triage_intake::config::Config;
use triage_intake::dictation::{DictationController, ReplayEngine, SpeechEngine, UnsupportedEngine};
use triage_intake::events::SessionEvent;
use triage_intake::lifecycle::ShutdownSignal;
use triage_intake::session::{forward_recognition, Session, SessionRunner};
use triage_intake::shell::Terminal;
use triage_intake::triage::HttpTriageClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout belongs to the shell
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "triage-intake starting"
    );

    let config = Config::load()?;
    info!(api_url = %config.api_url, locale = %config.locale, "configuration loaded");

    let mut shutdown = ShutdownSignal::register().context("failed to register signal handlers")?;

    let engine: Box<dyn SpeechEngine> = match &config.dictation_script {
        Some(path) => Box::new(ReplayEngine::load(path, config.replay_pacing)?),
        None => Box::new(UnsupportedEngine),
    };
    let service = Arc::new(HttpTriageClient::new(&config.api_url, config.request_timeout)?);

    // Shell + recognizer + triage tasks -> session runner
    let (input_tx, input_rx) = mpsc::channel(64);
    // Session -> shell (transition events)
    let (event_tx, event_rx) = broadcast::channel::<SessionEvent>(64);

    let (dictation, stream) = DictationController::initialize(engine, &config.recognition());
    if let Some(stream) = stream {
        forward_recognition(stream, &input_tx);
    }

    let session = Session::new(dictation, event_tx);
    let (mut runner, view_rx) = SessionRunner::new(session, service, &input_tx);
    let terminal = Terminal::new(input_tx, view_rx, event_rx);

    info!("session initialized, entering main loop");

    tokio::select! {
        _ = runner.run(input_rx) => {
            info!("session runner exited");
        }

        result = terminal.run() => {
            if let Err(e) = result {
                error!(?e, "shell error");
            }
        }

        _ = shutdown.wait() => {
            info!("shutdown signal received");
        }
    }

    info!("triage-intake stopped");

    Ok(())
}
