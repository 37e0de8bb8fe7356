//! Replay recognizer
//!
//! Plays back recorded recognition events from a JSON-lines script. Each
//! `start` emits `Start`, then the scripted events at a fixed pacing, then
//! `End`. Used for demos and for driving the intake flow without a microphone.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::engine::{EngineError, RecognitionConfig, RecognitionEvent, RecognitionStream, SpeechEngine};

/// Errors while reading a replay script
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("invalid recognition event on line {line}: {source}")]
    InvalidEvent {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

pub struct ReplayEngine {
    script: Arc<Vec<RecognitionEvent>>,
    pacing: Duration,
    event_tx: Option<mpsc::UnboundedSender<RecognitionEvent>>,
    /// Flag for the current playback only; a new one is made per start
    running: Arc<AtomicBool>,
    playback: Option<JoinHandle<()>>,
}

impl ReplayEngine {
    pub fn new(script: Vec<RecognitionEvent>, pacing: Duration) -> Self {
        Self {
            script: Arc::new(script),
            pacing,
            event_tx: None,
            running: Arc::new(AtomicBool::new(false)),
            playback: None,
        }
    }

    /// Load a script file
    pub fn load(path: &Path, pacing: Duration) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read dictation script {}", path.display()))?;
        let script = parse_script(&text)
            .with_context(|| format!("failed to parse dictation script {}", path.display()))?;

        info!(?path, events = script.len(), "dictation script loaded");
        Ok(Self::new(script, pacing))
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Parse JSON-lines recognition events.
///
/// Blank lines and `#` comments are skipped, and so are `start`/`end`
/// entries since the engine raises those itself.
pub fn parse_script(text: &str) -> Result<Vec<RecognitionEvent>, ScriptError> {
    let mut events = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let event: RecognitionEvent = serde_json::from_str(line)
            .map_err(|source| ScriptError::InvalidEvent { line: idx + 1, source })?;

        match event {
            RecognitionEvent::Start | RecognitionEvent::End => {
                debug!(line = idx + 1, "skipping lifecycle event in script");
            }
            event => events.push(event),
        }
    }

    Ok(events)
}

impl SpeechEngine for ReplayEngine {
    fn open(&mut self, config: &RecognitionConfig) -> Option<RecognitionStream> {
        debug!(
            continuous = config.continuous,
            interim = config.interim_results,
            locale = %config.locale,
            "replay recognizer configured"
        );
        let (tx, rx) = mpsc::unbounded_channel();
        self.event_tx = Some(tx);
        Some(rx)
    }

    fn start(&mut self) -> Result<(), EngineError> {
        let tx = self.event_tx.clone().ok_or(EngineError::Unavailable)?;
        if self.is_running() {
            return Err(EngineError::AlreadyRunning);
        }

        let running = Arc::new(AtomicBool::new(true));
        self.running = Arc::clone(&running);
        let _ = tx.send(RecognitionEvent::Start);

        let script = Arc::clone(&self.script);
        let pacing = self.pacing;

        self.playback = Some(tokio::spawn(async move {
            for event in script.iter() {
                tokio::time::sleep(pacing).await;
                if tx.send(event.clone()).is_err() {
                    break;
                }
            }

            // Stop may have won the race and already raised End.
            if running
                .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                let _ = tx.send(RecognitionEvent::End);
            }
            debug!("replay playback finished");
        }));

        Ok(())
    }

    fn stop(&mut self) -> Result<(), EngineError> {
        let tx = self.event_tx.as_ref().ok_or(EngineError::Unavailable)?;
        if self
            .running
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(EngineError::NotRunning);
        }

        if let Some(handle) = self.playback.take() {
            handle.abort();
        }
        let _ = tx.send(RecognitionEvent::End);
        Ok(())
    }
}
