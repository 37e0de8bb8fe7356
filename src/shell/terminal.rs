//! Terminal shell
//!
//! Reads commands from stdin, forwards intents to the session and prints
//! the view whenever it changes.

use std::fmt::Write as _;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, info, warn};

use super::protocol::{parse_line, ShellCommand, HELP};
use crate::dictation::Availability;
use crate::events::SessionEvent;
use crate::session::{SessionInput, SubmissionState, UrgencyTier, View};

/// Render a view as plain text
pub fn render(view: &View) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "== Symptom Analysis ==");
    if let Some(result) = &view.result {
        let marker = match result.tier {
            UrgencyTier::Emergency => "!!!",
            UrgencyTier::Urgent => "!!",
            UrgencyTier::Routine => "-",
        };
        let _ = writeln!(out, "Access token generated. Proceed to assigned department.");
        let _ = writeln!(out, "  Department: {}", result.department);
        let _ = writeln!(out, "  Priority:   {} {}", result.urgency, marker);
        let _ = writeln!(out, "  Entry code: {}", result.token);
        let _ = write!(out, "(/reset to process another case)");
        return out;
    }

    let symptoms = if view.symptoms.is_empty() {
        "(empty)"
    } else {
        view.symptoms.as_str()
    };
    let _ = writeln!(out, "Symptoms: {}", symptoms);

    let dictation = match (view.dictation.availability, view.dictation.listening) {
        (Availability::Unsupported, _) => "unavailable",
        (Availability::Available, true) => "recording...",
        (Availability::Available, false) => "idle (/mic to dictate)",
    };
    let _ = writeln!(out, "Dictation: {}", dictation);

    if let Some(message) = &view.mic_error {
        let _ = writeln!(out, "Mic: {} (/dismiss)", message);
    }

    let status = match &view.submission {
        SubmissionState::Submitting => "Running diagnostics...".to_string(),
        SubmissionState::Failed(message) => message.clone(),
        _ if view.can_submit => "Ready (/submit)".to_string(),
        _ => "Describe your symptoms".to_string(),
    };
    let _ = write!(out, "Status: {}", status);
    out
}

/// Line to print for an event, for events the view does not already show
pub fn notice(event: &SessionEvent) -> Option<String> {
    match event {
        SessionEvent::IntentRejected { message } => Some(format!("Rejected: {}", message)),
        _ => None,
    }
}

pub struct Terminal {
    input_tx: mpsc::Sender<SessionInput>,
    view_rx: watch::Receiver<View>,
    event_rx: broadcast::Receiver<SessionEvent>,
}

impl Terminal {
    pub fn new(
        input_tx: mpsc::Sender<SessionInput>,
        view_rx: watch::Receiver<View>,
        event_rx: broadcast::Receiver<SessionEvent>,
    ) -> Self {
        Self {
            input_tx,
            view_rx,
            event_rx,
        }
    }

    /// Run until stdin closes or `/quit`
    pub async fn run(mut self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        println!("{}\n", HELP);
        println!("{}", render(&self.view_rx.borrow_and_update()));

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        info!("stdin closed");
                        return Ok(());
                    };
                    if !self.handle_line(&line).await {
                        return Ok(());
                    }
                }

                changed = self.view_rx.changed() => {
                    if changed.is_err() {
                        info!("session closed");
                        return Ok(());
                    }
                    println!("{}", render(&self.view_rx.borrow_and_update()));
                }

                event = self.event_rx.recv() => {
                    match event {
                        Ok(event) => {
                            debug!(%event, "session event");
                            if let Some(line) = notice(&event) {
                                println!("{}", line);
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            warn!(skipped = n, "session event receiver lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => return Ok(()),
                    }
                }
            }
        }
    }

    /// Returns false when the shell should exit
    async fn handle_line(&self, line: &str) -> bool {
        match parse_line(line) {
            Ok(None) => true,
            Ok(Some(ShellCommand::Intent(intent))) => {
                self.input_tx.send(SessionInput::User(intent)).await.is_ok()
            }
            Ok(Some(ShellCommand::Show)) => {
                println!("{}", render(&self.view_rx.borrow()));
                true
            }
            Ok(Some(ShellCommand::Help)) => {
                println!("{}", HELP);
                true
            }
            Ok(Some(ShellCommand::Quit)) => false,
            Err(e) => {
                println!("{}", e);
                true
            }
        }
    }
}
