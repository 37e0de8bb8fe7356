//! Session runner
//!
//! Owns the [`Session`] and applies inputs one at a time from a single
//! channel. Triage requests run on spawned tasks that post their outcome
//! back into the same channel, so all state changes stay on this task.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::machine::SubmitTicket;
use super::reducer::{Session, SessionInput, View};
use crate::dictation::RecognitionStream;
use crate::triage::TriageService;

pub struct SessionRunner {
    session: Session,
    service: Arc<dyn TriageService>,
    /// Used by request tasks to report back; weak so the loop ends once
    /// every external sender is gone
    completion_tx: mpsc::WeakSender<SessionInput>,
    view_tx: watch::Sender<View>,
}

impl SessionRunner {
    /// Create a runner. `input_tx` must feed the receiver later given to `run`.
    pub fn new(
        session: Session,
        service: Arc<dyn TriageService>,
        input_tx: &mpsc::Sender<SessionInput>,
    ) -> (Self, watch::Receiver<View>) {
        let (view_tx, view_rx) = watch::channel(session.view());
        let runner = Self {
            session,
            service,
            completion_tx: input_tx.downgrade(),
            view_tx,
        };
        (runner, view_rx)
    }

    /// Run the session, processing inputs until every sender is dropped
    pub async fn run(&mut self, mut input_rx: mpsc::Receiver<SessionInput>) {
        info!("session started in Idle state");

        while let Some(input) = input_rx.recv().await {
            if let Some(ticket) = self.session.apply(input) {
                self.dispatch(ticket);
            }
            self.view_tx.send_replace(self.session.view());
        }

        info!("session stopped");
    }

    /// Send one triage request on its own task
    fn dispatch(&self, ticket: SubmitTicket) {
        let Some(tx) = self.completion_tx.upgrade() else {
            warn!(request_id = ticket.request_id, "session closing, triage request dropped");
            return;
        };
        let service = Arc::clone(&self.service);

        debug!(request_id = ticket.request_id, "dispatching triage request");
        tokio::spawn(async move {
            let outcome = service.triage(&ticket.symptoms).await;
            let completed = SessionInput::TriageCompleted {
                request_id: ticket.request_id,
                outcome,
            };
            if tx.send(completed).await.is_err() {
                warn!(request_id = ticket.request_id, "session gone before triage completed");
            }
        });
    }
}

/// Forward recognizer events into the session's input channel.
///
/// Holds only a weak sender: the recognizer lives inside the session, so a
/// strong one would keep the session alive forever.
pub fn forward_recognition(
    mut stream: RecognitionStream,
    input_tx: &mpsc::Sender<SessionInput>,
) -> JoinHandle<()> {
    let input_tx = input_tx.downgrade();
    tokio::spawn(async move {
        while let Some(event) = stream.recv().await {
            let Some(tx) = input_tx.upgrade() else {
                break;
            };
            if tx.send(SessionInput::Speech(event)).await.is_err() {
                break;
            }
        }
        debug!("recognition stream closed");
    })
}
