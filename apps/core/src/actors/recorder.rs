use crate::actors::messages::RecorderMessage;
use crate::actors::traits::QuestionStore;
use crate::error::AppError;
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{timeout, Duration};
use tracing::{debug, error, info, instrument, warn};

/// Default number of questions that may wait for the store.
pub const RECORDER_QUEUE_CAPACITY: usize = 256;

/// How long [`QuestionRecorderHandle::flush`] waits for the queue to drain.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

/// A handle to the question recorder actor.
///
/// Recording is fire-and-forget: [`record`](Self::record) never waits on the
/// store, and a slow or failing store never reaches the caller. Failures are
/// logged by the actor.
#[derive(Clone)]
pub struct QuestionRecorderHandle {
    sender: mpsc::Sender<RecorderMessage>,
}

impl QuestionRecorderHandle {
    /// Spawns the recorder on the current Tokio runtime and returns a handle to it.
    pub fn spawn(store: Arc<dyn QuestionStore>) -> Self {
        Self::spawn_with_capacity(store, RECORDER_QUEUE_CAPACITY)
    }

    /// Like [`spawn`](Self::spawn) with an explicit queue size.
    pub fn spawn_with_capacity(store: Arc<dyn QuestionStore>, capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let runner = RecorderRunner::new(receiver, store);
        tokio::spawn(async move { runner.run().await });
        Self { sender }
    }

    /// Queues a question for persistence. Returns `false` if it was dropped
    /// because the queue is full or the recorder has stopped.
    pub fn record(&self, text: impl Into<String>) -> bool {
        match self.sender.try_send(RecorderMessage::Record { text: text.into() }) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("Question recorder queue is full, dropping question");
                false
            }
            Err(TrySendError::Closed(_)) => {
                warn!("Question recorder has stopped, dropping question");
                false
            }
        }
    }

    /// Waits until every question queued so far has been handled.
    #[instrument(skip(self))]
    pub async fn flush(&self) -> Result<(), AppError> {
        let (send, recv) = oneshot::channel();
        self.sender
            .send(RecorderMessage::Flush { responder: send })
            .await
            .map_err(|e| AppError::Actor(e.to_string()))?;
        timeout(FLUSH_TIMEOUT, recv)
            .await?
            .map_err(|e| AppError::Actor(e.to_string()))
    }

    /// Asks the recorder to stop once the queued questions are handled.
    pub async fn shutdown(&self) -> Result<(), AppError> {
        self.sender
            .send(RecorderMessage::Shutdown)
            .await
            .map_err(|e| AppError::Actor(e.to_string()))
    }
}

// --- Actor Runner ---
struct RecorderRunner {
    receiver: mpsc::Receiver<RecorderMessage>,
    store: Arc<dyn QuestionStore>,
    recorded: u64,
    failed: u64,
}

impl RecorderRunner {
    fn new(receiver: mpsc::Receiver<RecorderMessage>, store: Arc<dyn QuestionStore>) -> Self {
        Self {
            receiver,
            store,
            recorded: 0,
            failed: 0,
        }
    }

    async fn run(mut self) {
        info!("Question recorder started");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                RecorderMessage::Record { text } => self.handle_record(text).await,
                RecorderMessage::Flush { responder } => {
                    let _ = responder.send(());
                }
                RecorderMessage::Shutdown => break,
            }
        }
        info!(
            recorded = self.recorded,
            failed = self.failed,
            "Question recorder stopped"
        );
    }

    async fn handle_record(&mut self, text: String) {
        match self.store.save(text).await {
            Ok(question) => {
                self.recorded += 1;
                debug!(question_id = question.id, "Question recorded");
            }
            Err(e) => {
                self.failed += 1;
                error!("Failed to record question: {}", e);
            }
        }
    }
}
