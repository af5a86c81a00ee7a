use tokio::sync::oneshot;

/// Messages that can be sent to the question recorder.
#[derive(Debug)]
pub enum RecorderMessage {
    /// Persist a raw user question. Nobody waits for the outcome.
    Record { text: String },
    /// Reply once every message queued before this one has been handled.
    Flush { responder: oneshot::Sender<()> },
    /// Stop the recorder after the messages already queued.
    Shutdown,
}
