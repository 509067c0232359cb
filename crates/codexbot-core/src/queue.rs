use anyhow::{anyhow, Result};
use tokio::sync::mpsc;
use tracing::debug;

/// One asynchronous unit of work, corresponding to one webhook-triggered
/// task.
#[derive(Debug)]
pub struct Job<T> {
    pub key: String,
    pub payload: T,
}

/// Fire-and-forget handle for the single-consumer background job queue.
///
/// Publishing never waits for the job to run; delivery lasts only as long
/// as the process, and a failed job is not retried. Replaying the same
/// webhook enqueues a new job each time.
pub struct JobQueue<T> {
    tx: mpsc::UnboundedSender<Job<T>>,
}

impl<T> Clone for JobQueue<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> JobQueue<T> {
    /// Create the queue, returning the publish handle and the consumer half.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Job<T>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Enqueue exactly one job under the given key.
    pub fn publish(&self, key: impl Into<String>, payload: T) -> Result<()> {
        let key = key.into();
        debug!(job_key = %key, "publishing job");
        self.tx
            .send(Job { key, payload })
            .map_err(|_| anyhow!("job queue is closed"))
    }
}
