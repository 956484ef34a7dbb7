//! Serial request queue for the rate-limited generative API.
//!
//! All upstream calls funnel through one FIFO drain loop so at most one
//! request is in flight at a time, with a fixed delay between tasks to
//! smooth burst traffic. The loop parks on the channel when the queue is
//! empty; there is no polling.

use crate::error::{InsightError, InsightResult};
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

type QueuedTask = BoxFuture<'static, ()>;

/// FIFO dispatcher guaranteeing one in-flight upstream call at a time
#[derive(Debug)]
pub struct SerialRequestQueue {
    inter_task_delay: Duration,
    sender: OnceLock<mpsc::UnboundedSender<QueuedTask>>,
}

impl SerialRequestQueue {
    /// Create the queue. The drain loop is spawned on first use, so
    /// construction does not require a running async runtime.
    ///
    /// `inter_task_delay` is slept after every task completes, before the
    /// next one is dequeued.
    pub fn new(inter_task_delay: Duration) -> Self {
        Self {
            inter_task_delay,
            sender: OnceLock::new(),
        }
    }

    fn sender(&self) -> &mpsc::UnboundedSender<QueuedTask> {
        self.sender.get_or_init(|| {
            let (sender, mut receiver) = mpsc::unbounded_channel::<QueuedTask>();
            let delay = self.inter_task_delay;

            tokio::spawn(async move {
                while let Some(task) = receiver.recv().await {
                    task.await;
                    tokio::time::sleep(delay).await;
                }
                debug!("Serial request queue drain loop stopped");
            });

            sender
        })
    }

    /// Append a unit of work and await its outcome.
    ///
    /// Enqueue order is dispatch order; resolution and rejection are both
    /// forwarded to the caller unchanged.
    pub async fn enqueue<T, F>(&self, work: F) -> InsightResult<T>
    where
        T: Send + 'static,
        F: Future<Output = InsightResult<T>> + Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();

        let task: QueuedTask = Box::pin(async move {
            let outcome = work.await;
            // The caller may have gone away; the work still ran to completion
            let _ = done_tx.send(outcome);
        });

        self.sender()
            .send(task)
            .map_err(|_| InsightError::Internal("request queue is shut down".to_string()))?;

        done_rx
            .await
            .map_err(|_| InsightError::Internal("queued task was dropped".to_string()))?
    }
}
