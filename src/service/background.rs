use futures::future::BoxFuture;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Fire-and-forget side effects: enqueued work is never awaited by the caller.
/// A failing task is logged and dropped; nothing is retried.
#[derive(Clone, Default)]
pub struct BackgroundTasks {
    tasks: Arc<Mutex<JoinSet<(&'static str, Result<(), String>)>>>,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue<F>(&self, name: &'static str, task: F)
    where
        F: Future<Output = Result<(), String>> + Send + 'static,
    {
        let task: BoxFuture<'static, Result<(), String>> = Box::pin(task);
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        // reap whatever already finished so the set does not grow unbounded
        while let Some(done) = tasks.try_join_next() {
            log_outcome(done);
        }
        tasks.spawn(async move { (name, task.await) });
        debug!(task = name, "Background task enqueued");
    }

    pub fn pending(&self) -> usize {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Waits for every enqueued task. Used at shutdown and in tests.
    pub async fn drain(&self) {
        let mut tasks = std::mem::take(&mut *self.tasks.lock().unwrap_or_else(PoisonError::into_inner));
        while let Some(done) = tasks.join_next().await {
            log_outcome(done);
        }
    }
}

fn log_outcome(done: Result<(&'static str, Result<(), String>), tokio::task::JoinError>) {
    match done {
        Ok((name, Ok(()))) => debug!(task = name, "Background task finished"),
        Ok((name, Err(e))) => warn!(task = name, "Background task failed: {}", e),
        Err(e) => warn!("Background task panicked or was cancelled: {}", e),
    }
}
