//! Cancellable background task handles.

use std::future::Future;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Owns a spawned background loop and its cancellation signal.
///
/// Stopping sends the signal and waits for the loop to exit. Dropping the
/// handle without stopping sends the signal and aborts the task, so a
/// handle can never leak a running loop.
#[derive(Debug)]
pub struct TaskHandle {
    /// Name used in logs.
    name: &'static str,
    /// Cancellation signal observed by the loop.
    cancel: watch::Sender<bool>,
    /// The spawned task.
    join: Option<JoinHandle<()>>,
}

impl TaskHandle {
    /// Spawns `body` with a fresh cancellation receiver.
    pub fn spawn<F, Fut>(name: &'static str, body: F) -> Self
    where
        F: FnOnce(watch::Receiver<bool>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (cancel, rx) = watch::channel(false);
        let join = tokio::spawn(body(rx));
        tracing::debug!(task = name, "Background task started");
        Self {
            name,
            cancel,
            join: Some(join),
        }
    }

    /// Whether the loop has already exited on its own.
    pub fn is_finished(&self) -> bool {
        self.join.as_ref().is_none_or(|j| j.is_finished())
    }

    /// Signals the loop and waits for it to exit.
    pub async fn stop(mut self) {
        let _ = self.cancel.send(true);
        if let Some(join) = self.join.take() {
            if let Err(e) = join.await {
                if e.is_panic() {
                    tracing::error!(task = self.name, "Background task panicked");
                }
            }
        }
        tracing::debug!(task = self.name, "Background task stopped");
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        let _ = self.cancel.send(true);
        if let Some(join) = self.join.take() {
            join.abort();
        }
    }
}

/// Resolves once the signal is set or its sender is gone.
pub(crate) async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    while !*cancel.borrow_and_update() {
        if cancel.changed().await.is_err() {
            return;
        }
    }
}
