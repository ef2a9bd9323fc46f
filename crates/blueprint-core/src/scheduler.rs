//! Debounced background saving.
//!
//! Mutations hand their new snapshot to [`SaveScheduler::schedule`], which
//! returns immediately. A background task holds only the newest snapshot and
//! writes it once no newer one has arrived for the debounce window, so a
//! burst of edits costs a single write.

use crate::persist::PersistenceGateway;
use crate::plan::Plan;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

enum Message {
    Snapshot(Arc<Plan>),
    Flush(oneshot::Sender<()>),
}

pub struct SaveScheduler {
    tx: mpsc::UnboundedSender<Message>,
    task: JoinHandle<()>,
}

impl SaveScheduler {
    /// Start the writer task. Must be called from within a Tokio runtime.
    pub fn spawn(gateway: PersistenceGateway, window: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(gateway, window, rx));
        Self { tx, task }
    }

    /// Queue `plan` for saving, replacing any snapshot still waiting.
    pub fn schedule(&self, plan: Arc<Plan>) {
        if self.tx.send(Message::Snapshot(plan)).is_err() {
            tracing::warn!("save scheduler has stopped; snapshot dropped");
        }
    }

    /// Write the pending snapshot now, if there is one, and wait for it.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(Message::Flush(ack_tx)).is_err() {
            return;
        }
        let _ = ack_rx.await;
    }

    /// Drain the pending snapshot and stop the writer task.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "save scheduler task failed");
        }
    }
}

async fn run(
    gateway: PersistenceGateway,
    window: Duration,
    mut rx: mpsc::UnboundedReceiver<Message>,
) {
    let mut pending: Option<Arc<Plan>> = None;
    loop {
        let message = if pending.is_some() {
            match tokio::time::timeout(window, rx.recv()).await {
                Ok(message) => message,
                Err(_) => {
                    if let Some(plan) = pending.take() {
                        write(&gateway, plan).await;
                    }
                    continue;
                }
            }
        } else {
            rx.recv().await
        };

        match message {
            Some(Message::Snapshot(plan)) => {
                if pending.replace(plan).is_some() {
                    tracing::debug!("coalesced pending save");
                }
            }
            Some(Message::Flush(ack)) => {
                if let Some(plan) = pending.take() {
                    write(&gateway, plan).await;
                }
                let _ = ack.send(());
            }
            None => {
                if let Some(plan) = pending.take() {
                    write(&gateway, plan).await;
                }
                break;
            }
        }
    }
}

/// Failures are logged and dropped; the next mutation schedules a fresh attempt.
async fn write(gateway: &PersistenceGateway, plan: Arc<Plan>) {
    let gateway = gateway.clone();
    match tokio::task::spawn_blocking(move || gateway.save(&plan)).await {
        Ok(Ok(())) => tracing::debug!("plan saved"),
        Ok(Err(e)) => tracing::error!(error = %e, "failed to save plan"),
        Err(e) => tracing::error!(error = %e, "save task panicked"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::{import_document, MemoryStorage};
    use crate::seed;

    const WINDOW: Duration = Duration::from_millis(300);

    fn setup() -> (Arc<MemoryStorage>, SaveScheduler) {
        let storage = Arc::new(MemoryStorage::new());
        let scheduler = SaveScheduler::spawn(PersistenceGateway::new(storage.clone()), WINDOW);
        (storage, scheduler)
    }

    fn plan_with_goal(goal: &str) -> Arc<Plan> {
        let mut plan = seed::plan();
        plan.meta.goal = Some(goal.to_string());
        Arc::new(plan)
    }

    fn stored_goal(storage: &MemoryStorage) -> Option<String> {
        let raw = storage.contents()?;
        import_document(&raw).ok()?.meta.goal
    }

    #[tokio::test(start_paused = true)]
    async fn burst_coalesces_into_one_write() {
        let (storage, scheduler) = setup();
        scheduler.schedule(plan_with_goal("a"));
        scheduler.schedule(plan_with_goal("b"));
        scheduler.schedule(plan_with_goal("c"));

        tokio::time::sleep(Duration::from_millis(350)).await;
        scheduler.flush().await;

        assert_eq!(storage.writes(), 1);
        assert_eq!(stored_goal(&storage).as_deref(), Some("c"));
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_written_inside_window() {
        let (storage, scheduler) = setup();
        scheduler.schedule(plan_with_goal("a"));
        tokio::time::sleep(Duration::from_millis(100)).await;
        scheduler.schedule(plan_with_goal("b"));
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(storage.writes(), 0);

        scheduler.flush().await;
        assert_eq!(storage.writes(), 1);
        assert_eq!(stored_goal(&storage).as_deref(), Some("b"));
    }

    #[tokio::test(start_paused = true)]
    async fn separate_bursts_write_separately() {
        let (storage, scheduler) = setup();
        scheduler.schedule(plan_with_goal("a"));
        tokio::time::sleep(Duration::from_millis(400)).await;
        scheduler.schedule(plan_with_goal("b"));
        tokio::time::sleep(Duration::from_millis(400)).await;
        scheduler.flush().await;
        assert_eq!(storage.writes(), 2);
    }

    #[tokio::test]
    async fn flush_without_pending_is_noop() {
        let (storage, scheduler) = setup();
        scheduler.flush().await;
        assert_eq!(storage.writes(), 0);
    }

    #[tokio::test]
    async fn shutdown_drains_pending() {
        let (storage, scheduler) = setup();
        scheduler.schedule(plan_with_goal("last"));
        scheduler.shutdown().await;
        assert_eq!(storage.writes(), 1);
        assert_eq!(stored_goal(&storage).as_deref(), Some("last"));
    }

    #[tokio::test]
    async fn write_failure_is_swallowed() {
        let (storage, scheduler) = setup();
        storage.fail_writes(true);
        scheduler.schedule(plan_with_goal("x"));
        scheduler.flush().await;
        assert_eq!(storage.writes(), 0);

        storage.fail_writes(false);
        scheduler.schedule(plan_with_goal("y"));
        scheduler.flush().await;
        assert_eq!(stored_goal(&storage).as_deref(), Some("y"));
    }
}
