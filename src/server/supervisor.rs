use std::future::Future;

use tokio::task::{AbortHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

/// Owns every background task the core spawns (populator batches and
/// session drivers) so shutdown can cancel and await them in order.
pub struct TaskSupervisor {
    tasks: parking_lot::Mutex<JoinSet<()>>,
    cancel_token: CancellationToken,
}

impl Default for TaskSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskSupervisor {
    pub fn new() -> Self {
        Self {
            tasks: parking_lot::Mutex::new(JoinSet::new()),
            cancel_token: CancellationToken::new(),
        }
    }

    /// Spawn `task` on the current runtime. It is dropped at its next
    /// suspension point once [`cancel_all`](Self::cancel_all) runs.
    /// Tasks spawned after that are cancelled immediately.
    pub fn spawn<F>(&self, task: F) -> AbortHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = self.cancel_token.child_token();
        let mut tasks = self.tasks.lock();
        Self::reap(&mut tasks);
        tasks.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = task => {}
            }
        })
    }

    /// Tasks still running.
    pub fn in_flight(&self) -> usize {
        let mut tasks = self.tasks.lock();
        Self::reap(&mut tasks);
        tasks.len()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    pub fn cancel_all(&self) {
        debug!("Cancelling all supervised tasks");
        self.cancel_token.cancel();
        self.tasks.lock().abort_all();
    }

    /// Wait for every task spawned so far to end.
    pub async fn await_all(&self) {
        let mut tasks = std::mem::take(&mut *self.tasks.lock());
        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                if e.is_panic() {
                    error!("Supervised task panicked: {}", e);
                }
            }
        }
    }

    fn reap(tasks: &mut JoinSet<()>) {
        while let Some(result) = tasks.try_join_next() {
            if let Err(e) = result {
                if e.is_panic() {
                    error!("Supervised task panicked: {}", e);
                }
            }
        }
    }
}
