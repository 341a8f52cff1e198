use std::sync::Arc;

use bobbin_core::Executable;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

type SharedReceiver = Arc<Mutex<mpsc::Receiver<Arc<Executable>>>>;

/// Worker group handle.
/// - `request_shutdown()` で新しい Executable を取らなくなる
/// - `shutdown_and_join()` で全ワーカーの終了を待てる
pub struct WorkerGroup {
    shutdown_tx: watch::Sender<bool>,
    joins: Vec<JoinHandle<()>>,
}

impl WorkerGroup {
    /// Spawn `n` workers pulling from one scheduler channel.
    ///
    /// Executables that reach a terminal state are sent to `done`.
    pub fn spawn(
        n: usize,
        receiver: mpsc::Receiver<Arc<Executable>>,
        done: mpsc::UnboundedSender<Arc<Executable>>,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let receiver: SharedReceiver = Arc::new(Mutex::new(receiver));

        let mut joins = Vec::with_capacity(n);
        for worker_id in 0..n {
            let rx = Arc::clone(&receiver);
            let done = done.clone();
            let mut shutdown = shutdown_rx.clone();

            joins.push(tokio::spawn(async move {
                worker_loop(worker_id, rx, done, &mut shutdown).await;
            }));
        }

        Self { shutdown_tx, joins }
    }

    /// In-flight attempts run to completion; no new executables are taken.
    pub fn request_shutdown(&self) {
        // receivers may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        for join in self.joins {
            let _ = join.await;
        }
    }
}

async fn worker_loop(
    worker_id: usize,
    receiver: SharedReceiver,
    done: mpsc::UnboundedSender<Arc<Executable>>,
    shutdown: &mut watch::Receiver<bool>,
) {
    loop {
        if *shutdown.borrow() {
            break;
        }

        let next = tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
                continue;
            }
            next = async { receiver.lock().await.recv().await } => next,
        };

        // every scheduler handle is gone
        let Some(executable) = next else {
            break;
        };

        process(worker_id, &executable).await;
        if executable.state().is_terminal() {
            let _ = done.send(executable);
        }
    }
    debug!(worker_id, "worker stopped");
}

/// One attempt: execute -> handle_err -> ack / nack.
async fn process(worker_id: usize, executable: &Arc<Executable>) {
    let result = executable
        .execute()
        .await
        .or_else(|err| executable.handle_err(err));

    match result {
        Ok(()) => executable.ack(),
        Err(err) if !executable.is_retryable_error(&err) => {
            warn!(
                worker_id,
                task_id = %executable.task().task_id(),
                error = %err,
                "non-retryable error, giving up"
            );
            executable.abort();
        }
        Err(err) => executable.nack(&err),
    }
}
