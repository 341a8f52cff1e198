//! ChannelScheduler - bounded tokio channel を Scheduler として使う
//!
//! 受信側は worker がそれぞれ取り出して実行します。並行度の上限は
//! worker 数とチャネル容量で決まります。

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::executable::Executable;
use crate::ports::Scheduler;

#[derive(Debug, Clone)]
pub struct ChannelScheduler {
    sender: mpsc::Sender<Arc<Executable>>,
}

impl ChannelScheduler {
    /// Create a scheduler and the receiving end workers pull from.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Arc<Executable>>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Free slots right now.
    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }
}

impl Scheduler for ChannelScheduler {
    /// False when the channel is full or every receiver is gone.
    fn try_submit(&self, executable: Arc<Executable>) -> bool {
        self.sender.try_send(executable).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;

    #[tokio::test]
    async fn declines_when_full_or_closed() {
        let h = Harness::new();
        let (scheduler, mut receiver) = ChannelScheduler::new(1);
        let first = h.new_executable();
        let second = h.new_executable();

        assert!(scheduler.try_submit(Arc::clone(&first)));
        assert_eq!(scheduler.capacity(), 0);
        assert!(!scheduler.try_submit(Arc::clone(&second)));

        let received = receiver.recv().await.unwrap();
        assert_eq!(received.task().task_id(), first.task().task_id());
        assert!(scheduler.try_submit(Arc::clone(&second)));

        drop(receiver);
        assert!(!scheduler.try_submit(first));
    }
}
