//! Cancellation of a running poll for a mint quote.
use std::sync::Arc;

use tokio::sync::watch;

/// Cancels a poll from another task, e.g. a Ctrl-C handler. Clones share the same state.
#[derive(Debug, Clone)]
pub struct PollHandle {
    cancelled: Arc<watch::Sender<bool>>,
}

impl Default for PollHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl PollHandle {
    pub fn new() -> Self {
        let (cancelled, _) = watch::channel(false);
        Self {
            cancelled: Arc::new(cancelled),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    /// Completes once `cancel` has been called on this handle or one of its clones.
    pub async fn cancelled(&self) {
        let mut receiver = self.cancelled.subscribe();
        receiver.wait_for(|cancelled| *cancelled).await.ok();
    }
}
