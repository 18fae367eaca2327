//! Application foreground/background signal.
//!
//! The host (a mobile shell, a desktop window, the CLI) reports lifecycle
//! transitions through a [`LifecycleNotifier`]. Timers hold a
//! [`LifecycleSubscription`] for as long as they live; dropping it is the
//! unsubscribe.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppLifecycle {
    #[default]
    Active,
    Background,
    Inactive,
}

impl AppLifecycle {
    pub fn is_backgrounded(self) -> bool {
        matches!(self, AppLifecycle::Background | AppLifecycle::Inactive)
    }
}

/// True only for the edge that counts as a distraction.
pub fn is_distraction_edge(previous: AppLifecycle, next: AppLifecycle) -> bool {
    previous == AppLifecycle::Active && next.is_backgrounded()
}

/// Publishes lifecycle transitions to every live subscription.
#[derive(Debug, Clone)]
pub struct LifecycleNotifier {
    tx: broadcast::Sender<AppLifecycle>,
}

impl LifecycleNotifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Report a transition. Returns how many subscribers will see it.
    pub fn notify(&self, state: AppLifecycle) -> usize {
        self.tx.send(state).unwrap_or(0)
    }

    pub fn subscribe(&self) -> LifecycleSubscription {
        LifecycleSubscription {
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for LifecycleNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving half of a lifecycle subscription.
#[derive(Debug)]
pub struct LifecycleSubscription {
    rx: broadcast::Receiver<AppLifecycle>,
}

impl LifecycleSubscription {
    /// Wait for the next transition. `None` once every notifier is gone.
    pub async fn recv(&mut self) -> Option<AppLifecycle> {
        loop {
            match self.rx.recv().await {
                Ok(state) => return Some(state),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "lifecycle subscriber lagged; dropping stale transitions");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
