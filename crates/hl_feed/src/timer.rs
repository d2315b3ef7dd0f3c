use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::manager::FeedManager;

/// Periodically reveals more articles on a feed. The task is aborted on
/// [`RevealTimer::cancel`] or when the timer is dropped.
#[derive(Debug)]
pub struct RevealTimer {
    handle: Option<JoinHandle<()>>,
}

impl RevealTimer {
    pub fn spawn(manager: FeedManager, period: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let revealed = manager.reveal_more().await;
                if revealed > 0 {
                    tracing::debug!("Revealed {} more articles on {}", revealed, manager.key());
                }
            }
        });
        Self { handle: Some(handle) }
    }

    /// Spawn with the feed's configured reveal interval.
    pub fn for_feed(manager: FeedManager) -> Self {
        let period = manager.config().reveal_interval;
        Self::spawn(manager, period)
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for RevealTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
