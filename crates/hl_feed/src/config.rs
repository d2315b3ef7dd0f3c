use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    /// Articles shown right after a load or refresh
    pub initial_window: usize,
    /// Articles revealed per tick
    pub reveal_batch: usize,
    pub reveal_interval: Duration,
    /// Drop redacted or untitled articles when refreshing
    pub hide_removed: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            initial_window: 10,
            reveal_batch: 5,
            reveal_interval: Duration::from_secs(10),
            hide_removed: true,
        }
    }
}

impl FeedConfig {
    pub fn with_initial_window(mut self, initial_window: usize) -> Self {
        self.initial_window = initial_window;
        self
    }

    pub fn with_reveal_batch(mut self, reveal_batch: usize) -> Self {
        self.reveal_batch = reveal_batch;
        self
    }

    pub fn with_reveal_interval(mut self, reveal_interval: Duration) -> Self {
        self.reveal_interval = reveal_interval;
        self
    }

    pub fn with_hide_removed(mut self, hide_removed: bool) -> Self {
        self.hide_removed = hide_removed;
        self
    }
}
