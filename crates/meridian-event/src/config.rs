/// Configuration for an [`EventLoop`](crate::EventLoop).
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Maximum number of dispatched events kept in the log. 0 = unlimited.
    pub max_log: usize,
    /// Maximum events a single `reach` may dispatch. 0 = unlimited.
    pub max_dispatch: usize,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_log: 1000,
            max_dispatch: 100_000,
        }
    }
}

impl LoopConfig {
    /// Set the maximum event log size (0 = unlimited).
    pub fn with_max_log(mut self, max: usize) -> Self {
        self.max_log = max;
        self
    }

    /// Set the per-`reach` dispatch limit (0 = unlimited).
    pub fn with_max_dispatch(mut self, max: usize) -> Self {
        self.max_dispatch = max;
        self
    }
}
