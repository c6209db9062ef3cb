use std::sync::Arc;
use std::time::Duration;

/// Emitted by the orchestrator each time a worker hands back its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub completed: usize,
    pub total: usize,
    /// Time since the start barrier released.
    pub elapsed: Duration,
    pub requests_total: u64,
    pub error_kinds: usize,
}

pub type ProgressFn = Arc<dyn Fn(ProgressUpdate) + Send + Sync + 'static>;
