//! Tokio-backed background execution.

use futures_util::future::BoxFuture;

use crate::infrastructure::ports::TaskSpawner;

/// Spawns every task onto the ambient tokio runtime.
///
/// Must be used from within a runtime context.
pub struct TokioSpawner;

impl TokioSpawner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TokioSpawner {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskSpawner for TokioSpawner {
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        tokio::spawn(task);
    }
}
