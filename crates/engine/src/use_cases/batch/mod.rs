//! Batch generation use cases.
//!
//! A batch is submitted synchronously (validation, job creation) and then run
//! in the background by `RunBatch`, one item at a time.

mod run;
mod submit;

use std::sync::Arc;

use levelforge_domain::DomainError;

pub use run::{RunBatch, RunOutcome};
pub use submit::SubmitBatch;

use crate::use_cases::jobs::JobError;

/// Container for batch use cases.
pub struct BatchUseCases {
    pub submit: Arc<SubmitBatch>,
    pub run: Arc<RunBatch>,
}

impl BatchUseCases {
    pub fn new(submit: Arc<SubmitBatch>, run: Arc<RunBatch>) -> Self {
        Self { submit, run }
    }
}

/// Errors from submitting or running a batch.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Invalid batch request: {0}")]
    InvalidRequest(#[from] DomainError),

    #[error("Unknown terrain algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Batch expands to {requested} items, at most {max} are allowed")]
    TooManyItems { requested: usize, max: usize },

    #[error(transparent)]
    Job(#[from] JobError),
}
