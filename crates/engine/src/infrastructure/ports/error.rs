//! Error types for port operations.

use levelforge_domain::{DomainError, JobId};

/// Job store operation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum JobStoreError {
    /// No live record under this id (never created, or expired).
    #[error("Job not found: {0}")]
    NotFound(JobId),

    /// The mutation refused to apply; the stored record is unchanged.
    #[error("Update rejected: {0}")]
    Rejected(#[from] DomainError),

    /// The backing store could not be reached.
    #[error("Job store unavailable: {0}")]
    Unavailable(String),
}

impl JobStoreError {
    /// Create an Unavailable error with backend context.
    pub fn unavailable(message: impl ToString) -> Self {
        Self::Unavailable(message.to_string())
    }

    /// Check if this is a NotFound error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
