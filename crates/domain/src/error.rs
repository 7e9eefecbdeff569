//! Unified error types for the domain layer
//!
//! Provides a common error type that can be used across all domain operations,
//! enabling consistent error handling without forcing adapters to use String or anyhow.

use thiserror::Error;

use crate::types::JobStatus;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Validation failed (e.g., width out of range, empty variation)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A variation names a configuration parameter that has no setter
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    /// State transition not allowed
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    /// The job already reached a terminal state
    #[error("Job is already terminal ({status})")]
    AlreadyTerminal { status: JobStatus },
}

impl DomainError {
    /// Creates a validation error for configuration rule violations.
    ///
    /// Use this when a configuration cannot be generated as given:
    /// - Dimensions are outside the allowed range
    /// - Entity counts or distances are out of bounds
    /// - A variation value has the wrong type for its parameter
    ///
    /// # Example
    /// ```ignore
    /// if config.algorithm.is_empty() {
    ///     return Err(DomainError::validation("algorithm cannot be empty"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an unknown parameter error
    pub fn unknown_parameter(path: impl Into<String>) -> Self {
        Self::UnknownParameter(path.into())
    }

    /// Create an invalid state transition error
    pub fn invalid_state_transition(msg: impl Into<String>) -> Self {
        Self::InvalidStateTransition(msg.into())
    }

    /// Check if this error rejects a transition (including terminal jobs)
    pub fn is_transition_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidStateTransition(_) | Self::AlreadyTerminal { .. }
        )
    }
}
