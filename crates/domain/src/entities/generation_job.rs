//! GenerationJob entity - Tracks a single-level or batch generation job
//!
//! ## State machine
//!
//! ```text
//! Pending ──start──▶ Running ──complete──▶ Completed
//!    │                  │ ───fail──────▶ Failed
//!    └──cancel──────────┴───cancel────▶ Cancelled
//! ```
//!
//! Terminal states accept no further transitions. Rejected transitions leave
//! the record untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::types::{JobKind, JobStatus};
use crate::{JobId, Level};

/// Caller-visible facts about a job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub total_items: usize,
    pub completed_items: usize,
}

impl JobMetadata {
    pub fn new(session_id: Option<String>, total_items: usize) -> Self {
        Self {
            session_id,
            total_items,
            completed_items: 0,
        }
    }
}

/// Outcome of one item of a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemResult {
    pub variation_index: u32,
    pub batch_index: u32,
    pub seed: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchItemResult {
    pub fn succeeded(variation_index: u32, batch_index: u32, level: Level) -> Self {
        Self {
            variation_index,
            batch_index,
            seed: level.metadata.seed,
            level: Some(level),
            error: None,
        }
    }

    pub fn failed(variation_index: u32, batch_index: u32, seed: i64, error: impl Into<String>) -> Self {
        Self {
            variation_index,
            batch_index,
            seed,
            level: None,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.level.is_some()
    }
}

/// Accumulated results of a batch, complete or partial
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub items: Vec<BatchItemResult>,
    pub total_items: usize,
    /// Items processed so far, successful or not
    pub completed_count: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchResult {
    pub fn new(total_items: usize) -> Self {
        Self {
            items: Vec::new(),
            total_items,
            ..Self::default()
        }
    }

    pub fn push(&mut self, item: BatchItemResult) {
        if item.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.completed_count += 1;
        self.items.push(item);
    }
}

/// Result payload stored on a job record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum JobResult {
    Level(Box<Level>),
    Batch(BatchResult),
}

impl JobResult {
    pub fn as_batch(&self) -> Option<&BatchResult> {
        match self {
            Self::Batch(batch) => Some(batch),
            Self::Level(_) => None,
        }
    }

    pub fn as_level(&self) -> Option<&Level> {
        match self {
            Self::Level(level) => Some(level),
            Self::Batch(_) => None,
        }
    }
}

/// A generation job and its progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    id: JobId,
    kind: JobKind,
    status: JobStatus,
    /// Percentage in `[0, 100]`
    progress: u8,
    message: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    result: Option<JobResult>,
    error: Option<String>,
    metadata: JobMetadata,
}

impl JobRecord {
    /// Create a new pending job
    pub fn new(id: JobId, kind: JobKind, metadata: JobMetadata, now: DateTime<Utc>) -> Self {
        Self {
            id,
            kind,
            status: JobStatus::Pending,
            progress: 0,
            message: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
            result: None,
            error: None,
            metadata,
        }
    }

    // Read-only accessors

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn result(&self) -> Option<&JobResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn metadata(&self) -> &JobMetadata {
        &self.metadata
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == JobStatus::Cancelled
    }

    // Transitions

    /// Pending → Running
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.ensure_not_terminal()?;
        if self.status != JobStatus::Pending {
            return Err(DomainError::invalid_state_transition(format!(
                "cannot start a job that is {}",
                self.status
            )));
        }
        self.status = JobStatus::Running;
        self.updated_at = now;
        Ok(())
    }

    /// Report progress while running; values above 100 are rejected.
    pub fn update_progress(
        &mut self,
        progress: u8,
        message: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.ensure_not_terminal()?;
        if self.status != JobStatus::Running {
            return Err(DomainError::invalid_state_transition(format!(
                "progress can only be reported while running, job is {}",
                self.status
            )));
        }
        if progress > 100 {
            return Err(DomainError::validation(format!(
                "progress must be between 0 and 100, got {}",
                progress
            )));
        }
        self.progress = progress;
        if message.is_some() {
            self.message = message;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Report progress of a batch, including how many items are done.
    pub fn record_batch_progress(
        &mut self,
        completed_items: usize,
        progress: u8,
        message: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.update_progress(progress, message, now)?;
        self.metadata.completed_items = completed_items;
        Ok(())
    }

    /// Running → Completed; progress is forced to 100.
    pub fn complete(&mut self, result: JobResult, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.ensure_running("complete")?;
        if let JobResult::Batch(batch) = &result {
            self.metadata.completed_items = batch.completed_count;
        }
        self.status = JobStatus::Completed;
        self.progress = 100;
        self.result = Some(result);
        self.completed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Running → Failed, keeping whatever was produced so far.
    pub fn fail(
        &mut self,
        error: impl Into<String>,
        partial_result: Option<JobResult>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.ensure_running("fail")?;
        self.status = JobStatus::Failed;
        self.error = Some(error.into());
        if partial_result.is_some() {
            self.result = partial_result;
        }
        self.completed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Pending or Running → Cancelled; terminal jobs report `AlreadyTerminal`.
    pub fn cancel(&mut self, reason: impl Into<String>, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.ensure_not_terminal()?;
        self.status = JobStatus::Cancelled;
        self.message = Some(reason.into());
        self.completed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Store results produced before a cancellation or failure.
    ///
    /// Does not change the status.
    pub fn attach_partial_result(
        &mut self,
        result: JobResult,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if !matches!(self.status, JobStatus::Cancelled | JobStatus::Failed) {
            return Err(DomainError::invalid_state_transition(format!(
                "partial results only attach to cancelled or failed jobs, job is {}",
                self.status
            )));
        }
        if let JobResult::Batch(batch) = &result {
            self.metadata.completed_items = batch.completed_count;
        }
        self.result = Some(result);
        self.updated_at = now;
        Ok(())
    }

    /// Terminal records report `AlreadyTerminal`; Pending ones an invalid
    /// transition.
    fn ensure_running(&self, action: &str) -> Result<(), DomainError> {
        self.ensure_not_terminal()?;
        if self.status != JobStatus::Running {
            return Err(DomainError::invalid_state_transition(format!(
                "cannot {} a job that is {}",
                action, self.status
            )));
        }
        Ok(())
    }

    fn ensure_not_terminal(&self) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::AlreadyTerminal {
                status: self.status,
            });
        }
        Ok(())
    }
}
