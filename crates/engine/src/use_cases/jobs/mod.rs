//! Job lifecycle use cases.
//!
//! `JobManager` drives `JobRecord` transitions through the job store. Every
//! transition is a single atomic read-modify-write on the stored record, so
//! a cancel racing a progress update is resolved by whichever lands first.

use std::sync::Arc;

use levelforge_domain::{
    DomainError, JobId, JobKind, JobMetadata, JobRecord, JobResult, JobStatus,
};

use crate::infrastructure::config::EngineConfig;
use crate::infrastructure::ports::{ClockPort, JobStore, JobStoreError};

/// Creates, transitions and reads job records.
pub struct JobManager {
    store: Arc<dyn JobStore>,
    clock: Arc<dyn ClockPort>,
    config: EngineConfig,
}

impl JobManager {
    pub fn new(store: Arc<dyn JobStore>, clock: Arc<dyn ClockPort>, config: EngineConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Create a pending job; fails if a live job already uses `job_id`.
    pub async fn create(
        &self,
        job_id: JobId,
        kind: JobKind,
        metadata: JobMetadata,
    ) -> Result<JobRecord, JobError> {
        let record = JobRecord::new(job_id, kind, metadata, self.clock.now());
        let inserted = self
            .store
            .insert_if_absent(record.clone(), self.config.job_ttl(kind))
            .await?;
        if !inserted {
            return Err(JobError::AlreadyExists(job_id));
        }

        tracing::debug!(job_id = %job_id, kind = %kind, "Job created");
        Ok(record)
    }

    pub async fn start(&self, job_id: JobId) -> Result<JobRecord, JobError> {
        let now = self.clock.now();
        let record = self
            .store
            .update(job_id, Box::new(move |job| job.start(now)))
            .await?;
        tracing::info!(job_id = %job_id, "Job started");
        Ok(record)
    }

    pub async fn update_progress(
        &self,
        job_id: JobId,
        progress: u8,
        message: Option<String>,
    ) -> Result<JobRecord, JobError> {
        let now = self.clock.now();
        let record = self
            .store
            .update(
                job_id,
                Box::new(move |job| job.update_progress(progress, message, now)),
            )
            .await?;
        tracing::debug!(job_id = %job_id, progress, "Job progress");
        Ok(record)
    }

    /// Progress update that also records how many batch items are done.
    pub async fn record_batch_progress(
        &self,
        job_id: JobId,
        completed_items: usize,
        progress: u8,
        message: Option<String>,
    ) -> Result<JobRecord, JobError> {
        let now = self.clock.now();
        let record = self
            .store
            .update(
                job_id,
                Box::new(move |job| {
                    job.record_batch_progress(completed_items, progress, message, now)
                }),
            )
            .await?;
        tracing::debug!(job_id = %job_id, completed_items, progress, "Batch progress");
        Ok(record)
    }

    pub async fn complete(&self, job_id: JobId, result: JobResult) -> Result<JobRecord, JobError> {
        let now = self.clock.now();
        let record = self
            .store
            .update(job_id, Box::new(move |job| job.complete(result, now)))
            .await?;
        tracing::info!(job_id = %job_id, "Job completed");
        Ok(record)
    }

    pub async fn fail(
        &self,
        job_id: JobId,
        error: String,
        partial_result: Option<JobResult>,
    ) -> Result<JobRecord, JobError> {
        let now = self.clock.now();
        let message = error.clone();
        let record = self
            .store
            .update(
                job_id,
                Box::new(move |job| job.fail(message, partial_result, now)),
            )
            .await?;
        tracing::info!(job_id = %job_id, error = %error, "Job failed");
        Ok(record)
    }

    /// Cancel a pending or running job.
    ///
    /// Terminal jobs are left as they are and report
    /// `DomainError::AlreadyTerminal`.
    pub async fn cancel(&self, job_id: JobId, reason: &str) -> Result<JobRecord, JobError> {
        let now = self.clock.now();
        let reason = reason.to_string();
        let record = self
            .store
            .update(job_id, Box::new(move |job| job.cancel(reason, now)))
            .await?;
        tracing::info!(job_id = %job_id, "Job cancelled");
        Ok(record)
    }

    /// Store results produced before the job was cancelled or failed.
    pub async fn attach_partial_result(
        &self,
        job_id: JobId,
        result: JobResult,
    ) -> Result<JobRecord, JobError> {
        let now = self.clock.now();
        let record = self
            .store
            .update(
                job_id,
                Box::new(move |job| job.attach_partial_result(result, now)),
            )
            .await?;
        Ok(record)
    }

    pub async fn get(&self, job_id: JobId) -> Result<Option<JobRecord>, JobError> {
        Ok(self.store.get(job_id).await?)
    }

    /// Live jobs of one session, newest first.
    pub async fn list_for_session(&self, session_id: &str) -> Result<Vec<JobRecord>, JobError> {
        let jobs = self.store.list().await?;
        Ok(jobs
            .into_iter()
            .filter(|job| job.metadata().session_id.as_deref() == Some(session_id))
            .collect())
    }

    /// Drop expired job records.
    pub async fn purge_expired(&self) -> Result<usize, JobError> {
        Ok(self.store.purge_expired().await?)
    }
}

/// Errors from job lifecycle operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum JobError {
    #[error("Job not found: {0}")]
    NotFound(JobId),

    #[error("Job already exists: {0}")]
    AlreadyExists(JobId),

    #[error("Invalid job transition: {0}")]
    InvalidTransition(DomainError),

    #[error("Job store error: {0}")]
    Store(JobStoreError),
}

impl JobError {
    /// Status of the job when a transition was refused because it had
    /// already finished.
    pub fn terminal_status(&self) -> Option<JobStatus> {
        match self {
            Self::InvalidTransition(DomainError::AlreadyTerminal { status }) => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<JobStoreError> for JobError {
    fn from(error: JobStoreError) -> Self {
        match error {
            JobStoreError::NotFound(id) => Self::NotFound(id),
            JobStoreError::Rejected(domain) => Self::InvalidTransition(domain),
            other => Self::Store(other),
        }
    }
}
