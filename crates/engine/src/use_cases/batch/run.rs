//! Background batch execution.
//!
//! Items run sequentially. Before each item the job record is re-read and
//! the run stops if the job was cancelled; a progress update refused because
//! the job was cancelled meanwhile counts the same. Item failures are
//! recorded in the result and never fail the job.

use std::sync::Arc;
use std::time::Duration;

use levelforge_domain::{
    BatchItem, BatchItemResult, BatchRequest, BatchResult, JobId, JobResult, JobStatus,
};

use super::BatchError;
use crate::generation::GenerationPipeline;
use crate::use_cases::jobs::{JobError, JobManager};

/// How a batch run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed { succeeded: usize, failed: usize },
    Cancelled { completed: usize },
    Failed { error: String },
}

/// Runs the items of a submitted batch and keeps its job record current.
pub struct RunBatch {
    pipeline: Arc<GenerationPipeline>,
    jobs: Arc<JobManager>,
    item_timeout: Duration,
    progress_floor: u8,
    progress_ceiling: u8,
}

/// What the record said when checked between items.
enum Checkpoint {
    Continue,
    Cancelled,
    Finished(JobStatus),
}

impl RunBatch {
    pub fn new(
        pipeline: Arc<GenerationPipeline>,
        jobs: Arc<JobManager>,
        item_timeout: Duration,
        progress_floor: u8,
        progress_ceiling: u8,
    ) -> Self {
        Self {
            pipeline,
            jobs,
            item_timeout,
            progress_floor: progress_floor.min(progress_ceiling),
            progress_ceiling,
        }
    }

    /// Run the batch for an already created job.
    ///
    /// Returns `Err` only when the job record itself could not be
    /// maintained; in that case the job is failed with the partial result
    /// when the store still allows it.
    pub async fn execute(&self, job_id: JobId, request: BatchRequest) -> Result<RunOutcome, BatchError> {
        match self.jobs.start(job_id).await {
            Ok(_) => {}
            Err(e) => {
                return match e.terminal_status() {
                    Some(status) => {
                        let empty = BatchResult::new(request.total_items());
                        self.stopped(job_id, empty, status).await
                    }
                    None => Err(e.into()),
                }
            }
        }

        let items = match request.expand() {
            Ok(items) => items,
            Err(e) => {
                let error = format!("Batch expansion failed: {}", e);
                tracing::warn!(job_id = %job_id, error = %error, "Batch expansion failed");
                return match self.jobs.fail(job_id, error.clone(), None).await {
                    Ok(_) => Ok(RunOutcome::Failed { error }),
                    Err(e) => match e.terminal_status() {
                        Some(status) => {
                            let empty = BatchResult::new(request.total_items());
                            self.stopped(job_id, empty, status).await
                        }
                        None => Err(e.into()),
                    },
                };
            }
        };

        let total = items.len();
        let mut result = BatchResult::new(total);
        tracing::info!(job_id = %job_id, total, "Batch running");

        let setup = self
            .report_progress(job_id, 0, total, format!("Generating {} levels", total))
            .await;
        if let Some(outcome) = self.interrupted(job_id, setup, &mut result).await {
            return outcome;
        }

        for (index, item) in items.into_iter().enumerate() {
            let checkpoint = self.checkpoint(job_id).await;
            if let Some(outcome) = self.interrupted(job_id, checkpoint, &mut result).await {
                return outcome;
            }

            result.push(self.run_item(job_id, index, item).await);

            let done = result.completed_count;
            let progress = self
                .report_progress(job_id, done, total, format!("Generated {}/{} levels", done, total))
                .await;
            if let Some(outcome) = self.interrupted(job_id, progress, &mut result).await {
                return outcome;
            }
        }

        let (succeeded, failed) = (result.succeeded, result.failed);
        match self.jobs.complete(job_id, JobResult::Batch(result.clone())).await {
            Ok(_) => {
                tracing::info!(job_id = %job_id, succeeded, failed, "Batch completed");
                Ok(RunOutcome::Completed { succeeded, failed })
            }
            Err(e) => match e.terminal_status() {
                Some(status) => self.stopped(job_id, result, status).await,
                None => Err(self.abort(job_id, e, result).await),
            },
        }
    }

    async fn run_item(&self, job_id: JobId, index: usize, item: BatchItem) -> BatchItemResult {
        let BatchItem {
            config,
            variation_index,
            batch_index,
        } = item;
        let seed = config.seed;

        match self
            .pipeline
            .clone()
            .build_blocking(config, self.item_timeout)
            .await
        {
            Ok(level) => BatchItemResult::succeeded(variation_index, batch_index, level),
            Err(e) => {
                tracing::warn!(
                    job_id = %job_id,
                    item = index,
                    variation_index,
                    batch_index,
                    error = %e,
                    "Batch item failed"
                );
                BatchItemResult::failed(variation_index, batch_index, seed, e.to_string())
            }
        }
    }

    async fn checkpoint(&self, job_id: JobId) -> Result<Checkpoint, JobError> {
        let record = self
            .jobs
            .get(job_id)
            .await?
            .ok_or(JobError::NotFound(job_id))?;
        Ok(match record.status() {
            JobStatus::Cancelled => Checkpoint::Cancelled,
            status if status.is_terminal() => Checkpoint::Finished(status),
            _ => Checkpoint::Continue,
        })
    }

    async fn report_progress(
        &self,
        job_id: JobId,
        done: usize,
        total: usize,
        message: String,
    ) -> Result<Checkpoint, JobError> {
        let progress = self.progress_for(done, total);
        match self
            .jobs
            .record_batch_progress(job_id, done, progress, Some(message))
            .await
        {
            Ok(_) => Ok(Checkpoint::Continue),
            Err(e) => match e.terminal_status() {
                Some(JobStatus::Cancelled) => Ok(Checkpoint::Cancelled),
                Some(status) => Ok(Checkpoint::Finished(status)),
                None => Err(e),
            },
        }
    }

    /// Linear between the floor and the ceiling.
    fn progress_for(&self, done: usize, total: usize) -> u8 {
        if total == 0 {
            return self.progress_ceiling;
        }
        let span = usize::from(self.progress_ceiling - self.progress_floor);
        let step = span * done.min(total) / total;
        self.progress_floor + step as u8
    }

    /// `Some` when the run must stop here.
    async fn interrupted(
        &self,
        job_id: JobId,
        checkpoint: Result<Checkpoint, JobError>,
        result: &mut BatchResult,
    ) -> Option<Result<RunOutcome, BatchError>> {
        match checkpoint {
            Ok(Checkpoint::Continue) => None,
            Ok(Checkpoint::Cancelled) => Some(
                self.stopped(job_id, std::mem::take(result), JobStatus::Cancelled)
                    .await,
            ),
            Ok(Checkpoint::Finished(status)) => {
                Some(self.stopped(job_id, std::mem::take(result), status).await)
            }
            Err(e) => Some(Err(self.abort(job_id, e, std::mem::take(result)).await)),
        }
    }

    /// The job reached a terminal state outside this run.
    async fn stopped(
        &self,
        job_id: JobId,
        result: BatchResult,
        status: JobStatus,
    ) -> Result<RunOutcome, BatchError> {
        let completed = result.completed_count;

        if status != JobStatus::Cancelled {
            tracing::warn!(job_id = %job_id, status = %status, "Batch stopped by external transition");
            return Ok(RunOutcome::Failed {
                error: format!("job became {} while running", status),
            });
        }

        if let Err(e) = self
            .jobs
            .attach_partial_result(job_id, JobResult::Batch(result))
            .await
        {
            tracing::warn!(job_id = %job_id, error = %e, "Failed to attach partial batch result");
        }
        tracing::info!(job_id = %job_id, completed, "Batch cancelled");
        Ok(RunOutcome::Cancelled { completed })
    }

    /// Fail the job after the record could not be maintained.
    async fn abort(&self, job_id: JobId, error: JobError, result: BatchResult) -> BatchError {
        tracing::error!(job_id = %job_id, error = %error, "Batch run lost its job record");
        if let Err(e) = self
            .jobs
            .fail(job_id, error.to_string(), Some(JobResult::Batch(result)))
            .await
        {
            tracing::warn!(job_id = %job_id, error = %e, "Failed to record batch failure");
        }
        BatchError::Job(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::TestHarness;

    #[test]
    fn progress_is_linear_between_floor_and_ceiling() {
        let harness = TestHarness::new();
        let run = &harness.batch.run;

        assert_eq!(run.progress_for(0, 4), 10);
        assert_eq!(run.progress_for(1, 4), 31);
        assert_eq!(run.progress_for(2, 4), 52);
        assert_eq!(run.progress_for(4, 4), 95);
        assert_eq!(run.progress_for(0, 0), 95);
    }
}
