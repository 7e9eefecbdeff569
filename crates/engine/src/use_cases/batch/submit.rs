//! Batch submission.

use std::sync::Arc;

use futures_util::FutureExt;
use levelforge_domain::{BatchRequest, JobId, JobKind, JobMetadata};

use super::{BatchError, RunBatch};
use crate::generation::TerrainRegistry;
use crate::infrastructure::ports::TaskSpawner;
use crate::use_cases::jobs::JobManager;

const ALGORITHM_PARAMETER: &str = "generationAlgorithm";

/// Validate a batch request, create its job and start the run.
pub struct SubmitBatch {
    runner: Arc<RunBatch>,
    jobs: Arc<JobManager>,
    terrain: Arc<TerrainRegistry>,
    spawner: Arc<dyn TaskSpawner>,
    max_items: usize,
}

impl SubmitBatch {
    pub fn new(
        runner: Arc<RunBatch>,
        jobs: Arc<JobManager>,
        terrain: Arc<TerrainRegistry>,
        spawner: Arc<dyn TaskSpawner>,
        max_items: usize,
    ) -> Self {
        Self {
            runner,
            jobs,
            terrain,
            spawner,
            max_items,
        }
    }

    /// Returns the new job's id as soon as the job exists; generation
    /// continues in the background.
    pub async fn execute(&self, request: BatchRequest) -> Result<JobId, BatchError> {
        request.validate()?;
        self.check_algorithms(&request)?;

        let total_items = request.total_items();
        if total_items > self.max_items {
            return Err(BatchError::TooManyItems {
                requested: total_items,
                max: self.max_items,
            });
        }

        let job_id = JobId::new();
        self.jobs
            .create(
                job_id,
                JobKind::Batch,
                JobMetadata::new(request.session_id.clone(), total_items),
            )
            .await?;

        let runner = self.runner.clone();
        self.spawner.spawn(
            async move {
                match runner.execute(job_id, request).await {
                    Ok(outcome) => {
                        tracing::debug!(job_id = %job_id, outcome = ?outcome, "Batch run finished")
                    }
                    Err(e) => tracing::error!(job_id = %job_id, error = %e, "Batch run aborted"),
                }
            }
            .boxed(),
        );

        tracing::info!(job_id = %job_id, total_items, "Batch submitted");
        Ok(job_id)
    }

    fn check_algorithms(&self, request: &BatchRequest) -> Result<(), BatchError> {
        let base = std::iter::once(request.base_config.algorithm.as_str());
        let varied = request
            .variations
            .iter()
            .filter(|variation| variation.parameter == ALGORITHM_PARAMETER)
            .flat_map(|variation| variation.values.iter().filter_map(|value| value.as_str()));

        match base.chain(varied).find(|name| !self.terrain.contains(name)) {
            Some(unknown) => Err(BatchError::UnknownAlgorithm(unknown.to_string())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use levelforge_domain::{ConfigVariation, DomainError, GenerationConfig, JobStatus};
    use serde_json::json;

    use super::*;
    use crate::infrastructure::config::EngineConfig;
    use crate::test_fixtures::TestHarness;

    fn request() -> BatchRequest {
        BatchRequest::new(GenerationConfig::new(20, 20, 1, "maze"), 2)
    }

    #[tokio::test]
    async fn submit_creates_batch_job_with_total_items() {
        let harness = TestHarness::new();
        let request = request()
            .with_session("s1")
            .with_variation(ConfigVariation::new(
                "gameplay.timeLimit",
                vec![json!(30), json!(60), json!(90)],
            ));

        let job_id = harness.batch.submit.execute(request).await.expect("submit");

        let job = harness.jobs.get(job_id).await.expect("get").expect("present");
        assert_eq!(job.kind(), JobKind::Batch);
        assert_eq!(job.metadata().total_items, 6);
        assert_eq!(job.metadata().session_id.as_deref(), Some("s1"));
        assert_ne!(job.status(), JobStatus::Failed);
    }

    #[tokio::test]
    async fn unknown_parameter_is_rejected_without_a_job() {
        let harness = TestHarness::new();
        let request =
            request().with_variation(ConfigVariation::new("gameplay.gravity", vec![json!(9.8)]));

        let err = harness.batch.submit.execute(request).await.expect_err("unknown");

        assert!(matches!(
            err,
            BatchError::InvalidRequest(DomainError::UnknownParameter(_))
        ));
        assert!(harness.store_is_empty().await);
    }

    #[tokio::test]
    async fn unknown_algorithms_are_rejected() {
        let harness = TestHarness::new();
        let request = request().with_variation(ConfigVariation::new(
            "generationAlgorithm",
            vec![json!("maze"), json!("Voronoi")],
        ));

        let err = harness.batch.submit.execute(request).await.expect_err("unknown");

        assert!(matches!(err, BatchError::UnknownAlgorithm(name) if name == "Voronoi"));
    }

    #[tokio::test]
    async fn oversized_batches_are_rejected() {
        let harness = TestHarness::with_config(EngineConfig {
            max_batch_items: 3,
            ..EngineConfig::default()
        });

        let err = harness
            .batch
            .submit
            .execute(request().with_variation(ConfigVariation::new(
                "seed",
                vec![json!(1), json!(2)],
            )))
            .await
            .expect_err("too many");

        assert!(matches!(
            err,
            BatchError::TooManyItems {
                requested: 4,
                max: 3
            }
        ));
    }

    #[tokio::test]
    async fn overflowing_variation_product_is_a_validation_error() {
        let harness = TestHarness::new();
        let values: Vec<serde_json::Value> = (0..1000).map(|v| json!(v)).collect();
        let mut request = BatchRequest::new(
            GenerationConfig::new(20, 20, 1, "maze"),
            BatchRequest::MAX_COUNT,
        );
        for _ in 0..7 {
            request = request.with_variation(ConfigVariation::new(
                "gameplay.timeLimit",
                values.clone(),
            ));
        }

        let err = harness.batch.submit.execute(request).await.expect_err("too large");

        assert!(matches!(
            err,
            BatchError::InvalidRequest(DomainError::Validation(_))
        ));
        assert!(harness.store_is_empty().await);
    }
}
