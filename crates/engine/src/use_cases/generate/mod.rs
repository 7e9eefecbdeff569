//! Single-level generation use cases.

use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use levelforge_domain::{
    DomainError, GenerationConfig, JobId, JobKind, JobMetadata, JobResult, Level,
};

use crate::generation::{GenerationError, GenerationPipeline};
use crate::infrastructure::cache::TtlCache;
use crate::infrastructure::ports::TaskSpawner;
use crate::use_cases::jobs::{JobError, JobManager};

/// Generated levels by `GenerationConfig::cache_key`.
pub type LevelCache = TtlCache<String, CachedLevel>;

/// A cached level with the exact configuration that produced it.
///
/// The cache key covers only the terrain inputs, so a hit is served only
/// when the whole configuration matches.
#[derive(Debug, Clone)]
pub struct CachedLevel {
    pub config: GenerationConfig,
    pub level: Level,
}

/// Generate one level, directly or as a background job.
#[derive(Clone)]
pub struct GenerateLevel {
    pipeline: Arc<GenerationPipeline>,
    cache: Arc<LevelCache>,
    jobs: Arc<JobManager>,
    spawner: Arc<dyn TaskSpawner>,
    timeout: Duration,
    progress_floor: u8,
}

impl GenerateLevel {
    pub fn new(
        pipeline: Arc<GenerationPipeline>,
        cache: Arc<LevelCache>,
        jobs: Arc<JobManager>,
        spawner: Arc<dyn TaskSpawner>,
        timeout: Duration,
        progress_floor: u8,
    ) -> Self {
        Self {
            pipeline,
            cache,
            jobs,
            spawner,
            timeout,
            progress_floor,
        }
    }

    /// Generate a level now, serving repeats of the same configuration from
    /// the level cache.
    pub async fn generate(&self, config: GenerationConfig) -> Result<Level, GenerateLevelError> {
        self.check(&config)?;

        let key = config.cache_key();
        if let Some(cached) = self.cache.get(&key).await {
            if cached.config == config {
                tracing::debug!(cache_key = %key, "Level served from cache");
                return Ok(cached.level);
            }
        }

        let level = self
            .pipeline
            .clone()
            .build_blocking(config.clone(), self.timeout)
            .await?;
        self.cache
            .insert(
                key,
                CachedLevel {
                    config,
                    level: level.clone(),
                },
            )
            .await;
        Ok(level)
    }

    /// Validate `config`, create a single-level job and generate it in the
    /// background.
    pub async fn submit(
        &self,
        config: GenerationConfig,
        session_id: Option<String>,
    ) -> Result<JobId, GenerateLevelError> {
        self.check(&config)?;

        let job_id = JobId::new();
        self.jobs
            .create(job_id, JobKind::Single, JobMetadata::new(session_id, 1))
            .await?;

        let this = self.clone();
        self.spawner.spawn(
            async move {
                if let Err(e) = this.run(job_id, config).await {
                    tracing::error!(job_id = %job_id, error = %e, "Level job aborted");
                }
            }
            .boxed(),
        );

        tracing::info!(job_id = %job_id, "Level job submitted");
        Ok(job_id)
    }

    async fn run(&self, job_id: JobId, config: GenerationConfig) -> Result<(), JobError> {
        let started = async {
            self.jobs.start(job_id).await?;
            self.jobs
                .update_progress(
                    job_id,
                    self.progress_floor,
                    Some("Generating level".to_string()),
                )
                .await
        };
        match started.await {
            Ok(_) => {}
            Err(e) if e.terminal_status().is_some() => {
                tracing::debug!(job_id = %job_id, "Level job cancelled before generation");
                return Ok(());
            }
            Err(e) => return Err(e),
        }

        let outcome = match self.generate(config).await {
            Ok(level) => {
                self.jobs
                    .complete(job_id, JobResult::Level(Box::new(level)))
                    .await
            }
            Err(e) => {
                tracing::warn!(job_id = %job_id, error = %e, "Level generation failed");
                self.jobs.fail(job_id, e.to_string(), None).await
            }
        };

        match outcome {
            Ok(_) => Ok(()),
            // Cancelled while generating; the cancellation stands
            Err(e) if e.terminal_status().is_some() => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn check(&self, config: &GenerationConfig) -> Result<(), GenerateLevelError> {
        config.validate()?;
        if !self.pipeline.terrain().contains(&config.algorithm) {
            return Err(GenerationError::UnknownAlgorithm(config.algorithm.clone()).into());
        }
        Ok(())
    }
}

/// Errors from single-level generation.
#[derive(Debug, thiserror::Error)]
pub enum GenerateLevelError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] DomainError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Job(#[from] JobError),
}

#[cfg(test)]
mod tests {
    use levelforge_domain::{EntityRequest, EntityType, JobStatus};

    use super::*;
    use crate::test_fixtures::{wait_for_terminal, TestHarness};

    #[tokio::test]
    async fn generate_caches_by_config() {
        let harness = TestHarness::new();
        let config = GenerationConfig::new(20, 20, 5, "maze");

        let first = harness.generate.generate(config.clone()).await.expect("level");
        let second = harness.generate.generate(config.clone()).await.expect("level");

        assert_eq!(first, second);
        assert!(harness.level_cache.get(&config.cache_key()).await.is_some());
        assert_eq!(harness.level_cache.len().await, 1);
    }

    #[tokio::test]
    async fn same_key_with_other_entities_is_regenerated() {
        let harness = TestHarness::new();
        let bare = GenerationConfig::new(20, 20, 5, "noise");
        let populated = bare
            .clone()
            .with_entity(EntityRequest::new(EntityType::Enemy, 3));
        assert_eq!(bare.cache_key(), populated.cache_key());

        let first = harness.generate.generate(bare).await.expect("level");
        let second = harness.generate.generate(populated.clone()).await.expect("level");

        assert!(first.entities.is_empty());
        assert!(!second.entities.is_empty());
        assert_eq!(first.grid, second.grid);
        let cached = harness
            .level_cache
            .get(&populated.cache_key())
            .await
            .expect("cached");
        assert_eq!(cached.config, populated);
    }

    #[tokio::test]
    async fn generate_rejects_invalid_input_up_front() {
        let harness = TestHarness::new();

        let err = harness
            .generate
            .generate(GenerationConfig::new(2000, 20, 5, "maze"))
            .await
            .expect_err("too wide");
        assert!(matches!(err, GenerateLevelError::InvalidConfig(_)));

        let err = harness
            .generate
            .submit(GenerationConfig::new(20, 20, 5, "voronoi"), None)
            .await
            .expect_err("unknown");
        assert!(matches!(
            err,
            GenerateLevelError::Generation(GenerationError::UnknownAlgorithm(_))
        ));
    }

    #[tokio::test]
    async fn submitted_job_completes_with_level() {
        let harness = TestHarness::new();
        let job_id = harness
            .generate
            .submit(GenerationConfig::new(24, 16, 3, "rooms"), Some("s".into()))
            .await
            .expect("submit");

        let job = wait_for_terminal(&harness.jobs, job_id).await;

        assert_eq!(job.status(), JobStatus::Completed);
        assert_eq!(job.kind(), JobKind::Single);
        let level = job.result().and_then(JobResult::as_level).expect("level");
        assert_eq!(level.name, "rooms-24x16-3");
    }

    #[tokio::test]
    async fn failing_strategy_fails_the_job() {
        let harness = TestHarness::new();
        let job_id = harness
            .generate
            .submit(GenerationConfig::new(20, 20, 3, "broken"), None)
            .await
            .expect("submit");

        let job = wait_for_terminal(&harness.jobs, job_id).await;

        assert_eq!(job.status(), JobStatus::Failed);
        assert!(job.error().is_some_and(|e| e.contains("panicked")));
    }
}
