//! Application state and composition.

use std::sync::Arc;

use crate::generation::{EntityPlacer, GenerationPipeline, PlacementRegistry, TerrainRegistry};
use crate::infrastructure::{
    clock::SystemClock,
    config::EngineConfig,
    job_store::InMemoryJobStore,
    ports::{ClockPort, JobStore, TaskSpawner},
    spawner::TokioSpawner,
};
use crate::use_cases;
use crate::use_cases::generate::LevelCache;
use crate::use_cases::jobs::JobError;

/// Main application state.
///
/// Holds the job manager, the level cache and all use cases.
pub struct App {
    pub config: EngineConfig,
    pub jobs: Arc<use_cases::JobManager>,
    pub level_cache: Arc<LevelCache>,
    pub use_cases: UseCases,
}

/// Container for all use cases.
pub struct UseCases {
    pub generate: Arc<use_cases::GenerateLevel>,
    pub batch: use_cases::BatchUseCases,
}

impl App {
    /// Create an App with the built-in terrain strategies and placement rules.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_registries(
            config,
            TerrainRegistry::with_defaults(),
            PlacementRegistry::with_defaults(),
        )
    }

    /// Create an App with caller-supplied registries, e.g. with plugin
    /// strategies registered at startup.
    pub fn with_registries(
        config: EngineConfig,
        terrain: TerrainRegistry,
        placement: PlacementRegistry,
    ) -> Self {
        Self::with_ports(
            config,
            terrain,
            placement,
            Arc::new(InMemoryJobStore::new()),
            Arc::new(TokioSpawner::new()),
            Arc::new(SystemClock::new()),
        )
    }

    /// Create an App with all dependencies wired up.
    pub fn with_ports(
        config: EngineConfig,
        terrain: TerrainRegistry,
        placement: PlacementRegistry,
        store: Arc<dyn JobStore>,
        spawner: Arc<dyn TaskSpawner>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        let terrain = Arc::new(terrain);
        let placer = Arc::new(EntityPlacer::new(Arc::new(placement)));
        let pipeline = Arc::new(GenerationPipeline::new(
            terrain.clone(),
            placer,
            clock.clone(),
        ));
        let jobs = Arc::new(use_cases::JobManager::new(store, clock, config.clone()));
        let level_cache = Arc::new(LevelCache::new(
            config.level_cache_ttl,
            config.level_cache_capacity,
        ));

        let generate = Arc::new(use_cases::GenerateLevel::new(
            pipeline.clone(),
            level_cache.clone(),
            jobs.clone(),
            spawner.clone(),
            config.item_timeout,
            config.progress_floor,
        ));

        let run = Arc::new(use_cases::batch::RunBatch::new(
            pipeline,
            jobs.clone(),
            config.item_timeout,
            config.progress_floor,
            config.progress_ceiling,
        ));
        let submit = Arc::new(use_cases::batch::SubmitBatch::new(
            run.clone(),
            jobs.clone(),
            terrain,
            spawner,
            config.max_batch_items,
        ));

        Self {
            config,
            jobs,
            level_cache,
            use_cases: UseCases {
                generate,
                batch: use_cases::BatchUseCases::new(submit, run),
            },
        }
    }

    /// Drop expired job records and cached levels.
    ///
    /// Returns the number of job records removed.
    pub async fn sweep_expired(&self) -> Result<usize, JobError> {
        let jobs = self.jobs.purge_expired().await?;
        let levels = self.level_cache.cleanup_expired().await;
        if jobs > 0 || levels > 0 {
            tracing::debug!(jobs, levels, "Swept expired entries");
        }
        Ok(jobs)
    }
}
