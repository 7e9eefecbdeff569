//! Shared fixtures for engine tests.
//!
//! `TestHarness` wires a full `App` against the in-memory job store and the
//! tokio spawner, with the built-in strategies plus a `broken` strategy that
//! always panics.

mod terrain;

use std::sync::Arc;
use std::time::Duration;

use levelforge_domain::{JobId, JobRecord};

pub use terrain::{gated, BrokenTerrain, Gate, GatedTerrain};

use crate::app::App;
use crate::generation::{PlacementRegistry, TerrainRegistry};
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::config::EngineConfig;
use crate::infrastructure::job_store::InMemoryJobStore;
use crate::infrastructure::ports::JobStore;
use crate::infrastructure::spawner::TokioSpawner;
use crate::use_cases::generate::LevelCache;
use crate::use_cases::{BatchUseCases, GenerateLevel, JobManager};

/// Longest a test waits for a background job.
const JOB_WAIT: Duration = Duration::from_secs(20);

pub struct TestHarness {
    pub app: App,
    pub store: Arc<InMemoryJobStore>,
    pub jobs: Arc<JobManager>,
    pub generate: Arc<GenerateLevel>,
    pub batch: BatchUseCases,
    pub level_cache: Arc<LevelCache>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with(EngineConfig::default(), test_terrain())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::with(config, test_terrain())
    }

    pub fn with(config: EngineConfig, terrain: TerrainRegistry) -> Self {
        let store = Arc::new(InMemoryJobStore::new());
        let app = App::with_ports(
            config,
            terrain,
            PlacementRegistry::with_defaults(),
            store.clone(),
            Arc::new(TokioSpawner::new()),
            Arc::new(SystemClock::new()),
        );
        Self {
            store,
            jobs: app.jobs.clone(),
            generate: app.use_cases.generate.clone(),
            batch: BatchUseCases::new(
                app.use_cases.batch.submit.clone(),
                app.use_cases.batch.run.clone(),
            ),
            level_cache: app.level_cache.clone(),
            app,
        }
    }

    pub async fn store_is_empty(&self) -> bool {
        self.store.list().await.map(|jobs| jobs.is_empty()).unwrap_or(false)
    }
}

/// Built-in strategies plus `broken`.
pub fn test_terrain() -> TerrainRegistry {
    let mut terrain = TerrainRegistry::with_defaults();
    terrain.register("broken", Arc::new(BrokenTerrain));
    terrain
}

/// Poll until the job reaches a terminal state.
pub async fn wait_for_terminal(jobs: &JobManager, job_id: JobId) -> JobRecord {
    let deadline = tokio::time::Instant::now() + JOB_WAIT;
    loop {
        let job = jobs
            .get(job_id)
            .await
            .expect("job store")
            .expect("job should exist");
        if job.status().is_terminal() {
            return job;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "job {} still {} after {:?}",
            job_id,
            job.status(),
            JOB_WAIT
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
