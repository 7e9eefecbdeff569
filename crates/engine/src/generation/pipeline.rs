//! Builds a complete level from a configuration.

use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};

use levelforge_domain::{GenerationConfig, Level};
use tokio::task::JoinError;

use super::{EntityPlacer, GenerationError, TerrainRegistry};
use crate::infrastructure::ports::ClockPort;

/// Terrain, then entities, then assembly.
pub struct GenerationPipeline {
    terrain: Arc<TerrainRegistry>,
    placer: Arc<EntityPlacer>,
    clock: Arc<dyn ClockPort>,
}

impl GenerationPipeline {
    pub fn new(
        terrain: Arc<TerrainRegistry>,
        placer: Arc<EntityPlacer>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            terrain,
            placer,
            clock,
        }
    }

    pub fn terrain(&self) -> &TerrainRegistry {
        &self.terrain
    }

    /// Build a level on the current thread.
    pub fn build(&self, config: &GenerationConfig) -> Result<Level, GenerationError> {
        config.validate()?;
        let started = Instant::now();

        let grid = self.terrain.generate(&config.algorithm, config, config.seed)?;
        let entities = self.placer.place(&grid, &config.entities, config.seed);

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        Ok(Level::assemble(
            config,
            grid,
            entities,
            self.clock.now(),
            elapsed_ms,
        ))
    }

    /// Build a level on the blocking pool, giving up after `limit`.
    ///
    /// A timed-out build keeps running on its blocking thread; its result is
    /// discarded.
    pub async fn build_blocking(
        self: Arc<Self>,
        config: GenerationConfig,
        limit: Duration,
    ) -> Result<Level, GenerationError> {
        let task = tokio::task::spawn_blocking(move || self.build(&config));
        match tokio::time::timeout(limit, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(join_failure(join_error)),
            Err(_) => Err(GenerationError::Timeout(limit)),
        }
    }
}

fn join_failure(error: JoinError) -> GenerationError {
    if error.is_panic() {
        GenerationError::Panicked(panic_message(error.into_panic()))
    } else {
        GenerationError::Failed(error.to_string())
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use levelforge_domain::{
        AlgorithmParameters, EntityRequest, EntityType, TileGrid, TileType,
    };

    use super::*;
    use crate::generation::{PlacementRegistry, TerrainGenerator};
    use crate::infrastructure::ports::MockClockPort;

    fn fixed_clock() -> Arc<dyn ClockPort> {
        let mut clock = MockClockPort::new();
        clock
            .expect_now()
            .returning(|| Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
        Arc::new(clock)
    }

    fn pipeline_with(terrain: TerrainRegistry) -> Arc<GenerationPipeline> {
        Arc::new(GenerationPipeline::new(
            Arc::new(terrain),
            Arc::new(EntityPlacer::new(Arc::new(PlacementRegistry::with_defaults()))),
            fixed_clock(),
        ))
    }

    fn pipeline() -> Arc<GenerationPipeline> {
        pipeline_with(TerrainRegistry::with_defaults())
    }

    struct Exploding;

    impl TerrainGenerator for Exploding {
        fn name(&self) -> &str {
            "exploding"
        }

        fn generate(&self, _: usize, _: usize, _: i64, _: &AlgorithmParameters) -> TileGrid {
            panic!("terrain exploded")
        }
    }

    struct Slow;

    impl TerrainGenerator for Slow {
        fn name(&self) -> &str {
            "slow"
        }

        fn generate(&self, width: usize, height: usize, _: i64, _: &AlgorithmParameters) -> TileGrid {
            std::thread::sleep(Duration::from_millis(300));
            TileGrid::filled(width, height, TileType::Ground)
        }
    }

    #[test]
    fn build_assembles_named_level() {
        let config = GenerationConfig::new(30, 20, 42, "Cellular")
            .with_entity(EntityRequest::new(EntityType::Player, 1))
            .with_entity(EntityRequest::new(EntityType::Enemy, 4));

        let level = pipeline().build(&config).expect("level");

        assert_eq!(level.name, "cellular-30x20-42");
        assert_eq!((level.grid.width(), level.grid.height()), (30, 20));
        assert_eq!(level.metadata.seed, 42);
        assert_eq!(
            level.metadata.generated_at,
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
        );
        assert!(level.entities.len() <= 5);
    }

    #[test]
    fn build_is_deterministic() {
        let config = GenerationConfig::new(40, 40, 7, "rooms")
            .with_entity(EntityRequest::new(EntityType::Player, 1))
            .with_entity(EntityRequest::new(EntityType::Item, 6));

        let a = pipeline().build(&config).expect("level");
        let b = pipeline().build(&config).expect("level");

        assert_eq!(a.grid, b.grid);
        assert_eq!(a.entities, b.entities);
        assert_eq!(a.name, b.name);
    }

    #[test]
    fn build_rejects_unknown_algorithm_and_invalid_config() {
        let unknown = GenerationConfig::new(20, 20, 1, "voronoi");
        assert!(matches!(
            pipeline().build(&unknown),
            Err(GenerationError::UnknownAlgorithm(_))
        ));

        let tiny = GenerationConfig::new(5, 20, 1, "maze");
        assert!(matches!(
            pipeline().build(&tiny),
            Err(GenerationError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn panicking_strategy_becomes_error() {
        let mut terrain = TerrainRegistry::empty();
        terrain.register("exploding", Arc::new(Exploding));
        let config = GenerationConfig::new(10, 10, 1, "exploding");

        let err = pipeline_with(terrain)
            .build_blocking(config, Duration::from_secs(5))
            .await
            .expect_err("panic");

        assert!(matches!(err, GenerationError::Panicked(message) if message.contains("exploded")));
    }

    #[tokio::test]
    async fn slow_strategy_times_out() {
        let mut terrain = TerrainRegistry::empty();
        terrain.register("slow", Arc::new(Slow));
        let config = GenerationConfig::new(10, 10, 1, "slow");

        let err = pipeline_with(terrain)
            .build_blocking(config, Duration::from_millis(20))
            .await
            .expect_err("timeout");

        assert!(matches!(err, GenerationError::Timeout(_)));
    }

    #[tokio::test]
    async fn blocking_build_returns_level() {
        let config = GenerationConfig::new(20, 20, 1, "maze");

        let level = pipeline()
            .build_blocking(config, Duration::from_secs(5))
            .await
            .expect("level");

        assert_eq!(level.name, "maze-20x20-1");
    }
}
