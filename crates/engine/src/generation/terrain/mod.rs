//! Terrain strategies and the registry that resolves them by name.

mod cellular;
mod maze;
mod noise;
mod rooms;

use std::collections::HashMap;
use std::sync::Arc;

use levelforge_domain::{AlgorithmParameters, GenerationConfig, TileGrid};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::GenerationError;

pub use cellular::CellularTerrain;
pub use maze::MazeTerrain;
pub use noise::NoiseTerrain;
pub use rooms::RoomsTerrain;

/// A terrain generation strategy.
///
/// Implementations must be pure: the same inputs always produce the same
/// grid, and generation never fails.
pub trait TerrainGenerator: Send + Sync {
    fn name(&self) -> &str;

    fn generate(
        &self,
        width: usize,
        height: usize,
        seed: i64,
        params: &AlgorithmParameters,
    ) -> TileGrid;
}

/// Registry of terrain strategies, keyed by lower-cased name.
pub struct TerrainRegistry {
    generators: HashMap<String, Arc<dyn TerrainGenerator>>,
}

impl Default for TerrainRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl TerrainRegistry {
    /// Create a registry with the built-in strategies and their aliases.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();

        let noise: Arc<dyn TerrainGenerator> = Arc::new(NoiseTerrain);
        registry.register("noise", noise.clone());
        registry.register("perlin", noise);

        let cellular: Arc<dyn TerrainGenerator> = Arc::new(CellularTerrain);
        registry.register("cellular", cellular.clone());
        registry.register("cellular_automata", cellular.clone());
        registry.register("caves", cellular);

        registry.register("maze", Arc::new(MazeTerrain));

        let rooms: Arc<dyn TerrainGenerator> = Arc::new(RoomsTerrain);
        registry.register("rooms", rooms.clone());
        registry.register("dungeon", rooms);

        registry
    }

    /// Create an empty registry without built-in strategies.
    pub fn empty() -> Self {
        Self {
            generators: HashMap::new(),
        }
    }

    /// Register a strategy under `name`, replacing any previous one.
    pub fn register(&mut self, name: &str, generator: Arc<dyn TerrainGenerator>) {
        self.generators.insert(name.to_lowercase(), generator);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn TerrainGenerator>> {
        self.generators.get(&name.to_lowercase()).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.generators.contains_key(&name.to_lowercase())
    }

    /// Registered names, aliases included, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.generators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Generate terrain for `config` with the strategy registered as `name`.
    pub fn generate(
        &self,
        name: &str,
        config: &GenerationConfig,
        seed: i64,
    ) -> Result<TileGrid, GenerationError> {
        let generator = self
            .get(name)
            .ok_or_else(|| GenerationError::UnknownAlgorithm(name.to_string()))?;
        Ok(generator.generate(
            config.width as usize,
            config.height as usize,
            seed,
            &config.algorithm_parameters,
        ))
    }
}

pub(crate) fn seeded_rng(seed: i64) -> StdRng {
    StdRng::seed_from_u64(seed as u64)
}

pub(crate) fn float_parameter(params: &AlgorithmParameters, key: &str, default: f64) -> f64 {
    params
        .get(key)
        .and_then(serde_json::Value::as_f64)
        .filter(|value| value.is_finite())
        .unwrap_or(default)
}

pub(crate) fn count_parameter(params: &AlgorithmParameters, key: &str, default: u32) -> u32 {
    params
        .get(key)
        .and_then(serde_json::Value::as_u64)
        .and_then(|value| u32::try_from(value).ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use levelforge_domain::TileType;

    use super::*;

    struct Flat;

    impl TerrainGenerator for Flat {
        fn name(&self) -> &str {
            "flat"
        }

        fn generate(&self, width: usize, height: usize, _: i64, _: &AlgorithmParameters) -> TileGrid {
            TileGrid::filled(width, height, TileType::Grass)
        }
    }

    #[test]
    fn defaults_include_every_alias() {
        let registry = TerrainRegistry::with_defaults();
        assert_eq!(
            registry.names(),
            vec![
                "caves",
                "cellular",
                "cellular_automata",
                "dungeon",
                "maze",
                "noise",
                "perlin",
                "rooms"
            ]
        );
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let registry = TerrainRegistry::with_defaults();
        assert!(registry.contains("Maze"));
        assert!(registry.contains("CELLULAR_AUTOMATA"));
        assert_eq!(registry.get("Perlin").map(|g| g.name().to_string()), Some("noise".into()));
    }

    #[test]
    fn unknown_algorithm_is_an_error() {
        let registry = TerrainRegistry::with_defaults();
        let config = GenerationConfig::new(20, 20, 1, "voronoi");

        let err = registry
            .generate(&config.algorithm, &config, config.seed)
            .expect_err("unknown");

        assert!(matches!(err, GenerationError::UnknownAlgorithm(name) if name == "voronoi"));
    }

    #[test]
    fn registered_strategy_is_used() {
        let mut registry = TerrainRegistry::empty();
        registry.register("Flat", Arc::new(Flat));
        let config = GenerationConfig::new(12, 11, 1, "flat");

        let grid = registry
            .generate("FLAT", &config, config.seed)
            .expect("flat terrain");

        assert_eq!((grid.width(), grid.height()), (12, 11));
        assert_eq!(grid.count(TileType::Grass), 12 * 11);
    }

    #[test]
    fn parameters_fall_back_on_wrong_types() {
        let mut params = AlgorithmParameters::new();
        params.insert("frequency".into(), serde_json::json!("fast"));
        params.insert("iterations".into(), serde_json::json!(-1));
        params.insert("threshold".into(), serde_json::json!(0.7));

        assert_eq!(float_parameter(&params, "frequency", 0.1), 0.1);
        assert_eq!(count_parameter(&params, "iterations", 5), 5);
        assert_eq!(float_parameter(&params, "threshold", 0.3), 0.7);
        assert_eq!(float_parameter(&params, "missing", 0.3), 0.3);
    }
}
