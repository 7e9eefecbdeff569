//! Trigonometric noise terrain.

use levelforge_domain::{AlgorithmParameters, TileGrid, TileType};
use rand::Rng;

use super::{float_parameter, seeded_rng, TerrainGenerator};

const DEFAULT_FREQUENCY: f64 = 0.1;
const DEFAULT_WALL_THRESHOLD: f64 = 0.3;
const DEFAULT_WATER_THRESHOLD: f64 = -0.2;
const JITTER: f64 = 0.5;

/// `sin(x·f)·cos(y·f)` plus seeded jitter, thresholded into walls and water.
pub struct NoiseTerrain;

impl TerrainGenerator for NoiseTerrain {
    fn name(&self) -> &str {
        "noise"
    }

    fn generate(
        &self,
        width: usize,
        height: usize,
        seed: i64,
        params: &AlgorithmParameters,
    ) -> TileGrid {
        let frequency = float_parameter(params, "frequency", DEFAULT_FREQUENCY);
        let wall_threshold = float_parameter(params, "wallThreshold", DEFAULT_WALL_THRESHOLD);
        let water_threshold = float_parameter(params, "waterThreshold", DEFAULT_WATER_THRESHOLD);

        let mut rng = seeded_rng(seed);
        let mut grid = TileGrid::filled(width, height, TileType::Ground);

        for x in 0..width {
            for y in 0..height {
                let value = (x as f64 * frequency).sin() * (y as f64 * frequency).cos()
                    + rng.gen::<f64>() * JITTER;
                let tile = if value > wall_threshold {
                    TileType::Wall
                } else if value < water_threshold {
                    TileType::Water
                } else {
                    TileType::Ground
                };
                grid.set(x, y, tile);
            }
        }

        grid
    }
}
