//! Cellular automata caves.

use levelforge_domain::{AlgorithmParameters, GenerationConfig, TileGrid, TileType};
use rand::Rng;

use super::{count_parameter, float_parameter, seeded_rng, TerrainGenerator};

const DEFAULT_FILL_PROBABILITY: f64 = 0.45;
const DEFAULT_ITERATIONS: u32 = 5;
const WALL_NEIGHBOUR_THRESHOLD: usize = 4;

/// Random fill followed by neighbour-count smoothing passes.
pub struct CellularTerrain;

impl TerrainGenerator for CellularTerrain {
    fn name(&self) -> &str {
        "cellular"
    }

    fn generate(
        &self,
        width: usize,
        height: usize,
        seed: i64,
        params: &AlgorithmParameters,
    ) -> TileGrid {
        let mut fill = float_parameter(params, "fillProbability", DEFAULT_FILL_PROBABILITY);
        if !(0.0..=1.0).contains(&fill) {
            fill = DEFAULT_FILL_PROBABILITY;
        }
        let iterations = count_parameter(params, "iterations", DEFAULT_ITERATIONS)
            .min(GenerationConfig::MAX_SMOOTHING_ITERATIONS);

        let mut rng = seeded_rng(seed);
        let mut grid = TileGrid::filled(width, height, TileType::Ground);
        for y in 0..height {
            for x in 0..width {
                if rng.gen_bool(fill) {
                    grid.set(x, y, TileType::Wall);
                }
            }
        }

        for _ in 0..iterations {
            grid = smooth(&grid);
        }
        grid
    }
}

/// One smoothing pass. Reads only `grid` and writes a fresh grid.
pub(crate) fn smooth(grid: &TileGrid) -> TileGrid {
    let mut next = grid.clone();
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let tile = if wall_neighbours(grid, x, y) >= WALL_NEIGHBOUR_THRESHOLD {
                TileType::Wall
            } else {
                TileType::Ground
            };
            next.set(x, y, tile);
        }
    }
    next
}

// Out-of-bounds neighbours count as walls.
fn wall_neighbours(grid: &TileGrid, x: usize, y: usize) -> usize {
    let mut walls = 0;
    for dy in -1_i64..=1 {
        for dx in -1_i64..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            let is_wall = !grid.in_bounds(nx, ny)
                || grid.get(nx as usize, ny as usize) == Some(TileType::Wall);
            if is_wall {
                walls += 1;
            }
        }
    }
    walls
}
