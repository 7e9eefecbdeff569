//! Grid maze with random openings.

use levelforge_domain::{AlgorithmParameters, TileGrid, TileType};
use rand::Rng;

use super::{seeded_rng, TerrainGenerator};

/// Right, down, left, up.
const DIRECTIONS: [(i64, i64); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

/// Carves every odd cell and opens each neighbour on a coin flip.
pub struct MazeTerrain;

impl TerrainGenerator for MazeTerrain {
    fn name(&self) -> &str {
        "maze"
    }

    fn generate(
        &self,
        width: usize,
        height: usize,
        seed: i64,
        _params: &AlgorithmParameters,
    ) -> TileGrid {
        let mut rng = seeded_rng(seed);
        let mut grid = TileGrid::filled(width, height, TileType::Wall);

        for y in (1..height).step_by(2) {
            for x in (1..width).step_by(2) {
                grid.set(x, y, TileType::Ground);
                for (dx, dy) in DIRECTIONS {
                    // Always draw so the stream is independent of the edges
                    let open = rng.gen_bool(0.5);
                    let nx = x as i64 + dx;
                    let ny = y as i64 + dy;
                    if open && grid.in_bounds(nx, ny) {
                        grid.set(nx as usize, ny as usize, TileType::Ground);
                    }
                }
            }
        }

        grid
    }
}
