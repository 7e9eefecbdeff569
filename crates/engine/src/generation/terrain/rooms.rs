//! Rectangular rooms carved out of solid rock.

use levelforge_domain::{AlgorithmParameters, TileGrid, TileType};
use rand::Rng;

use super::{seeded_rng, TerrainGenerator};

const MIN_ROOMS: usize = 3;
const MAX_ROOMS: usize = 8;
const CELLS_PER_ROOM: usize = 400;
const MIN_ROOM_SIDE: usize = 5;
const MAX_ROOM_SIDE: usize = 15;

pub struct RoomsTerrain;

impl TerrainGenerator for RoomsTerrain {
    fn name(&self) -> &str {
        "rooms"
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
        let room_count = (width * height / CELLS_PER_ROOM).clamp(MIN_ROOMS, MAX_ROOMS);

        for _ in 0..room_count {
            let room_width = rng.gen_range(MIN_ROOM_SIDE..=max_room_side(width));
            let room_height = rng.gen_range(MIN_ROOM_SIDE..=max_room_side(height));
            if room_width > width || room_height > height {
                continue;
            }
            let left = rng.gen_range(0..=width - room_width);
            let top = rng.gen_range(0..=height - room_height);

            // Interior only; the one-cell rim stays wall
            for y in top + 1..top + room_height - 1 {
                for x in left + 1..left + room_width - 1 {
                    grid.set(x, y, TileType::Ground);
                }
            }
        }

        grid
    }
}

fn max_room_side(dimension: usize) -> usize {
    (dimension / 3).clamp(MIN_ROOM_SIDE, MAX_ROOM_SIDE)
}
