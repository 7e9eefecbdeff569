//! Terrain tiles and the grid that holds them

use serde::{Deserialize, Serialize};

use crate::value_objects::Position;

/// Terrain type of a single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TileType {
    Ground,
    Wall,
    Water,
    Grass,
    Sand,
    Stone,
    Lava,
    Ice,
}

impl TileType {
    /// Entities can stand on every tile except walls and water.
    pub fn is_walkable(self) -> bool {
        !matches!(self, Self::Wall | Self::Water)
    }
}

impl std::fmt::Display for TileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Ground => "Ground",
            Self::Wall => "Wall",
            Self::Water => "Water",
            Self::Grass => "Grass",
            Self::Sand => "Sand",
            Self::Stone => "Stone",
            Self::Lava => "Lava",
            Self::Ice => "Ice",
        };
        write!(f, "{}", name)
    }
}

/// Row-major width × height array of tiles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileGrid {
    width: usize,
    height: usize,
    tiles: Vec<TileType>,
}

impl TileGrid {
    /// Create a grid with every cell set to `tile`
    pub fn filled(width: usize, height: usize, tile: TileType) -> Self {
        Self {
            width,
            height,
            tiles: vec![tile; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tiles(&self) -> &[TileType] {
        &self.tiles
    }

    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<TileType> {
        if x < self.width && y < self.height {
            Some(self.tiles[y * self.width + x])
        } else {
            None
        }
    }

    /// Set a cell; writes outside the grid are ignored.
    pub fn set(&mut self, x: usize, y: usize, tile: TileType) {
        if x < self.width && y < self.height {
            self.tiles[y * self.width + x] = tile;
        }
    }

    /// Tile under a floating-point position (coordinates are floored).
    pub fn tile_at(&self, position: Position) -> Option<TileType> {
        if !position.x.is_finite() || !position.y.is_finite() {
            return None;
        }
        let x = position.x.floor() as i64;
        let y = position.y.floor() as i64;
        if self.in_bounds(x, y) {
            self.get(x as usize, y as usize)
        } else {
            None
        }
    }

    pub fn is_walkable_at(&self, position: Position) -> bool {
        self.tile_at(position).is_some_and(TileType::is_walkable)
    }

    pub fn count(&self, tile: TileType) -> usize {
        self.tiles.iter().filter(|t| **t == tile).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walls_and_water_are_not_walkable() {
        assert!(!TileType::Wall.is_walkable());
        assert!(!TileType::Water.is_walkable());
        assert!(TileType::Ground.is_walkable());
        assert!(TileType::Lava.is_walkable());
    }

    #[test]
    fn set_and_get_use_row_major_layout() {
        let mut grid = TileGrid::filled(4, 3, TileType::Wall);
        grid.set(3, 2, TileType::Ground);

        assert_eq!(grid.get(3, 2), Some(TileType::Ground));
        assert_eq!(grid.tiles()[2 * 4 + 3], TileType::Ground);
        assert_eq!(grid.count(TileType::Ground), 1);
    }

    #[test]
    fn out_of_bounds_access_is_none_and_writes_are_ignored() {
        let mut grid = TileGrid::filled(2, 2, TileType::Ground);
        grid.set(5, 5, TileType::Wall);

        assert_eq!(grid.get(2, 0), None);
        assert_eq!(grid.count(TileType::Wall), 0);
        assert_eq!(grid.tile_at(Position::new(-0.5, 1.0)), None);
    }

    #[test]
    fn tile_at_floors_fractional_positions() {
        let mut grid = TileGrid::filled(3, 3, TileType::Ground);
        grid.set(1, 2, TileType::Water);

        assert_eq!(grid.tile_at(Position::new(1.9, 2.1)), Some(TileType::Water));
        assert!(!grid.is_walkable_at(Position::new(1.0, 2.0)));
        assert!(grid.is_walkable_at(Position::new(0.0, 0.0)));
    }
}
