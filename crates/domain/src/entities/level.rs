//! Level entity - A generated tile grid with its placed entities

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{EntityType, TileGrid};
use crate::value_objects::{GameplayConfig, GenerationConfig, Position, VisualTheme};

/// An entity placed on a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedEntity {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub position: Position,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

impl PlacedEntity {
    pub fn new(entity_type: EntityType, position: Position) -> Self {
        Self {
            entity_type,
            position,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_properties(mut self, properties: BTreeMap<String, Value>) -> Self {
        self.properties = properties;
        self
    }
}

/// How and when a level was generated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelMetadata {
    pub algorithm: String,
    pub seed: i64,
    pub generated_at: DateTime<Utc>,
    pub generation_time_ms: u64,
    pub width: u32,
    pub height: u32,
}

impl LevelMetadata {
    /// Size in `WIDTHxHEIGHT` form
    pub fn size(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

/// A generated level
///
/// Owns its grid exclusively; levels are never shared between generations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub name: String,
    pub grid: TileGrid,
    pub entities: Vec<PlacedEntity>,
    pub visual_theme: VisualTheme,
    pub gameplay: GameplayConfig,
    pub metadata: LevelMetadata,
}

impl Level {
    /// Assemble a level from generated parts and the config that produced them
    pub fn assemble(
        config: &GenerationConfig,
        grid: TileGrid,
        entities: Vec<PlacedEntity>,
        generated_at: DateTime<Utc>,
        generation_time_ms: u64,
    ) -> Self {
        Self {
            name: format!(
                "{}-{}x{}-{}",
                config.algorithm.to_lowercase(),
                config.width,
                config.height,
                config.seed
            ),
            grid,
            entities,
            visual_theme: config.visual_theme.clone(),
            gameplay: config.gameplay.clone(),
            metadata: LevelMetadata {
                algorithm: config.algorithm.clone(),
                seed: config.seed,
                generated_at,
                generation_time_ms,
                width: config.width,
                height: config.height,
            },
        }
    }

    /// Entities of one kind, in placement order
    pub fn entities_of<'a>(
        &'a self,
        entity_type: &'a EntityType,
    ) -> impl Iterator<Item = &'a PlacedEntity> + 'a {
        self.entities
            .iter()
            .filter(move |e| &e.entity_type == entity_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TileType;

    #[test]
    fn assemble_names_level_and_copies_sub_configs() {
        let mut config = GenerationConfig::new(12, 10, 42, "Maze");
        config.gameplay.difficulty = "hard".to_string();
        let now = Utc::now();

        let level = Level::assemble(
            &config,
            TileGrid::filled(12, 10, TileType::Ground),
            vec![PlacedEntity::new(EntityType::Exit, Position::new(1.0, 1.0))],
            now,
            3,
        );

        assert_eq!(level.name, "maze-12x10-42");
        assert_eq!(level.metadata.size(), "12x10");
        assert_eq!(level.metadata.algorithm, "Maze");
        assert_eq!(level.metadata.generated_at, now);
        assert_eq!(level.gameplay.difficulty, "hard");
        assert_eq!(level.entities_of(&EntityType::Exit).count(), 1);
        assert_eq!(level.entities_of(&EntityType::Enemy).count(), 0);
    }
}
