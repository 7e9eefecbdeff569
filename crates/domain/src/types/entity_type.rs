//! Entity type enumeration for placed level entities

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of entity placed on a level
///
/// Built-in kinds have their own placement rules. `Custom` carries any other
/// name so plugins can register rules for new kinds at startup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityType {
    Player,
    Enemy,
    Item,
    PowerUp,
    Npc,
    Exit,
    Obstacle,
    Checkpoint,
    Trigger,
    /// Plugin-defined entity kind
    Custom(String),
}

impl EntityType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Player => "Player",
            Self::Enemy => "Enemy",
            Self::Item => "Item",
            Self::PowerUp => "PowerUp",
            Self::Npc => "NPC",
            Self::Exit => "Exit",
            Self::Obstacle => "Obstacle",
            Self::Checkpoint => "Checkpoint",
            Self::Trigger => "Trigger",
            Self::Custom(name) => name,
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = match s.to_ascii_lowercase().as_str() {
            "player" => Self::Player,
            "enemy" => Self::Enemy,
            "item" => Self::Item,
            "powerup" | "power_up" => Self::PowerUp,
            "npc" => Self::Npc,
            "exit" => Self::Exit,
            "obstacle" => Self::Obstacle,
            "checkpoint" => Self::Checkpoint,
            "trigger" => Self::Trigger,
            _ => Self::Custom(s.to_string()),
        };
        Ok(parsed)
    }
}

impl From<String> for EntityType {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(parsed) => parsed,
            Err(never) => match never {},
        }
    }
}

impl From<&str> for EntityType {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<EntityType> for String {
    fn from(value: EntityType) -> Self {
        value.as_str().to_string()
    }
}
