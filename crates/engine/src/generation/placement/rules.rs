//! Per-entity-type placement rules.

use levelforge_domain::{EntityType, PlacedEntity, Position, TileGrid};

/// Decides whether an entity may stand at a position.
pub trait PlacementRule: Send + Sync {
    /// Entity type the rule governs; `None` marks the fallback rule.
    fn entity_type(&self) -> Option<EntityType>;

    fn can_place_at(&self, position: Position, grid: &TileGrid, existing: &[PlacedEntity]) -> bool;
}

/// Whether every entity accepted by `filter` is at least `distance` away.
fn keeps_distance(
    position: Position,
    existing: &[PlacedEntity],
    distance: f64,
    filter: impl Fn(&PlacedEntity) -> bool,
) -> bool {
    existing
        .iter()
        .filter(|entity| filter(entity))
        .all(|entity| entity.position.distance(position) >= distance)
}

fn is_player(entity: &PlacedEntity) -> bool {
    entity.entity_type == EntityType::Player
}

/// Walkable and at least one tile from everything.
///
/// Used for every type without a dedicated rule.
pub struct DefaultRule;

impl DefaultRule {
    pub const SPACING: f64 = 1.0;
}

impl PlacementRule for DefaultRule {
    fn entity_type(&self) -> Option<EntityType> {
        None
    }

    fn can_place_at(&self, position: Position, grid: &TileGrid, existing: &[PlacedEntity]) -> bool {
        grid.is_walkable_at(position) && keeps_distance(position, existing, Self::SPACING, |_| true)
    }
}

/// Enemies keep clear of players and of each other.
pub struct EnemyRule {
    pub player_clearance: f64,
    pub spacing: f64,
}

impl Default for EnemyRule {
    fn default() -> Self {
        Self {
            player_clearance: 3.0,
            spacing: 1.0,
        }
    }
}

impl PlacementRule for EnemyRule {
    fn entity_type(&self) -> Option<EntityType> {
        Some(EntityType::Enemy)
    }

    fn can_place_at(&self, position: Position, grid: &TileGrid, existing: &[PlacedEntity]) -> bool {
        grid.is_walkable_at(position)
            && keeps_distance(position, existing, self.player_clearance, is_player)
            && keeps_distance(position, existing, self.spacing, |e| !is_player(e))
    }
}

/// Rule that only enforces a uniform spacing from every entity.
macro_rules! spacing_rule {
    ($(#[$doc:meta])* $name:ident, $entity_type:expr, $spacing:expr) => {
        $(#[$doc])*
        pub struct $name;

        impl $name {
            pub const SPACING: f64 = $spacing;
        }

        impl PlacementRule for $name {
            fn entity_type(&self) -> Option<EntityType> {
                Some($entity_type)
            }

            fn can_place_at(
                &self,
                position: Position,
                grid: &TileGrid,
                existing: &[PlacedEntity],
            ) -> bool {
                grid.is_walkable_at(position)
                    && keeps_distance(position, existing, Self::SPACING, |_| true)
            }
        }
    };
}

spacing_rule!(
    /// Items may sit close together.
    ItemRule,
    EntityType::Item,
    0.5
);
spacing_rule!(PowerUpRule, EntityType::PowerUp, 1.0);
spacing_rule!(
    /// NPCs get a little more room.
    NpcRule,
    EntityType::Npc,
    1.5
);

/// Exits stay away from the player start and from other entities.
pub struct ExitRule {
    pub player_clearance: f64,
    pub spacing: f64,
}

impl Default for ExitRule {
    fn default() -> Self {
        Self {
            player_clearance: 5.0,
            spacing: 2.0,
        }
    }
}

impl PlacementRule for ExitRule {
    fn entity_type(&self) -> Option<EntityType> {
        Some(EntityType::Exit)
    }

    fn can_place_at(&self, position: Position, grid: &TileGrid, existing: &[PlacedEntity]) -> bool {
        grid.is_walkable_at(position)
            && keeps_distance(position, existing, self.player_clearance, is_player)
            && keeps_distance(position, existing, self.spacing, |e| !is_player(e))
    }
}

/// Triggers may overlap anything except other triggers.
pub struct TriggerRule;

impl TriggerRule {
    pub const SPACING: f64 = 0.1;
}

impl PlacementRule for TriggerRule {
    fn entity_type(&self) -> Option<EntityType> {
        Some(EntityType::Trigger)
    }

    fn can_place_at(&self, position: Position, grid: &TileGrid, existing: &[PlacedEntity]) -> bool {
        grid.is_walkable_at(position)
            && keeps_distance(position, existing, Self::SPACING, |e| {
                e.entity_type == EntityType::Trigger
            })
    }
}
