//! Entity placement on generated terrain.
//!
//! Each requested instance gets a bounded number of random cell draws; the
//! first draw accepted by the type's rule and the request's own distance
//! constraints wins. Instances that run out of draws are skipped.

mod rules;

use std::collections::HashMap;
use std::sync::Arc;

use levelforge_domain::{EntityRequest, EntityType, PlacedEntity, Position, TileGrid};
use rand::Rng;

use super::terrain::seeded_rng;

pub use rules::{
    DefaultRule, EnemyRule, ExitRule, ItemRule, NpcRule, PlacementRule, PowerUpRule, TriggerRule,
};

/// Random draws per requested instance before it is skipped
pub const MAX_PLACEMENT_ATTEMPTS: usize = 100;

/// Placement rules keyed by entity type, with a fallback.
pub struct PlacementRegistry {
    rules: HashMap<EntityType, Arc<dyn PlacementRule>>,
    fallback: Arc<dyn PlacementRule>,
}

impl Default for PlacementRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl PlacementRegistry {
    /// Create a registry with the built-in rules.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(EnemyRule::default()));
        registry.register(Arc::new(ItemRule));
        registry.register(Arc::new(PowerUpRule));
        registry.register(Arc::new(NpcRule));
        registry.register(Arc::new(ExitRule::default()));
        registry.register(Arc::new(TriggerRule));
        registry
    }

    /// Create a registry where every type uses the default rule.
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
            fallback: Arc::new(DefaultRule),
        }
    }

    /// Register a rule for its entity type; a rule without a type replaces
    /// the fallback.
    pub fn register(&mut self, rule: Arc<dyn PlacementRule>) {
        match rule.entity_type() {
            Some(entity_type) => {
                self.rules.insert(entity_type, rule);
            }
            None => self.fallback = rule,
        }
    }

    pub fn rule_for(&self, entity_type: &EntityType) -> Arc<dyn PlacementRule> {
        self.rules
            .get(entity_type)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

/// Places requested entities on a grid using the registered rules.
pub struct EntityPlacer {
    registry: Arc<PlacementRegistry>,
}

impl EntityPlacer {
    pub fn new(registry: Arc<PlacementRegistry>) -> Self {
        Self { registry }
    }

    /// Place `requests` on an empty level.
    pub fn place(&self, grid: &TileGrid, requests: &[EntityRequest], seed: i64) -> Vec<PlacedEntity> {
        self.place_among(grid, &[], requests, seed)
    }

    /// Place `requests` around entities that are already on the level.
    ///
    /// Returns only the newly placed entities, in request order.
    pub fn place_among(
        &self,
        grid: &TileGrid,
        existing: &[PlacedEntity],
        requests: &[EntityRequest],
        seed: i64,
    ) -> Vec<PlacedEntity> {
        if grid.width() == 0 || grid.height() == 0 {
            return Vec::new();
        }

        let mut rng = seeded_rng(seed);
        let mut occupied: Vec<PlacedEntity> = existing.to_vec();
        let first_new = occupied.len();

        for request in requests {
            let rule = self.registry.rule_for(&request.entity_type);
            let mut skipped = 0_u32;

            for _ in 0..request.count {
                let accepted = (0..MAX_PLACEMENT_ATTEMPTS).find_map(|_| {
                    let position = Position::new(
                        rng.gen_range(0..grid.width()) as f64,
                        rng.gen_range(0..grid.height()) as f64,
                    );
                    let allowed = rule.can_place_at(position, grid, &occupied)
                        && satisfies_request(request, position, &occupied);
                    allowed.then_some(position)
                });

                match accepted {
                    Some(position) => occupied.push(
                        PlacedEntity::new(request.entity_type.clone(), position)
                            .with_properties(request.properties.clone()),
                    ),
                    None => skipped += 1,
                }
            }

            if skipped > 0 {
                tracing::debug!(
                    entity_type = %request.entity_type,
                    requested = request.count,
                    skipped,
                    "No valid position found for some entities"
                );
            }
        }

        occupied.split_off(first_new)
    }
}

/// Distance constraints carried on the request itself.
///
/// `max_distance_from_player` holds when any player is close enough; with no
/// player on the level it does not constrain anything.
fn satisfies_request(request: &EntityRequest, position: Position, occupied: &[PlacedEntity]) -> bool {
    if let Some(min_distance) = request.min_distance {
        if occupied
            .iter()
            .any(|entity| entity.position.distance(position) < min_distance)
        {
            return false;
        }
    }

    if let Some(max_distance) = request.max_distance_from_player {
        let mut players = occupied
            .iter()
            .filter(|entity| entity.entity_type == EntityType::Player)
            .peekable();
        if players.peek().is_some()
            && !players.any(|player| player.position.distance(position) <= max_distance)
        {
            return false;
        }
    }

    true
}
