//! Level generation configuration
//!
//! A `GenerationConfig` describes one level: its dimensions, the seed and the
//! terrain algorithm to use, and the entities to place. The visual and gameplay
//! sub-configs are carried through to the generated level untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DomainError;
use crate::types::{EntityType, TileType};

/// Free-form parameters forwarded to the terrain algorithm
pub type AlgorithmParameters = BTreeMap<String, Value>;

/// Prefix of variation paths that set a single algorithm parameter
const ALGORITHM_PARAMETER_PREFIX: &str = "algorithmParameters.";

/// Complete configuration for generating one level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub width: u32,
    pub height: u32,
    pub seed: i64,
    /// Name of a registered terrain algorithm (case-insensitive)
    #[serde(rename = "generationAlgorithm", alias = "algorithm")]
    pub algorithm: String,
    #[serde(default)]
    pub algorithm_parameters: AlgorithmParameters,
    /// Terrain types the caller allows; carried through unchanged
    #[serde(default)]
    pub terrain_types: Vec<TileType>,
    #[serde(default)]
    pub entities: Vec<EntityRequest>,
    #[serde(default)]
    pub visual_theme: VisualTheme,
    #[serde(default)]
    pub gameplay: GameplayConfig,
}

impl GenerationConfig {
    /// Smallest accepted width or height
    pub const MIN_DIMENSION: u32 = 10;

    /// Largest accepted width or height
    pub const MAX_DIMENSION: u32 = 1000;

    /// Largest accepted count in a single entity request
    pub const MAX_ENTITY_COUNT: u32 = 1000;

    /// Upper bound on the `iterations` algorithm parameter
    pub const MAX_SMOOTHING_ITERATIONS: u32 = 64;

    pub fn new(width: u32, height: u32, seed: i64, algorithm: impl Into<String>) -> Self {
        Self {
            width,
            height,
            seed,
            algorithm: algorithm.into(),
            ..Self::default()
        }
    }

    pub fn with_entity(mut self, request: EntityRequest) -> Self {
        self.entities.push(request);
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: Value) -> Self {
        self.algorithm_parameters.insert(key.into(), value);
        self
    }

    /// Deterministic memoization key; equal configs produce equal keys.
    ///
    /// Only the inputs that shape the terrain participate: dimensions, seed
    /// and algorithm.
    pub fn cache_key(&self) -> String {
        format!(
            "level:{}x{}:{}:{}",
            self.width,
            self.height,
            self.seed,
            self.algorithm.to_lowercase()
        )
    }

    /// Check the configuration before any generation work starts.
    ///
    /// Algorithm registration is checked by the engine, which owns the registry.
    pub fn validate(&self) -> Result<(), DomainError> {
        let range = Self::MIN_DIMENSION..=Self::MAX_DIMENSION;
        if !range.contains(&self.width) {
            return Err(DomainError::validation(format!(
                "width must be between {} and {}, got {}",
                Self::MIN_DIMENSION,
                Self::MAX_DIMENSION,
                self.width
            )));
        }
        if !range.contains(&self.height) {
            return Err(DomainError::validation(format!(
                "height must be between {} and {}, got {}",
                Self::MIN_DIMENSION,
                Self::MAX_DIMENSION,
                self.height
            )));
        }
        if self.algorithm.trim().is_empty() {
            return Err(DomainError::validation("generation algorithm cannot be empty"));
        }
        self.validate_algorithm_parameters()?;

        let cells = u64::from(self.width) * u64::from(self.height);
        let mut requested = 0_u64;
        for request in &self.entities {
            request.validate()?;
            requested += u64::from(request.count);
        }
        if requested > cells {
            return Err(DomainError::validation(format!(
                "{} entities requested but the level only has {} cells",
                requested, cells
            )));
        }
        Ok(())
    }

    // Non-numeric values are left to the algorithm, which falls back to its
    // defaults.
    fn validate_algorithm_parameters(&self) -> Result<(), DomainError> {
        if let Some(fill) = self
            .algorithm_parameters
            .get("fillProbability")
            .filter(|value| value.is_number())
        {
            let in_range = fill.as_f64().is_some_and(|p| (0.0..=1.0).contains(&p));
            if !in_range {
                return Err(DomainError::validation(format!(
                    "fillProbability must be between 0 and 1, got {}",
                    fill
                )));
            }
        }
        if let Some(iterations) = self
            .algorithm_parameters
            .get("iterations")
            .filter(|value| value.is_number())
        {
            let in_range = iterations
                .as_u64()
                .is_some_and(|n| n <= u64::from(Self::MAX_SMOOTHING_ITERATIONS));
            if !in_range {
                return Err(DomainError::validation(format!(
                    "iterations must be between 0 and {}, got {}",
                    Self::MAX_SMOOTHING_ITERATIONS,
                    iterations
                )));
            }
        }
        Ok(())
    }

    /// Whether `path` names a parameter that `apply_parameter` can set.
    pub fn is_known_parameter(path: &str) -> bool {
        matches!(
            path,
            "seed"
                | "width"
                | "height"
                | "generationAlgorithm"
                | "visualTheme.themeName"
                | "gameplay.difficulty"
                | "gameplay.playerSpeed"
                | "gameplay.timeLimit"
        ) || path
            .strip_prefix(ALGORITHM_PARAMETER_PREFIX)
            .is_some_and(|key| !key.is_empty())
    }

    /// Set the parameter named by a dotted `path` to `value`.
    ///
    /// Unknown paths fail with `UnknownParameter`; values of the wrong JSON
    /// type fail with `Validation`.
    pub fn apply_parameter(&mut self, path: &str, value: &Value) -> Result<(), DomainError> {
        match path {
            "seed" => self.seed = expect_i64(path, value)?,
            "width" => self.width = expect_u32(path, value)?,
            "height" => self.height = expect_u32(path, value)?,
            "generationAlgorithm" => self.algorithm = expect_string(path, value)?,
            "visualTheme.themeName" => self.visual_theme.theme_name = expect_string(path, value)?,
            "gameplay.difficulty" => self.gameplay.difficulty = expect_string(path, value)?,
            "gameplay.playerSpeed" => self.gameplay.player_speed = expect_f64(path, value)?,
            "gameplay.timeLimit" => self.gameplay.time_limit = expect_u32(path, value)?,
            other => match other.strip_prefix(ALGORITHM_PARAMETER_PREFIX) {
                Some(key) if !key.is_empty() => {
                    self.algorithm_parameters
                        .insert(key.to_string(), value.clone());
                }
                _ => return Err(DomainError::unknown_parameter(other)),
            },
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            width: 50,
            height: 50,
            seed: 0,
            algorithm: "noise".to_string(),
            algorithm_parameters: AlgorithmParameters::new(),
            terrain_types: Vec::new(),
            entities: Vec::new(),
            visual_theme: VisualTheme::default(),
            gameplay: GameplayConfig::default(),
        }
    }
}

/// Request to place `count` entities of one kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRequest {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub count: u32,
    /// Minimum distance to every other entity, on top of the type's own rule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_distance: Option<f64>,
    /// Maximum distance to the nearest player, when a player is placed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_distance_from_player: Option<f64>,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

impl EntityRequest {
    pub fn new(entity_type: EntityType, count: u32) -> Self {
        Self {
            entity_type,
            count,
            min_distance: None,
            max_distance_from_player: None,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_min_distance(mut self, distance: f64) -> Self {
        self.min_distance = Some(distance);
        self
    }

    pub fn with_max_distance_from_player(mut self, distance: f64) -> Self {
        self.max_distance_from_player = Some(distance);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    fn validate(&self) -> Result<(), DomainError> {
        if self.count > GenerationConfig::MAX_ENTITY_COUNT {
            return Err(DomainError::validation(format!(
                "{} count must be at most {}, got {}",
                self.entity_type,
                GenerationConfig::MAX_ENTITY_COUNT,
                self.count
            )));
        }
        if let Some(distance) = self.min_distance {
            if !distance.is_finite() || distance < 0.0 {
                return Err(DomainError::validation(format!(
                    "{} minDistance must be a non-negative number",
                    self.entity_type
                )));
            }
        }
        if let Some(distance) = self.max_distance_from_player {
            if !distance.is_finite() || distance <= 0.0 {
                return Err(DomainError::validation(format!(
                    "{} maxDistanceFromPlayer must be a positive number",
                    self.entity_type
                )));
            }
        }
        Ok(())
    }
}

/// Visual theme settings, opaque to generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VisualTheme {
    pub theme_name: String,
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

impl Default for VisualTheme {
    fn default() -> Self {
        Self {
            theme_name: "Default".to_string(),
            extras: Map::new(),
        }
    }
}

/// Gameplay settings, opaque to generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameplayConfig {
    pub difficulty: String,
    pub player_speed: f64,
    /// Seconds
    pub time_limit: u32,
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            difficulty: "normal".to_string(),
            player_speed: 5.0,
            time_limit: 300,
            extras: Map::new(),
        }
    }
}

fn type_error(path: &str, expected: &str, value: &Value) -> DomainError {
    DomainError::validation(format!("{} expects {}, got {}", path, expected, value))
}

fn expect_i64(path: &str, value: &Value) -> Result<i64, DomainError> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| type_error(path, "an integer", value))
}

fn expect_u32(path: &str, value: &Value) -> Result<u32, DomainError> {
    expect_i64(path, value)
        .ok()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| type_error(path, "a non-negative integer", value))
}

fn expect_f64(path: &str, value: &Value) -> Result<f64, DomainError> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|n: &f64| n.is_finite())
    .ok_or_else(|| type_error(path, "a number", value))
}

fn expect_string(path: &str, value: &Value) -> Result<String, DomainError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| type_error(path, "a string", value))
}
