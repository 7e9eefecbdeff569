//! LevelForge domain.
//!
//! Pure types and invariants for level generation: the tile grid, generation
//! configuration, batch expansion and the generation job state machine. No
//! I/O, randomness or clock access happens here; callers pass time in.

pub mod entities;
pub mod error;
pub mod ids;
pub mod types;
pub mod value_objects;

pub use entities::{
    BatchItemResult, BatchResult, JobMetadata, JobRecord, JobResult, Level, LevelMetadata,
    PlacedEntity,
};

pub use error::DomainError;

pub use ids::JobId;

pub use types::{EntityType, JobKind, JobStatus, TileGrid, TileType};

pub use value_objects::{
    AlgorithmParameters, BatchItem, BatchRequest, ConfigVariation, EntityRequest,
    GameplayConfig, GenerationConfig, Position, VisualTheme,
};
