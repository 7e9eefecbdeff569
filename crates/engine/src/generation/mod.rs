//! Level generation: terrain strategies, entity placement and the pipeline
//! that combines them into a `Level`.

pub mod pipeline;
pub mod placement;
pub mod terrain;

use std::time::Duration;

use levelforge_domain::DomainError;

pub use pipeline::GenerationPipeline;
pub use placement::{EntityPlacer, PlacementRegistry, PlacementRule};
pub use terrain::{TerrainGenerator, TerrainRegistry};

/// Errors from building a single level.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerationError {
    #[error("Unknown terrain algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] DomainError),

    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Generation panicked: {0}")]
    Panicked(String),

    #[error("Generation failed: {0}")]
    Failed(String),
}
