//! Value objects - Immutable objects defined by their attributes

mod batch;
mod generation_config;
mod position;

// Generation configuration
pub use generation_config::{AlgorithmParameters, EntityRequest, GameplayConfig, GenerationConfig, VisualTheme};

// Batch expansion
pub use batch::{BatchItem, BatchRequest, ConfigVariation};

pub use position::Position;
