//! # LevelForge Domain Types
//!
//! Shared vocabulary types: tiles, entity kinds and job states.
//!
//! ## Design Principles
//!
//! 1. **Pure data types** - No I/O, no async, no side effects
//! 2. **Serializable** - All types derive Serialize/Deserialize

// Terrain types
mod tile;
pub use tile::{TileGrid, TileType};

// Entity types
mod entity_type;
pub use entity_type::EntityType;

// Job types
mod job_status;
pub use job_status::{JobKind, JobStatus};
