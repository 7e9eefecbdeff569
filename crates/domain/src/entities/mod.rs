//! Domain entities

mod generation_job;
mod level;

pub use generation_job::{BatchItemResult, BatchResult, JobMetadata, JobRecord, JobResult};
pub use level::{Level, LevelMetadata, PlacedEntity};
