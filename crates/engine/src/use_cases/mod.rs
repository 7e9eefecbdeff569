//! Use cases - User story orchestration.
//!
//! Each module contains use cases for a specific area. Use cases orchestrate
//! the generation pipeline and the job store to fulfil a request.

pub mod batch;
pub mod generate;
pub mod jobs;

pub use batch::BatchUseCases;
pub use generate::GenerateLevel;
pub use jobs::JobManager;
