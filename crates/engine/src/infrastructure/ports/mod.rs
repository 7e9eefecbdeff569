//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Job state storage (could swap the in-memory map -> Redis)
//! - Background execution (could swap tokio tasks -> a worker pool)
//! - Clock (for testing)

mod error;
mod jobs;
mod testing;

pub use error::JobStoreError;

// =============================================================================
// Job Ports
// =============================================================================
pub use jobs::{JobMutation, JobStore, TaskSpawner};

#[cfg(test)]
pub use jobs::MockJobStore;

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::ClockPort;

#[cfg(test)]
pub use testing::MockClockPort;
