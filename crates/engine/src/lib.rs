//! LevelForge Engine library.
//!
//! Procedural level generation with asynchronous, cancellable batch jobs.
//!
//! ## Structure
//!
//! - `generation/` - Terrain strategies, entity placement and the level pipeline
//! - `use_cases/` - Single-level and batch generation, job lifecycle
//! - `infrastructure/` - Port traits and their in-process implementations
//! - `app` - Application composition

pub mod app;
pub mod generation;
pub mod infrastructure;
pub mod use_cases;

/// Test fixtures shared by unit and end-to-end tests.
#[cfg(test)]
pub mod test_fixtures;

/// End-to-end tests running whole jobs in-process.
#[cfg(test)]
mod e2e_tests;

pub use app::App;
