//! Infrastructure implementations.
//!
//! Contains port trait implementations and process-level plumbing.

pub mod cache;
pub mod clock;
pub mod config;
pub mod job_store;
pub mod ports;
pub mod spawner;
