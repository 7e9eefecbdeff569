//! End-to-end tests running whole jobs through the `App` wiring.
//!
//! Everything runs in-process: in-memory job store, tokio spawner, real
//! generation strategies. Cancellation tests use a gated strategy so the
//! point of cancellation is deterministic.

mod batch_flow_tests;
