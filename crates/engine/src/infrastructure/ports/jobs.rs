//! Job store and background execution ports.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use levelforge_domain::{DomainError, JobId, JobRecord};

use super::error::JobStoreError;

/// Read-modify-write step applied atomically to one stored record.
///
/// Returning an error leaves the stored record untouched.
pub type JobMutation = Box<dyn FnOnce(&mut JobRecord) -> Result<(), DomainError> + Send>;

/// Key-value store of job records with per-record expiry.
///
/// All operations on one job id are linearizable: a mutation observes every
/// mutation that completed before it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Store `record` unless a live record with the same id exists.
    ///
    /// Returns `false` when the id was taken. The TTL counts from the last
    /// write and is refreshed by every successful `update`.
    async fn insert_if_absent(&self, record: JobRecord, ttl: Duration) -> Result<bool, JobStoreError>;

    async fn get(&self, id: JobId) -> Result<Option<JobRecord>, JobStoreError>;

    /// Apply `mutation` to the live record and return the updated copy.
    async fn update(&self, id: JobId, mutation: JobMutation) -> Result<JobRecord, JobStoreError>;

    /// All live records, newest first.
    async fn list(&self) -> Result<Vec<JobRecord>, JobStoreError>;

    /// Drop expired records and return how many were removed.
    async fn purge_expired(&self) -> Result<usize, JobStoreError>;
}

/// Fire-and-forget background execution.
///
/// No ordering is guaranteed between spawned tasks.
pub trait TaskSpawner: Send + Sync {
    fn spawn(&self, task: BoxFuture<'static, ()>);
}
