//! In-memory job store.
//!
//! Records live in a `DashMap`; each one carries its own TTL counted from the
//! last successful write. Expired records are invisible to readers and are
//! physically dropped either lazily on access or by `purge_expired`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use levelforge_domain::{JobId, JobRecord};

use crate::infrastructure::ports::{JobMutation, JobStore, JobStoreError};

struct StoredJob {
    record: JobRecord,
    ttl: Duration,
    touched_at: Instant,
    /// Extra age added by `backdate`, cleared on write.
    #[cfg(test)]
    backdated: Duration,
}

impl StoredJob {
    fn new(record: JobRecord, ttl: Duration) -> Self {
        Self {
            record,
            ttl,
            touched_at: Instant::now(),
            #[cfg(test)]
            backdated: Duration::ZERO,
        }
    }

    fn touch(&mut self) {
        self.touched_at = Instant::now();
        #[cfg(test)]
        {
            self.backdated = Duration::ZERO;
        }
    }

    fn age(&self) -> Duration {
        let age = self.touched_at.elapsed();
        #[cfg(test)]
        let age = age + self.backdated;
        age
    }

    fn is_expired(&self) -> bool {
        self.age() >= self.ttl
    }
}

/// Process-local job store backed by a concurrent map.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: DashMap<JobId, StoredJob>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend the record was last written `by` earlier than it was.
    #[cfg(test)]
    pub fn backdate(&self, id: JobId, by: Duration) {
        if let Some(mut stored) = self.jobs.get_mut(&id) {
            stored.backdated += by;
        }
    }

    fn evict_if_expired(&self, id: &JobId) {
        self.jobs.remove_if(id, |_, stored| stored.is_expired());
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn insert_if_absent(&self, record: JobRecord, ttl: Duration) -> Result<bool, JobStoreError> {
        match self.jobs.entry(record.id()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired() {
                    occupied.insert(StoredJob::new(record, ttl));
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(StoredJob::new(record, ttl));
                Ok(true)
            }
        }
    }

    async fn get(&self, id: JobId) -> Result<Option<JobRecord>, JobStoreError> {
        let live = self
            .jobs
            .get(&id)
            .map(|stored| (!stored.is_expired()).then(|| stored.record.clone()));
        match live {
            Some(Some(record)) => Ok(Some(record)),
            Some(None) => {
                self.evict_if_expired(&id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn update(&self, id: JobId, mutation: JobMutation) -> Result<JobRecord, JobStoreError> {
        {
            let Some(mut stored) = self.jobs.get_mut(&id) else {
                return Err(JobStoreError::NotFound(id));
            };
            if !stored.is_expired() {
                let mut next = stored.record.clone();
                mutation(&mut next)?;
                stored.record = next;
                stored.touch();
                return Ok(stored.record.clone());
            }
        }
        self.evict_if_expired(&id);
        Err(JobStoreError::NotFound(id))
    }

    async fn list(&self) -> Result<Vec<JobRecord>, JobStoreError> {
        let mut records: Vec<JobRecord> = self
            .jobs
            .iter()
            .filter(|stored| !stored.is_expired())
            .map(|stored| stored.record.clone())
            .collect();
        records.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(records)
    }

    async fn purge_expired(&self) -> Result<usize, JobStoreError> {
        let before = self.jobs.len();
        self.jobs.retain(|_, stored| !stored.is_expired());
        Ok(before.saturating_sub(self.jobs.len()))
    }
}
