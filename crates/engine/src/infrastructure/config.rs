//! Engine configuration loaded from environment variables.
//!
//! Supported environment variables (all optional):
//! - LEVELFORGE_SINGLE_JOB_TTL_SECS: lifetime of single-level job records (default 3600)
//! - LEVELFORGE_BATCH_JOB_TTL_SECS: lifetime of batch job records (default 7200)
//! - LEVELFORGE_ITEM_TIMEOUT_SECS: per-level generation timeout (default 30)
//! - LEVELFORGE_SWEEP_INTERVAL_SECS: expired record sweep interval (default 60)
//! - LEVELFORGE_LEVEL_CACHE_TTL_SECS: generated level cache lifetime (default 600)
//! - LEVELFORGE_LEVEL_CACHE_CAPACITY: generated level cache size (default 256)
//! - LEVELFORGE_MAX_BATCH_ITEMS: largest accepted expanded batch (default 1000)

use std::str::FromStr;
use std::time::Duration;

use levelforge_domain::JobKind;

/// Runtime settings for the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub single_job_ttl: Duration,
    pub batch_job_ttl: Duration,
    pub item_timeout: Duration,
    pub sweep_interval: Duration,
    pub level_cache_ttl: Duration,
    pub level_cache_capacity: usize,
    pub max_batch_items: usize,
    /// Progress reported once a batch is expanded and about to run
    pub progress_floor: u8,
    /// Progress reported after the last item, before completion
    pub progress_ceiling: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            single_job_ttl: Duration::from_secs(3600),
            batch_job_ttl: Duration::from_secs(7200),
            item_timeout: Duration::from_secs(30),
            sweep_interval: Duration::from_secs(60),
            level_cache_ttl: Duration::from_secs(600),
            level_cache_capacity: 256,
            max_batch_items: 1000,
            progress_floor: 10,
            progress_ceiling: 95,
        }
    }
}

impl EngineConfig {
    /// Load from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup; missing or invalid values keep
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let secs = |key: &str, default: Duration| {
            parse_var(&lookup, key, default.as_secs()).map_or(default, Duration::from_secs)
        };

        Self {
            single_job_ttl: secs("LEVELFORGE_SINGLE_JOB_TTL_SECS", defaults.single_job_ttl),
            batch_job_ttl: secs("LEVELFORGE_BATCH_JOB_TTL_SECS", defaults.batch_job_ttl),
            item_timeout: secs("LEVELFORGE_ITEM_TIMEOUT_SECS", defaults.item_timeout),
            sweep_interval: secs("LEVELFORGE_SWEEP_INTERVAL_SECS", defaults.sweep_interval),
            level_cache_ttl: secs("LEVELFORGE_LEVEL_CACHE_TTL_SECS", defaults.level_cache_ttl),
            level_cache_capacity: parse_var(
                &lookup,
                "LEVELFORGE_LEVEL_CACHE_CAPACITY",
                defaults.level_cache_capacity,
            )
            .unwrap_or(defaults.level_cache_capacity),
            max_batch_items: parse_var(
                &lookup,
                "LEVELFORGE_MAX_BATCH_ITEMS",
                defaults.max_batch_items,
            )
            .unwrap_or(defaults.max_batch_items),
            ..defaults
        }
    }

    /// Record lifetime for a job of the given kind.
    pub fn job_ttl(&self, kind: JobKind) -> Duration {
        match kind {
            JobKind::Single => self.single_job_ttl,
            JobKind::Batch => self.batch_job_ttl,
        }
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Option<T>
where
    T: FromStr + Copy + PartialOrd + Default + std::fmt::Display,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => {
            tracing::info!(key, %value, "Applied environment override");
            Some(value)
        }
        Ok(_) => {
            tracing::warn!(key, %default, "Value must be positive, using default");
            None
        }
        Err(_) => {
            tracing::warn!(key, val = %raw, %default, "Not a valid number, using default");
            None
        }
    }
}
