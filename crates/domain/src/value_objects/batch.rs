//! Batch requests and their combinatorial expansion
//!
//! A batch is a base configuration, a list of parameter variations and a
//! replica count. Expansion takes the Cartesian product of the variation
//! values in declaration order (the last variation changes fastest) and emits
//! `count` replicas of every combination. Replica `i` gets `seed + i`; the
//! seed never depends on the variation index, so replicas with the same index
//! share terrain when the varied parameter does not affect the algorithm.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DomainError;
use crate::value_objects::GenerationConfig;

/// A configuration parameter with its candidate values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigVariation {
    /// Dotted parameter path, e.g. `gameplay.timeLimit`
    #[serde(alias = "parameterPath", alias = "parameterName")]
    pub parameter: String,
    pub values: Vec<Value>,
}

impl ConfigVariation {
    pub fn new(parameter: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            parameter: parameter.into(),
            values,
        }
    }
}

/// Request to generate many levels from one base configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    pub base_config: GenerationConfig,
    #[serde(default)]
    pub variations: Vec<ConfigVariation>,
    /// Replicas per variation combination
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

fn default_count() -> u32 {
    1
}

impl BatchRequest {
    /// Largest accepted replica count
    pub const MAX_COUNT: u32 = 100;
    /// Largest accepted expansion size
    pub const MAX_TOTAL_ITEMS: usize = 10_000;

    pub fn new(base_config: GenerationConfig, count: u32) -> Self {
        Self {
            base_config,
            variations: Vec::new(),
            count,
            session_id: None,
        }
    }

    pub fn with_variation(mut self, variation: ConfigVariation) -> Self {
        self.variations.push(variation);
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Number of items `expand` produces:
    /// `count × ∏ len(values)`, saturating instead of overflowing.
    pub fn total_items(&self) -> usize {
        self.variations
            .iter()
            .fold(self.count as usize, |total, variation| {
                total.saturating_mul(variation.values.len())
            })
    }

    /// Check the request before a job is created for it.
    ///
    /// Every variation value is applied to a copy of the base configuration
    /// and the result validated, so a bad value is reported up front instead
    /// of failing items one by one later.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.count == 0 || self.count > Self::MAX_COUNT {
            return Err(DomainError::validation(format!(
                "count must be between 1 and {}, got {}",
                Self::MAX_COUNT,
                self.count
            )));
        }
        self.base_config.validate()?;
        self.ensure_total_within_bound()?;

        for variation in &self.variations {
            if !GenerationConfig::is_known_parameter(&variation.parameter) {
                return Err(DomainError::unknown_parameter(&variation.parameter));
            }
            if variation.values.is_empty() {
                return Err(DomainError::validation(format!(
                    "variation {} has no values",
                    variation.parameter
                )));
            }
            for value in &variation.values {
                let mut candidate = self.base_config.clone();
                candidate.apply_parameter(&variation.parameter, value)?;
                candidate.validate()?;
            }
        }
        Ok(())
    }

    /// Expand into the ordered list of concrete items.
    pub fn expand(&self) -> Result<Vec<BatchItem>, DomainError> {
        self.ensure_total_within_bound()?;
        let mut items = Vec::with_capacity(self.total_items());

        if self.variations.is_empty() {
            self.push_replicas(&mut items, &self.base_config, 0);
            return Ok(items);
        }

        let radices: Vec<usize> = self.variations.iter().map(|v| v.values.len()).collect();
        if let Some(empty) = self.variations.iter().find(|v| v.values.is_empty()) {
            return Err(DomainError::validation(format!(
                "variation {} has no values",
                empty.parameter
            )));
        }

        let combinations: usize = radices.iter().product();
        let mut digits = vec![0_usize; radices.len()];

        for variation_index in 0..combinations {
            let mut config = self.base_config.clone();
            for (variation, digit) in self.variations.iter().zip(&digits) {
                config.apply_parameter(&variation.parameter, &variation.values[*digit])?;
            }
            self.push_replicas(&mut items, &config, variation_index as u32);

            // Mixed-radix increment, last variation fastest
            for position in (0..digits.len()).rev() {
                digits[position] += 1;
                if digits[position] < radices[position] {
                    break;
                }
                digits[position] = 0;
            }
        }

        Ok(items)
    }

    fn ensure_total_within_bound(&self) -> Result<(), DomainError> {
        let total = self.total_items();
        if total > Self::MAX_TOTAL_ITEMS {
            return Err(DomainError::validation(format!(
                "batch expands to {} items, at most {} allowed",
                total,
                Self::MAX_TOTAL_ITEMS
            )));
        }
        Ok(())
    }

    fn push_replicas(&self, items: &mut Vec<BatchItem>, config: &GenerationConfig, variation_index: u32) {
        for batch_index in 0..self.count {
            let mut replica = config.clone();
            replica.seed = replica.seed.wrapping_add(i64::from(batch_index));
            items.push(BatchItem {
                config: replica,
                variation_index,
                batch_index,
            });
        }
    }
}

/// One concrete configuration inside an expanded batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    pub config: GenerationConfig,
    pub variation_index: u32,
    pub batch_index: u32,
}
