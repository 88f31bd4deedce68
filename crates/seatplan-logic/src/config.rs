//! Allocation settings supplied by the caller.
//!
//! The ingestion side fills an [`AllocationConfig`] (typically from a saved
//! settings file) and hands it to the orchestrator together with the roster.
//! Partition-keyed settings live in explicit tables with a documented
//! fallback instead of silently coercing missing keys:
//!
//! - [`PrefixTable`]: partition prefix → `default` → [`AllocationError::MissingPrefix`]
//! - [`QuotaTable`]: partition minimum → `default` (0 disables quotas)
//!
//! ```
//! use seatplan_logic::config::{validate_config, AllocationConfig};
//!
//! let mut config = AllocationConfig::default();
//! config.capacity = 30;
//! config.quotas.by_partition.insert("Grade 1".into(), 4);
//! assert!(validate_config(&config).is_empty());
//! assert_eq!(config.quotas.min_for("Grade 1"), 4);
//! assert_eq!(config.quotas.min_for("Grade 2"), 0);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CAPACITY, DEFAULT_PREFIX, GRID_WIDTH, MAX_CAPACITY, MIN_CAPACITY};
use crate::error::{AllocationError, Result};

/// What to do with members left over after filling full rooms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizingStrategy {
    /// Fold a small remainder into the last full room.
    #[default]
    PackLast,
    /// The remainder always gets a room of its own.
    SeparateRemainder,
    /// Spread everyone evenly; sizes differ by at most one.
    Average,
}

/// Identity prefixes per partition with a default fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefixTable {
    pub default: Option<String>,
    pub by_partition: BTreeMap<String, String>,
}

impl PrefixTable {
    pub fn with_default(prefix: impl Into<String>) -> Self {
        Self {
            default: Some(prefix.into()),
            by_partition: BTreeMap::new(),
        }
    }

    /// Prefix for `partition`, falling back to the default.
    pub fn resolve(&self, partition: &str) -> Result<&str> {
        self.by_partition
            .get(partition)
            .or(self.default.as_ref())
            .map(String::as_str)
            .ok_or_else(|| AllocationError::MissingPrefix(partition.to_string()))
    }
}

/// Minimum members per group per room, keyed by partition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaTable {
    /// Used for partitions without an entry. Zero disables quotas.
    pub default: u32,
    pub by_partition: BTreeMap<String, u32>,
}

impl QuotaTable {
    pub fn min_for(&self, partition: &str) -> u32 {
        self.by_partition
            .get(partition)
            .copied()
            .unwrap_or(self.default)
    }
}

/// Everything the orchestrator needs besides the roster and the RNG.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    /// Target members per room.
    pub capacity: u32,
    pub strategy: SizingStrategy,
    /// Seating chart columns.
    pub grid_width: u32,
    pub prefixes: PrefixTable,
    pub quotas: QuotaTable,
    /// Output order for partitions; unlisted partitions follow in encounter order.
    pub partition_order: Vec<String>,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            strategy: SizingStrategy::PackLast,
            grid_width: GRID_WIDTH,
            prefixes: PrefixTable::with_default(DEFAULT_PREFIX),
            quotas: QuotaTable::default(),
            partition_order: Vec::new(),
        }
    }
}

/// Validate a config, returning every problem found.
///
/// Prefix gaps are only detectable against a roster, so they are checked by
/// the orchestrator once partitions are known.
pub fn validate_config(config: &AllocationConfig) -> Vec<AllocationError> {
    let mut errors = Vec::new();

    if !(MIN_CAPACITY..=MAX_CAPACITY).contains(&config.capacity) {
        errors.push(AllocationError::InvalidCapacity(config.capacity));
    }
    if config.grid_width == 0 {
        errors.push(AllocationError::InvalidGridWidth(config.grid_width));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AllocationConfig::default()).is_empty());
    }

    #[test]
    fn test_capacity_bounds() {
        let mut config = AllocationConfig::default();
        config.capacity = 0;
        assert_eq!(
            validate_config(&config),
            vec![AllocationError::InvalidCapacity(0)]
        );
        config.capacity = 73;
        assert_eq!(
            validate_config(&config),
            vec![AllocationError::InvalidCapacity(73)]
        );
        config.capacity = 72;
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn test_reports_all_errors() {
        let config = AllocationConfig {
            capacity: 0,
            grid_width: 0,
            ..AllocationConfig::default()
        };
        assert_eq!(validate_config(&config).len(), 2);
    }

    #[test]
    fn test_prefix_fallback() {
        let mut prefixes = PrefixTable::with_default("S");
        prefixes.by_partition.insert("Grade 1".into(), "G1".into());
        assert_eq!(prefixes.resolve("Grade 1"), Ok("G1"));
        assert_eq!(prefixes.resolve("Grade 9"), Ok("S"));

        prefixes.default = None;
        assert_eq!(
            prefixes.resolve("Grade 9"),
            Err(AllocationError::MissingPrefix("Grade 9".into()))
        );
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: AllocationConfig = serde_json::from_str(
            r#"{"capacity": 30, "strategy": "Average", "quotas": {"default": 3}}"#,
        )
        .unwrap();
        assert_eq!(config.capacity, 30);
        assert_eq!(config.strategy, SizingStrategy::Average);
        assert_eq!(config.grid_width, GRID_WIDTH);
        assert_eq!(config.quotas.min_for("anything"), 3);
        assert_eq!(config.prefixes.resolve("x"), Ok(DEFAULT_PREFIX));
    }
}
