//! Engine configuration
//!
//! Configuration is immutable after construction and applies to every
//! factory built against it. Toggles here change strategy selection only,
//! never query results.

use serde::{Deserialize, Serialize};

/// Configuration for the scan engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Whether factories may use per-frame bitmap indexes.
    ///
    /// Disabling this forces the unindexed row walk everywhere; results
    /// are identical either way.
    pub indexed_scan_enabled: bool,
    /// Initial capacity hint for the target key set scratch.
    pub target_key_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            indexed_scan_enabled: true,
            target_key_capacity: 16,
        }
    }
}

impl EngineConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration with indexed scans disabled (baseline).
    pub fn unindexed() -> Self {
        Self {
            indexed_scan_enabled: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_enables_indexes() {
        let config = EngineConfig::default();
        assert!(config.indexed_scan_enabled);
    }

    #[test]
    fn test_unindexed_baseline() {
        let config = EngineConfig::unindexed();
        assert!(!config.indexed_scan_enabled);
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = EngineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.indexed_scan_enabled, config.indexed_scan_enabled);
        assert_eq!(back.target_key_capacity, config.target_key_capacity);
    }
}
