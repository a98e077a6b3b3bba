//! Access manager configuration.

use serde::{Deserialize, Serialize};

/// Default number of restricted slots.
pub const DEFAULT_MAX_RESTRICTED_SLOTS: u64 = 100;

/// Access manager configuration. Fixed for the lifetime of a manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AccessConfig {
    /// Maximum number of connected peers without any channel (default: 100).
    pub max_restricted_slots: u64,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            max_restricted_slots: DEFAULT_MAX_RESTRICTED_SLOTS,
        }
    }
}

impl AccessConfig {
    pub fn with_max_restricted_slots(mut self, slots: u64) -> Self {
        self.max_restricted_slots = slots;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AccessConfig::default();
        assert_eq!(config.max_restricted_slots, DEFAULT_MAX_RESTRICTED_SLOTS);
        assert_eq!(config.with_max_restricted_slots(3).max_restricted_slots, 3);
    }

    #[test]
    fn test_from_toml() {
        let config: AccessConfig = toml::from_str("max-restricted-slots = 25").unwrap();
        assert_eq!(config.max_restricted_slots, 25);

        // Missing keys fall back to defaults.
        let config: AccessConfig = toml::from_str("").unwrap();
        assert_eq!(config, AccessConfig::default());
    }
}
