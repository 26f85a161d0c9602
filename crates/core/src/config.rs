//! Engine configuration.
//!
//! ```json
//! {
//!   "discovery": { "max_depth": 2 },
//!   "filter": { "on_error": "fallback", "fallback": false }
//! }
//! ```
//!
//! Every key is optional. Unknown keys are rejected.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub discovery: DiscoveryConfig,
    pub filter: FilterConfig,
}

impl EngineConfig {
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ConfigError> {
        Ok(EngineConfig::deserialize(value)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscoveryConfig {
    /// How many record levels below the root field discovery descends.
    pub max_depth: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        DiscoveryConfig { max_depth: 1 }
    }
}

/// What a compiled filter does when an operation fails on a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Return the error to the caller.
    #[default]
    Propagate,
    /// Log it and treat the record as `fallback`.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    pub on_error: ErrorPolicy,
    pub fallback: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        FilterConfig {
            on_error: ErrorPolicy::Propagate,
            fallback: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_object_gives_defaults() {
        let config = EngineConfig::from_json(&json!({})).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.discovery.max_depth, 1);
        assert_eq!(config.filter.on_error, ErrorPolicy::Propagate);
        assert!(config.filter.fallback);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = EngineConfig::from_json(&json!({
            "filter": { "on_error": "fallback" }
        }))
        .unwrap();
        assert_eq!(config.filter.on_error, ErrorPolicy::Fallback);
        assert!(config.filter.fallback);
        assert_eq!(config.discovery.max_depth, 1);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(EngineConfig::from_json(&json!({ "discovery": { "depth": 3 } })).is_err());
        assert!(EngineConfig::from_json(&json!({ "extra": true })).is_err());
    }
}
