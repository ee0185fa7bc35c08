//! Configuration for the Extractor

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum document text length (characters)
    pub max_text_length: usize,

    /// Candidates per verification call
    pub verify_batch_size: usize,

    /// Entity pairs per classification call
    pub pair_batch_size: usize,

    /// Maximum time for a single oracle call (seconds)
    pub oracle_timeout_secs: u64,

    /// Retries after a failed oracle call (0 = fail on first error)
    pub max_retries: u32,

    /// Delay before the first retry (milliseconds); doubles on each retry
    pub retry_backoff_ms: u64,

    /// Upper bound for the retry delay (milliseconds)
    pub max_backoff_ms: u64,
}

impl ExtractorConfig {
    /// Get the oracle timeout as a Duration
    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_secs(self.oracle_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_text_length == 0 {
            return Err("max_text_length must be greater than 0".to_string());
        }
        if self.verify_batch_size == 0 {
            return Err("verify_batch_size must be greater than 0".to_string());
        }
        if self.pair_batch_size == 0 {
            return Err("pair_batch_size must be greater than 0".to_string());
        }
        if self.oracle_timeout_secs == 0 {
            return Err("oracle_timeout_secs must be greater than 0".to_string());
        }
        if self.retry_backoff_ms > self.max_backoff_ms {
            return Err("retry_backoff_ms cannot exceed max_backoff_ms".to_string());
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    /// Default configuration: verification batches of 10, pair batches of 20
    fn default() -> Self {
        Self {
            max_text_length: 200_000,
            verify_batch_size: 10,
            pair_batch_size: 20,
            oracle_timeout_secs: 120,
            max_retries: 2,
            retry_backoff_ms: 1_000,
            max_backoff_ms: 30_000,
        }
    }
}

impl ExtractorConfig {
    /// Thorough preset: smaller batches and more patience per call
    pub fn thorough() -> Self {
        Self {
            max_text_length: 200_000,
            verify_batch_size: 5,
            pair_batch_size: 10,
            oracle_timeout_secs: 300,
            max_retries: 4,
            retry_backoff_ms: 2_000,
            max_backoff_ms: 60_000,
        }
    }

    /// Fast preset: larger batches, fewer oracle calls, fail quickly
    pub fn fast() -> Self {
        Self {
            max_text_length: 100_000,
            verify_batch_size: 20,
            pair_batch_size: 40,
            oracle_timeout_secs: 60,
            max_retries: 1,
            retry_backoff_ms: 500,
            max_backoff_ms: 5_000,
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.verify_batch_size, 10);
        assert_eq!(config.pair_batch_size, 20);
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(ExtractorConfig::thorough().validate().is_ok());
        assert!(ExtractorConfig::fast().validate().is_ok());
    }

    #[test]
    fn test_zero_batch_sizes_rejected() {
        let mut config = ExtractorConfig::default();
        config.verify_batch_size = 0;
        assert!(config.validate().is_err());

        let mut config = ExtractorConfig::default();
        config.pair_batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_backoff_bounds() {
        let mut config = ExtractorConfig::default();
        config.retry_backoff_ms = config.max_backoff_ms + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractorConfig::thorough();
        let toml_str = config.to_toml().unwrap();
        let parsed = ExtractorConfig::from_toml(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed = ExtractorConfig::from_toml("verify_batch_size = 4\n").unwrap();
        assert_eq!(parsed.verify_batch_size, 4);
        assert_eq!(parsed.pair_batch_size, 20);
        assert_eq!(parsed.max_retries, 2);
    }
}
