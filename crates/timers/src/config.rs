//! Configuration types for the timer subsystem
//!
//! Limits here guard decoders against hostile or corrupted input; they never
//! change the wire format.

use crate::error::{Result, TimerError};
use serde::{Deserialize, Serialize};

/// Main timer configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Codec configuration
    #[serde(default)]
    pub codec: CodecConfig,
}

impl TimerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.codec.validate()
    }
}

/// Codec limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Largest namespace string key accepted when decoding, in bytes
    #[serde(default = "default_max_namespace_key_bytes")]
    pub max_namespace_key_bytes: usize,

    /// Largest number of timers accepted in one encoded timer set
    #[serde(default = "default_max_timer_set_len")]
    pub max_timer_set_len: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_namespace_key_bytes: default_max_namespace_key_bytes(),
            max_timer_set_len: default_max_timer_set_len(),
        }
    }
}

impl CodecConfig {
    /// Validate codec configuration
    pub fn validate(&self) -> Result<()> {
        // "//" is the shortest key a window namespace can have
        if self.max_namespace_key_bytes < 2 {
            return Err(TimerError::Configuration {
                source: "max_namespace_key_bytes must be at least 2".into(),
            });
        }

        if self.max_timer_set_len == 0 {
            return Err(TimerError::Configuration {
                source: "max_timer_set_len must be greater than 0".into(),
            });
        }

        Ok(())
    }
}

fn default_max_namespace_key_bytes() -> usize {
    64 * 1024
}

fn default_max_timer_set_len() -> usize {
    1 << 20
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = TimerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.codec.max_namespace_key_bytes, 65_536);
        assert_eq!(config.codec.max_timer_set_len, 1_048_576);
    }

    #[test]
    fn test_config_from_json_uses_defaults() {
        let config: TimerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, TimerConfig::default());

        let config: TimerConfig =
            serde_json::from_str(r#"{"codec": {"max_timer_set_len": 10}}"#).unwrap();
        assert_eq!(config.codec.max_timer_set_len, 10);
        assert_eq!(config.codec.max_namespace_key_bytes, 65_536);
    }

    #[test]
    fn test_invalid_key_limit() {
        let config = CodecConfig {
            max_namespace_key_bytes: 1,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, TimerError::Configuration { .. }));
        assert!(err.to_string().contains("max_namespace_key_bytes"));
    }

    #[test]
    fn test_invalid_timer_set_limit() {
        let config = TimerConfig {
            codec: CodecConfig {
                max_timer_set_len: 0,
                ..Default::default()
            },
        };
        assert!(config.validate().is_err());
    }
}
