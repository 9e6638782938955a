//! Codec configuration.
//!
//! Every [`Packer`](crate::raw::Packer), [`Unpacker`](crate::raw::Unpacker) and
//! JSON parse carries a [`CodecConfig`]. There is no process-wide limit: a
//! caller that needs a tighter bound builds its own config and passes it in.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::{
    ENV_MAX_ARRAY_ELEMENTS, ENV_MAX_RECURSION_DEPTH, MAX_NUM_ARRAY_ELEMENTS, MAX_RECURSION_DEPTH,
};
use crate::error::{FcError, Result};

/// Limits applied while encoding and decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Maximum element count or byte length of any container, string or blob
    pub max_num_array_elements: usize,
    /// Maximum nesting depth of a parsed variant tree
    pub max_recursion_depth: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_num_array_elements: MAX_NUM_ARRAY_ELEMENTS,
            max_recursion_depth: MAX_RECURSION_DEPTH,
        }
    }
}

impl CodecConfig {
    /// Creates a config with the default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the container size limit.
    pub fn with_max_array_elements(mut self, max: usize) -> Self {
        self.max_num_array_elements = max;
        self
    }

    /// Sets the variant nesting limit.
    pub fn with_max_recursion_depth(mut self, max: usize) -> Self {
        self.max_recursion_depth = max;
        self
    }

    /// Loads limits from the environment, falling back to defaults.
    ///
    /// A `.env` file in the working directory is read first. Values that do not
    /// parse as a positive integer are ignored with a warning.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let defaults = Self::default();
        let config = Self {
            max_num_array_elements: env_limit(ENV_MAX_ARRAY_ELEMENTS)
                .unwrap_or(defaults.max_num_array_elements),
            max_recursion_depth: env_limit(ENV_MAX_RECURSION_DEPTH)
                .unwrap_or(defaults.max_recursion_depth),
        };

        debug!(
            max_num_array_elements = config.max_num_array_elements,
            max_recursion_depth = config.max_recursion_depth,
            "Loaded codec config"
        );
        config
    }

    /// Fails with [`FcError::BoundViolation`] if `count` exceeds the array limit.
    pub fn check_count(&self, what: &'static str, count: u64) -> Result<usize> {
        if count > self.max_num_array_elements as u64 {
            return Err(FcError::BoundViolation {
                what,
                count,
                max: self.max_num_array_elements,
            });
        }
        Ok(count as usize)
    }
}

fn env_limit(name: &str) -> Option<usize> {
    let raw = std::env::var(name).ok()?;
    match parse_limit(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(var = name, value = %raw, error = %e, "Ignoring invalid limit");
            None
        }
    }
}

fn parse_limit(raw: &str) -> Result<usize> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Err(FcError::ConfigError("limit must be positive".into())),
        Ok(v) => Ok(v),
        Err(e) => Err(FcError::ConfigError(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let config = CodecConfig::default();
        assert_eq!(config.max_num_array_elements, MAX_NUM_ARRAY_ELEMENTS);
        assert_eq!(config.max_recursion_depth, MAX_RECURSION_DEPTH);
    }

    #[test]
    fn test_builders() {
        let config = CodecConfig::new()
            .with_max_array_elements(16)
            .with_max_recursion_depth(4);
        assert_eq!(config.max_num_array_elements, 16);
        assert_eq!(config.max_recursion_depth, 4);
    }

    #[test]
    fn test_check_count() {
        let config = CodecConfig::new().with_max_array_elements(3);
        assert_eq!(config.check_count("vector", 3).unwrap(), 3);

        let err = config.check_count("vector", 4).unwrap_err();
        assert!(err.is_bound_violation());
        assert!(matches!(
            err,
            FcError::BoundViolation { count: 4, max: 3, .. }
        ));
    }

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit(" 42 ").unwrap(), 42);
        assert!(parse_limit("0").is_err());
        assert!(parse_limit("-5").is_err());
        assert!(parse_limit("lots").is_err());
    }

    #[test]
    fn test_serde_fills_missing_fields() {
        let config: CodecConfig =
            serde_json::from_str(r#"{"max_num_array_elements": 10}"#).unwrap();
        assert_eq!(config.max_num_array_elements, 10);
        assert_eq!(config.max_recursion_depth, MAX_RECURSION_DEPTH);
    }
}
