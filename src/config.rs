//! Generation configuration

use crate::error::ConfigError;
use crate::identity::IdentityMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for value generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Recursion budget of the construction planner
    pub recursion_depth: u32,

    /// Maximum constructors used per top-level object type
    pub constructor_fan_out: usize,

    /// Lengths offered for arrays without a declared length
    pub array_lengths: Vec<usize>,

    /// Seed for string mutations
    pub mutation_seed: u64,

    /// Executables whose string arguments are worth mutating
    pub string_mutating_operations: Vec<String>,

    /// Identities start right after this value
    pub identity_offset: u64,

    pub identity_mode: IdentityMode,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            recursion_depth: 1,
            constructor_fan_out: 8,
            array_lengths: vec![0, 10],
            mutation_seed: 0,
            string_mutating_operations: [
                "substring",
                "subSequence",
                "substr",
                "slice",
                "replace",
                "trim",
                "strip",
                "split",
            ]
            .iter()
            .map(|name| name.to_string())
            .collect(),
            identity_offset: 0,
            identity_mode: IdentityMode::Reference,
        }
    }
}

impl GenerationConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GenerationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.constructor_fan_out == 0 {
            return Err(ConfigError::Invalid(
                "constructor_fan_out must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_string_mutating(&self, operation: &str) -> bool {
        self.string_mutating_operations.iter().any(|name| name == operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_fields_take_defaults() {
        let config = GenerationConfig::from_json(r#"{"recursion_depth": 3}"#).unwrap();
        assert_eq!(config.recursion_depth, 3);
        assert_eq!(config.constructor_fan_out, 8);
        assert_eq!(config.array_lengths, vec![0, 10]);
        assert!(config.is_string_mutating("substring"));
    }

    #[test]
    fn test_zero_fan_out_is_rejected() {
        let err = GenerationConfig::from_json(r#"{"constructor_fan_out": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"identity_mode": "value", "mutation_seed": 7}}"#).unwrap();

        let config = GenerationConfig::from_path(file.path()).unwrap();
        assert_eq!(config.identity_mode, IdentityMode::Value);
        assert_eq!(config.mutation_seed, 7);
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        let err = GenerationConfig::from_json("{").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
