//! Relationship configuration
//!
//! Tunables for eager constraint building, loaded from the environment the
//! same way the rest of elif.rs loads its configuration.

use std::env;

use crate::error::ModelError;

/// Configuration error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {field}: '{value}', expected {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Validation failed for {field}: {reason}")]
    ValidationFailed { field: String, reason: String },
}

impl From<ConfigError> for ModelError {
    fn from(err: ConfigError) -> Self {
        ModelError::Configuration(err.to_string())
    }
}

/// Relationship behaviour configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationConfig {
    /// Drop repeated parent keys from batch `IN` constraints, keeping the
    /// first occurrence of each
    pub deduplicate_eager_keys: bool,
    /// Upper bound on the number of keys in one batch constraint
    pub max_eager_keys: Option<usize>,
    /// Emit a warning when fetched related models carry a null foreign key
    pub warn_on_null_foreign_keys: bool,
}

impl Default for RelationConfig {
    fn default() -> Self {
        Self {
            deduplicate_eager_keys: true,
            max_eager_keys: None,
            warn_on_null_foreign_keys: true,
        }
    }
}

impl RelationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    ///
    /// Reads `ELIF_RELATIONS_DEDUPLICATE_KEYS`, `ELIF_RELATIONS_MAX_EAGER_KEYS`
    /// and `ELIF_RELATIONS_WARN_NULL_FOREIGN_KEYS`; unset variables keep their
    /// defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new();

        if let Ok(value) = env::var("ELIF_RELATIONS_DEDUPLICATE_KEYS") {
            config.deduplicate_eager_keys = parse_bool("deduplicate_eager_keys", &value)?;
        }

        if let Ok(value) = env::var("ELIF_RELATIONS_MAX_EAGER_KEYS") {
            config.max_eager_keys = if value.trim().is_empty() {
                None
            } else {
                Some(value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    field: "max_eager_keys".to_string(),
                    value: value.clone(),
                    expected: "a positive integer".to_string(),
                })?)
            };
        }

        if let Ok(value) = env::var("ELIF_RELATIONS_WARN_NULL_FOREIGN_KEYS") {
            config.warn_on_null_foreign_keys = parse_bool("warn_on_null_foreign_keys", &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_eager_keys == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "max_eager_keys".to_string(),
                reason: "must be greater than zero when set".to_string(),
            });
        }
        Ok(())
    }

    pub fn with_deduplicated_keys(mut self, deduplicate: bool) -> Self {
        self.deduplicate_eager_keys = deduplicate;
        self
    }

    pub fn with_max_eager_keys(mut self, max: usize) -> Self {
        self.max_eager_keys = Some(max);
        self
    }
}

fn parse_bool(field: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            expected: "true or false".to_string(),
        }),
    }
}
