//! Motion vector configuration

use serde::{Deserialize, Serialize};

use crate::config::{Config, ConfigError};

/// Shader parameter names the three matrices are published under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterNames {
    /// Key for the previous tick's model matrix
    pub previous_model: String,
    /// Key for the inverse of the current model matrix
    pub current_inverse_model: String,
    /// Key for the current model matrix
    pub current_model: String,
}

impl Default for ParameterNames {
    fn default() -> Self {
        Self {
            previous_model: "PreviousFrameModelMatrix".to_string(),
            current_inverse_model: "CurrentFrameInverseModelMatrix".to_string(),
            current_model: "CurrentFrameModelMatrix".to_string(),
        }
    }
}

impl ParameterNames {
    /// The three keys in publishing order
    pub fn as_array(&self) -> [&str; 3] {
        [
            &self.previous_model,
            &self.current_inverse_model,
            &self.current_model,
        ]
    }
}

/// What to publish as the inverse when the current model matrix is singular
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SingularInversePolicy {
    /// Publish the unguarded (non-finite) result
    #[default]
    Propagate,
    /// Publish the identity matrix instead
    Identity,
    /// Leave the inverse parameter untouched for this tick
    SkipWrite,
}

/// Settings for frame matrix trackers
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionVectorConfig {
    /// Handling of singular current matrices
    pub singular_inverse: SingularInversePolicy,
    /// Log the previous model matrix on every tick (debug level)
    pub log_published: bool,
    /// Shader parameter names
    pub parameters: ParameterNames,
}

impl MotionVectorConfig {
    /// Builder pattern: Set the singular inverse policy
    #[must_use]
    pub fn with_singular_inverse(mut self, policy: SingularInversePolicy) -> Self {
        self.singular_inverse = policy;
        self
    }

    /// Builder pattern: Set the parameter names
    #[must_use]
    pub fn with_parameters(mut self, parameters: ParameterNames) -> Self {
        self.parameters = parameters;
        self
    }

    /// Builder pattern: Enable per-tick logging
    #[must_use]
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.log_published = enabled;
        self
    }
}

impl Config for MotionVectorConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let keys = self.parameters.as_array();

        if keys.iter().any(|key| key.trim().is_empty()) {
            return Err(ConfigError::Invalid("shader parameter names must not be empty".to_string()));
        }

        for (i, key) in keys.iter().enumerate() {
            if keys[i + 1..].contains(key) {
                return Err(ConfigError::Invalid(format!("shader parameter name '{key}' is used twice")));
            }
        }

        Ok(())
    }
}
