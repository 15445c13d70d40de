//! Policy configuration (shroud.toml)
//!
//! Declarative settings for the policies that can be described without
//! code. Predicates and observers stay in Rust; only key classification and
//! the intercepted operation name live here.
//!
//! ```toml
//! [encapsulation]
//! private_prefixes = ["_"]
//! private_keys = ["password"]
//!
//! [interception]
//! operation = "request"
//! ```

use std::path::Path;
use std::rc::Rc;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::policy::{encapsulation_policy_with, interception_policy, PrivateKeyFilter};
use crate::traps::TrapSet;
use crate::value::Operation;

/// Errors that can occur while loading a policy configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Parsed but semantically invalid
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level policy configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PolicyConfig {
    /// Private-key classification (omit to disable encapsulation)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encapsulation: Option<EncapsulationConfig>,

    /// Operation replacement target (omit to disable interception)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interception: Option<InterceptionConfig>,
}

/// Which keys are private
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EncapsulationConfig {
    /// Keys starting with any of these prefixes are private
    #[serde(default)]
    pub private_prefixes: Vec<String>,

    /// Exact private keys
    #[serde(default)]
    pub private_keys: Vec<String>,
}

/// Which operation to intercept
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InterceptionConfig {
    /// Member name to replace
    pub operation: String,
}

impl PolicyConfig {
    /// Parse from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: PolicyConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded policy config");
        Ok(config)
    }

    /// Serialize back to TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(encapsulation) = &self.encapsulation {
            if encapsulation.private_prefixes.iter().any(|p| p.is_empty()) {
                return Err(ConfigError::Invalid(
                    "empty private prefix would hide every key".to_string(),
                ));
            }
        }
        if let Some(interception) = &self.interception {
            if interception.operation.is_empty() {
                return Err(ConfigError::Invalid(
                    "interception.operation must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl EncapsulationConfig {
    /// Filter classifying keys by prefix or exact name
    pub fn filter(&self) -> PrivateKeyFilter {
        let prefixes = self.private_prefixes.clone();
        let keys: FxHashSet<String> = self.private_keys.iter().cloned().collect();
        Rc::new(move |key: &str| {
            keys.contains(key) || prefixes.iter().any(|prefix| key.starts_with(prefix.as_str()))
        })
    }

    /// Encapsulation trap set for this classification
    pub fn policy(&self) -> TrapSet {
        encapsulation_policy_with(self.filter())
    }
}

impl InterceptionConfig {
    /// Interception trap set serving `replacement` for the configured member
    pub fn policy(&self, replacement: Operation) -> TrapSet {
        interception_policy(self.operation.clone(), replacement)
    }
}
