//! Configuration file parsing for `tidemark.toml`.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::capability::SchemaEvolutionCapability;
use crate::error::{EvolutionError, EvolutionResult};

/// Main configuration structure for `tidemark.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EvolutionConfig {
    /// Schema evolution settings.
    #[serde(default)]
    pub evolution: EvolutionSettings,
}

/// The `[evolution]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EvolutionSettings {
    /// Compare column names case-insensitively.
    #[serde(default)]
    pub ignore_case: bool,

    /// Schema changes the operator allows.
    #[serde(default)]
    pub capabilities: Vec<SchemaEvolutionCapability>,
}

impl EvolutionConfig {
    /// Create an empty configuration: case-sensitive, nothing authorized.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a file.
    pub fn from_file(path: impl AsRef<Path>) -> EvolutionResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| EvolutionError::ConfigIo {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> EvolutionResult<Self> {
        let expanded = expand_env_vars(content);
        Ok(toml::from_str(&expanded)?)
    }

    /// Authorize a capability.
    pub fn with_capability(mut self, capability: SchemaEvolutionCapability) -> Self {
        if !self.evolution.capabilities.contains(&capability) {
            self.evolution.capabilities.push(capability);
        }
        self
    }

    /// Set case-insensitive name matching.
    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.evolution.ignore_case = ignore_case;
        self
    }

    /// The authorized capability set.
    pub fn authorized(&self) -> HashSet<SchemaEvolutionCapability> {
        self.evolution.capabilities.iter().copied().collect()
    }

    /// Check whether a capability is authorized.
    pub fn allows(&self, capability: SchemaEvolutionCapability) -> bool {
        self.evolution.capabilities.contains(&capability)
    }
}

/// Replace `${VAR}` references with environment values. Unset variables are
/// left as written.
fn expand_env_vars(content: &str) -> String {
    let Ok(re) = regex_lite::Regex::new(r"\$\{([^}]+)\}") else {
        return content.to_string();
    };

    re.replace_all(content, |caps: &regex_lite::Captures<'_>| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
    })
    .into_owned()
}
