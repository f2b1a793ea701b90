//! Error types for schema evolution.

// These warnings are false positives - the fields are used by derive macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;
use tidemark_schema::SchemaError;

/// Result type alias for evolution operations.
pub type EvolutionResult<T> = Result<T, EvolutionError>;

/// Errors that can occur while planning a schema evolution.
#[derive(Error, Debug, Diagnostic)]
pub enum EvolutionError {
    /// Staging cannot be reconciled with main under the granted capabilities.
    #[error("incompatible schema change: {0}")]
    #[diagnostic(
        code(tidemark::evolve::incompatible_schema_change),
        help("check the sink capabilities and the authorized schema evolution capabilities")
    )]
    IncompatibleSchemaChange(String),

    /// An input schema is malformed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    InvalidSchema(#[from] SchemaError),

    /// Error reading a configuration file.
    #[error("failed to read config file: {path}")]
    #[diagnostic(code(tidemark::evolve::config_io))]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing configuration.
    #[error("failed to parse config: {message}")]
    #[diagnostic(code(tidemark::evolve::config))]
    Config {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },
}

impl EvolutionError {
    /// Create an incompatible schema change error.
    pub fn incompatible(msg: impl Into<String>) -> Self {
        Self::IncompatibleSchemaChange(msg.into())
    }

    /// Create a configuration error without an underlying parse error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            source: None,
        }
    }

    /// Check if this error rejects a schema change.
    pub fn is_incompatible(&self) -> bool {
        matches!(self, Self::IncompatibleSchemaChange(_))
    }

    /// The rejection message, if this is an incompatible change.
    pub fn incompatible_message(&self) -> Option<&str> {
        match self {
            Self::IncompatibleSchemaChange(msg) => Some(msg),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for EvolutionError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config {
            message: err.message().to_string(),
            source: Some(err),
        }
    }
}
