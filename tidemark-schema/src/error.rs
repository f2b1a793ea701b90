//! Error types for the schema model.

// These warnings are false positives - the fields are used by derive macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised when a schema description is malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum SchemaError {
    /// Two fields resolve to the same name under the active case rule.
    #[error("duplicate field `{name}` in dataset `{dataset}`")]
    #[diagnostic(
        code(tidemark::schema::duplicate_field),
        help(
            "field names must be unique; with ignore_case enabled, names differing only in case collide"
        )
    )]
    DuplicateField { dataset: String, name: String },

    /// A cluster key references a field that is not part of the schema.
    #[error("cluster key `{key}` does not reference a field of dataset `{dataset}`")]
    #[diagnostic(code(tidemark::schema::unknown_cluster_key))]
    UnknownClusterKey { dataset: String, key: String },

    /// A type name could not be parsed.
    #[error("unknown data type `{0}`")]
    #[diagnostic(code(tidemark::schema::invalid_data_type))]
    InvalidDataType(String),
}

impl SchemaError {
    /// Create a duplicate field error.
    pub fn duplicate_field(dataset: impl Into<String>, name: impl Into<String>) -> Self {
        Self::DuplicateField {
            dataset: dataset.into(),
            name: name.into(),
        }
    }

    /// Create an unknown cluster key error.
    pub fn unknown_cluster_key(dataset: impl Into<String>, key: impl Into<String>) -> Self {
        Self::UnknownClusterKey {
            dataset: dataset.into(),
            key: key.into(),
        }
    }
}
