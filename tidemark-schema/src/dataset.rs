//! Datasets: a schema bound to a sink location.

use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::case::CaseConversion;
use crate::schema::SchemaDefinition;

/// Where a dataset lives in the sink.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetReference {
    /// Database or catalog name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<SmolStr>,
    /// Schema or group name inside the database.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<SmolStr>,
    /// Table name.
    pub name: SmolStr,
    /// Alias used when the dataset is referenced in a plan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<SmolStr>,
}

impl DatasetReference {
    /// Create a reference to a bare table name.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            database: None,
            group: None,
            name: name.into(),
            alias: None,
        }
    }

    /// Set the database.
    pub fn database(mut self, database: impl Into<SmolStr>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Set the group (schema).
    pub fn group(mut self, group: impl Into<SmolStr>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Set the alias.
    pub fn alias(mut self, alias: impl Into<SmolStr>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Return a copy with every identifier rewritten by `conversion`.
    pub fn with_case(&self, conversion: CaseConversion) -> Self {
        Self {
            database: conversion.apply_opt(self.database.as_ref()),
            group: conversion.apply_opt(self.group.as_ref()),
            name: conversion.apply(&self.name),
            alias: self.alias.clone(),
        }
    }
}

impl fmt::Display for DatasetReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(database) = &self.database {
            write!(f, "{}.", database)?;
        }
        if let Some(group) = &self.group {
            write!(f, "{}.", group)?;
        }
        f.write_str(&self.name)
    }
}

/// A schema bound to its location in the sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    /// Sink identity.
    pub reference: DatasetReference,
    /// Current schema.
    pub schema: SchemaDefinition,
}

impl Dataset {
    /// Create a dataset.
    pub fn new(reference: DatasetReference, schema: SchemaDefinition) -> Self {
        Self { reference, schema }
    }

    /// Create a dataset addressed by a bare table name.
    pub fn named(name: impl Into<SmolStr>, schema: SchemaDefinition) -> Self {
        Self::new(DatasetReference::new(name), schema)
    }

    /// Get the schema.
    pub fn schema(&self) -> &SchemaDefinition {
        &self.schema
    }

    /// Get the sink identity.
    pub fn reference(&self) -> &DatasetReference {
        &self.reference
    }

    /// Get the table name.
    pub fn name(&self) -> &str {
        &self.reference.name
    }

    /// Return a dataset with the same identity and a different schema.
    pub fn with_schema(&self, schema: SchemaDefinition) -> Self {
        Self {
            reference: self.reference.clone(),
            schema,
        }
    }

    /// Return a copy with every identifier rewritten by `conversion`.
    pub fn with_case(&self, conversion: CaseConversion) -> Self {
        Self {
            reference: self.reference.with_case(conversion),
            schema: self.schema.with_case(conversion),
        }
    }
}
