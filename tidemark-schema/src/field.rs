//! Field definitions.

use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::case::CaseConversion;
use crate::types::FieldType;

/// A column of a dataset.
///
/// Fields are values: every change produces a new `Field` through one of the
/// `with_*` methods.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    /// Column name.
    pub name: SmolStr,
    /// Column type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether the column accepts nulls.
    pub nullable: bool,
    /// Whether the column is part of the primary key.
    #[serde(default)]
    pub primary_key: bool,
}

impl Field {
    /// Create a nullable, non-key field.
    pub fn new(name: impl Into<SmolStr>, field_type: impl Into<FieldType>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            nullable: true,
            primary_key: false,
        }
    }

    /// Mark the field as non-nullable.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Mark the field as a primary key column. Primary keys are never nullable.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    /// Get the field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the field type.
    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    /// Check if this is a primary key column.
    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    /// Return a copy with a different nullability.
    pub fn with_nullable(&self, nullable: bool) -> Self {
        Self {
            nullable,
            ..self.clone()
        }
    }

    /// Return a copy with a different type.
    pub fn with_type(&self, field_type: FieldType) -> Self {
        Self {
            field_type,
            ..self.clone()
        }
    }

    /// Return a copy with a different name.
    pub fn with_name(&self, name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Return a copy with the name rewritten by `conversion`.
    pub fn with_case(&self, conversion: CaseConversion) -> Self {
        self.with_name(conversion.apply(&self.name))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.field_type)?;
        if !self.nullable {
            write!(f, " NOT NULL")?;
        }
        if self.primary_key {
            write!(f, " PRIMARY KEY")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DataType;

    #[test]
    fn test_new_field_defaults() {
        let field = Field::new("email", FieldType::sized(DataType::Varchar, 50));
        assert!(field.nullable);
        assert!(!field.is_primary_key());
        assert_eq!(field.name(), "email");
    }

    #[test]
    fn test_primary_key_is_not_null() {
        let field = Field::new("id", DataType::Int).primary_key();
        assert!(field.is_primary_key());
        assert!(!field.nullable);
    }

    #[test]
    fn test_with_methods_do_not_mutate() {
        let original = Field::new("name", FieldType::sized(DataType::Varchar, 10)).not_null();
        let relaxed = original.with_nullable(true);
        let widened = original.with_type(FieldType::sized(DataType::Varchar, 20));

        assert!(!original.nullable);
        assert!(relaxed.nullable);
        assert_eq!(widened.field_type.length, Some(20));
        assert_eq!(original.field_type.length, Some(10));
    }

    #[test]
    fn test_display() {
        let field = Field::new("id", DataType::Int).primary_key();
        assert_eq!(field.to_string(), "id INT NOT NULL PRIMARY KEY");
        let field = Field::new("name", FieldType::sized(DataType::Varchar, 10));
        assert_eq!(field.to_string(), "name VARCHAR(10)");
    }

    #[test]
    fn test_with_case() {
        let field = Field::new("Name", DataType::Text);
        assert_eq!(field.with_case(CaseConversion::ToUpper).name(), "NAME");
    }
}
