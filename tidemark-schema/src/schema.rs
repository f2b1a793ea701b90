//! Schema definitions: ordered fields plus cluster keys.

use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::case::{CaseConversion, CaseRule};
use crate::error::{SchemaError, SchemaResult};
use crate::field::Field;

/// A reference to a field used for clustering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterKey {
    /// The referenced field name.
    pub field_name: SmolStr,
}

impl ClusterKey {
    /// Create a cluster key referencing `field_name`.
    pub fn new(field_name: impl Into<SmolStr>) -> Self {
        Self {
            field_name: field_name.into(),
        }
    }

    /// Get the referenced field name.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }
}

impl fmt::Display for ClusterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.field_name)
    }
}

/// Render a cluster key list as text, e.g. `(region, id)`.
pub fn render_cluster_keys(keys: &[ClusterKey]) -> String {
    let names: Vec<&str> = keys.iter().map(ClusterKey::field_name).collect();
    format!("({})", names.join(", "))
}

/// The shape of a dataset: ordered fields and cluster keys.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SchemaDefinition {
    /// Fields in declaration order.
    pub fields: Vec<Field>,
    /// Cluster keys in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cluster_keys: Vec<ClusterKey>,
}

impl SchemaDefinition {
    /// Create a schema from fields.
    pub fn new(fields: impl IntoIterator<Item = Field>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
            cluster_keys: Vec::new(),
        }
    }

    /// Get the fields.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Get the cluster keys.
    pub fn cluster_keys(&self) -> &[ClusterKey] {
        &self.cluster_keys
    }

    /// Return a copy with different fields.
    pub fn with_fields(&self, fields: Vec<Field>) -> Self {
        Self {
            fields,
            cluster_keys: self.cluster_keys.clone(),
        }
    }

    /// Return a copy with different cluster keys.
    pub fn with_cluster_keys(&self, cluster_keys: Vec<ClusterKey>) -> Self {
        Self {
            fields: self.fields.clone(),
            cluster_keys,
        }
    }

    /// Append a cluster key (builder style).
    pub fn cluster_by(mut self, field_name: impl Into<SmolStr>) -> Self {
        self.cluster_keys.push(ClusterKey::new(field_name));
        self
    }

    /// Find a field by name under the given case rule.
    pub fn field(&self, name: &str, rule: CaseRule) -> Option<&Field> {
        self.fields.iter().find(|f| rule.same_name(f.name(), name))
    }

    /// Check whether a field exists.
    pub fn has_field(&self, name: &str, rule: CaseRule) -> bool {
        self.field(name, rule).is_some()
    }

    /// Comparison keys of every field name.
    pub fn field_keys(&self, rule: CaseRule) -> IndexSet<SmolStr> {
        self.fields.iter().map(|f| rule.owned_key(f.name())).collect()
    }

    /// The primary key fields, in declaration order.
    pub fn primary_keys(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.is_primary_key())
    }

    /// Check that field names are unique and cluster keys resolve.
    pub fn validate(&self, dataset: &str, rule: CaseRule) -> SchemaResult<()> {
        let mut seen = IndexSet::with_capacity(self.fields.len());
        for field in &self.fields {
            if !seen.insert(rule.owned_key(field.name())) {
                return Err(SchemaError::duplicate_field(dataset, field.name()));
            }
        }

        for key in &self.cluster_keys {
            if !seen.contains(&*rule.key(key.field_name())) {
                return Err(SchemaError::unknown_cluster_key(dataset, key.field_name()));
            }
        }

        Ok(())
    }

    /// Return a copy with every name rewritten by `conversion`.
    pub fn with_case(&self, conversion: CaseConversion) -> Self {
        Self {
            fields: self.fields.iter().map(|f| f.with_case(conversion)).collect(),
            cluster_keys: self
                .cluster_keys
                .iter()
                .map(|k| ClusterKey::new(conversion.apply(k.field_name())))
                .collect(),
        }
    }
}

impl FromIterator<Field> for SchemaDefinition {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DataType, FieldType};
    use pretty_assertions::assert_eq;

    fn sample() -> SchemaDefinition {
        SchemaDefinition::new([
            Field::new("id", DataType::Int).primary_key(),
            Field::new("Name", FieldType::sized(DataType::Varchar, 10)),
        ])
        .cluster_by("id")
    }

    #[test]
    fn test_lookup_respects_case_rule() {
        let schema = sample();
        assert!(schema.field("name", CaseRule::Sensitive).is_none());
        assert_eq!(
            schema.field("name", CaseRule::Insensitive).map(Field::name),
            Some("Name")
        );
        assert!(schema.has_field("NAME", CaseRule::Insensitive));
        assert!(!schema.has_field("NAME", CaseRule::Sensitive));
    }

    #[test]
    fn test_with_cluster_keys_replaces_keys_only() {
        let schema = sample();
        let reclustered = schema.with_cluster_keys(vec![ClusterKey::new("Name")]);
        assert_eq!(reclustered.fields(), schema.fields());
        assert_eq!(reclustered.cluster_keys(), &[ClusterKey::new("Name")]);
        assert!(reclustered.validate("main", CaseRule::Sensitive).is_ok());
    }

    #[test]
    fn test_primary_keys() {
        let schema = sample();
        let pks: Vec<&str> = schema.primary_keys().map(Field::name).collect();
        assert_eq!(pks, vec!["id"]);
    }

    #[test]
    fn test_validate_detects_case_insensitive_duplicates() {
        let schema = SchemaDefinition::new([
            Field::new("Id", DataType::Int),
            Field::new("id", DataType::Int),
        ]);
        assert!(schema.validate("staging", CaseRule::Sensitive).is_ok());
        assert_eq!(
            schema.validate("staging", CaseRule::Insensitive),
            Err(SchemaError::duplicate_field("staging", "id"))
        );
    }

    #[test]
    fn test_validate_detects_unknown_cluster_key() {
        let schema = sample().cluster_by("region");
        assert_eq!(
            schema.validate("main", CaseRule::Sensitive),
            Err(SchemaError::unknown_cluster_key("main", "region"))
        );
    }

    #[test]
    fn test_render_cluster_keys() {
        let keys = vec![ClusterKey::new("region"), ClusterKey::new("id")];
        assert_eq!(render_cluster_keys(&keys), "(region, id)");
        assert_eq!(render_cluster_keys(&[]), "()");
    }

    #[test]
    fn test_with_case_rewrites_fields_and_cluster_keys() {
        let upper = sample().with_case(CaseConversion::ToUpper);
        assert_eq!(upper.fields[1].name(), "NAME");
        assert_eq!(upper.cluster_keys[0].field_name(), "ID");
    }
}
