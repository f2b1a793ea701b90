//! Planned schema operations and the evolution result.

use std::fmt;

use serde::{Deserialize, Serialize};
use tidemark_schema::{ClusterKey, Dataset, Field, render_cluster_keys};

/// One DDL-level change to the main dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Operation {
    /// Add a new nullable column.
    Add { field: Field },
    /// Change the type, length or scale of a column.
    ChangeDatatype { field: Field },
    /// Make a column nullable.
    NullableColumn { field: Field },
    /// Replace the cluster keys.
    AlterClusterKey { cluster_keys: Vec<ClusterKey> },
}

/// The kind of an [`Operation`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Add,
    ChangeDatatype,
    NullableColumn,
    AlterClusterKey,
}

impl Operation {
    /// The column this operation targets, if it targets one.
    pub fn field(&self) -> Option<&Field> {
        match self {
            Operation::Add { field }
            | Operation::ChangeDatatype { field }
            | Operation::NullableColumn { field } => Some(field),
            Operation::AlterClusterKey { .. } => None,
        }
    }

    /// The targeted column name, if any.
    pub fn column_name(&self) -> Option<&str> {
        self.field().map(Field::name)
    }

    /// Get the operation kind.
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Add { .. } => OperationKind::Add,
            Operation::ChangeDatatype { .. } => OperationKind::ChangeDatatype,
            Operation::NullableColumn { .. } => OperationKind::NullableColumn,
            Operation::AlterClusterKey { .. } => OperationKind::AlterClusterKey,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Add { field } => {
                write!(f, "ADD COLUMN {} {}", field.name(), field.field_type())
            }
            Operation::ChangeDatatype { field } => {
                write!(
                    f,
                    "ALTER COLUMN {} TYPE {}",
                    field.name(),
                    field.field_type()
                )
            }
            Operation::NullableColumn { field } => {
                write!(f, "ALTER COLUMN {} DROP NOT NULL", field.name())
            }
            Operation::AlterClusterKey { cluster_keys } => {
                write!(f, "ALTER CLUSTER KEY {}", render_cluster_keys(cluster_keys))
            }
        }
    }
}

/// The outcome of a successful evolution plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaEvolutionResult {
    operations: Vec<Operation>,
    evolved_dataset: Dataset,
}

impl SchemaEvolutionResult {
    /// Create a result.
    pub fn new(operations: Vec<Operation>, evolved_dataset: Dataset) -> Self {
        Self {
            operations,
            evolved_dataset,
        }
    }

    /// The operations, in the order they must be applied.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// The main dataset as it looks after every operation is applied.
    pub fn evolved_dataset(&self) -> &Dataset {
        &self.evolved_dataset
    }

    /// Check if no change is needed.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Count operations of one kind.
    pub fn count(&self, kind: OperationKind) -> usize {
        self.operations.iter().filter(|op| op.kind() == kind).count()
    }

    /// Get a human-readable summary of the plan.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();

        let added = self.count(OperationKind::Add);
        if added > 0 {
            parts.push(format!("Add {} columns", added));
        }
        let changed = self.count(OperationKind::ChangeDatatype);
        if changed > 0 {
            parts.push(format!("Change {} column types", changed));
        }
        let relaxed = self.count(OperationKind::NullableColumn);
        if relaxed > 0 {
            parts.push(format!("Make {} columns nullable", relaxed));
        }
        if self.count(OperationKind::AlterClusterKey) > 0 {
            parts.push("Alter cluster keys".to_string());
        }

        if parts.is_empty() {
            "No changes".to_string()
        } else {
            parts.join(", ")
        }
    }

    /// Split into operations and evolved dataset.
    pub fn into_parts(self) -> (Vec<Operation>, Dataset) {
        (self.operations, self.evolved_dataset)
    }
}
