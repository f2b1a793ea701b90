//! # tidemark-schema
//!
//! Field, schema and dataset model for Tidemark.
//!
//! This crate provides:
//! - Logical column types ([`DataType`], [`FieldType`])
//! - Immutable [`Field`], [`SchemaDefinition`] and [`Dataset`] values
//! - Case rules for comparing names and case conversions for rewriting them
//! - Schema validation (unique names, resolvable cluster keys)
//!
//! ## Example
//!
//! ```rust
//! use tidemark_schema::{CaseRule, DataType, Dataset, Field, FieldType, SchemaDefinition};
//!
//! let main = Dataset::named(
//!     "orders",
//!     SchemaDefinition::new([
//!         Field::new("id", DataType::Int).primary_key(),
//!         Field::new("name", FieldType::sized(DataType::Varchar, 10)),
//!     ]),
//! );
//!
//! assert!(main.schema().validate(main.name(), CaseRule::Sensitive).is_ok());
//! let evolved = main.with_schema(main.schema().with_fields(vec![]));
//! assert_eq!(evolved.name(), "orders");
//! ```

pub mod case;
pub mod dataset;
pub mod error;
pub mod field;
pub mod schema;
pub mod types;

pub use case::{CaseConversion, CaseRule};
pub use dataset::{Dataset, DatasetReference};
pub use error::{SchemaError, SchemaResult};
pub use field::Field;
pub use schema::{ClusterKey, SchemaDefinition, render_cluster_keys};
pub use types::{DataType, FieldType};
