//! # tidemark-evolve
//!
//! Capability-gated schema evolution for batch ingestion.
//!
//! Given a main dataset and the schema of an incoming staging batch, the
//! planner produces the ordered list of schema operations that make main
//! accept the batch, together with the evolved main dataset. It refuses when
//! a change is unsafe or has not been authorized.
//!
//! A change goes ahead only when the [`Sink`] reports the matching
//! [`Capability`] *and* the operator granted the matching
//! [`SchemaEvolutionCapability`].
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use tidemark_evolve::{Operation, SchemaEvolution, SchemaEvolutionCapability, TypeMappingSink};
//! use tidemark_ingest::IngestMode;
//! use tidemark_schema::{DataType, Dataset, Field, FieldType, SchemaDefinition};
//!
//! let main = Dataset::named(
//!     "orders",
//!     SchemaDefinition::new([Field::new("id", DataType::Int).primary_key()]),
//! );
//! let staging = SchemaDefinition::new([
//!     Field::new("id", DataType::Int).primary_key(),
//!     Field::new("email", FieldType::sized(DataType::Varchar, 50)),
//! ]);
//!
//! let planner = SchemaEvolution::new(
//!     Arc::new(TypeMappingSink::h2()),
//!     IngestMode::append_only().into(),
//!     [SchemaEvolutionCapability::AddColumn],
//! );
//! let result = planner.build_logical_plan(&main, &staging).unwrap();
//!
//! assert_eq!(result.operations().len(), 1);
//! assert_eq!(result.operations()[0].to_string(), "ADD COLUMN email VARCHAR(50)");
//! assert!(matches!(result.operations()[0], Operation::Add { .. }));
//! ```

pub mod capability;
pub mod config;
pub mod error;
pub mod evolution;
pub mod operation;
pub mod reconcile;
pub mod resolve;
pub mod sink;

pub use capability::{Authorization, Capability, EvolutionClass, SchemaEvolutionCapability};
pub use config::{EvolutionConfig, EvolutionSettings};
pub use error::{EvolutionError, EvolutionResult};
pub use evolution::SchemaEvolution;
pub use operation::{Operation, OperationKind, SchemaEvolutionResult};
pub use reconcile::{Reconciler, Reconciliation, validate_primary_keys};
pub use resolve::{DataTypeEvolution, resolve_data_type, resolve_field_type};
pub use sink::{Sink, TypeMappingSink, evolve_size};
