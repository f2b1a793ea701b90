//! # Tidemark
//!
//! Capability-gated schema evolution planning for batch ingestion.
//!
//! Tidemark provides:
//! - A field, schema and dataset model with configurable case sensitivity
//! - Ingest modes and the bookkeeping columns each one maintains
//! - A planner that reconciles a staging schema with a main dataset and
//!   returns the ordered schema operations, or refuses unsafe changes
//! - Sink presets describing which conversions a backend accepts
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use tidemark::prelude::*;
//!
//! let main = Dataset::named(
//!     "customers",
//!     SchemaDefinition::new([
//!         Field::new("id", DataType::Int).primary_key(),
//!         Field::new("name", FieldType::sized(DataType::Varchar, 10)),
//!     ]),
//! );
//! let staging = SchemaDefinition::new([
//!     Field::new("id", DataType::Int).primary_key(),
//!     Field::new("name", FieldType::sized(DataType::Varchar, 20)),
//! ]);
//!
//! let config = EvolutionConfig::from_str(
//!     r#"
//!     [evolution]
//!     capabilities = ["DATA_TYPE_LENGTH_CHANGE"]
//!     "#,
//! )?;
//!
//! let planner = SchemaEvolution::from_config(
//!     Arc::new(TypeMappingSink::h2()),
//!     IngestMode::nontemporal_snapshot().into(),
//!     &config,
//! );
//! let result = planner.build_logical_plan(&main, &staging)?;
//!
//! assert_eq!(result.summary(), "Change 1 column types");
//! assert_eq!(
//!     result.operations()[0].to_string(),
//!     "ALTER COLUMN name TYPE VARCHAR(20)"
//! );
//! # Ok::<(), tidemark::EvolutionError>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod logging;

/// Field, schema and dataset model.
pub mod schema {
    pub use tidemark_schema::*;
}

/// Ingest modes and bookkeeping field classifiers.
pub mod ingest {
    pub use tidemark_ingest::*;
}

/// Capabilities, sinks and the evolution planner.
pub mod evolve {
    pub use tidemark_evolve::*;
}

#[doc(hidden)]
pub use tracing as __tracing;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::evolve::{
        Capability, EvolutionConfig, EvolutionError, EvolutionResult, Operation, OperationKind,
        SchemaEvolution, SchemaEvolutionCapability, SchemaEvolutionResult, Sink, TypeMappingSink,
    };
    pub use crate::ingest::{
        Auditing, Deduplication, DigestGenStrategy, IngestMode, MergeStrategy,
        TransactionMilestoning, ValidityDerivation, ValidityMilestoning, Versioning,
    };
    pub use crate::schema::{
        CaseConversion, CaseRule, ClusterKey, DataType, Dataset, DatasetReference, Field,
        FieldType, SchemaDefinition,
    };
}

// Re-export key types at the crate root
pub use evolve::{EvolutionError, EvolutionResult, SchemaEvolution};
pub use schema::SchemaError;
