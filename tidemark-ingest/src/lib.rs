//! # tidemark-ingest
//!
//! Ingest modes and the bookkeeping columns they maintain.
//!
//! An [`IngestMode`] describes how a staging batch is merged into a main
//! dataset. Each mode adds system columns of its own (batch ids, audit
//! timestamps, milestoning ranges, digests). The classifiers in [`classify`]
//! name those columns so schema comparison can skip them.
//!
//! ## Example
//!
//! ```rust
//! use tidemark_ingest::{IngestMode, TransactionMilestoning, main_fields_to_ignore};
//!
//! let mode: IngestMode =
//!     IngestMode::unitemporal_delta("digest", TransactionMilestoning::batch_id()).into();
//!
//! let ignored = main_fields_to_ignore(&mode);
//! assert!(ignored.contains("batch_id_in"));
//! assert!(ignored.contains("batch_id_out"));
//! ```

pub mod classify;
pub mod mode;
pub mod strategy;

pub use classify::{main_fields_to_ignore, staging_fields_to_ignore};
pub use mode::{
    AppendOnly, BitemporalDelta, BitemporalSnapshot, BulkLoad, IngestMode, NontemporalDelta,
    NontemporalSnapshot, UnitemporalDelta, UnitemporalSnapshot,
};
pub use strategy::{
    Auditing, Deduplication, DigestGenStrategy, MergeStrategy, TransactionMilestoning,
    ValidityDerivation, ValidityMilestoning, Versioning,
};
