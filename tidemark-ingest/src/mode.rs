//! Ingest modes.
//!
//! [`IngestMode`] is a closed set: adding a variant forces every classifier
//! and converter in this crate to handle it.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use tidemark_schema::CaseConversion;

use crate::strategy::{
    Auditing, DEFAULT_BATCH_ID_FIELD, Deduplication, DigestGenStrategy, MergeStrategy,
    TransactionMilestoning, ValidityMilestoning, Versioning,
};

/// Append every staging row to main.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppendOnly {
    #[serde(default)]
    pub digest_gen_strategy: DigestGenStrategy,
    #[serde(default)]
    pub auditing: Auditing,
    #[serde(default)]
    pub deduplication: Deduplication,
    #[serde(default)]
    pub versioning: Versioning,
    pub batch_id_field: SmolStr,
    /// Skip staging rows already present in main.
    #[serde(default)]
    pub filter_existing_records: bool,
}

/// Replace main with the staging snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NontemporalSnapshot {
    #[serde(default)]
    pub auditing: Auditing,
    #[serde(default)]
    pub deduplication: Deduplication,
    #[serde(default)]
    pub versioning: Versioning,
    pub batch_id_field: SmolStr,
}

/// Upsert staging into main without history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NontemporalDelta {
    pub digest_field: SmolStr,
    #[serde(default)]
    pub merge_strategy: MergeStrategy,
    #[serde(default)]
    pub auditing: Auditing,
    #[serde(default)]
    pub deduplication: Deduplication,
    #[serde(default)]
    pub versioning: Versioning,
    pub batch_id_field: SmolStr,
}

/// Snapshot with transaction-time history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitemporalSnapshot {
    pub digest_field: SmolStr,
    pub transaction_milestoning: TransactionMilestoning,
    #[serde(default)]
    pub deduplication: Deduplication,
    #[serde(default)]
    pub versioning: Versioning,
}

/// Delta with transaction-time history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitemporalDelta {
    pub digest_field: SmolStr,
    pub transaction_milestoning: TransactionMilestoning,
    #[serde(default)]
    pub merge_strategy: MergeStrategy,
    #[serde(default)]
    pub deduplication: Deduplication,
    #[serde(default)]
    pub versioning: Versioning,
}

/// Snapshot with transaction and validity history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitemporalSnapshot {
    pub digest_field: SmolStr,
    pub transaction_milestoning: TransactionMilestoning,
    pub validity_milestoning: ValidityMilestoning,
    #[serde(default)]
    pub deduplication: Deduplication,
    #[serde(default)]
    pub versioning: Versioning,
}

/// Delta with transaction and validity history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitemporalDelta {
    pub digest_field: SmolStr,
    pub transaction_milestoning: TransactionMilestoning,
    pub validity_milestoning: ValidityMilestoning,
    #[serde(default)]
    pub merge_strategy: MergeStrategy,
    #[serde(default)]
    pub deduplication: Deduplication,
    #[serde(default)]
    pub versioning: Versioning,
}

/// Load files straight into main.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkLoad {
    pub batch_id_field: SmolStr,
    #[serde(default)]
    pub digest_gen_strategy: DigestGenStrategy,
    #[serde(default)]
    pub auditing: Auditing,
}

/// The ingestion strategy of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum IngestMode {
    AppendOnly(AppendOnly),
    NontemporalSnapshot(NontemporalSnapshot),
    NontemporalDelta(NontemporalDelta),
    UnitemporalSnapshot(UnitemporalSnapshot),
    UnitemporalDelta(UnitemporalDelta),
    BitemporalSnapshot(BitemporalSnapshot),
    BitemporalDelta(BitemporalDelta),
    BulkLoad(BulkLoad),
    NoOp,
}

impl IngestMode {
    /// Append-only with default bookkeeping names.
    pub fn append_only() -> AppendOnly {
        AppendOnly {
            digest_gen_strategy: DigestGenStrategy::None,
            auditing: Auditing::None,
            deduplication: Deduplication::AllowDuplicates,
            versioning: Versioning::None,
            batch_id_field: DEFAULT_BATCH_ID_FIELD.into(),
            filter_existing_records: false,
        }
    }

    /// Nontemporal snapshot with default bookkeeping names.
    pub fn nontemporal_snapshot() -> NontemporalSnapshot {
        NontemporalSnapshot {
            auditing: Auditing::None,
            deduplication: Deduplication::AllowDuplicates,
            versioning: Versioning::None,
            batch_id_field: DEFAULT_BATCH_ID_FIELD.into(),
        }
    }

    /// Nontemporal delta keyed on `digest_field`.
    pub fn nontemporal_delta(digest_field: impl Into<SmolStr>) -> NontemporalDelta {
        NontemporalDelta {
            digest_field: digest_field.into(),
            merge_strategy: MergeStrategy::NoDeletes,
            auditing: Auditing::None,
            deduplication: Deduplication::AllowDuplicates,
            versioning: Versioning::None,
            batch_id_field: DEFAULT_BATCH_ID_FIELD.into(),
        }
    }

    /// Unitemporal snapshot.
    pub fn unitemporal_snapshot(
        digest_field: impl Into<SmolStr>,
        transaction_milestoning: TransactionMilestoning,
    ) -> UnitemporalSnapshot {
        UnitemporalSnapshot {
            digest_field: digest_field.into(),
            transaction_milestoning,
            deduplication: Deduplication::AllowDuplicates,
            versioning: Versioning::None,
        }
    }

    /// Unitemporal delta.
    pub fn unitemporal_delta(
        digest_field: impl Into<SmolStr>,
        transaction_milestoning: TransactionMilestoning,
    ) -> UnitemporalDelta {
        UnitemporalDelta {
            digest_field: digest_field.into(),
            transaction_milestoning,
            merge_strategy: MergeStrategy::NoDeletes,
            deduplication: Deduplication::AllowDuplicates,
            versioning: Versioning::None,
        }
    }

    /// Bitemporal snapshot.
    pub fn bitemporal_snapshot(
        digest_field: impl Into<SmolStr>,
        transaction_milestoning: TransactionMilestoning,
        validity_milestoning: ValidityMilestoning,
    ) -> BitemporalSnapshot {
        BitemporalSnapshot {
            digest_field: digest_field.into(),
            transaction_milestoning,
            validity_milestoning,
            deduplication: Deduplication::AllowDuplicates,
            versioning: Versioning::None,
        }
    }

    /// Bitemporal delta.
    pub fn bitemporal_delta(
        digest_field: impl Into<SmolStr>,
        transaction_milestoning: TransactionMilestoning,
        validity_milestoning: ValidityMilestoning,
    ) -> BitemporalDelta {
        BitemporalDelta {
            digest_field: digest_field.into(),
            transaction_milestoning,
            validity_milestoning,
            merge_strategy: MergeStrategy::NoDeletes,
            deduplication: Deduplication::AllowDuplicates,
            versioning: Versioning::None,
        }
    }

    /// Bulk load with default bookkeeping names.
    pub fn bulk_load() -> BulkLoad {
        BulkLoad {
            batch_id_field: DEFAULT_BATCH_ID_FIELD.into(),
            digest_gen_strategy: DigestGenStrategy::None,
            auditing: Auditing::None,
        }
    }

    /// The variant name, for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            IngestMode::AppendOnly(_) => "append_only",
            IngestMode::NontemporalSnapshot(_) => "nontemporal_snapshot",
            IngestMode::NontemporalDelta(_) => "nontemporal_delta",
            IngestMode::UnitemporalSnapshot(_) => "unitemporal_snapshot",
            IngestMode::UnitemporalDelta(_) => "unitemporal_delta",
            IngestMode::BitemporalSnapshot(_) => "bitemporal_snapshot",
            IngestMode::BitemporalDelta(_) => "bitemporal_delta",
            IngestMode::BulkLoad(_) => "bulk_load",
            IngestMode::NoOp => "no_op",
        }
    }

    /// The deduplication strategy, if the mode has one.
    pub fn deduplication(&self) -> Option<&Deduplication> {
        match self {
            IngestMode::AppendOnly(m) => Some(&m.deduplication),
            IngestMode::NontemporalSnapshot(m) => Some(&m.deduplication),
            IngestMode::NontemporalDelta(m) => Some(&m.deduplication),
            IngestMode::UnitemporalSnapshot(m) => Some(&m.deduplication),
            IngestMode::UnitemporalDelta(m) => Some(&m.deduplication),
            IngestMode::BitemporalSnapshot(m) => Some(&m.deduplication),
            IngestMode::BitemporalDelta(m) => Some(&m.deduplication),
            IngestMode::BulkLoad(_) | IngestMode::NoOp => None,
        }
    }

    /// The versioning strategy, if the mode has one.
    pub fn versioning(&self) -> Option<&Versioning> {
        match self {
            IngestMode::AppendOnly(m) => Some(&m.versioning),
            IngestMode::NontemporalSnapshot(m) => Some(&m.versioning),
            IngestMode::NontemporalDelta(m) => Some(&m.versioning),
            IngestMode::UnitemporalSnapshot(m) => Some(&m.versioning),
            IngestMode::UnitemporalDelta(m) => Some(&m.versioning),
            IngestMode::BitemporalSnapshot(m) => Some(&m.versioning),
            IngestMode::BitemporalDelta(m) => Some(&m.versioning),
            IngestMode::BulkLoad(_) | IngestMode::NoOp => None,
        }
    }

    /// The generated column that splits a batch into version sub-batches.
    pub fn data_split_field(&self) -> Option<&SmolStr> {
        self.versioning().and_then(Versioning::data_split_field)
    }

    /// Return a copy with every bookkeeping column name rewritten.
    pub fn with_case(&self, conversion: CaseConversion) -> Self {
        match self {
            IngestMode::AppendOnly(m) => IngestMode::AppendOnly(AppendOnly {
                digest_gen_strategy: m.digest_gen_strategy.with_case(conversion),
                auditing: m.auditing.with_case(conversion),
                deduplication: m.deduplication.with_case(conversion),
                versioning: m.versioning.with_case(conversion),
                batch_id_field: conversion.apply(&m.batch_id_field),
                filter_existing_records: m.filter_existing_records,
            }),
            IngestMode::NontemporalSnapshot(m) => {
                IngestMode::NontemporalSnapshot(NontemporalSnapshot {
                    auditing: m.auditing.with_case(conversion),
                    deduplication: m.deduplication.with_case(conversion),
                    versioning: m.versioning.with_case(conversion),
                    batch_id_field: conversion.apply(&m.batch_id_field),
                })
            }
            IngestMode::NontemporalDelta(m) => IngestMode::NontemporalDelta(NontemporalDelta {
                digest_field: conversion.apply(&m.digest_field),
                merge_strategy: m.merge_strategy.with_case(conversion),
                auditing: m.auditing.with_case(conversion),
                deduplication: m.deduplication.with_case(conversion),
                versioning: m.versioning.with_case(conversion),
                batch_id_field: conversion.apply(&m.batch_id_field),
            }),
            IngestMode::UnitemporalSnapshot(m) => {
                IngestMode::UnitemporalSnapshot(UnitemporalSnapshot {
                    digest_field: conversion.apply(&m.digest_field),
                    transaction_milestoning: m.transaction_milestoning.with_case(conversion),
                    deduplication: m.deduplication.with_case(conversion),
                    versioning: m.versioning.with_case(conversion),
                })
            }
            IngestMode::UnitemporalDelta(m) => IngestMode::UnitemporalDelta(UnitemporalDelta {
                digest_field: conversion.apply(&m.digest_field),
                transaction_milestoning: m.transaction_milestoning.with_case(conversion),
                merge_strategy: m.merge_strategy.with_case(conversion),
                deduplication: m.deduplication.with_case(conversion),
                versioning: m.versioning.with_case(conversion),
            }),
            IngestMode::BitemporalSnapshot(m) => {
                IngestMode::BitemporalSnapshot(BitemporalSnapshot {
                    digest_field: conversion.apply(&m.digest_field),
                    transaction_milestoning: m.transaction_milestoning.with_case(conversion),
                    validity_milestoning: m.validity_milestoning.with_case(conversion),
                    deduplication: m.deduplication.with_case(conversion),
                    versioning: m.versioning.with_case(conversion),
                })
            }
            IngestMode::BitemporalDelta(m) => IngestMode::BitemporalDelta(BitemporalDelta {
                digest_field: conversion.apply(&m.digest_field),
                transaction_milestoning: m.transaction_milestoning.with_case(conversion),
                validity_milestoning: m.validity_milestoning.with_case(conversion),
                merge_strategy: m.merge_strategy.with_case(conversion),
                deduplication: m.deduplication.with_case(conversion),
                versioning: m.versioning.with_case(conversion),
            }),
            IngestMode::BulkLoad(m) => IngestMode::BulkLoad(BulkLoad {
                batch_id_field: conversion.apply(&m.batch_id_field),
                digest_gen_strategy: m.digest_gen_strategy.with_case(conversion),
                auditing: m.auditing.with_case(conversion),
            }),
            IngestMode::NoOp => IngestMode::NoOp,
        }
    }
}

macro_rules! impl_into_ingest_mode {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for IngestMode {
                fn from(mode: $variant) -> Self {
                    IngestMode::$variant(mode)
                }
            }
        )*
    };
}

impl_into_ingest_mode!(
    AppendOnly,
    NontemporalSnapshot,
    NontemporalDelta,
    UnitemporalSnapshot,
    UnitemporalDelta,
    BitemporalSnapshot,
    BitemporalDelta,
    BulkLoad,
);

macro_rules! impl_common_builders {
    ($($variant:ident),* $(,)?) => {
        $(
            impl $variant {
                /// Set the deduplication strategy.
                pub fn with_deduplication(mut self, deduplication: Deduplication) -> Self {
                    self.deduplication = deduplication;
                    self
                }

                /// Set the versioning strategy.
                pub fn with_versioning(mut self, versioning: Versioning) -> Self {
                    self.versioning = versioning;
                    self
                }
            }
        )*
    };
}

impl_common_builders!(
    AppendOnly,
    NontemporalSnapshot,
    NontemporalDelta,
    UnitemporalSnapshot,
    UnitemporalDelta,
    BitemporalSnapshot,
    BitemporalDelta,
);

impl AppendOnly {
    /// Set the auditing strategy.
    pub fn with_auditing(mut self, auditing: Auditing) -> Self {
        self.auditing = auditing;
        self
    }

    /// Set the digest generation strategy.
    pub fn with_digest_gen_strategy(mut self, strategy: DigestGenStrategy) -> Self {
        self.digest_gen_strategy = strategy;
        self
    }

    /// Set the batch id column.
    pub fn with_batch_id_field(mut self, field: impl Into<SmolStr>) -> Self {
        self.batch_id_field = field.into();
        self
    }
}

impl NontemporalSnapshot {
    /// Set the auditing strategy.
    pub fn with_auditing(mut self, auditing: Auditing) -> Self {
        self.auditing = auditing;
        self
    }
}

impl NontemporalDelta {
    /// Set the auditing strategy.
    pub fn with_auditing(mut self, auditing: Auditing) -> Self {
        self.auditing = auditing;
        self
    }

    /// Set the merge strategy.
    pub fn with_merge_strategy(mut self, merge_strategy: MergeStrategy) -> Self {
        self.merge_strategy = merge_strategy;
        self
    }
}

impl UnitemporalDelta {
    /// Set the merge strategy.
    pub fn with_merge_strategy(mut self, merge_strategy: MergeStrategy) -> Self {
        self.merge_strategy = merge_strategy;
        self
    }
}

impl BitemporalDelta {
    /// Set the merge strategy.
    pub fn with_merge_strategy(mut self, merge_strategy: MergeStrategy) -> Self {
        self.merge_strategy = merge_strategy;
        self
    }
}

impl BulkLoad {
    /// Set the auditing strategy.
    pub fn with_auditing(mut self, auditing: Auditing) -> Self {
        self.auditing = auditing;
        self
    }

    /// Set the digest generation strategy.
    pub fn with_digest_gen_strategy(mut self, strategy: DigestGenStrategy) -> Self {
        self.digest_gen_strategy = strategy;
        self
    }
}
