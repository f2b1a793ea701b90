//! Strategy types carried by ingest modes.
//!
//! Each strategy is a closed enum. The accessors return the bookkeeping
//! field names a strategy contributes, which is all the classifiers need.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use tidemark_schema::CaseConversion;

/// Default name of the batch id column.
pub const DEFAULT_BATCH_ID_FIELD: &str = "batch_id";
/// Default name of the batch id in column.
pub const DEFAULT_BATCH_ID_IN_FIELD: &str = "batch_id_in";
/// Default name of the batch id out column.
pub const DEFAULT_BATCH_ID_OUT_FIELD: &str = "batch_id_out";
/// Default name of the transaction time in column.
pub const DEFAULT_BATCH_TIME_IN_FIELD: &str = "batch_time_in";
/// Default name of the transaction time out column.
pub const DEFAULT_BATCH_TIME_OUT_FIELD: &str = "batch_time_out";
/// Default name of the validity start column.
pub const DEFAULT_VALID_FROM_FIELD: &str = "valid_from";
/// Default name of the validity end column.
pub const DEFAULT_VALID_THROUGH_FIELD: &str = "valid_through";
/// Default name of the duplicate count column.
pub const DEFAULT_DUPLICATE_COUNT_FIELD: &str = "duplicate_count";
/// Default name of the data split column.
pub const DEFAULT_DATA_SPLIT_FIELD: &str = "data_split";

/// How transaction time is recorded on the main dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransactionMilestoning {
    /// Batch id ranges.
    BatchId {
        batch_id_in: SmolStr,
        batch_id_out: SmolStr,
    },
    /// Transaction timestamp ranges.
    DateTime {
        date_time_in: SmolStr,
        date_time_out: SmolStr,
    },
    /// Both batch id and timestamp ranges.
    BatchIdAndDateTime {
        batch_id_in: SmolStr,
        batch_id_out: SmolStr,
        date_time_in: SmolStr,
        date_time_out: SmolStr,
    },
}

impl TransactionMilestoning {
    /// Batch id milestoning with the default column names.
    pub fn batch_id() -> Self {
        TransactionMilestoning::BatchId {
            batch_id_in: DEFAULT_BATCH_ID_IN_FIELD.into(),
            batch_id_out: DEFAULT_BATCH_ID_OUT_FIELD.into(),
        }
    }

    /// Timestamp milestoning with the default column names.
    pub fn date_time() -> Self {
        TransactionMilestoning::DateTime {
            date_time_in: DEFAULT_BATCH_TIME_IN_FIELD.into(),
            date_time_out: DEFAULT_BATCH_TIME_OUT_FIELD.into(),
        }
    }

    /// Batch id and timestamp milestoning with the default column names.
    pub fn batch_id_and_date_time() -> Self {
        TransactionMilestoning::BatchIdAndDateTime {
            batch_id_in: DEFAULT_BATCH_ID_IN_FIELD.into(),
            batch_id_out: DEFAULT_BATCH_ID_OUT_FIELD.into(),
            date_time_in: DEFAULT_BATCH_TIME_IN_FIELD.into(),
            date_time_out: DEFAULT_BATCH_TIME_OUT_FIELD.into(),
        }
    }

    /// Every column maintained by this milestoning.
    pub fn field_names(&self) -> Vec<&SmolStr> {
        match self {
            TransactionMilestoning::BatchId {
                batch_id_in,
                batch_id_out,
            } => vec![batch_id_in, batch_id_out],
            TransactionMilestoning::DateTime {
                date_time_in,
                date_time_out,
            } => vec![date_time_in, date_time_out],
            TransactionMilestoning::BatchIdAndDateTime {
                batch_id_in,
                batch_id_out,
                date_time_in,
                date_time_out,
            } => vec![batch_id_in, batch_id_out, date_time_in, date_time_out],
        }
    }

    /// Rewrite every column name.
    pub fn with_case(&self, conversion: CaseConversion) -> Self {
        match self {
            TransactionMilestoning::BatchId {
                batch_id_in,
                batch_id_out,
            } => TransactionMilestoning::BatchId {
                batch_id_in: conversion.apply(batch_id_in),
                batch_id_out: conversion.apply(batch_id_out),
            },
            TransactionMilestoning::DateTime {
                date_time_in,
                date_time_out,
            } => TransactionMilestoning::DateTime {
                date_time_in: conversion.apply(date_time_in),
                date_time_out: conversion.apply(date_time_out),
            },
            TransactionMilestoning::BatchIdAndDateTime {
                batch_id_in,
                batch_id_out,
                date_time_in,
                date_time_out,
            } => TransactionMilestoning::BatchIdAndDateTime {
                batch_id_in: conversion.apply(batch_id_in),
                batch_id_out: conversion.apply(batch_id_out),
                date_time_in: conversion.apply(date_time_in),
                date_time_out: conversion.apply(date_time_out),
            },
        }
    }
}

/// How the validity period of a row is derived from staging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidityDerivation {
    /// Staging supplies the start of the validity period.
    SourceSpecifiesFrom {
        source_from_field: SmolStr,
        /// Keep the source column as ordinary data on the main dataset.
        #[serde(default)]
        preserve_source_fields: bool,
    },
    /// Staging supplies both ends of the validity period.
    SourceSpecifiesFromAndThru {
        source_from_field: SmolStr,
        source_thru_field: SmolStr,
        #[serde(default)]
        preserve_source_fields: bool,
    },
}

impl ValidityDerivation {
    /// Derivation from a single source column.
    pub fn source_from(field: impl Into<SmolStr>) -> Self {
        ValidityDerivation::SourceSpecifiesFrom {
            source_from_field: field.into(),
            preserve_source_fields: false,
        }
    }

    /// Derivation from a pair of source columns.
    pub fn source_from_and_thru(from: impl Into<SmolStr>, thru: impl Into<SmolStr>) -> Self {
        ValidityDerivation::SourceSpecifiesFromAndThru {
            source_from_field: from.into(),
            source_thru_field: thru.into(),
            preserve_source_fields: false,
        }
    }

    /// Mark whether the source columns stay visible as ordinary data.
    pub fn preserve(self, preserve: bool) -> Self {
        match self {
            ValidityDerivation::SourceSpecifiesFrom {
                source_from_field, ..
            } => ValidityDerivation::SourceSpecifiesFrom {
                source_from_field,
                preserve_source_fields: preserve,
            },
            ValidityDerivation::SourceSpecifiesFromAndThru {
                source_from_field,
                source_thru_field,
                ..
            } => ValidityDerivation::SourceSpecifiesFromAndThru {
                source_from_field,
                source_thru_field,
                preserve_source_fields: preserve,
            },
        }
    }

    /// Whether the source columns are preserved.
    pub fn preserves_source_fields(&self) -> bool {
        match self {
            ValidityDerivation::SourceSpecifiesFrom {
                preserve_source_fields,
                ..
            }
            | ValidityDerivation::SourceSpecifiesFromAndThru {
                preserve_source_fields,
                ..
            } => *preserve_source_fields,
        }
    }

    /// The staging columns the derivation reads.
    pub fn source_fields(&self) -> Vec<&SmolStr> {
        match self {
            ValidityDerivation::SourceSpecifiesFrom {
                source_from_field, ..
            } => vec![source_from_field],
            ValidityDerivation::SourceSpecifiesFromAndThru {
                source_from_field,
                source_thru_field,
                ..
            } => vec![source_from_field, source_thru_field],
        }
    }

    /// Rewrite every column name.
    pub fn with_case(&self, conversion: CaseConversion) -> Self {
        match self {
            ValidityDerivation::SourceSpecifiesFrom {
                source_from_field,
                preserve_source_fields,
            } => ValidityDerivation::SourceSpecifiesFrom {
                source_from_field: conversion.apply(source_from_field),
                preserve_source_fields: *preserve_source_fields,
            },
            ValidityDerivation::SourceSpecifiesFromAndThru {
                source_from_field,
                source_thru_field,
                preserve_source_fields,
            } => ValidityDerivation::SourceSpecifiesFromAndThru {
                source_from_field: conversion.apply(source_from_field),
                source_thru_field: conversion.apply(source_thru_field),
                preserve_source_fields: *preserve_source_fields,
            },
        }
    }
}

/// How business validity is recorded on the main dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidityMilestoning {
    /// Validity expressed as a date-time range.
    DateTime {
        date_time_from: SmolStr,
        date_time_thru: SmolStr,
        derivation: ValidityDerivation,
    },
}

impl ValidityMilestoning {
    /// Date-time validity with default column names.
    pub fn date_time(derivation: ValidityDerivation) -> Self {
        ValidityMilestoning::DateTime {
            date_time_from: DEFAULT_VALID_FROM_FIELD.into(),
            date_time_thru: DEFAULT_VALID_THROUGH_FIELD.into(),
            derivation,
        }
    }

    /// The validity columns maintained on the main dataset.
    pub fn field_names(&self) -> Vec<&SmolStr> {
        match self {
            ValidityMilestoning::DateTime {
                date_time_from,
                date_time_thru,
                ..
            } => vec![date_time_from, date_time_thru],
        }
    }

    /// The derivation in use.
    pub fn derivation(&self) -> &ValidityDerivation {
        match self {
            ValidityMilestoning::DateTime { derivation, .. } => derivation,
        }
    }

    /// Rewrite every column name.
    pub fn with_case(&self, conversion: CaseConversion) -> Self {
        match self {
            ValidityMilestoning::DateTime {
                date_time_from,
                date_time_thru,
                derivation,
            } => ValidityMilestoning::DateTime {
                date_time_from: conversion.apply(date_time_from),
                date_time_thru: conversion.apply(date_time_thru),
                derivation: derivation.with_case(conversion),
            },
        }
    }
}

/// Audit column maintenance.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Auditing {
    #[default]
    None,
    /// Stamp each row with the batch time.
    DateTime { date_time_field: SmolStr },
}

impl Auditing {
    /// Date-time auditing into `field`.
    pub fn date_time(field: impl Into<SmolStr>) -> Self {
        Auditing::DateTime {
            date_time_field: field.into(),
        }
    }

    /// The audit column, if any.
    pub fn audit_field(&self) -> Option<&SmolStr> {
        match self {
            Auditing::None => None,
            Auditing::DateTime { date_time_field } => Some(date_time_field),
        }
    }

    /// Rewrite every column name.
    pub fn with_case(&self, conversion: CaseConversion) -> Self {
        match self {
            Auditing::None => Auditing::None,
            Auditing::DateTime { date_time_field } => Auditing::DateTime {
                date_time_field: conversion.apply(date_time_field),
            },
        }
    }
}

/// Handling of duplicate rows in staging.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Deduplication {
    #[default]
    AllowDuplicates,
    /// Keep one copy, recording the count in a generated column.
    FilterDuplicates { count_field: SmolStr },
    /// Fail the batch on duplicates; counts are computed into a generated column.
    FailOnDuplicates { count_field: SmolStr },
}

impl Deduplication {
    /// Filter duplicates with the default count column.
    pub fn filter_duplicates() -> Self {
        Deduplication::FilterDuplicates {
            count_field: DEFAULT_DUPLICATE_COUNT_FIELD.into(),
        }
    }

    /// Fail on duplicates with the default count column.
    pub fn fail_on_duplicates() -> Self {
        Deduplication::FailOnDuplicates {
            count_field: DEFAULT_DUPLICATE_COUNT_FIELD.into(),
        }
    }

    /// The generated count column, if any.
    pub fn count_field(&self) -> Option<&SmolStr> {
        match self {
            Deduplication::AllowDuplicates => None,
            Deduplication::FilterDuplicates { count_field }
            | Deduplication::FailOnDuplicates { count_field } => Some(count_field),
        }
    }

    /// Rewrite every column name.
    pub fn with_case(&self, conversion: CaseConversion) -> Self {
        match self {
            Deduplication::AllowDuplicates => Deduplication::AllowDuplicates,
            Deduplication::FilterDuplicates { count_field } => Deduplication::FilterDuplicates {
                count_field: conversion.apply(count_field),
            },
            Deduplication::FailOnDuplicates { count_field } => Deduplication::FailOnDuplicates {
                count_field: conversion.apply(count_field),
            },
        }
    }
}

/// Handling of multiple versions of a row within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Versioning {
    #[default]
    None,
    /// Keep only the highest version.
    MaxVersion { versioning_field: SmolStr },
    /// Ingest every version, split into sub-batches by a generated column.
    AllVersions {
        versioning_field: SmolStr,
        data_split_field: SmolStr,
    },
}

impl Versioning {
    /// Max-version strategy on `field`.
    pub fn max_version(field: impl Into<SmolStr>) -> Self {
        Versioning::MaxVersion {
            versioning_field: field.into(),
        }
    }

    /// All-versions strategy on `field` with the default data split column.
    pub fn all_versions(field: impl Into<SmolStr>) -> Self {
        Versioning::AllVersions {
            versioning_field: field.into(),
            data_split_field: DEFAULT_DATA_SPLIT_FIELD.into(),
        }
    }

    /// The user column carrying the version, if any.
    pub fn versioning_field(&self) -> Option<&SmolStr> {
        match self {
            Versioning::None => None,
            Versioning::MaxVersion { versioning_field }
            | Versioning::AllVersions {
                versioning_field, ..
            } => Some(versioning_field),
        }
    }

    /// The generated data split column, if any.
    pub fn data_split_field(&self) -> Option<&SmolStr> {
        match self {
            Versioning::AllVersions {
                data_split_field, ..
            } => Some(data_split_field),
            _ => None,
        }
    }

    /// Rewrite every column name.
    pub fn with_case(&self, conversion: CaseConversion) -> Self {
        match self {
            Versioning::None => Versioning::None,
            Versioning::MaxVersion { versioning_field } => Versioning::MaxVersion {
                versioning_field: conversion.apply(versioning_field),
            },
            Versioning::AllVersions {
                versioning_field,
                data_split_field,
            } => Versioning::AllVersions {
                versioning_field: conversion.apply(versioning_field),
                data_split_field: conversion.apply(data_split_field),
            },
        }
    }
}

/// Where the row digest comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DigestGenStrategy {
    #[default]
    None,
    /// Computed by the sink through a user-defined function.
    UdfBased {
        digest_field: SmolStr,
        digest_udf_name: SmolStr,
    },
    /// Supplied by staging like any other column.
    UserProvided { digest_field: SmolStr },
}

impl DigestGenStrategy {
    /// System-generated digest.
    pub fn udf_based(field: impl Into<SmolStr>, udf: impl Into<SmolStr>) -> Self {
        DigestGenStrategy::UdfBased {
            digest_field: field.into(),
            digest_udf_name: udf.into(),
        }
    }

    /// User-provided digest.
    pub fn user_provided(field: impl Into<SmolStr>) -> Self {
        DigestGenStrategy::UserProvided {
            digest_field: field.into(),
        }
    }

    /// The digest column, whoever produces it.
    pub fn digest_field(&self) -> Option<&SmolStr> {
        match self {
            DigestGenStrategy::None => None,
            DigestGenStrategy::UdfBased { digest_field, .. }
            | DigestGenStrategy::UserProvided { digest_field } => Some(digest_field),
        }
    }

    /// The digest column when the system generates it.
    pub fn generated_digest_field(&self) -> Option<&SmolStr> {
        match self {
            DigestGenStrategy::UdfBased { digest_field, .. } => Some(digest_field),
            DigestGenStrategy::None | DigestGenStrategy::UserProvided { .. } => None,
        }
    }

    /// Rewrite every column name. UDF names are left untouched.
    pub fn with_case(&self, conversion: CaseConversion) -> Self {
        match self {
            DigestGenStrategy::None => DigestGenStrategy::None,
            DigestGenStrategy::UdfBased {
                digest_field,
                digest_udf_name,
            } => DigestGenStrategy::UdfBased {
                digest_field: conversion.apply(digest_field),
                digest_udf_name: digest_udf_name.clone(),
            },
            DigestGenStrategy::UserProvided { digest_field } => DigestGenStrategy::UserProvided {
                digest_field: conversion.apply(digest_field),
            },
        }
    }
}

/// How deletes are expressed in a delta batch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MergeStrategy {
    #[default]
    NoDeletes,
    /// Rows whose indicator column holds one of `delete_values` are deletes.
    DeleteIndicator {
        delete_field: SmolStr,
        #[serde(default)]
        delete_values: Vec<String>,
    },
}

impl MergeStrategy {
    /// Delete-indicator strategy.
    pub fn delete_indicator<I, S>(field: impl Into<SmolStr>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MergeStrategy::DeleteIndicator {
            delete_field: field.into(),
            delete_values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// The delete indicator column, if any.
    pub fn delete_field(&self) -> Option<&SmolStr> {
        match self {
            MergeStrategy::NoDeletes => None,
            MergeStrategy::DeleteIndicator { delete_field, .. } => Some(delete_field),
        }
    }

    /// Rewrite every column name. Delete values are data and stay as-is.
    pub fn with_case(&self, conversion: CaseConversion) -> Self {
        match self {
            MergeStrategy::NoDeletes => MergeStrategy::NoDeletes,
            MergeStrategy::DeleteIndicator {
                delete_field,
                delete_values,
            } => MergeStrategy::DeleteIndicator {
                delete_field: conversion.apply(delete_field),
                delete_values: delete_values.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_field_names() {
        assert_eq!(
            TransactionMilestoning::batch_id_and_date_time().field_names(),
            vec![
                "batch_id_in",
                "batch_id_out",
                "batch_time_in",
                "batch_time_out"
            ]
        );
    }

    #[test]
    fn test_derivation_preserve_flag_defaults_to_false() {
        let derivation = ValidityDerivation::source_from("start");
        assert!(!derivation.preserves_source_fields());
        assert!(derivation.preserve(true).preserves_source_fields());

        let parsed: ValidityDerivation =
            serde_json::from_str(r#"{"kind":"source_specifies_from","source_from_field":"start"}"#)
                .unwrap();
        assert!(!parsed.preserves_source_fields());
    }

    #[test]
    fn test_digest_field_ownership() {
        let udf = DigestGenStrategy::udf_based("digest", "md5");
        let user = DigestGenStrategy::user_provided("digest");
        assert_eq!(udf.generated_digest_field().map(SmolStr::as_str), Some("digest"));
        assert_eq!(user.generated_digest_field(), None);
        assert_eq!(user.digest_field().map(SmolStr::as_str), Some("digest"));
    }

    #[test]
    fn test_versioning_data_split_field() {
        assert_eq!(
            Versioning::all_versions("version")
                .data_split_field()
                .map(SmolStr::as_str),
            Some(DEFAULT_DATA_SPLIT_FIELD)
        );
        assert_eq!(Versioning::max_version("version").data_split_field(), None);
    }

    #[test]
    fn test_merge_strategy_case_keeps_values() {
        let strategy = MergeStrategy::delete_indicator("is_deleted", ["yes"]);
        let upper = strategy.with_case(CaseConversion::ToUpper);
        assert_eq!(upper.delete_field().map(SmolStr::as_str), Some("IS_DELETED"));
        assert_eq!(
            upper,
            MergeStrategy::DeleteIndicator {
                delete_field: "IS_DELETED".into(),
                delete_values: vec!["yes".to_string()],
            }
        );
    }
}
