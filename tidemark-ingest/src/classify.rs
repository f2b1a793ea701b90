//! Bookkeeping field classifiers.
//!
//! Generated and system-maintained columns never take part in schema
//! comparison. These two functions decide which names are excluded on each
//! side for a given [`IngestMode`].

use indexmap::IndexSet;
use smol_str::SmolStr;

use crate::mode::IngestMode;
use crate::strategy::{MergeStrategy, ValidityMilestoning};

/// Staging columns that are generated during ingestion and must not be
/// reconciled against main.
pub fn staging_fields_to_ignore(mode: &IngestMode) -> IndexSet<SmolStr> {
    let mut fields = IndexSet::new();

    if let Some(field) = mode.data_split_field() {
        fields.insert(field.clone());
    }
    if let Some(field) = mode.deduplication().and_then(|d| d.count_field()) {
        fields.insert(field.clone());
    }

    match mode {
        IngestMode::AppendOnly(_)
        | IngestMode::NontemporalSnapshot(_)
        | IngestMode::NontemporalDelta(_)
        | IngestMode::UnitemporalSnapshot(_) => {}
        IngestMode::UnitemporalDelta(m) => {
            extend_with_delete_field(&mut fields, &m.merge_strategy);
        }
        IngestMode::BitemporalSnapshot(m) => {
            extend_with_hidden_sources(&mut fields, &m.validity_milestoning);
        }
        IngestMode::BitemporalDelta(m) => {
            extend_with_hidden_sources(&mut fields, &m.validity_milestoning);
            extend_with_delete_field(&mut fields, &m.merge_strategy);
        }
        IngestMode::BulkLoad(_) | IngestMode::NoOp => {}
    }

    fields
}

/// Main columns maintained by the system that staging never supplies.
pub fn main_fields_to_ignore(mode: &IngestMode) -> IndexSet<SmolStr> {
    let mut fields = IndexSet::new();

    match mode {
        IngestMode::AppendOnly(m) => {
            fields.insert(m.batch_id_field.clone());
            fields.extend(m.auditing.audit_field().cloned());
            fields.extend(m.digest_gen_strategy.generated_digest_field().cloned());
        }
        IngestMode::NontemporalSnapshot(m) => {
            fields.insert(m.batch_id_field.clone());
            fields.extend(m.auditing.audit_field().cloned());
        }
        IngestMode::NontemporalDelta(m) => {
            fields.insert(m.batch_id_field.clone());
            fields.extend(m.auditing.audit_field().cloned());
        }
        IngestMode::UnitemporalSnapshot(m) => {
            fields.extend(m.transaction_milestoning.field_names().into_iter().cloned());
        }
        IngestMode::UnitemporalDelta(m) => {
            fields.extend(m.transaction_milestoning.field_names().into_iter().cloned());
        }
        IngestMode::BitemporalSnapshot(m) => {
            fields.extend(m.transaction_milestoning.field_names().into_iter().cloned());
            fields.extend(m.validity_milestoning.field_names().into_iter().cloned());
        }
        IngestMode::BitemporalDelta(m) => {
            fields.extend(m.transaction_milestoning.field_names().into_iter().cloned());
            fields.extend(m.validity_milestoning.field_names().into_iter().cloned());
        }
        IngestMode::BulkLoad(m) => {
            fields.insert(m.batch_id_field.clone());
            fields.extend(m.auditing.audit_field().cloned());
            fields.extend(m.digest_gen_strategy.generated_digest_field().cloned());
        }
        IngestMode::NoOp => {}
    }

    fields
}

fn extend_with_delete_field(fields: &mut IndexSet<SmolStr>, strategy: &MergeStrategy) {
    fields.extend(strategy.delete_field().cloned());
}

fn extend_with_hidden_sources(fields: &mut IndexSet<SmolStr>, validity: &ValidityMilestoning) {
    let derivation = validity.derivation();
    if !derivation.preserves_source_fields() {
        fields.extend(derivation.source_fields().into_iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{
        Auditing, Deduplication, DigestGenStrategy, TransactionMilestoning, ValidityDerivation,
        Versioning,
    };
    use pretty_assertions::assert_eq;

    fn names(set: &IndexSet<SmolStr>) -> Vec<&str> {
        set.iter().map(SmolStr::as_str).collect()
    }

    fn bitemporal_delta(preserve: bool) -> IngestMode {
        IngestMode::bitemporal_delta(
            "digest",
            TransactionMilestoning::batch_id_and_date_time(),
            ValidityMilestoning::date_time(
                ValidityDerivation::source_from_and_thru("start", "end").preserve(preserve),
            ),
        )
        .with_merge_strategy(MergeStrategy::delete_indicator("is_deleted", ["Y"]))
        .with_deduplication(Deduplication::filter_duplicates())
        .into()
    }

    #[test]
    fn test_staging_ignores_generated_columns() {
        let mode: IngestMode = IngestMode::append_only()
            .with_deduplication(Deduplication::fail_on_duplicates())
            .with_versioning(Versioning::all_versions("version"))
            .into();

        assert_eq!(
            names(&staging_fields_to_ignore(&mode)),
            vec!["data_split", "duplicate_count"]
        );
    }

    #[test]
    fn test_bitemporal_hides_unpreserved_sources() {
        assert_eq!(
            names(&staging_fields_to_ignore(&bitemporal_delta(false))),
            vec!["duplicate_count", "start", "end", "is_deleted"]
        );
        assert_eq!(
            names(&staging_fields_to_ignore(&bitemporal_delta(true))),
            vec!["duplicate_count", "is_deleted"]
        );
    }

    #[test]
    fn test_nontemporal_delta_keeps_delete_field_visible() {
        let mode: IngestMode = IngestMode::nontemporal_delta("digest")
            .with_merge_strategy(MergeStrategy::delete_indicator("is_deleted", ["Y"]))
            .into();
        assert!(staging_fields_to_ignore(&mode).is_empty());
    }

    #[test]
    fn test_bulk_load_and_no_op_ignore_nothing_in_staging() {
        let mode: IngestMode = IngestMode::bulk_load().into();
        assert!(staging_fields_to_ignore(&mode).is_empty());
        assert!(staging_fields_to_ignore(&IngestMode::NoOp).is_empty());
        assert!(main_fields_to_ignore(&IngestMode::NoOp).is_empty());
    }

    #[test]
    fn test_main_ignores_milestoning_columns() {
        assert_eq!(
            names(&main_fields_to_ignore(&bitemporal_delta(false))),
            vec![
                "batch_id_in",
                "batch_id_out",
                "batch_time_in",
                "batch_time_out",
                "valid_from",
                "valid_through"
            ]
        );
    }

    #[test]
    fn test_main_ignores_only_generated_digest() {
        let udf: IngestMode = IngestMode::append_only()
            .with_auditing(Auditing::date_time("audit_ts"))
            .with_digest_gen_strategy(DigestGenStrategy::udf_based("digest", "md5"))
            .into();
        assert_eq!(
            names(&main_fields_to_ignore(&udf)),
            vec!["batch_id", "audit_ts", "digest"]
        );

        let user: IngestMode = IngestMode::bulk_load()
            .with_digest_gen_strategy(DigestGenStrategy::user_provided("digest"))
            .into();
        assert_eq!(names(&main_fields_to_ignore(&user)), vec!["batch_id"]);
    }

    #[test]
    fn test_nontemporal_snapshot_main_fields() {
        let mode: IngestMode = IngestMode::nontemporal_snapshot()
            .with_auditing(Auditing::date_time("audit_ts"))
            .into();
        assert_eq!(
            names(&main_fields_to_ignore(&mode)),
            vec!["batch_id", "audit_ts"]
        );
    }
}
