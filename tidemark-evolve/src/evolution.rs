//! The schema evolution planner.

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tidemark_ingest::{IngestMode, main_fields_to_ignore, staging_fields_to_ignore};
use tidemark_schema::{CaseConversion, CaseRule, Dataset, SchemaDefinition};
use tracing::{debug, info};

use crate::capability::{Authorization, SchemaEvolutionCapability};
use crate::config::EvolutionConfig;
use crate::error::EvolutionResult;
use crate::operation::SchemaEvolutionResult;
use crate::reconcile::{Reconciler, validate_primary_keys};
use crate::sink::Sink;

const STAGING_DATASET: &str = "staging";

/// Plans the operations that make a main dataset accept a staging batch.
///
/// Planning is a pure function of its inputs: it performs no I/O and either
/// returns the complete plan or fails without a partial result.
#[derive(Clone)]
pub struct SchemaEvolution {
    sink: Arc<dyn Sink>,
    ingest_mode: IngestMode,
    capabilities: HashSet<SchemaEvolutionCapability>,
    ignore_case: bool,
    case_conversion: CaseConversion,
}

impl SchemaEvolution {
    /// Create a planner for `sink` under `ingest_mode` with the operator's
    /// authorized capabilities.
    pub fn new(
        sink: Arc<dyn Sink>,
        ingest_mode: IngestMode,
        capabilities: impl IntoIterator<Item = SchemaEvolutionCapability>,
    ) -> Self {
        Self {
            sink,
            ingest_mode,
            capabilities: capabilities.into_iter().collect(),
            ignore_case: false,
            case_conversion: CaseConversion::None,
        }
    }

    /// Create a planner from a loaded configuration.
    pub fn from_config(
        sink: Arc<dyn Sink>,
        ingest_mode: IngestMode,
        config: &EvolutionConfig,
    ) -> Self {
        Self::new(sink, ingest_mode, config.authorized()).ignore_case(config.evolution.ignore_case)
    }

    /// Compare column names case-insensitively.
    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    /// Rewrite every identifier before planning, for sinks that fold case.
    pub fn with_case(mut self, conversion: CaseConversion) -> Self {
        self.case_conversion = conversion;
        self
    }

    /// The ingest mode.
    pub fn ingest_mode(&self) -> &IngestMode {
        &self.ingest_mode
    }

    /// The authorized capabilities.
    pub fn capabilities(&self) -> &HashSet<SchemaEvolutionCapability> {
        &self.capabilities
    }

    fn case_rule(&self) -> CaseRule {
        CaseRule::from_ignore_case(self.ignore_case)
    }

    /// Plan the evolution of `main_dataset` towards `staging_schema`.
    pub fn build_logical_plan(
        &self,
        main_dataset: &Dataset,
        staging_schema: &SchemaDefinition,
    ) -> EvolutionResult<SchemaEvolutionResult> {
        let (main_dataset, staging_schema, ingest_mode) = match self.case_conversion {
            CaseConversion::None => (
                Cow::Borrowed(main_dataset),
                Cow::Borrowed(staging_schema),
                Cow::Borrowed(&self.ingest_mode),
            ),
            conversion => (
                Cow::Owned(main_dataset.with_case(conversion)),
                Cow::Owned(staging_schema.with_case(conversion)),
                Cow::Owned(self.ingest_mode.with_case(conversion)),
            ),
        };

        let rule = self.case_rule();
        let main = main_dataset.schema();

        main.validate(main_dataset.name(), rule)?;
        staging_schema.validate(STAGING_DATASET, rule)?;

        let ignore_staging = staging_fields_to_ignore(&ingest_mode);
        let ignore_main = main_fields_to_ignore(&ingest_mode);
        debug!(
            dataset = main_dataset.name(),
            mode = ingest_mode.name(),
            ?ignore_staging,
            ?ignore_main,
            "classified bookkeeping fields"
        );

        validate_primary_keys(main, &staging_schema, &ignore_main, &ignore_staging, rule)?;

        let auth = Authorization::new(self.sink.capabilities(), &self.capabilities);
        let reconciler = Reconciler::new(self.sink.as_ref(), auth, rule);
        let reconciliation =
            reconciler.reconcile(main, &staging_schema, &ignore_staging, &ignore_main)?;

        let evolved = main_dataset.with_schema(reconciliation.merge(main, rule));
        let result = SchemaEvolutionResult::new(reconciliation.into_operations(), evolved);

        info!(
            dataset = main_dataset.name(),
            operations = result.operations().len(),
            summary = %result.summary(),
            "schema evolution planned"
        );

        Ok(result)
    }
}

impl fmt::Debug for SchemaEvolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaEvolution")
            .field("ingest_mode", &self.ingest_mode.name())
            .field("capabilities", &self.capabilities)
            .field("ignore_case", &self.ignore_case)
            .field("case_conversion", &self.case_conversion)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::SchemaEvolutionCapability as Op;
    use crate::error::EvolutionError;
    use crate::operation::Operation;
    use crate::sink::TypeMappingSink;
    use pretty_assertions::assert_eq;
    use tidemark_ingest::{Auditing, TransactionMilestoning};
    use tidemark_schema::{DataType, Field, FieldType, SchemaError};

    fn planner(ops: &[Op]) -> SchemaEvolution {
        SchemaEvolution::new(
            Arc::new(TypeMappingSink::h2()),
            IngestMode::nontemporal_snapshot().into(),
            ops.iter().copied(),
        )
    }

    fn id() -> Field {
        Field::new("id", DataType::Int).primary_key()
    }

    #[test]
    fn test_identical_schemas_need_no_changes() {
        let main = Dataset::named(
            "orders",
            SchemaDefinition::new([
                id(),
                Field::new("name", FieldType::sized(DataType::Varchar, 10)),
            ]),
        );
        let result = planner(&[])
            .build_logical_plan(&main, main.schema())
            .unwrap();
        assert!(result.is_empty());
        assert_eq!(result.evolved_dataset(), &main);
    }

    #[test]
    fn test_bookkeeping_columns_are_skipped() {
        let main = Dataset::named(
            "orders",
            SchemaDefinition::new([
                id(),
                Field::new("batch_id_in", DataType::Int).not_null(),
                Field::new("batch_id_out", DataType::Int).not_null(),
                Field::new("audit_ts", DataType::Timestamp).not_null(),
            ]),
        );
        let staging = SchemaDefinition::new([id()]);
        let mode: IngestMode =
            IngestMode::unitemporal_snapshot("digest", TransactionMilestoning::batch_id()).into();

        let err = SchemaEvolution::new(
            Arc::new(TypeMappingSink::h2()),
            mode.clone(),
            Vec::<Op>::new(),
        )
        .build_logical_plan(&main, &staging)
        .unwrap_err();
        assert!(err.to_string().contains("audit_ts"));

        let main = main.with_schema(SchemaDefinition::new(main.schema().fields()[..3].to_vec()));
        let result = SchemaEvolution::new(Arc::new(TypeMappingSink::h2()), mode, Vec::<Op>::new())
            .build_logical_plan(&main, &staging)
            .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_audit_field_is_skipped_for_nontemporal() {
        let main = Dataset::named(
            "orders",
            SchemaDefinition::new([id(), Field::new("audit_ts", DataType::Timestamp).not_null()]),
        );
        let mode: IngestMode = IngestMode::nontemporal_snapshot()
            .with_auditing(Auditing::date_time("audit_ts"))
            .into();
        let result = SchemaEvolution::new(Arc::new(TypeMappingSink::h2()), mode, Vec::<Op>::new())
            .build_logical_plan(&main, &SchemaDefinition::new([id()]))
            .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_duplicate_staging_fields_fail_validation() {
        let main = Dataset::named("orders", SchemaDefinition::new([id()]));
        let staging = SchemaDefinition::new([id(), Field::new("ID", DataType::Int)]);

        let err = planner(&Op::ALL)
            .ignore_case(true)
            .build_logical_plan(&main, &staging)
            .unwrap_err();
        match err {
            EvolutionError::InvalidSchema(SchemaError::DuplicateField { dataset, name }) => {
                assert_eq!(dataset, "staging");
                assert_eq!(name, "ID");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_case_conversion_aligns_inputs() {
        let main = Dataset::named(
            "ORDERS",
            SchemaDefinition::new([Field::new("ID", DataType::Int).primary_key()]),
        );
        let staging = SchemaDefinition::new([
            id(),
            Field::new("email", FieldType::sized(DataType::Varchar, 50)),
        ]);

        let result = planner(&[Op::AddColumn])
            .with_case(CaseConversion::ToUpper)
            .build_logical_plan(&main, &staging)
            .unwrap();
        assert_eq!(
            result.operations(),
            &[Operation::Add {
                field: Field::new("EMAIL", FieldType::sized(DataType::Varchar, 50)),
            }]
        );
        assert_eq!(result.evolved_dataset().name(), "ORDERS");
    }

    #[test]
    fn test_from_config() {
        let config = EvolutionConfig::new()
            .with_capability(Op::AddColumn)
            .ignore_case(true);
        let planner = SchemaEvolution::from_config(
            Arc::new(TypeMappingSink::ansi()),
            IngestMode::NoOp,
            &config,
        );
        assert!(planner.capabilities().contains(&Op::AddColumn));
        assert_eq!(planner.case_rule(), CaseRule::Insensitive);
        assert_eq!(planner.ingest_mode(), &IngestMode::NoOp);
    }
}
