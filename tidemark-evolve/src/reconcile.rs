//! Column reconciliation between a staging schema and a main dataset.
//!
//! The passes run in a fixed order: staging to main, cluster keys, then
//! main to staging. Each pass appends operations and records the evolved
//! form of every column it touches. [`Reconciliation::merge`] folds those
//! columns back into the main schema.

use indexmap::{IndexMap, IndexSet};
use smol_str::SmolStr;
use tidemark_schema::{CaseRule, ClusterKey, Field, SchemaDefinition};
use tracing::{debug, warn};

use crate::capability::{Authorization, EvolutionClass, SchemaEvolutionCapability};
use crate::error::{EvolutionError, EvolutionResult};
use crate::operation::Operation;
use crate::resolve::resolve_field_type;
use crate::sink::Sink;

/// Fail unless both sides declare the same primary key columns.
///
/// Bookkeeping columns named by the ignore sets are left out on each side.
pub fn validate_primary_keys(
    main: &SchemaDefinition,
    staging: &SchemaDefinition,
    ignore_main: &IndexSet<SmolStr>,
    ignore_staging: &IndexSet<SmolStr>,
    rule: CaseRule,
) -> EvolutionResult<()> {
    let main_pks = primary_key_names(main, ignore_main, rule);
    let staging_pks = primary_key_names(staging, ignore_staging, rule);

    if main_pks != staging_pks {
        debug!(?main_pks, ?staging_pks, "primary key mismatch");
        return Err(EvolutionError::incompatible(
            "Primary keys for main table has changed which is not allowed",
        ));
    }
    Ok(())
}

fn primary_key_names(
    schema: &SchemaDefinition,
    ignore: &IndexSet<SmolStr>,
    rule: CaseRule,
) -> IndexSet<SmolStr> {
    let ignore = keys(ignore, rule);
    let mut names: IndexSet<SmolStr> = schema
        .primary_keys()
        .map(|f| rule.owned_key(f.name()))
        .filter(|key| !ignore.contains(key))
        .collect();
    names.sort();
    names
}

fn keys(names: &IndexSet<SmolStr>, rule: CaseRule) -> IndexSet<SmolStr> {
    names.iter().map(|n| rule.owned_key(n)).collect()
}

/// Accumulated output of the reconciliation passes.
#[derive(Debug, Default)]
pub struct Reconciliation {
    operations: Vec<Operation>,
    modified: IndexMap<SmolStr, Field>,
    added: Vec<Field>,
    cluster_keys: Option<Vec<ClusterKey>>,
}

impl Reconciliation {
    /// The operations planned so far.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Columns of main that were evolved, keyed by comparison key.
    pub fn modified_fields(&self) -> impl Iterator<Item = &Field> {
        self.modified.values()
    }

    /// Columns to be added, in staging order.
    pub fn added_fields(&self) -> &[Field] {
        &self.added
    }

    fn record(&mut self, key: SmolStr, field: Field) {
        self.modified.insert(key, field);
    }

    /// Build the evolved schema.
    ///
    /// Main columns keep their position with evolved columns replaced in
    /// place. Added columns follow in staging order.
    pub fn merge(&self, main: &SchemaDefinition, rule: CaseRule) -> SchemaDefinition {
        let mut fields: Vec<Field> = main
            .fields()
            .iter()
            .map(|field| {
                self.modified
                    .get(&*rule.key(field.name()))
                    .cloned()
                    .unwrap_or_else(|| field.clone())
            })
            .collect();
        fields.extend(self.added.iter().cloned());

        let cluster_keys = self
            .cluster_keys
            .clone()
            .unwrap_or_else(|| main.cluster_keys().to_vec());

        SchemaDefinition {
            fields,
            cluster_keys,
        }
    }

    /// Take the planned operations.
    pub fn into_operations(self) -> Vec<Operation> {
        self.operations
    }
}

/// Runs the reconciliation passes against one sink and authorization.
pub struct Reconciler<'a> {
    sink: &'a dyn Sink,
    auth: Authorization<'a>,
    rule: CaseRule,
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler.
    pub fn new(sink: &'a dyn Sink, auth: Authorization<'a>, rule: CaseRule) -> Self {
        Self { sink, auth, rule }
    }

    /// Run every pass.
    pub fn reconcile(
        &self,
        main: &SchemaDefinition,
        staging: &SchemaDefinition,
        ignore_staging: &IndexSet<SmolStr>,
        ignore_main: &IndexSet<SmolStr>,
    ) -> EvolutionResult<Reconciliation> {
        let mut out = Reconciliation::default();
        self.staging_to_main(main, staging, ignore_staging, &mut out)?;
        self.cluster_keys(main, staging, &mut out);
        self.main_to_staging(main, staging, ignore_main, &mut out)?;
        Ok(out)
    }

    /// Add new columns and evolve matched ones.
    pub fn staging_to_main(
        &self,
        main: &SchemaDefinition,
        staging: &SchemaDefinition,
        ignore_staging: &IndexSet<SmolStr>,
        out: &mut Reconciliation,
    ) -> EvolutionResult<()> {
        let ignore = keys(ignore_staging, self.rule);

        for staging_field in staging.fields() {
            let key = self.rule.owned_key(staging_field.name());
            if ignore.contains(&key) {
                continue;
            }

            match main.field(staging_field.name(), self.rule) {
                None => self.add_column(staging_field, out)?,
                Some(main_field) => self.evolve_column(key, main_field, staging_field, out)?,
            }
        }
        Ok(())
    }

    fn add_column(&self, staging_field: &Field, out: &mut Reconciliation) -> EvolutionResult<()> {
        let name = staging_field.name();
        if !self.auth.is_authorized(EvolutionClass::AddColumn) {
            return Err(EvolutionError::incompatible(format!(
                "Field \"{name}\" in staging dataset does not exist in main dataset. \
                 Couldn't add column since sink/user capabilities do not permit operation."
            )));
        }
        if !staging_field.nullable {
            return Err(EvolutionError::incompatible(format!(
                "Field \"{name}\" in staging dataset is non-nullable and cannot be added \
                 to main dataset"
            )));
        }

        debug!(column = name, "add column");
        out.operations.push(Operation::Add {
            field: staging_field.clone(),
        });
        out.added.push(staging_field.clone());
        Ok(())
    }

    fn evolve_column(
        &self,
        key: SmolStr,
        main_field: &Field,
        staging_field: &Field,
        out: &mut Reconciliation,
    ) -> EvolutionResult<()> {
        let name = main_field.name();
        let field_type = resolve_field_type(
            self.sink,
            &self.auth,
            name,
            main_field.field_type(),
            staging_field.field_type(),
        )?;

        let mut evolved = main_field.with_type(field_type);
        let mut changed = false;

        if field_type != *main_field.field_type() {
            debug!(
                column = name,
                from = %main_field.field_type(),
                to = %field_type,
                "change data type"
            );
            out.operations.push(Operation::ChangeDatatype {
                field: evolved.clone(),
            });
            changed = true;
        }

        if main_field.nullable && !staging_field.nullable {
            return Err(EvolutionError::incompatible(format!(
                "Column \"{name}\" couldn't be made non-nullable since nullability \
                 can only be relaxed"
            )));
        }

        // Primary keys are never relaxed.
        if !main_field.is_primary_key() && !main_field.nullable && staging_field.nullable {
            if !self.auth.is_authorized(EvolutionClass::NullabilityChange) {
                return Err(EvolutionError::incompatible(format!(
                    "Column \"{name}\" couldn't be made nullable since user capability \
                     does not allow it"
                )));
            }

            debug!(column = name, "relax to nullable");
            evolved = evolved.with_nullable(true);
            out.operations.push(Operation::NullableColumn {
                field: evolved.clone(),
            });
            changed = true;
        }

        if changed {
            out.record(key, evolved);
        }
        Ok(())
    }

    /// Adopt the staging cluster keys when they differ from main's.
    ///
    /// This change is not gated by any capability.
    pub fn cluster_keys(
        &self,
        main: &SchemaDefinition,
        staging: &SchemaDefinition,
        out: &mut Reconciliation,
    ) {
        let main_keys: Vec<SmolStr> = main
            .cluster_keys()
            .iter()
            .map(|k| self.rule.owned_key(k.field_name()))
            .collect();
        let staging_keys: Vec<SmolStr> = staging
            .cluster_keys()
            .iter()
            .map(|k| self.rule.owned_key(k.field_name()))
            .collect();

        if main_keys != staging_keys {
            warn!(
                from = ?main_keys,
                to = ?staging_keys,
                "cluster keys changed; applying without capability check"
            );
            let cluster_keys = staging.cluster_keys().to_vec();
            out.operations.push(Operation::AlterClusterKey {
                cluster_keys: cluster_keys.clone(),
            });
            out.cluster_keys = Some(cluster_keys);
        }
    }

    /// Relax main columns that staging no longer supplies.
    pub fn main_to_staging(
        &self,
        main: &SchemaDefinition,
        staging: &SchemaDefinition,
        ignore_main: &IndexSet<SmolStr>,
        out: &mut Reconciliation,
    ) -> EvolutionResult<()> {
        let ignore = keys(ignore_main, self.rule);
        let staging_names = staging.field_keys(self.rule);

        for main_field in main.fields() {
            let key = self.rule.owned_key(main_field.name());
            if ignore.contains(&key) || staging_names.contains(&key) {
                continue;
            }

            let name = main_field.name();
            if !self.auth.is_authorized(EvolutionClass::MissingColumns) {
                return Err(EvolutionError::incompatible(format!(
                    "Field \"{name}\" in main dataset does not exist in staging dataset. \
                     Missing columns require {}",
                    SchemaEvolutionCapability::AllowMissingColumns
                )));
            }
            if main_field.is_primary_key() {
                return Err(EvolutionError::incompatible(format!(
                    "Primary key field \"{name}\" does not exist in staging dataset"
                )));
            }
            if main_field.nullable {
                continue;
            }

            debug!(column = name, "relax missing column to nullable");
            let evolved = main_field.with_nullable(true);
            out.operations.push(Operation::NullableColumn {
                field: evolved.clone(),
            });
            out.record(key, evolved);
        }
        Ok(())
    }
}
