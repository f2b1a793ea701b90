//! Sink capabilities, operator authorizations and the joint gate over both.
//!
//! A schema change goes ahead only when the sink can perform it *and* the
//! operator has allowed it. [`Authorization`] is the single place that
//! combines the two sets.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// What a sink is technically able to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Capability {
    AddColumn,
    ImplicitDataTypeConversion,
    ExplicitDataTypeConversion,
    DataTypeLengthChange,
    DataTypeScaleChange,
}

/// What the operator has allowed for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchemaEvolutionCapability {
    AddColumn,
    DataTypeConversion,
    DataTypeLengthChange,
    DataTypeScaleChange,
    ColumnNullabilityChange,
    AllowMissingColumns,
}

impl SchemaEvolutionCapability {
    /// All operator capabilities.
    pub const ALL: [SchemaEvolutionCapability; 6] = [
        SchemaEvolutionCapability::AddColumn,
        SchemaEvolutionCapability::DataTypeConversion,
        SchemaEvolutionCapability::DataTypeLengthChange,
        SchemaEvolutionCapability::DataTypeScaleChange,
        SchemaEvolutionCapability::ColumnNullabilityChange,
        SchemaEvolutionCapability::AllowMissingColumns,
    ];

    /// The configuration spelling of this capability.
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaEvolutionCapability::AddColumn => "ADD_COLUMN",
            SchemaEvolutionCapability::DataTypeConversion => "DATA_TYPE_CONVERSION",
            SchemaEvolutionCapability::DataTypeLengthChange => "DATA_TYPE_LENGTH_CHANGE",
            SchemaEvolutionCapability::DataTypeScaleChange => "DATA_TYPE_SCALE_CHANGE",
            SchemaEvolutionCapability::ColumnNullabilityChange => "COLUMN_NULLABILITY_CHANGE",
            SchemaEvolutionCapability::AllowMissingColumns => "ALLOW_MISSING_COLUMNS",
        }
    }
}

impl fmt::Display for SchemaEvolutionCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A class of schema change subject to gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvolutionClass {
    AddColumn,
    ImplicitConversion,
    ExplicitConversion,
    LengthChange,
    ScaleChange,
    NullabilityChange,
    MissingColumns,
}

impl EvolutionClass {
    /// The sink capability this class needs, if any.
    pub fn sink_requirement(&self) -> Option<Capability> {
        match self {
            EvolutionClass::AddColumn => Some(Capability::AddColumn),
            EvolutionClass::ImplicitConversion => Some(Capability::ImplicitDataTypeConversion),
            EvolutionClass::ExplicitConversion => Some(Capability::ExplicitDataTypeConversion),
            EvolutionClass::LengthChange => Some(Capability::DataTypeLengthChange),
            EvolutionClass::ScaleChange => Some(Capability::DataTypeScaleChange),
            EvolutionClass::NullabilityChange | EvolutionClass::MissingColumns => None,
        }
    }

    /// The operator capability this class needs, if any.
    pub fn operator_requirement(&self) -> Option<SchemaEvolutionCapability> {
        match self {
            EvolutionClass::AddColumn => Some(SchemaEvolutionCapability::AddColumn),
            EvolutionClass::ImplicitConversion => None,
            EvolutionClass::ExplicitConversion => {
                Some(SchemaEvolutionCapability::DataTypeConversion)
            }
            EvolutionClass::LengthChange => Some(SchemaEvolutionCapability::DataTypeLengthChange),
            EvolutionClass::ScaleChange => Some(SchemaEvolutionCapability::DataTypeScaleChange),
            EvolutionClass::NullabilityChange => {
                Some(SchemaEvolutionCapability::ColumnNullabilityChange)
            }
            EvolutionClass::MissingColumns => Some(SchemaEvolutionCapability::AllowMissingColumns),
        }
    }
}

/// The sink and operator capability sets for one evolution run.
#[derive(Debug, Clone, Copy)]
pub struct Authorization<'a> {
    sink: &'a HashSet<Capability>,
    operator: &'a HashSet<SchemaEvolutionCapability>,
}

impl<'a> Authorization<'a> {
    /// Pair a sink capability set with an operator capability set.
    pub fn new(
        sink: &'a HashSet<Capability>,
        operator: &'a HashSet<SchemaEvolutionCapability>,
    ) -> Self {
        Self { sink, operator }
    }

    /// Whether the sink can perform changes of this class.
    pub fn sink_supports(&self, class: EvolutionClass) -> bool {
        class
            .sink_requirement()
            .is_none_or(|cap| self.sink.contains(&cap))
    }

    /// Whether the operator has allowed changes of this class.
    pub fn operator_allows(&self, class: EvolutionClass) -> bool {
        class
            .operator_requirement()
            .is_none_or(|cap| self.operator.contains(&cap))
    }

    /// Whether a change of this class may go ahead. Both sides must agree.
    pub fn is_authorized(&self, class: EvolutionClass) -> bool {
        self.sink_supports(class) && self.operator_allows(class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLASSES: [EvolutionClass; 7] = [
        EvolutionClass::AddColumn,
        EvolutionClass::ImplicitConversion,
        EvolutionClass::ExplicitConversion,
        EvolutionClass::LengthChange,
        EvolutionClass::ScaleChange,
        EvolutionClass::NullabilityChange,
        EvolutionClass::MissingColumns,
    ];

    fn all_sink() -> HashSet<Capability> {
        CLASSES.iter().filter_map(|c| c.sink_requirement()).collect()
    }

    fn all_operator() -> HashSet<SchemaEvolutionCapability> {
        SchemaEvolutionCapability::ALL.into_iter().collect()
    }

    #[test]
    fn test_each_class_needs_both_sides() {
        for class in CLASSES {
            let sink = all_sink();
            let operator = all_operator();
            assert!(Authorization::new(&sink, &operator).is_authorized(class));

            if let Some(cap) = class.sink_requirement() {
                let mut sink = all_sink();
                sink.remove(&cap);
                assert!(
                    !Authorization::new(&sink, &operator).is_authorized(class),
                    "{class:?} accepted without sink capability"
                );
            }

            if let Some(cap) = class.operator_requirement() {
                let sink = all_sink();
                let mut operator = all_operator();
                operator.remove(&cap);
                assert!(
                    !Authorization::new(&sink, &operator).is_authorized(class),
                    "{class:?} accepted without operator capability"
                );
            }
        }
    }

    #[test]
    fn test_empty_sets_only_allow_unrequired_sides() {
        let sink = HashSet::new();
        let operator = HashSet::new();
        let auth = Authorization::new(&sink, &operator);
        assert!(auth.operator_allows(EvolutionClass::ImplicitConversion));
        assert!(!auth.sink_supports(EvolutionClass::ImplicitConversion));
        assert!(auth.sink_supports(EvolutionClass::MissingColumns));
        for class in CLASSES {
            assert!(!auth.is_authorized(class));
        }
    }

    #[test]
    fn test_capability_serde_spelling() {
        let json = serde_json::to_string(&SchemaEvolutionCapability::AllowMissingColumns).unwrap();
        assert_eq!(json, "\"ALLOW_MISSING_COLUMNS\"");

        let cap: Capability = serde_json::from_str("\"IMPLICIT_DATA_TYPE_CONVERSION\"").unwrap();
        assert_eq!(cap, Capability::ImplicitDataTypeConversion);

        for cap in SchemaEvolutionCapability::ALL {
            let json = serde_json::to_string(&cap).unwrap();
            assert_eq!(json, format!("\"{}\"", cap.as_str()));
        }
    }
}
