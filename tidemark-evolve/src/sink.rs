//! Sink abstraction.
//!
//! A [`Sink`] reports what the storage backend can do and which type
//! conversions it accepts. [`TypeMappingSink`] is a table-driven
//! implementation with presets for known backends.

use std::collections::{HashMap, HashSet};
use std::fmt;

use tidemark_schema::DataType;

use crate::capability::Capability;
use crate::resolve::DataTypeEvolution;

/// A storage backend as seen by the evolution planner.
///
/// Implementations must be stateless or internally synchronized.
pub trait Sink: Send + Sync {
    /// What the backend can do.
    fn capabilities(&self) -> &HashSet<Capability>;

    /// Whether a `main` column accepts `staging` values without conversion.
    fn supports_implicit_mapping(&self, main: DataType, staging: DataType) -> bool;

    /// Whether a `main` column can be converted to the `staging` type.
    fn supports_explicit_mapping(&self, main: DataType, staging: DataType) -> bool;

    /// The length of the evolved column.
    fn evolve_to_length(
        &self,
        column: &str,
        main_length: Option<u32>,
        staging_length: Option<u32>,
        main_type: DataType,
        staging_type: DataType,
        evolution: DataTypeEvolution,
    ) -> Option<u32>;

    /// The scale of the evolved column.
    fn evolve_to_scale(
        &self,
        column: &str,
        main_scale: Option<u32>,
        staging_scale: Option<u32>,
        main_type: DataType,
        staging_type: DataType,
        evolution: DataTypeEvolution,
    ) -> Option<u32>;
}

/// Default sizing shared by length and scale.
///
/// When both sides are sized the larger wins. Otherwise the side whose type
/// survives the evolution decides.
pub fn evolve_size(
    main: Option<u32>,
    staging: Option<u32>,
    evolution: DataTypeEvolution,
) -> Option<u32> {
    match (main, staging) {
        (Some(m), Some(s)) => Some(m.max(s)),
        _ => match evolution {
            DataTypeEvolution::SameDataType => main.or(staging),
            DataTypeEvolution::ImplicitConversion => main,
            DataTypeEvolution::ExplicitConversion => staging,
        },
    }
}

/// A sink described by a capability set and two type mapping tables.
///
/// The implicit table maps a main type to the staging types it accepts. The
/// explicit table maps a main type to the types it can be converted to.
#[derive(Clone, Default)]
pub struct TypeMappingSink {
    name: &'static str,
    capabilities: HashSet<Capability>,
    implicit: HashMap<DataType, HashSet<DataType>>,
    explicit: HashMap<DataType, HashSet<DataType>>,
}

impl TypeMappingSink {
    /// Create an empty sink with no capabilities.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    /// Add a capability.
    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    /// Declare the staging types a main type accepts implicitly.
    pub fn with_implicit(
        mut self,
        main: DataType,
        staging: impl IntoIterator<Item = DataType>,
    ) -> Self {
        self.implicit.entry(main).or_default().extend(staging);
        self
    }

    /// Declare the types a main type can be converted to.
    pub fn with_explicit(
        mut self,
        main: DataType,
        targets: impl IntoIterator<Item = DataType>,
    ) -> Self {
        self.explicit.entry(main).or_default().extend(targets);
        self
    }

    /// The sink name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// An H2-style sink: every capability and a full conversion table.
    pub fn h2() -> Self {
        use DataType::*;

        Self::new("h2")
            .with_capability(Capability::AddColumn)
            .with_capability(Capability::ImplicitDataTypeConversion)
            .with_capability(Capability::ExplicitDataTypeConversion)
            .with_capability(Capability::DataTypeLengthChange)
            .with_capability(Capability::DataTypeScaleChange)
            .with_implicit(
                Decimal,
                [TinyInt, SmallInt, Integer, Int, BigInt, Float, Double, Real, Numeric],
            )
            .with_implicit(Double, [TinyInt, SmallInt, Integer, Int, Float, Real])
            .with_implicit(Real, [TinyInt, SmallInt, Integer, Int, Float, Double])
            .with_implicit(BigInt, [TinyInt, SmallInt, Integer, Int])
            .with_implicit(Integer, [Int, TinyInt, SmallInt])
            .with_implicit(SmallInt, [TinyInt])
            .with_implicit(Varchar, [Char, String])
            .with_implicit(Timestamp, [Datetime])
            .with_explicit(
                TinyInt,
                [SmallInt, Integer, Int, BigInt, Float, Double, Decimal, Numeric],
            )
            .with_explicit(
                SmallInt,
                [Integer, Int, BigInt, Float, Double, Decimal, Numeric],
            )
            .with_explicit(Integer, [BigInt, Float, Double, Decimal, Numeric])
            .with_explicit(Int, [BigInt, Float, Double, Decimal, Numeric])
            .with_explicit(BigInt, [Decimal, Numeric])
            .with_explicit(Real, [Double, Decimal, Numeric])
            .with_explicit(Double, [Decimal, Numeric])
            .with_explicit(Char, [Varchar, LongText, String])
            .with_explicit(Varchar, [LongText])
    }

    /// A Snowflake-style sink: implicit conversions and length changes only.
    pub fn snowflake() -> Self {
        use DataType::*;

        Self::new("snowflake")
            .with_capability(Capability::AddColumn)
            .with_capability(Capability::ImplicitDataTypeConversion)
            .with_capability(Capability::DataTypeLengthChange)
            .with_implicit(
                Decimal,
                [TinyInt, SmallInt, Integer, Int, BigInt, Float, Double, Real, Numeric],
            )
            .with_implicit(Double, [TinyInt, SmallInt, Integer, Int, Float, Real])
            .with_implicit(BigInt, [TinyInt, SmallInt, Integer, Int])
            .with_implicit(Varchar, [Char, String, Text])
            .with_implicit(Timestamp, [Datetime])
            .with_implicit(Json, [Variant])
    }

    /// A plain ANSI sink that supports no schema evolution.
    pub fn ansi() -> Self {
        Self::new("ansi")
    }
}

impl fmt::Debug for TypeMappingSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeMappingSink")
            .field("name", &self.name)
            .field("capabilities", &self.capabilities)
            .field("implicit_mappings", &self.implicit.len())
            .field("explicit_mappings", &self.explicit.len())
            .finish()
    }
}

impl Sink for TypeMappingSink {
    fn capabilities(&self) -> &HashSet<Capability> {
        &self.capabilities
    }

    fn supports_implicit_mapping(&self, main: DataType, staging: DataType) -> bool {
        self.implicit
            .get(&main)
            .is_some_and(|accepted| accepted.contains(&staging))
    }

    fn supports_explicit_mapping(&self, main: DataType, staging: DataType) -> bool {
        self.explicit
            .get(&main)
            .is_some_and(|targets| targets.contains(&staging))
    }

    fn evolve_to_length(
        &self,
        _column: &str,
        main_length: Option<u32>,
        staging_length: Option<u32>,
        _main_type: DataType,
        _staging_type: DataType,
        evolution: DataTypeEvolution,
    ) -> Option<u32> {
        evolve_size(main_length, staging_length, evolution)
    }

    fn evolve_to_scale(
        &self,
        _column: &str,
        main_scale: Option<u32>,
        staging_scale: Option<u32>,
        _main_type: DataType,
        _staging_type: DataType,
        evolution: DataTypeEvolution,
    ) -> Option<u32> {
        evolve_size(main_scale, staging_scale, evolution)
    }
}
