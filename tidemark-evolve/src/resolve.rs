//! Data type resolution for a matched pair of columns.

use serde::{Deserialize, Serialize};
use tidemark_schema::{DataType, FieldType};
use tracing::debug;

use crate::capability::{Authorization, EvolutionClass, SchemaEvolutionCapability};
use crate::error::{EvolutionError, EvolutionResult};
use crate::sink::Sink;

/// How a main column type relates to its staging counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataTypeEvolution {
    /// Both sides carry the same type tag.
    SameDataType,
    /// Main accepts staging values as-is; the main tag is kept.
    ImplicitConversion,
    /// Main is converted to the staging tag.
    ExplicitConversion,
}

/// Pick the evolved type tag for `column`.
pub fn resolve_data_type(
    sink: &dyn Sink,
    auth: &Authorization<'_>,
    column: &str,
    main: DataType,
    staging: DataType,
) -> EvolutionResult<(DataTypeEvolution, DataType)> {
    if main == staging {
        return Ok((DataTypeEvolution::SameDataType, main));
    }

    if auth.is_authorized(EvolutionClass::ImplicitConversion)
        && sink.supports_implicit_mapping(main, staging)
    {
        debug!(column, %main, %staging, "implicit conversion");
        return Ok((DataTypeEvolution::ImplicitConversion, main));
    }

    if auth.sink_supports(EvolutionClass::ExplicitConversion)
        && sink.supports_explicit_mapping(main, staging)
    {
        if !auth.operator_allows(EvolutionClass::ExplicitConversion) {
            return Err(EvolutionError::incompatible(format!(
                "Data type conversion of field \"{column}\" from {main} to {staging} requires {}",
                SchemaEvolutionCapability::DataTypeConversion
            )));
        }
        debug!(column, %main, %staging, "explicit conversion");
        return Ok((DataTypeEvolution::ExplicitConversion, staging));
    }

    Err(EvolutionError::incompatible(format!(
        "Breaking schema change for field \"{column}\" from datatype {main} to {staging}"
    )))
}

/// Resolve the full evolved type of `column`, including sizing.
///
/// A length or scale that differs from the main column's must be allowed by
/// the matching capability pair.
pub fn resolve_field_type(
    sink: &dyn Sink,
    auth: &Authorization<'_>,
    column: &str,
    main: &FieldType,
    staging: &FieldType,
) -> EvolutionResult<FieldType> {
    let (evolution, data_type) =
        resolve_data_type(sink, auth, column, main.data_type, staging.data_type)?;

    let length = sink.evolve_to_length(
        column,
        main.length,
        staging.length,
        main.data_type,
        staging.data_type,
        evolution,
    );
    if length != main.length && !auth.is_authorized(EvolutionClass::LengthChange) {
        return Err(EvolutionError::incompatible(format!(
            "Length change of field \"{column}\" from {} to {} is not allowed",
            render_size(main.length),
            render_size(length)
        )));
    }

    let scale = sink.evolve_to_scale(
        column,
        main.scale,
        staging.scale,
        main.data_type,
        staging.data_type,
        evolution,
    );
    if scale != main.scale && !auth.is_authorized(EvolutionClass::ScaleChange) {
        return Err(EvolutionError::incompatible(format!(
            "Scale change of field \"{column}\" from {} to {} is not allowed",
            render_size(main.scale),
            render_size(scale)
        )));
    }

    Ok(FieldType {
        data_type,
        length,
        scale,
    })
}

fn render_size(size: Option<u32>) -> String {
    size.map_or_else(|| "unspecified".to_string(), |s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{Capability, SchemaEvolutionCapability as Op};
    use crate::sink::TypeMappingSink;
    use std::collections::HashSet;

    fn operator(caps: &[Op]) -> HashSet<Op> {
        caps.iter().copied().collect()
    }

    #[test]
    fn test_same_type_keeps_tag() {
        let sink = TypeMappingSink::h2();
        let ops = operator(&[]);
        let auth = Authorization::new(sink.capabilities(), &ops);
        let resolved = resolve_data_type(&sink, &auth, "id", DataType::Int, DataType::Int);
        assert_eq!(
            resolved.unwrap(),
            (DataTypeEvolution::SameDataType, DataType::Int)
        );
    }

    #[test]
    fn test_implicit_keeps_main_tag() {
        let sink = TypeMappingSink::h2();
        let ops = operator(&[]);
        let auth = Authorization::new(sink.capabilities(), &ops);
        let resolved =
            resolve_data_type(&sink, &auth, "amount", DataType::BigInt, DataType::Int).unwrap();
        assert_eq!(
            resolved,
            (DataTypeEvolution::ImplicitConversion, DataType::BigInt)
        );
    }

    #[test]
    fn test_explicit_needs_operator_authorization() {
        let sink = TypeMappingSink::h2();
        let ops = operator(&[]);
        let auth = Authorization::new(sink.capabilities(), &ops);
        let err = resolve_data_type(&sink, &auth, "amount", DataType::Int, DataType::BigInt)
            .unwrap_err();
        assert!(err.is_incompatible());
        assert!(err.to_string().contains("DATA_TYPE_CONVERSION"));

        let ops = operator(&[Op::DataTypeConversion]);
        let auth = Authorization::new(sink.capabilities(), &ops);
        let resolved =
            resolve_data_type(&sink, &auth, "amount", DataType::Int, DataType::BigInt).unwrap();
        assert_eq!(
            resolved,
            (DataTypeEvolution::ExplicitConversion, DataType::BigInt)
        );
    }

    #[test]
    fn test_unmapped_pair_is_breaking() {
        let sink = TypeMappingSink::h2();
        let ops = operator(&Op::ALL);
        let auth = Authorization::new(sink.capabilities(), &ops);
        let err = resolve_data_type(&sink, &auth, "flag", DataType::Boolean, DataType::Date)
            .unwrap_err();
        assert!(err.to_string().contains("from datatype BOOLEAN to DATE"));
    }

    #[test]
    fn test_length_change_is_gated() {
        let sink = TypeMappingSink::h2();
        let main = FieldType::sized(DataType::Varchar, 10);
        let staging = FieldType::sized(DataType::Varchar, 20);

        let ops = operator(&[]);
        let auth = Authorization::new(sink.capabilities(), &ops);
        let err = resolve_field_type(&sink, &auth, "name", &main, &staging).unwrap_err();
        assert!(err.to_string().contains("from 10 to 20"));

        let ops = operator(&[Op::DataTypeLengthChange]);
        let auth = Authorization::new(sink.capabilities(), &ops);
        let evolved = resolve_field_type(&sink, &auth, "name", &main, &staging).unwrap();
        assert_eq!(evolved, FieldType::sized(DataType::Varchar, 20));
    }

    #[test]
    fn test_shorter_staging_keeps_main_length() {
        let sink = TypeMappingSink::h2();
        let ops = operator(&[]);
        let auth = Authorization::new(sink.capabilities(), &ops);
        let main = FieldType::sized(DataType::Varchar, 64);
        let staging = FieldType::sized(DataType::Varchar, 8);
        let evolved = resolve_field_type(&sink, &auth, "name", &main, &staging).unwrap();
        assert_eq!(evolved, main);
    }

    #[test]
    fn test_scale_change_needs_sink_capability() {
        let sink = TypeMappingSink::snowflake();
        let ops = operator(&Op::ALL);
        let auth = Authorization::new(sink.capabilities(), &ops);
        assert!(!sink.capabilities().contains(&Capability::DataTypeScaleChange));

        let main = FieldType::with_precision(DataType::Decimal, 10, 2);
        let staging = FieldType::with_precision(DataType::Decimal, 10, 4);
        let err = resolve_field_type(&sink, &auth, "price", &main, &staging).unwrap_err();
        assert!(err.to_string().contains("Scale change"));
    }
}
