//! Logical column types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Logical data types understood by the evolution engine.
///
/// Sinks map these onto their physical types; the engine only compares tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    Int,
    Integer,
    #[serde(rename = "BIGINT")]
    BigInt,
    #[serde(rename = "TINYINT")]
    TinyInt,
    #[serde(rename = "SMALLINT")]
    SmallInt,
    Decimal,
    Numeric,
    Float,
    Double,
    Real,
    Char,
    Varchar,
    #[serde(rename = "LONGVARCHAR")]
    LongVarchar,
    #[serde(rename = "LONGTEXT")]
    LongText,
    Text,
    String,
    Timestamp,
    TimestampNtz,
    TimestampTz,
    Datetime,
    Date,
    Time,
    Boolean,
    Binary,
    #[serde(rename = "VARBINARY")]
    VarBinary,
    #[serde(rename = "LONGVARBINARY")]
    LongVarBinary,
    Json,
    Variant,
    Map,
    Array,
}

impl DataType {
    /// All data types, in declaration order.
    pub const ALL: [DataType; 30] = [
        DataType::Int,
        DataType::Integer,
        DataType::BigInt,
        DataType::TinyInt,
        DataType::SmallInt,
        DataType::Decimal,
        DataType::Numeric,
        DataType::Float,
        DataType::Double,
        DataType::Real,
        DataType::Char,
        DataType::Varchar,
        DataType::LongVarchar,
        DataType::LongText,
        DataType::Text,
        DataType::String,
        DataType::Timestamp,
        DataType::TimestampNtz,
        DataType::TimestampTz,
        DataType::Datetime,
        DataType::Date,
        DataType::Time,
        DataType::Boolean,
        DataType::Binary,
        DataType::VarBinary,
        DataType::LongVarBinary,
        DataType::Json,
        DataType::Variant,
        DataType::Map,
        DataType::Array,
    ];

    /// The canonical upper-case name of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Int => "INT",
            DataType::Integer => "INTEGER",
            DataType::BigInt => "BIGINT",
            DataType::TinyInt => "TINYINT",
            DataType::SmallInt => "SMALLINT",
            DataType::Decimal => "DECIMAL",
            DataType::Numeric => "NUMERIC",
            DataType::Float => "FLOAT",
            DataType::Double => "DOUBLE",
            DataType::Real => "REAL",
            DataType::Char => "CHAR",
            DataType::Varchar => "VARCHAR",
            DataType::LongVarchar => "LONGVARCHAR",
            DataType::LongText => "LONGTEXT",
            DataType::Text => "TEXT",
            DataType::String => "STRING",
            DataType::Timestamp => "TIMESTAMP",
            DataType::TimestampNtz => "TIMESTAMP_NTZ",
            DataType::TimestampTz => "TIMESTAMP_TZ",
            DataType::Datetime => "DATETIME",
            DataType::Date => "DATE",
            DataType::Time => "TIME",
            DataType::Boolean => "BOOLEAN",
            DataType::Binary => "BINARY",
            DataType::VarBinary => "VARBINARY",
            DataType::LongVarBinary => "LONGVARBINARY",
            DataType::Json => "JSON",
            DataType::Variant => "VARIANT",
            DataType::Map => "MAP",
            DataType::Array => "ARRAY",
        }
    }

    /// Whether the type is a character type that usually carries a length.
    pub fn is_character(&self) -> bool {
        matches!(
            self,
            DataType::Char
                | DataType::Varchar
                | DataType::LongVarchar
                | DataType::LongText
                | DataType::Text
                | DataType::String
        )
    }

    /// Whether the type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::Int
                | DataType::Integer
                | DataType::BigInt
                | DataType::TinyInt
                | DataType::SmallInt
                | DataType::Decimal
                | DataType::Numeric
                | DataType::Float
                | DataType::Double
                | DataType::Real
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        DataType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| SchemaError::InvalidDataType(s.to_string()))
    }
}

/// A data type together with its optional sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldType {
    /// The logical type tag.
    pub data_type: DataType,
    /// Length or precision, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    /// Scale, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
}

impl FieldType {
    /// Create an unsized type.
    pub const fn of(data_type: DataType) -> Self {
        Self {
            data_type,
            length: None,
            scale: None,
        }
    }

    /// Create a type with a length.
    pub const fn sized(data_type: DataType, length: u32) -> Self {
        Self {
            data_type,
            length: Some(length),
            scale: None,
        }
    }

    /// Create a type with length (precision) and scale.
    pub const fn with_precision(data_type: DataType, length: u32, scale: u32) -> Self {
        Self {
            data_type,
            length: Some(length),
            scale: Some(scale),
        }
    }

    /// Return a copy with a different type tag.
    pub fn with_data_type(self, data_type: DataType) -> Self {
        Self { data_type, ..self }
    }

    /// Return a copy with a different length.
    pub fn with_length(self, length: Option<u32>) -> Self {
        Self { length, ..self }
    }

    /// Return a copy with a different scale.
    pub fn with_scale(self, scale: Option<u32>) -> Self {
        Self { scale, ..self }
    }
}

impl From<DataType> for FieldType {
    fn from(data_type: DataType) -> Self {
        Self::of(data_type)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.length, self.scale) {
            (Some(length), Some(scale)) => write!(f, "{}({}, {})", self.data_type, length, scale),
            (Some(length), None) => write!(f, "{}({})", self.data_type, length),
            (None, Some(scale)) => write!(f, "{}(*, {})", self.data_type, scale),
            (None, None) => write!(f, "{}", self.data_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_data_type_case_insensitive() {
        assert_eq!("varchar".parse::<DataType>().unwrap(), DataType::Varchar);
        assert_eq!(" BIGINT ".parse::<DataType>().unwrap(), DataType::BigInt);
        assert_eq!(
            "timestamp_ntz".parse::<DataType>().unwrap(),
            DataType::TimestampNtz
        );
    }

    #[test]
    fn test_parse_unknown_data_type() {
        let err = "NUMBERISH".parse::<DataType>().unwrap_err();
        assert_eq!(err, SchemaError::InvalidDataType("NUMBERISH".to_string()));
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for data_type in DataType::ALL {
            assert_eq!(data_type.to_string().parse::<DataType>().unwrap(), data_type);
        }
    }

    #[test]
    fn test_field_type_display() {
        assert_eq!(FieldType::of(DataType::Int).to_string(), "INT");
        assert_eq!(
            FieldType::sized(DataType::Varchar, 20).to_string(),
            "VARCHAR(20)"
        );
        assert_eq!(
            FieldType::with_precision(DataType::Decimal, 10, 2).to_string(),
            "DECIMAL(10, 2)"
        );
    }

    #[test]
    fn test_serde_uses_upper_snake_case() {
        let json = serde_json::to_string(&DataType::TimestampNtz).unwrap();
        assert_eq!(json, "\"TIMESTAMP_NTZ\"");
        let json = serde_json::to_string(&DataType::BigInt).unwrap();
        assert_eq!(json, "\"BIGINT\"");
        let ty: FieldType = serde_json::from_str(r#"{"data_type":"VARCHAR","length":10}"#).unwrap();
        assert_eq!(ty, FieldType::sized(DataType::Varchar, 10));
    }

    #[test]
    fn test_type_families() {
        assert!(DataType::Varchar.is_character());
        assert!(!DataType::Varchar.is_numeric());
        assert!(DataType::Decimal.is_numeric());
    }
}
