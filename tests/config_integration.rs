//! Integration tests for configuration parsing and handling.
//!
//! These tests verify that evolution settings load from TOML files and feed
//! the planner the capabilities they name.

use std::io::Write;
use std::sync::Arc;

use tidemark::prelude::*;

fn main_dataset() -> Dataset {
    Dataset::named(
        "customers",
        SchemaDefinition::new([Field::new("id", DataType::Int).primary_key()]),
    )
}

fn staging_with_email() -> SchemaDefinition {
    SchemaDefinition::new([
        Field::new("ID", DataType::Int).primary_key(),
        Field::new("email", FieldType::sized(DataType::Varchar, 50)),
    ])
}

/// Test an empty configuration
#[test]
fn test_config_empty() {
    let config = EvolutionConfig::from_str("").expect("Failed to parse config");

    assert!(!config.evolution.ignore_case);
    assert!(config.evolution.capabilities.is_empty());
    assert!(config.authorized().is_empty());
}

/// Test a configuration loaded from a file drives the planner
#[test]
fn test_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    writeln!(
        file,
        r#"
[evolution]
ignore_case = true
capabilities = ["ADD_COLUMN", "ALLOW_MISSING_COLUMNS"]
"#
    )
    .expect("Failed to write config");

    let config = EvolutionConfig::from_file(file.path()).expect("Failed to load config");
    assert!(config.allows(SchemaEvolutionCapability::AddColumn));
    assert!(!config.allows(SchemaEvolutionCapability::DataTypeConversion));

    let planner = SchemaEvolution::from_config(
        Arc::new(TypeMappingSink::h2()),
        IngestMode::append_only().into(),
        &config,
    );
    let result = planner
        .build_logical_plan(&main_dataset(), &staging_with_email())
        .expect("Failed to plan");

    assert_eq!(result.summary(), "Add 1 columns");
}

/// Test a file that does not exist reports its path
#[test]
fn test_config_missing_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("tidemark.toml");

    let err = EvolutionConfig::from_file(&path).expect_err("Missing file should fail");
    assert!(err.to_string().contains("tidemark.toml"));
}

/// Test unknown keys are rejected
#[test]
fn test_config_unknown_key() {
    let result = EvolutionConfig::from_str(
        r#"
[evolution]
ignore_case = true
allow_everything = true
"#,
    );
    assert!(result.is_err());
}

/// Test unknown capability names are rejected
#[test]
fn test_config_unknown_capability() {
    let result = EvolutionConfig::from_str(
        r#"
[evolution]
capabilities = ["DROP_COLUMN"]
"#,
    );
    assert!(result.is_err());
}

/// Test every capability name parses
#[test]
fn test_config_all_capabilities() {
    let config = EvolutionConfig::from_str(
        r#"
[evolution]
capabilities = [
    "ADD_COLUMN",
    "DATA_TYPE_CONVERSION",
    "DATA_TYPE_LENGTH_CHANGE",
    "DATA_TYPE_SCALE_CHANGE",
    "COLUMN_NULLABILITY_CHANGE",
    "ALLOW_MISSING_COLUMNS",
]
"#,
    )
    .expect("Failed to parse config");

    for capability in SchemaEvolutionCapability::ALL {
        assert!(config.allows(capability), "{capability} should be allowed");
    }
}

/// Test a config without the capability refuses the change
#[test]
fn test_config_without_capability_refuses() {
    let config = EvolutionConfig::from_str(
        r#"
[evolution]
ignore_case = true
"#,
    )
    .expect("Failed to parse config");

    let err = SchemaEvolution::from_config(
        Arc::new(TypeMappingSink::h2()),
        IngestMode::append_only().into(),
        &config,
    )
    .build_logical_plan(&main_dataset(), &staging_with_email())
    .expect_err("Add column is not authorized");

    assert!(err.is_incompatible());
    assert!(err.to_string().contains("email"));
}

/// Test the builder and the parser agree
#[test]
fn test_config_builder_matches_parser() {
    let parsed = EvolutionConfig::from_str(
        r#"
[evolution]
ignore_case = true
capabilities = ["DATA_TYPE_LENGTH_CHANGE"]
"#,
    )
    .expect("Failed to parse config");
    let built = EvolutionConfig::new()
        .ignore_case(true)
        .with_capability(SchemaEvolutionCapability::DataTypeLengthChange)
        .with_capability(SchemaEvolutionCapability::DataTypeLengthChange);

    assert_eq!(parsed.authorized(), built.authorized());
    assert_eq!(parsed.evolution.capabilities.len(), 1);
    assert_eq!(built.evolution.capabilities.len(), 1);
}
