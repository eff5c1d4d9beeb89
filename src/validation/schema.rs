//! Schema module for validating model documents.
//!
//! Models are exchanged as JSON. This module checks a JSON document against
//! the schema derived from [`Model`] before it is deserialized, so that
//! structural problems are reported with their location instead of as a
//! single parse error.

use std::fmt;

use colored::Colorize;
use jsonschema::validator_for;
use schemars::schema_for;
use serde_json::Value;
use thiserror::Error;

use crate::prelude::Model;

/// Report containing validation results
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ValidationReport {
    /// Whether the document is valid
    pub valid: bool,
    /// List of validation errors if any
    pub errors: Vec<ValidationError>,
}

/// Individual validation error details
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ValidationError {
    /// JSON path where the error occurred
    pub location: String,
    /// Description of the validation error
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = if self.location.is_empty() {
            "/"
        } else {
            self.location.as_str()
        };

        write!(f, "{}\n\t└── {}", location.bold(), self.message.bold().red())
    }
}

/// Errors preventing a document from being validated at all.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not compile model schema: {0}")]
    Compile(String),
}

/// Validates a JSON model document against the model schema.
///
/// # Arguments
/// * `content` - JSON string containing the model
///
/// # Returns
/// * `Result<ValidationReport, SchemaError>` - Validation report, or an error
///   if the content is not JSON
pub fn validate_json(content: &str) -> Result<ValidationReport, SchemaError> {
    let json: Value = serde_json::from_str(content)?;
    let schema = serde_json::to_value(schema_for!(Model))?;
    let validator = validator_for(&schema).map_err(|e| SchemaError::Compile(e.to_string()))?;

    let errors = validator
        .iter_errors(&json)
        .map(|error| ValidationError {
            location: error.instance_path.to_string(),
            message: error.to_string().replace('"', "'"),
        })
        .collect::<Vec<_>>();

    Ok(ValidationReport {
        valid: errors.is_empty(),
        errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_model() {
        let content = include_str!("../../tests/data/enzyme_l3.json");
        let report = validate_json(content).expect("Failed to validate model");

        assert!(report.valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_invalid_model() {
        let content = r#"{
            "species": [{ "id": "S" }],
            "unit_definitions": [{ "id": "u", "base_units": [{ "kind": "furlong" }] }]
        }"#;
        let report = validate_json(content).expect("Failed to validate model");

        assert!(!report.valid);
        let locations = report
            .errors
            .iter()
            .map(|e| e.location.as_str())
            .collect::<Vec<_>>();
        assert!(locations.contains(&"/species/0"));
        assert!(locations.contains(&"/unit_definitions/0/base_units/0/kind"));
    }

    #[test]
    fn test_not_json() {
        let result = validate_json("species: []");
        assert!(matches!(result, Err(SchemaError::Json(_))));
    }
}
