use std::path::PathBuf;

use thiserror::Error;

use crate::prelude::Model;

/// Loads and parses a model from a JSON file.
///
/// The returned model has no derived units yet. Call
/// `populate_list_formula_units_data` to derive them.
///
/// # Arguments
///
/// * `path` - Path to the JSON file containing the model
///
/// # Returns
///
/// Returns a `Result` containing either:
/// * `Ok(Model)` - The successfully parsed model
/// * `Err(IOError)` - An error that occurred during file reading or JSON parsing
pub fn load_model(path: impl Into<PathBuf>) -> Result<Model, IOError> {
    let path = path.into();
    let file = std::fs::File::open(path).map_err(IOError::FileNotFound)?;
    serde_json::from_reader(file).map_err(IOError::JsonParseError)
}

/// Saves a model to a JSON file. Derived units are not written.
///
/// # Arguments
///
/// * `path` - Path of the JSON file to write
/// * `model` - The model to save
pub fn save_model(path: impl Into<PathBuf>, model: &Model) -> Result<(), IOError> {
    let path = path.into();
    let file = std::fs::File::create(path).map_err(IOError::FileNotFound)?;
    serde_json::to_writer_pretty(file, model).map_err(IOError::JsonParseError)
}

/// Errors that can occur while reading or writing models.
#[derive(Error, Debug)]
pub enum IOError {
    /// The file could not be found, opened or created.
    #[error("File not found: {0}")]
    FileNotFound(#[from] std::io::Error),

    /// The file contents are not a valid model.
    #[error("Failed to parse JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),
}
