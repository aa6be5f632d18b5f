//! Reaction settings loading.
//!
//! Reads [`ReactionSettings`] from RON files. Validation errors are fatal;
//! inert rules are only logged.

use std::path::Path;

use elemental_core::data::ReactionSettings;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur while loading settings.
#[derive(Debug, Error)]
pub enum SettingsLoadError {
    /// Failed to read file.
    #[error("Failed to read file '{path}': {source}")]
    IoError {
        /// Path to the file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse RON file.
    #[error("Failed to parse RON file '{path}': {source}")]
    ParseError {
        /// Path to the file.
        path: String,
        /// Underlying parse error.
        #[source]
        source: ron::error::SpannedError,
    },

    /// Settings validation failed.
    #[error("Validation failed for '{path}': {errors:?}")]
    ValidationError {
        /// Path to the file.
        path: String,
        /// List of validation errors.
        errors: Vec<String>,
    },
}

/// Result type for settings loading.
pub type SettingsLoadResult<T> = Result<T, SettingsLoadError>;

/// Read and parse a settings file without validating it.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid RON.
pub fn read_settings_file(path: &Path) -> SettingsLoadResult<ReactionSettings> {
    let path_str = path.display().to_string();

    let contents = std::fs::read_to_string(path).map_err(|e| SettingsLoadError::IoError {
        path: path_str.clone(),
        source: e,
    })?;

    ron::from_str(&contents).map_err(|e| SettingsLoadError::ParseError {
        path: path_str,
        source: e,
    })
}

/// Load reaction settings from a RON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or fails validation.
pub fn load_settings_from_file(path: &Path) -> SettingsLoadResult<ReactionSettings> {
    let settings = read_settings_file(path)?;

    let errors = settings.validate();
    if !errors.is_empty() {
        return Err(SettingsLoadError::ValidationError {
            path: path.display().to_string(),
            errors,
        });
    }

    for warning in settings.warnings() {
        warn!("{}: {warning}", path.display());
    }

    info!(
        "Loaded reaction settings with {} rules ({} active), {} effects, {} equipment",
        settings.reaction_rules.len(),
        settings.complete_rules().count(),
        settings.effects.len(),
        settings.equipment.len()
    );

    Ok(settings)
}
