//! Settings validation.

use std::path::Path;

use crate::loader::{read_settings_file, SettingsLoadResult};

/// Problems found in one settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Rules applied to the file.
    pub rule_count: usize,
    /// Errors that make the settings unusable.
    pub errors: Vec<String>,
    /// Rules that load but never fire.
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Whether the file passes. In strict mode warnings fail it too.
    #[must_use]
    pub fn passes(&self, strict: bool) -> bool {
        self.errors.is_empty() && (!strict || self.warnings.is_empty())
    }
}

/// Validate a reaction settings file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed. Validation
/// problems are reported in the returned [`ValidationReport`].
pub fn validate_settings_file(path: &Path) -> SettingsLoadResult<ValidationReport> {
    let settings = read_settings_file(path)?;
    Ok(ValidationReport {
        rule_count: settings.reaction_rules.len(),
        errors: settings.validate(),
        warnings: settings.warnings(),
    })
}
