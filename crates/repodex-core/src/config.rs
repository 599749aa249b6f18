//! Build configuration
//!
//! Read from the repository's JSON config file (unknown keys are ignored so a
//! full repository definition can be passed as-is).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{BuildError, Result};
use crate::include::JsonStyle;
use crate::template::HASH_PLACEHOLDER;

/// Default include filename template for flat mode.
pub const DEFAULT_INCLUDE_FILENAME: &str = "include/all$%hash%.json";

/// Settings consumed by [`crate::PackagesBuilder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BuildConfig {
    /// Emit one provider file per package instead of a single include file.
    pub providers: bool,
    /// Public URL of the repository; its path prefixes `providers-url`.
    pub homepage: Option<String>,
    /// Include filename template used in flat mode.
    pub include_filename: String,
    /// Indent JSON output.
    pub pretty_print: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            providers: false,
            homepage: None,
            include_filename: DEFAULT_INCLUDE_FILENAME.to_string(),
            pretty_print: true,
        }
    }
}

impl BuildConfig {
    /// Parse a configuration from JSON text.
    ///
    /// Values are not checked here; command line overrides may still replace
    /// them. [`crate::PackagesBuilder::new`] validates the final configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid JSON for this schema.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
        Self::from_json(&text)
    }

    /// Check the configuration once, before any output is produced.
    ///
    /// An include filename without `%hash%` is accepted: it degrades to a
    /// fixed filename that is rewritten on every run.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Config`] if the include filename is empty or
    /// names a directory.
    pub fn validate(&self) -> Result<()> {
        let include = self.include_filename.trim();
        if include.is_empty() {
            return Err(BuildError::Config(
                "include-filename must not be empty".to_string(),
            ));
        }
        if include.ends_with('/') {
            return Err(BuildError::Config(format!(
                "include-filename must name a file, got '{include}'"
            )));
        }
        if !self.providers && !include.contains(HASH_PLACEHOLDER) {
            tracing::warn!(
                include_filename = %self.include_filename,
                "include-filename has no %hash% placeholder, include file will be rewritten on every run"
            );
        }
        Ok(())
    }

    /// The homepage, treating an empty string as unset.
    pub fn homepage(&self) -> Option<&str> {
        self.homepage.as_deref().filter(|h| !h.trim().is_empty())
    }

    /// JSON formatting derived from `pretty-print`.
    pub fn json_style(&self) -> JsonStyle {
        JsonStyle {
            pretty: self.pretty_print,
        }
    }
}
