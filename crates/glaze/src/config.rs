//! Builder settings and file loading.
//!
//! [`BuilderOptions`], [`ValidationConfig`](crate::validate::ValidationConfig),
//! and persisted [`ThemeCustomization`]s load from JSON or TOML through
//! [`ConfigFile`]. Every field has a default, so partial files are fine:
//!
//! ```toml
//! strict = true
//! hookTimeoutMs = 250
//! ```

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::tokens::ThemeCustomization;
use crate::validate::ValidationConfig;

/// Build behaviour switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuilderOptions {
    /// Fail builds whose validation reports errors.
    pub strict: bool,
    /// Run validation as part of every build.
    pub validate_on_build: bool,
    /// Upper bound for a single extension hook.
    pub hook_timeout_ms: u64,
    /// Base used when the requested one is not registered.
    pub default_base: String,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            strict: false,
            validate_on_build: true,
            hook_timeout_ms: 5_000,
            default_base: "light".to_string(),
        }
    }
}

impl BuilderOptions {
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn hook_timeout_ms(mut self, ms: u64) -> Self {
        self.hook_timeout_ms = ms;
        self
    }

    pub fn default_base(mut self, name: impl Into<String>) -> Self {
        self.default_base = name.into();
        self
    }
}

/// JSON/TOML loading for settings types.
pub trait ConfigFile: DeserializeOwned {
    /// Parse from a JSON string.
    ///
    /// # Errors
    /// Returns `ConfigError::Json` if parsing fails.
    fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse from a TOML string.
    ///
    /// # Errors
    /// Returns `ConfigError::Toml` if parsing fails.
    fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml)?)
    }

    /// Load from a file, choosing the format by extension.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, the extension is not
    /// `json` or `toml`, or parsing fails.
    fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            Some("toml") => Self::from_toml(&content),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.into())),
            None => Err(ConfigError::UnsupportedFormat("unknown".into())),
        }
    }
}

impl ConfigFile for BuilderOptions {}
impl ConfigFile for ValidationConfig {}
impl ConfigFile for ThemeCustomization {}
