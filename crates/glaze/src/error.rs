//! Error types.
//!
//! Composition and variant transforms never fail: malformed tokens flow through
//! and are reported by validation instead. The fatal paths are few:
//!
//! | Error | Raised by |
//! |-------|-----------|
//! | [`ThemeError::ValidationFailed`] | a strict-mode build with validation errors |
//! | [`ThemeError::ChecksumMismatch`] | deserializing a tampered envelope |
//! | [`ThemeError::NotBuilt`] | `validate`/`serialize` with no theme and no cache |
//! | [`ThemeError::Json`] | envelope (de)serialization |
//!
//! Extension hooks report [`HookError`]; the builder logs and skips those.

use thiserror::Error;

/// Errors surfaced by building, validating, and serializing themes.
#[derive(Error, Debug)]
pub enum ThemeError {
    /// Strict mode was on and validation reported errors.
    ///
    /// `messages` holds every error message in report order.
    #[error("Theme validation failed: {}", messages.join("; "))]
    ValidationFailed { messages: Vec<String> },

    /// The envelope checksum does not match its theme payload.
    #[error("Checksum mismatch: expected {expected}, computed {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    /// An operation needed a built theme but none was passed or cached.
    #[error("No theme has been built yet")]
    NotBuilt,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ThemeError {
    /// Creates a validation failure from the given messages.
    pub fn validation_failed<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::ValidationFailed {
            messages: messages.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true for integrity failures of a serialized theme.
    pub fn is_integrity_error(&self) -> bool {
        matches!(self, Self::ChecksumMismatch { .. })
    }
}

/// Errors from a single extension hook.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HookError {
    /// The hook returned an error of its own.
    #[error("Extension '{extension}' failed: {message}")]
    Failed { extension: String, message: String },

    /// The hook did not finish within the configured timeout.
    #[error("Extension '{extension}' timed out after {timeout_ms}ms")]
    TimedOut { extension: String, timeout_ms: u64 },

    /// The hook panicked.
    #[error("Extension '{extension}' panicked")]
    Panicked { extension: String },
}

impl HookError {
    /// Creates a failure for the named extension.
    pub fn failed(extension: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            extension: extension.into(),
            message: message.into(),
        }
    }

    /// Name of the extension that raised the error.
    pub fn extension(&self) -> &str {
        match self {
            Self::Failed { extension, .. }
            | Self::TimedOut { extension, .. }
            | Self::Panicked { extension } => extension,
        }
    }
}

/// Errors loading builder or validation settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// A specialized [`Result`] type for theme operations.
pub type Result<T> = std::result::Result<T, ThemeError>;
