//! Persisted theme envelope.
//!
//! ```json
//! { "version": "1.0.0", "theme": { ... }, "checksum": "1f3a9c07", "exportedAt": "..." }
//! ```
//!
//! The checksum is a 32-bit string hash (`h = h * 31 + c`, wrapping, over UTF-16
//! code units) of the theme's JSON with object keys sorted, rendered as eight
//! lowercase hex digits. It detects accidental edits and truncation; it is not
//! a cryptographic signature.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{Result, ThemeError};
use crate::tokens::BuiltTheme;

/// Envelope format written by [`serialize_theme`]. Read back verbatim, never migrated.
pub const FORMAT_VERSION: &str = "1.0.0";

/// A theme ready to persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedTheme {
    pub version: String,
    pub theme: BuiltTheme,
    pub checksum: String,
    pub exported_at: DateTime<Utc>,
}

impl SerializedTheme {
    /// Pretty JSON text of the envelope.
    ///
    /// # Errors
    /// Returns `ThemeError::Json` if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses an envelope. The checksum is checked by [`deserialize_theme`].
    ///
    /// # Errors
    /// Returns `ThemeError::Json` if the text is not a valid envelope.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Wraps a theme in an envelope with a fresh checksum.
///
/// # Errors
/// Returns `ThemeError::Json` if the theme cannot be serialized.
pub fn serialize_theme(theme: &BuiltTheme) -> Result<SerializedTheme> {
    let checksum = compute_checksum(theme)?;
    debug!(theme.name = %theme.name(), theme.checksum = %checksum, "Theme serialized");
    Ok(SerializedTheme {
        version: FORMAT_VERSION.to_string(),
        theme: theme.clone(),
        checksum,
        exported_at: Utc::now(),
    })
}

/// Verifies the envelope checksum and returns its theme.
///
/// # Errors
/// Returns `ThemeError::ChecksumMismatch` when the payload was altered.
pub fn deserialize_theme(data: &SerializedTheme) -> Result<BuiltTheme> {
    let actual = compute_checksum(&data.theme)?;
    if actual != data.checksum {
        warn!(
            theme.expected = %data.checksum,
            theme.actual = %actual,
            "Serialized theme failed integrity check"
        );
        return Err(ThemeError::ChecksumMismatch {
            expected: data.checksum.clone(),
            actual,
        });
    }
    Ok(data.theme.clone())
}

/// Checksum of a theme's canonical JSON.
///
/// # Errors
/// Returns `ThemeError::Json` if the theme cannot be serialized.
pub fn compute_checksum(theme: &BuiltTheme) -> Result<String> {
    let canonical = sort_keys(serde_json::to_value(theme)?);
    let text = serde_json::to_string(&canonical)?;
    Ok(format!("{:08x}", string_hash(&text)))
}

#[allow(clippy::cast_sign_loss)]
fn string_hash(text: &str) -> u32 {
    let hash = text
        .encode_utf16()
        .fold(0i32, |h, c| h.wrapping_mul(31).wrapping_add(i32::from(c)));
    hash as u32
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, sort_keys(v)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
