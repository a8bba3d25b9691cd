//! Design token data model.
//!
//! A [`BuiltTheme`] is a set of [`ThemeTokens`] plus [`ThemeMeta`]. Colors are
//! organised as named [`SemanticColorGroup`] palettes (each an 11-step
//! [`ColorScale`] with contextual roles) and a fixed set of surface colors.
//! Every other category is an ordered [`TokenScale`].
//!
//! [`ThemeCustomization`] mirrors the token shape with every field optional; it
//! is the overlay input to composition. Absent fields mean "no change".
//!
//! All types serialize to the camelCase JSON shape that rendering layers and
//! persisted customizations use:
//!
//! ```json
//! {
//!   "colors": {
//!     "background": "#ffffff",
//!     "cardForeground": "#0a0a0b",
//!     "primary": { "50": "#eef3fd", "500": "#2563eb", "DEFAULT": "#2563eb", "foreground": "#ffffff" }
//!   },
//!   "spacing": { "0": "0", "1": "0.25rem" }
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::compose::CompositionMode;
use crate::variant::Variant;

// -----------------------------------------------------------------------------
// TokenScale
// -----------------------------------------------------------------------------

/// An insertion-ordered, string-keyed map of token values.
///
/// Serialized as a JSON object. Declaration order is kept so that checks such
/// as "the spacing scale must increase" see the scale the way its author wrote it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenScale<V = String> {
    entries: Vec<(String, V)>,
}

impl<V> Default for TokenScale<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> TokenScale<V> {
    /// Creates an empty scale.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value for `key`.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns a mutable reference to the value for `key`.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Returns true when `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Inserts or replaces in place, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        if let Some(slot) = self.get_mut(&key) {
            return Some(std::mem::replace(slot, value));
        }
        self.entries.push((key, value));
        None
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the scale has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates values mutably in declaration order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.entries.iter_mut().map(|(_, v)| v)
    }

    /// Iterates entries mutably in declaration order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut V)> {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns a new scale with every value mapped through `f`.
    pub fn map_values(&self, mut f: impl FnMut(&str, &V) -> V) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|(k, v)| (k.clone(), f(k, v)))
                .collect(),
        }
    }
}

impl<V: Clone> TokenScale<V> {
    /// Overlays `other` onto this scale; `other` wins on shared keys.
    pub fn merge_from(&mut self, other: &TokenScale<V>) {
        for (k, v) in &other.entries {
            self.insert(k.clone(), v.clone());
        }
    }

    /// Adds the entries of `other` whose keys are missing here.
    pub fn extend_missing(&mut self, other: &TokenScale<V>) {
        for (k, v) in &other.entries {
            if !self.contains_key(k) {
                self.entries.push((k.clone(), v.clone()));
            }
        }
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for TokenScale<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut scale = Self::new();
        for (k, v) in iter {
            scale.insert(k, v);
        }
        scale
    }
}

impl<const N: usize> From<[(&str, &str); N]> for TokenScale<String> {
    fn from(entries: [(&str, &str); N]) -> Self {
        entries.into_iter().map(|(k, v)| (k, v.to_string())).collect()
    }
}

impl<const N: usize> From<[(&str, i64); N]> for TokenScale<i64> {
    fn from(entries: [(&str, i64); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<V: Serialize> Serialize for TokenScale<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for TokenScale<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TokenScaleVisitor(PhantomData))
    }
}

struct TokenScaleVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for TokenScaleVisitor<V> {
    type Value = TokenScale<V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of token names to values")
    }

    fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> Result<Self::Value, M::Error> {
        let mut scale = TokenScale::new();
        while let Some((key, value)) = map.next_entry::<String, V>()? {
            scale.insert(key, value);
        }
        Ok(scale)
    }
}

// -----------------------------------------------------------------------------
// ColorScale
// -----------------------------------------------------------------------------

/// The 11 fixed step keys of every color scale.
pub const SCALE_STEPS: [&str; 11] = [
    "50", "100", "200", "300", "400", "500", "600", "700", "800", "900", "950",
];

/// An 11-step lightness scale keyed `"50"` through `"950"`.
///
/// The shape is fixed: a scale can never gain or lose a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorScale {
    steps: [String; 11],
}

impl ColorScale {
    /// Builds a scale from 11 values in step order.
    pub fn from_steps(steps: [String; 11]) -> Self {
        Self { steps }
    }

    /// A scale with every step set to the same color.
    pub fn uniform(color: impl Into<String>) -> Self {
        let c = color.into();
        Self {
            steps: std::array::from_fn(|_| c.clone()),
        }
    }

    /// Returns the color for a step key such as `"500"`.
    pub fn get(&self, step: &str) -> Option<&str> {
        step_index(step).map(|i| self.steps[i].as_str())
    }

    /// Sets a step. Returns false (and changes nothing) for unknown keys.
    pub fn set(&mut self, step: &str, color: impl Into<String>) -> bool {
        match step_index(step) {
            Some(i) => {
                self.steps[i] = color.into();
                true
            }
            None => false,
        }
    }

    /// Iterates `(step, color)` pairs from lightest to darkest.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        SCALE_STEPS
            .iter()
            .zip(self.steps.iter())
            .map(|(k, v)| (*k, v.as_str()))
    }

    /// Iterates colors mutably from lightest to darkest.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&'static str, &mut String)> {
        SCALE_STEPS.iter().copied().zip(self.steps.iter_mut())
    }
}

/// Position of a step key in [`SCALE_STEPS`].
pub fn step_index(step: &str) -> Option<usize> {
    SCALE_STEPS.iter().position(|s| *s == step)
}

impl Serialize for ColorScale {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(SCALE_STEPS.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ColorScale {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ColorScaleVisitor)
    }
}

struct ColorScaleVisitor;

impl<'de> Visitor<'de> for ColorScaleVisitor {
    type Value = ColorScale;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map with the steps 50 through 950")
    }

    fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> Result<Self::Value, M::Error> {
        let mut steps: [Option<String>; 11] = Default::default();
        while let Some(key) = map.next_key::<String>()? {
            match step_index(&key) {
                Some(i) => steps[i] = Some(map.next_value()?),
                None => {
                    let _ = map.next_value::<de::IgnoredAny>()?;
                }
            }
        }

        let mut out: [String; 11] = Default::default();
        for (i, step) in steps.into_iter().enumerate() {
            out[i] = step.ok_or_else(|| de::Error::missing_field(SCALE_STEPS[i]))?;
        }
        Ok(ColorScale { steps: out })
    }
}

// -----------------------------------------------------------------------------
// Colors
// -----------------------------------------------------------------------------

/// One named palette: a scale plus its contextual roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticColorGroup {
    #[serde(flatten)]
    pub scale: ColorScale,
    #[serde(rename = "DEFAULT")]
    pub default: String,
    pub foreground: String,
    pub background: String,
    pub border: String,
    pub muted: String,
    pub accent: String,
}

/// Role keys of a [`SemanticColorGroup`] besides its scale steps.
pub const GROUP_ROLES: [&str; 6] = [
    "DEFAULT",
    "foreground",
    "background",
    "border",
    "muted",
    "accent",
];

impl SemanticColorGroup {
    /// Returns a role (`"DEFAULT"`, `"foreground"`, ...) or a step (`"500"`).
    pub fn get(&self, key: &str) -> Option<&str> {
        let role = match key {
            "DEFAULT" => &self.default,
            "foreground" => &self.foreground,
            "background" => &self.background,
            "border" => &self.border,
            "muted" => &self.muted,
            "accent" => &self.accent,
            step => return self.scale.get(step),
        };
        Some(role.as_str())
    }

    /// Mutable access to a role or step.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut String> {
        let role = match key {
            "DEFAULT" => &mut self.default,
            "foreground" => &mut self.foreground,
            "background" => &mut self.background,
            "border" => &mut self.border,
            "muted" => &mut self.muted,
            "accent" => &mut self.accent,
            step => {
                let index = step_index(step)?;
                return self.scale.iter_mut().nth(index).map(|(_, v)| v);
            }
        };
        Some(role)
    }

    /// Visits every color leaf: the 11 steps, then the roles.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(&str, &mut String)) {
        for (step, color) in self.scale.iter_mut() {
            f(step, color);
        }
        f("DEFAULT", &mut self.default);
        f("foreground", &mut self.foreground);
        f("background", &mut self.background);
        f("border", &mut self.border);
        f("muted", &mut self.muted);
        f("accent", &mut self.accent);
    }

    /// Every `(key, color)` leaf of the group.
    pub fn leaves(&self) -> Vec<(&str, &str)> {
        let mut out: Vec<(&str, &str)> = self.scale.iter().collect();
        for role in GROUP_ROLES {
            if let Some(color) = self.get(role) {
                out.push((role, color));
            }
        }
        out
    }
}

/// The five semantic palettes every theme must define.
pub const REQUIRED_PALETTES: [&str; 5] = ["primary", "secondary", "destructive", "success", "warning"];

/// Surface color keys, in their serialized camelCase spelling.
pub const SURFACE_COLORS: [&str; 13] = [
    "background",
    "foreground",
    "card",
    "cardForeground",
    "popover",
    "popoverForeground",
    "border",
    "input",
    "ring",
    "muted",
    "mutedForeground",
    "accent",
    "accentForeground",
];

/// All theme colors: flat surface colors plus named palettes.
///
/// Palettes live in a name-keyed map so applications can add their own
/// (`info`, `brand`, ...) next to the five required ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorTokens {
    pub background: String,
    pub foreground: String,
    pub card: String,
    pub card_foreground: String,
    pub popover: String,
    pub popover_foreground: String,
    pub border: String,
    pub input: String,
    pub ring: String,
    pub muted: String,
    pub muted_foreground: String,
    pub accent: String,
    pub accent_foreground: String,
    #[serde(flatten)]
    pub palettes: BTreeMap<String, SemanticColorGroup>,
}

impl ColorTokens {
    /// Returns a surface color by its camelCase key.
    pub fn surface(&self, key: &str) -> Option<&str> {
        let color = match key {
            "background" => &self.background,
            "foreground" => &self.foreground,
            "card" => &self.card,
            "cardForeground" => &self.card_foreground,
            "popover" => &self.popover,
            "popoverForeground" => &self.popover_foreground,
            "border" => &self.border,
            "input" => &self.input,
            "ring" => &self.ring,
            "muted" => &self.muted,
            "mutedForeground" => &self.muted_foreground,
            "accent" => &self.accent,
            "accentForeground" => &self.accent_foreground,
            _ => return None,
        };
        Some(color.as_str())
    }

    /// Mutable access to a surface color by its camelCase key.
    pub fn surface_mut(&mut self, key: &str) -> Option<&mut String> {
        let color = match key {
            "background" => &mut self.background,
            "foreground" => &mut self.foreground,
            "card" => &mut self.card,
            "cardForeground" => &mut self.card_foreground,
            "popover" => &mut self.popover,
            "popoverForeground" => &mut self.popover_foreground,
            "border" => &mut self.border,
            "input" => &mut self.input,
            "ring" => &mut self.ring,
            "muted" => &mut self.muted,
            "mutedForeground" => &mut self.muted_foreground,
            "accent" => &mut self.accent,
            "accentForeground" => &mut self.accent_foreground,
            _ => return None,
        };
        Some(color)
    }

    /// Returns a palette by name.
    pub fn palette(&self, name: &str) -> Option<&SemanticColorGroup> {
        self.palettes.get(name)
    }

    /// Visits every color leaf with its dotted path relative to `colors`.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(&str, &mut String)) {
        for key in SURFACE_COLORS {
            if let Some(color) = self.surface_mut(key) {
                f(key, color);
            }
        }
        for (name, group) in &mut self.palettes {
            group.for_each_mut(|leaf, color| f(&format!("{name}.{leaf}"), color));
        }
    }

    /// Every `(path, color)` leaf, surfaces first.
    pub fn leaves(&self) -> Vec<(String, &str)> {
        let mut out: Vec<(String, &str)> = SURFACE_COLORS
            .iter()
            .filter_map(|k| self.surface(k).map(|c| ((*k).to_string(), c)))
            .collect();
        for (name, group) in &self.palettes {
            out.extend(
                group
                    .leaves()
                    .into_iter()
                    .map(|(leaf, color)| (format!("{name}.{leaf}"), color)),
            );
        }
        out
    }
}

// -----------------------------------------------------------------------------
// Other categories
// -----------------------------------------------------------------------------

/// Font families and the size, weight, and line-height scales.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypographyTokens {
    #[serde(default)]
    pub font_family: TokenScale,
    #[serde(default)]
    pub font_size: TokenScale,
    #[serde(default, skip_serializing_if = "TokenScale::is_empty")]
    pub font_weight: TokenScale,
    #[serde(default, skip_serializing_if = "TokenScale::is_empty")]
    pub line_height: TokenScale,
    #[serde(default, skip_serializing_if = "TokenScale::is_empty")]
    pub letter_spacing: TokenScale,
}

/// Durations and easing curves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotionTokens {
    #[serde(default)]
    pub duration: TokenScale,
    #[serde(default)]
    pub easing: TokenScale,
}

/// Corner radius: either one value or a named scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RadiusTokens {
    Scalar(String),
    Scale(TokenScale),
}

impl Default for RadiusTokens {
    fn default() -> Self {
        Self::Scalar("0.5rem".to_string())
    }
}

impl RadiusTokens {
    /// Returns a new value with every radius passed through `f`.
    pub fn map(&self, mut f: impl FnMut(&str) -> String) -> Self {
        match self {
            Self::Scalar(v) => Self::Scalar(f(v)),
            Self::Scale(scale) => Self::Scale(scale.map_values(|_, v| f(v))),
        }
    }
}

/// Every token category of a theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeTokens {
    pub colors: ColorTokens,
    pub typography: TypographyTokens,
    pub spacing: TokenScale,
    pub motion: MotionTokens,
    pub breakpoints: TokenScale,
    #[serde(default)]
    pub radius: RadiusTokens,
    #[serde(default)]
    pub z_index: TokenScale<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadows: Option<TokenScale>,
    /// Animation tokens, carried as an opaque blob.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animations: Option<serde_json::Value>,
}

// -----------------------------------------------------------------------------
// BuiltTheme
// -----------------------------------------------------------------------------

/// Provenance of a built theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub base_theme: String,
    #[serde(default)]
    pub variant: Variant,
    #[serde(default)]
    pub composition_mode: CompositionMode,
    /// The customization diff that produced this theme from its base.
    #[serde(default, skip_serializing_if = "ThemeCustomization::is_empty")]
    pub customizations: ThemeCustomization,
    /// Extensions whose hooks ran during the build.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ThemeMeta {
    /// Fresh metadata for a theme instantiated from `base_theme` now.
    pub fn new(base_theme: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: None,
            version: None,
            base_theme: base_theme.into(),
            variant: Variant::Default,
            composition_mode: CompositionMode::default(),
            customizations: ThemeCustomization::default(),
            plugins: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Refreshes `updated_at`, never moving it before `created_at`.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.created_at);
    }
}

/// A fully resolved theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuiltTheme {
    #[serde(flatten)]
    pub tokens: ThemeTokens,
    pub meta: ThemeMeta,
}

impl BuiltTheme {
    /// Wraps tokens with fresh metadata.
    pub fn new(tokens: ThemeTokens, base_theme: impl Into<String>) -> Self {
        Self {
            tokens,
            meta: ThemeMeta::new(base_theme),
        }
    }

    /// The display name, falling back to the base theme identifier.
    pub fn name(&self) -> &str {
        self.meta.name.as_deref().unwrap_or(&self.meta.base_theme)
    }
}

// -----------------------------------------------------------------------------
// Customization
// -----------------------------------------------------------------------------

/// Partial overrides for one palette.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteCustomization {
    #[serde(rename = "DEFAULT", default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreground: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muted: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    /// Explicit step overrides keyed `"50"` through `"950"`.
    #[serde(flatten)]
    pub steps: BTreeMap<String, String>,
}

impl PaletteCustomization {
    /// A customization that only sets `DEFAULT`.
    pub fn from_default(color: impl Into<String>) -> Self {
        Self {
            default: Some(color.into()),
            ..Self::default()
        }
    }

    /// Sets a step override.
    pub fn with_step(mut self, step: impl Into<String>, color: impl Into<String>) -> Self {
        self.steps.insert(step.into(), color.into());
        self
    }

    /// The color a complete palette would be generated from.
    pub fn seed(&self) -> Option<&str> {
        self.default
            .as_deref()
            .or_else(|| self.steps.get("500").map(String::as_str))
    }

    /// Every explicitly provided `(key, color)` leaf.
    pub fn leaves(&self) -> Vec<(&str, &str)> {
        let roles = [
            ("DEFAULT", &self.default),
            ("foreground", &self.foreground),
            ("background", &self.background),
            ("border", &self.border),
            ("muted", &self.muted),
            ("accent", &self.accent),
        ];
        let mut out: Vec<(&str, &str)> = self
            .steps
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        out.extend(
            roles
                .into_iter()
                .filter_map(|(k, v)| v.as_deref().map(|v| (k, v))),
        );
        out
    }

    /// Later values win.
    pub fn merge(&mut self, other: &PaletteCustomization) {
        merge_opt(&mut self.default, &other.default);
        merge_opt(&mut self.foreground, &other.foreground);
        merge_opt(&mut self.background, &other.background);
        merge_opt(&mut self.border, &other.border);
        merge_opt(&mut self.muted, &other.muted);
        merge_opt(&mut self.accent, &other.accent);
        for (k, v) in &other.steps {
            self.steps.insert(k.clone(), v.clone());
        }
    }
}

/// Partial overrides for [`ColorTokens`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorCustomization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreground: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_foreground: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popover: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popover_foreground: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ring: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muted: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muted_foreground: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_foreground: Option<String>,
    #[serde(flatten)]
    pub palettes: BTreeMap<String, PaletteCustomization>,
}

impl ColorCustomization {
    /// Returns a surface override by its camelCase key.
    pub fn surface(&self, key: &str) -> Option<&str> {
        let value = match key {
            "background" => &self.background,
            "foreground" => &self.foreground,
            "card" => &self.card,
            "cardForeground" => &self.card_foreground,
            "popover" => &self.popover,
            "popoverForeground" => &self.popover_foreground,
            "border" => &self.border,
            "input" => &self.input,
            "ring" => &self.ring,
            "muted" => &self.muted,
            "mutedForeground" => &self.muted_foreground,
            "accent" => &self.accent,
            "accentForeground" => &self.accent_foreground,
            _ => return None,
        };
        value.as_deref()
    }

    /// Sets a surface override by its camelCase key. Unknown keys are ignored.
    pub fn set_surface(&mut self, key: &str, color: impl Into<String>) -> bool {
        let slot = match key {
            "background" => &mut self.background,
            "foreground" => &mut self.foreground,
            "card" => &mut self.card,
            "cardForeground" => &mut self.card_foreground,
            "popover" => &mut self.popover,
            "popoverForeground" => &mut self.popover_foreground,
            "border" => &mut self.border,
            "input" => &mut self.input,
            "ring" => &mut self.ring,
            "muted" => &mut self.muted,
            "mutedForeground" => &mut self.muted_foreground,
            "accent" => &mut self.accent,
            "accentForeground" => &mut self.accent_foreground,
            _ => return false,
        };
        *slot = Some(color.into());
        true
    }

    /// Builder-style surface setter.
    pub fn with_surface(mut self, key: &str, color: impl Into<String>) -> Self {
        self.set_surface(key, color);
        self
    }

    /// Builder-style palette setter.
    pub fn with_palette(mut self, name: impl Into<String>, palette: PaletteCustomization) -> Self {
        self.palettes.insert(name.into(), palette);
        self
    }

    /// Returns true when nothing is overridden.
    pub fn is_empty(&self) -> bool {
        SURFACE_COLORS.iter().all(|k| self.surface(k).is_none()) && self.palettes.is_empty()
    }

    /// Later values win.
    pub fn merge(&mut self, other: &ColorCustomization) {
        for key in SURFACE_COLORS {
            if let Some(color) = other.surface(key) {
                self.set_surface(key, color);
            }
        }
        for (name, palette) in &other.palettes {
            self.palettes
                .entry(name.clone())
                .or_default()
                .merge(palette);
        }
    }
}

/// Partial overrides for [`TypographyTokens`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypographyCustomization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<TokenScale>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<TokenScale>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<TokenScale>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<TokenScale>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<TokenScale>,
}

impl TypographyCustomization {
    /// Later values win, key by key.
    pub fn merge(&mut self, other: &TypographyCustomization) {
        merge_scale_opt(&mut self.font_family, &other.font_family);
        merge_scale_opt(&mut self.font_size, &other.font_size);
        merge_scale_opt(&mut self.font_weight, &other.font_weight);
        merge_scale_opt(&mut self.line_height, &other.line_height);
        merge_scale_opt(&mut self.letter_spacing, &other.letter_spacing);
    }
}

/// Partial overrides for [`MotionTokens`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotionCustomization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<TokenScale>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<TokenScale>,
}

impl MotionCustomization {
    /// Later values win, key by key.
    pub fn merge(&mut self, other: &MotionCustomization) {
        merge_scale_opt(&mut self.duration, &other.duration);
        merge_scale_opt(&mut self.easing, &other.easing);
    }
}

/// A partial theme patch. Every field is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeCustomization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<ColorCustomization>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typography: Option<TypographyCustomization>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<TokenScale>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motion: Option<MotionCustomization>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakpoints: Option<TokenScale>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<RadiusTokens>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadows: Option<TokenScale>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<TokenScale<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animations: Option<serde_json::Value>,
}

impl ThemeCustomization {
    /// Returns true when the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.colors.as_ref().is_none_or(ColorCustomization::is_empty)
            && self.typography.is_none()
            && self.spacing.is_none()
            && self.motion.is_none()
            && self.breakpoints.is_none()
            && self.radius.is_none()
            && self.shadows.is_none()
            && self.z_index.is_none()
            && self.animations.is_none()
    }

    /// Folds `other` into this patch; `other` wins wherever both set a value.
    pub fn merge(&mut self, other: &ThemeCustomization) {
        if let Some(colors) = &other.colors {
            self.colors.get_or_insert_with(Default::default).merge(colors);
        }
        if let Some(typography) = &other.typography {
            self.typography
                .get_or_insert_with(Default::default)
                .merge(typography);
        }
        if let Some(motion) = &other.motion {
            self.motion.get_or_insert_with(Default::default).merge(motion);
        }
        merge_scale_opt(&mut self.spacing, &other.spacing);
        merge_scale_opt(&mut self.breakpoints, &other.breakpoints);
        merge_scale_opt(&mut self.shadows, &other.shadows);
        merge_scale_opt(&mut self.z_index, &other.z_index);
        if let Some(radius) = &other.radius {
            self.radius = Some(match (self.radius.take(), radius) {
                (Some(RadiusTokens::Scale(mut mine)), RadiusTokens::Scale(theirs)) => {
                    mine.merge_from(theirs);
                    RadiusTokens::Scale(mine)
                }
                (_, theirs) => theirs.clone(),
            });
        }
        if let Some(animations) = &other.animations {
            match &mut self.animations {
                Some(mine) => merge_json(mine, animations),
                None => self.animations = Some(animations.clone()),
            }
        }
    }
}

fn merge_opt(target: &mut Option<String>, other: &Option<String>) {
    if other.is_some() {
        target.clone_from(other);
    }
}

fn merge_scale_opt<V: Clone>(target: &mut Option<TokenScale<V>>, other: &Option<TokenScale<V>>) {
    if let Some(other) = other {
        match target {
            Some(mine) => mine.merge_from(other),
            None => *target = Some(other.clone()),
        }
    }
}

/// Recursive JSON object merge; `overlay` wins at leaves.
pub(crate) fn merge_json(base: &mut serde_json::Value, overlay: &serde_json::Value) {
    match (base, overlay) {
        (serde_json::Value::Object(mine), serde_json::Value::Object(theirs)) => {
            for (k, v) in theirs {
                match mine.get_mut(k) {
                    Some(existing) => merge_json(existing, v),
                    None => {
                        mine.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (slot, value) => *slot = value.clone(),
    }
}

/// Recursive JSON object merge that only adds missing keys.
pub(crate) fn extend_json(base: &mut serde_json::Value, overlay: &serde_json::Value) {
    if let (serde_json::Value::Object(mine), serde_json::Value::Object(theirs)) = (base, overlay) {
        for (k, v) in theirs {
            match mine.get_mut(k) {
                Some(existing) => extend_json(existing, v),
                None => {
                    mine.insert(k.clone(), v.clone());
                }
            }
        }
    }
}
