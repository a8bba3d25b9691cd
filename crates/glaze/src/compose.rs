//! Theme composition: applying a [`ThemeCustomization`] to a built theme.
//!
//! Three modes decide what happens to values the overlay touches:
//!
//! - [`CompositionMode::Merge`]: deep merge, overlay wins per key. Colors go
//!   through the configured [`ConflictStrategy`].
//! - [`CompositionMode::Override`]: every present field replaces the base field
//!   wholesale. Applying the same overlay twice changes nothing further.
//! - [`CompositionMode::Extend`]: only adds what the base is missing. Existing
//!   values are never touched.
//!
//! Merge and override finish with [`ensure_accessible_colors`] when
//! [`ConflictResolutionConfig::preserve_accessibility`] is set.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::color;
use crate::scale::{self, ScaleConfig};
use crate::tokens::{
    BuiltTheme, ColorCustomization, ColorTokens, MotionCustomization, MotionTokens,
    PaletteCustomization, RadiusTokens, SURFACE_COLORS, SemanticColorGroup, ThemeCustomization,
    ThemeTokens, TokenScale, TypographyCustomization, TypographyTokens, extend_json, merge_json,
};

/// Mix ratio used by [`ConflictStrategy::Blend`].
pub const BLEND_RATIO: f64 = 0.5;

/// Minimum foreground/background contrast enforced after composition.
pub const COMPOSITION_MIN_CONTRAST: f64 = 4.5;

/// How an overlay is applied to its base.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompositionMode {
    #[default]
    Merge,
    Override,
    Extend,
}

impl CompositionMode {
    /// Serialized name of the mode.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Merge => "merge",
            Self::Override => "override",
            Self::Extend => "extend",
        }
    }
}

impl fmt::Display for CompositionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a color present in both base and overlay is resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictStrategy {
    /// Palettes with a `DEFAULT` are regenerated; scalar colors are overwritten.
    #[default]
    Auto,
    /// Keep base colors; only fill missing ones.
    PreferBase,
    /// Overlay wins at every leaf.
    PreferOverride,
    /// Mix both colors in Oklab at [`BLEND_RATIO`].
    Blend,
}

/// Color conflict resolution settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConflictResolutionConfig {
    pub strategy: ConflictStrategy,
    /// Run [`ensure_accessible_colors`] after merge and override.
    pub preserve_accessibility: bool,
    /// In `auto`, apply explicit step/role overrides on top of a regenerated palette.
    ///
    /// When false, a reseeded palette is taken from the generated scale as is:
    /// explicit steps and roles are dropped and `DEFAULT` becomes step 500.
    pub prioritize_user_customizations: bool,
    /// When false, merge ignores palette overlays that carry no `DEFAULT`.
    pub allow_partial_overrides: bool,
}

impl Default for ConflictResolutionConfig {
    fn default() -> Self {
        Self {
            strategy: ConflictStrategy::Auto,
            preserve_accessibility: true,
            prioritize_user_customizations: true,
            allow_partial_overrides: true,
        }
    }
}

impl ConflictResolutionConfig {
    /// Default settings with the given strategy.
    pub fn with_strategy(strategy: ConflictStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }
}

/// Applies `overlay` to `base` and returns the composed theme.
///
/// `meta` is kept except for `compositionMode` and `updatedAt`; the overlay is
/// folded into `meta.customizations`.
pub fn compose(
    base: &BuiltTheme,
    overlay: &ThemeCustomization,
    mode: CompositionMode,
    conflict: &ConflictResolutionConfig,
) -> BuiltTheme {
    debug!(
        theme.composition_mode = %mode,
        theme.strategy = ?conflict.strategy,
        "Composing theme"
    );

    let mut tokens = match mode {
        CompositionMode::Merge => merge_tokens(&base.tokens, overlay, conflict),
        CompositionMode::Override => override_tokens(&base.tokens, overlay, conflict),
        CompositionMode::Extend => extend_tokens(&base.tokens, overlay, conflict),
    };

    if conflict.preserve_accessibility && mode != CompositionMode::Extend {
        tokens.colors = ensure_accessible_colors(&tokens.colors, COMPOSITION_MIN_CONTRAST);
    }

    let mut meta = base.meta.clone();
    meta.composition_mode = mode;
    meta.customizations.merge(overlay);
    meta.touch();
    BuiltTheme { tokens, meta }
}

/// Forces readable foregrounds.
///
/// For each palette (`foreground` on `background`) and the top-level
/// `foreground`/`background` pair, a foreground below `min_ratio` becomes
/// `#000000` on a light background and `#ffffff` on a dark one. Pairs whose
/// contrast cannot be computed are left alone.
pub fn ensure_accessible_colors(colors: &ColorTokens, min_ratio: f64) -> ColorTokens {
    let mut out = colors.clone();

    if let Some(fg) = accessible_foreground("colors.foreground", &out.foreground, &out.background, min_ratio) {
        out.foreground = fg;
    }
    for (name, group) in &mut out.palettes {
        let path = format!("colors.{name}.foreground");
        if let Some(fg) = accessible_foreground(&path, &group.foreground, &group.background, min_ratio) {
            group.foreground = fg;
        }
    }
    out
}

fn accessible_foreground(path: &str, fg: &str, bg: &str, min_ratio: f64) -> Option<String> {
    let ratio = scale::try_contrast_ratio(fg, bg)?;
    if ratio >= min_ratio {
        return None;
    }
    let replacement = scale::readable_foreground(bg);
    if fg == replacement {
        return None;
    }
    warn!(
        theme.path = path,
        theme.contrast_ratio = ratio,
        theme.min_ratio = min_ratio,
        theme.replacement = replacement,
        "Low contrast foreground replaced"
    );
    Some(replacement.to_string())
}

// -----------------------------------------------------------------------------
// Merge
// -----------------------------------------------------------------------------

fn merge_tokens(
    base: &ThemeTokens,
    overlay: &ThemeCustomization,
    conflict: &ConflictResolutionConfig,
) -> ThemeTokens {
    let mut out = base.clone();

    if let Some(colors) = &overlay.colors {
        out.colors = merge_colors(&base.colors, colors, conflict);
    }
    if let Some(typography) = &overlay.typography {
        merge_typography(&mut out.typography, typography);
    }
    if let Some(motion) = &overlay.motion {
        merge_motion(&mut out.motion, motion);
    }
    merge_scale(&mut out.spacing, overlay.spacing.as_ref());
    merge_scale(&mut out.breakpoints, overlay.breakpoints.as_ref());
    merge_scale(&mut out.z_index, overlay.z_index.as_ref());
    if let Some(shadows) = &overlay.shadows {
        out.shadows.get_or_insert_with(TokenScale::new).merge_from(shadows);
    }
    if let Some(radius) = &overlay.radius {
        out.radius = match (&base.radius, radius) {
            (RadiusTokens::Scale(mine), RadiusTokens::Scale(theirs)) => {
                let mut merged = mine.clone();
                merged.merge_from(theirs);
                RadiusTokens::Scale(merged)
            }
            (_, theirs) => theirs.clone(),
        };
    }
    if let Some(animations) = &overlay.animations {
        match &mut out.animations {
            Some(mine) => merge_json(mine, animations),
            None => out.animations = Some(animations.clone()),
        }
    }
    out
}

fn merge_colors(
    base: &ColorTokens,
    overlay: &ColorCustomization,
    conflict: &ConflictResolutionConfig,
) -> ColorTokens {
    let mut out = base.clone();
    let strategy = conflict.strategy;

    for key in SURFACE_COLORS {
        if let (Some(value), Some(slot)) = (overlay.surface(key), out.surface_mut(key)) {
            *slot = resolve_leaf(strategy, slot, value);
        }
    }

    for (name, palette) in &overlay.palettes {
        if palette.default.is_none() && !conflict.allow_partial_overrides {
            warn!(theme.palette = %name, "Partial palette override ignored");
            continue;
        }
        let merged = match base.palettes.get(name) {
            Some(existing) => merge_palette(existing, palette, conflict),
            None => match new_palette(name, palette, conflict) {
                Some(group) => group,
                None => continue,
            },
        };
        out.palettes.insert(name.clone(), merged);
    }
    out
}

fn merge_palette(
    base: &SemanticColorGroup,
    overlay: &PaletteCustomization,
    conflict: &ConflictResolutionConfig,
) -> SemanticColorGroup {
    if let (ConflictStrategy::Auto, Some(seed)) = (conflict.strategy, overlay.default.as_deref()) {
        return regenerate_palette(seed, overlay, conflict.prioritize_user_customizations);
    }
    let mut out = base.clone();
    for (key, value) in overlay.leaves() {
        match out.get_mut(key) {
            Some(slot) => *slot = resolve_leaf(conflict.strategy, slot, value),
            None => debug!(theme.palette_key = key, "Unknown palette key skipped"),
        }
    }
    out
}

/// Resolves one color present in both base and overlay.
fn resolve_leaf(strategy: ConflictStrategy, base: &str, overlay: &str) -> String {
    match strategy {
        ConflictStrategy::Auto | ConflictStrategy::PreferOverride => overlay.to_string(),
        ConflictStrategy::PreferBase if base.trim().is_empty() => overlay.to_string(),
        ConflictStrategy::PreferBase => base.to_string(),
        ConflictStrategy::Blend => {
            color::mix(base, overlay, BLEND_RATIO).unwrap_or_else(|| overlay.to_string())
        }
    }
}

/// Completes a palette the base does not have from its `DEFAULT` or `500` step.
fn new_palette(
    name: &str,
    overlay: &PaletteCustomization,
    conflict: &ConflictResolutionConfig,
) -> Option<SemanticColorGroup> {
    let Some(seed) = overlay.seed() else {
        warn!(theme.palette = %name, "New palette has no DEFAULT or 500 step, skipped");
        return None;
    };
    let explicit =
        conflict.prioritize_user_customizations || conflict.strategy != ConflictStrategy::Auto;
    Some(regenerate_palette(seed, overlay, explicit))
}

/// Generates a full group from `seed`, optionally applying explicit leaves on top.
fn regenerate_palette(seed: &str, overlay: &PaletteCustomization, explicit: bool) -> SemanticColorGroup {
    let mut group = scale::semantic_group(seed, &ScaleConfig::default());
    if !explicit {
        let dropped = overlay
            .leaves()
            .into_iter()
            .filter(|(key, value)| group.get(key) != Some(*value))
            .count();
        if dropped > 0 {
            debug!(
                theme.seed = %seed,
                theme.dropped = dropped,
                "Explicit palette values replaced by the generated scale"
            );
        }
    }
    if explicit {
        for (key, value) in overlay.leaves() {
            if let Some(slot) = group.get_mut(key) {
                *slot = value.to_string();
            }
        }
        if overlay.default.is_none() {
            if let Some(step) = group.scale.get("500") {
                group.default = step.to_string();
            }
        }
    }
    group
}

fn merge_typography(base: &mut TypographyTokens, overlay: &TypographyCustomization) {
    merge_scale(&mut base.font_family, overlay.font_family.as_ref());
    merge_scale(&mut base.font_size, overlay.font_size.as_ref());
    merge_scale(&mut base.font_weight, overlay.font_weight.as_ref());
    merge_scale(&mut base.line_height, overlay.line_height.as_ref());
    merge_scale(&mut base.letter_spacing, overlay.letter_spacing.as_ref());
}

fn merge_motion(base: &mut MotionTokens, overlay: &MotionCustomization) {
    merge_scale(&mut base.duration, overlay.duration.as_ref());
    merge_scale(&mut base.easing, overlay.easing.as_ref());
}

fn merge_scale<V: Clone>(base: &mut TokenScale<V>, overlay: Option<&TokenScale<V>>) {
    if let Some(overlay) = overlay {
        base.merge_from(overlay);
    }
}

// -----------------------------------------------------------------------------
// Override
// -----------------------------------------------------------------------------

fn override_tokens(
    base: &ThemeTokens,
    overlay: &ThemeCustomization,
    conflict: &ConflictResolutionConfig,
) -> ThemeTokens {
    let mut out = base.clone();

    if let Some(colors) = &overlay.colors {
        out.colors = override_colors(&base.colors, colors, conflict);
    }
    if let Some(t) = &overlay.typography {
        replace(&mut out.typography.font_family, t.font_family.as_ref());
        replace(&mut out.typography.font_size, t.font_size.as_ref());
        replace(&mut out.typography.font_weight, t.font_weight.as_ref());
        replace(&mut out.typography.line_height, t.line_height.as_ref());
        replace(&mut out.typography.letter_spacing, t.letter_spacing.as_ref());
    }
    if let Some(m) = &overlay.motion {
        replace(&mut out.motion.duration, m.duration.as_ref());
        replace(&mut out.motion.easing, m.easing.as_ref());
    }
    replace(&mut out.spacing, overlay.spacing.as_ref());
    replace(&mut out.breakpoints, overlay.breakpoints.as_ref());
    replace(&mut out.z_index, overlay.z_index.as_ref());
    replace(&mut out.radius, overlay.radius.as_ref());
    if overlay.shadows.is_some() {
        out.shadows.clone_from(&overlay.shadows);
    }
    if overlay.animations.is_some() {
        out.animations.clone_from(&overlay.animations);
    }
    out
}

fn override_colors(
    base: &ColorTokens,
    overlay: &ColorCustomization,
    conflict: &ConflictResolutionConfig,
) -> ColorTokens {
    let mut out = base.clone();
    for key in SURFACE_COLORS {
        if let (Some(value), Some(slot)) = (overlay.surface(key), out.surface_mut(key)) {
            *slot = value.to_string();
        }
    }
    for (name, palette) in &overlay.palettes {
        let group = match (palette.default.as_deref(), base.palettes.get(name)) {
            (Some(seed), _) => regenerate_palette(seed, palette, true),
            (None, Some(existing)) => {
                let mut group = existing.clone();
                for (key, value) in palette.leaves() {
                    if let Some(slot) = group.get_mut(key) {
                        *slot = value.to_string();
                    }
                }
                group
            }
            (None, None) => match new_palette(name, palette, conflict) {
                Some(group) => group,
                None => continue,
            },
        };
        out.palettes.insert(name.clone(), group);
    }
    out
}

fn replace<T: Clone>(target: &mut T, value: Option<&T>) {
    if let Some(value) = value {
        target.clone_from(value);
    }
}

// -----------------------------------------------------------------------------
// Extend
// -----------------------------------------------------------------------------

fn extend_tokens(
    base: &ThemeTokens,
    overlay: &ThemeCustomization,
    conflict: &ConflictResolutionConfig,
) -> ThemeTokens {
    let mut out = base.clone();

    if let Some(colors) = &overlay.colors {
        extend_colors(&mut out.colors, colors, conflict);
    }
    if let Some(t) = &overlay.typography {
        extend_scale(&mut out.typography.font_family, t.font_family.as_ref());
        extend_scale(&mut out.typography.font_size, t.font_size.as_ref());
        extend_scale(&mut out.typography.font_weight, t.font_weight.as_ref());
        extend_scale(&mut out.typography.line_height, t.line_height.as_ref());
        extend_scale(&mut out.typography.letter_spacing, t.letter_spacing.as_ref());
    }
    if let Some(m) = &overlay.motion {
        extend_scale(&mut out.motion.duration, m.duration.as_ref());
        extend_scale(&mut out.motion.easing, m.easing.as_ref());
    }
    extend_scale(&mut out.spacing, overlay.spacing.as_ref());
    extend_scale(&mut out.breakpoints, overlay.breakpoints.as_ref());
    extend_scale(&mut out.z_index, overlay.z_index.as_ref());
    if let Some(shadows) = &overlay.shadows {
        match &mut out.shadows {
            Some(mine) => mine.extend_missing(shadows),
            None => out.shadows = Some(shadows.clone()),
        }
    }
    if let (RadiusTokens::Scale(mine), Some(RadiusTokens::Scale(theirs))) =
        (&mut out.radius, overlay.radius.as_ref())
    {
        mine.extend_missing(theirs);
    }
    if let Some(animations) = &overlay.animations {
        match &mut out.animations {
            Some(mine) => extend_json(mine, animations),
            None => out.animations = Some(animations.clone()),
        }
    }
    out
}

fn extend_colors(
    out: &mut ColorTokens,
    overlay: &ColorCustomization,
    conflict: &ConflictResolutionConfig,
) {
    for key in SURFACE_COLORS {
        if let (Some(value), Some(slot)) = (overlay.surface(key), out.surface_mut(key)) {
            if slot.trim().is_empty() {
                *slot = value.to_string();
            }
        }
    }
    for (name, palette) in &overlay.palettes {
        match out.palettes.get_mut(name) {
            Some(existing) => {
                for (key, value) in palette.leaves() {
                    if let Some(slot) = existing.get_mut(key) {
                        if slot.trim().is_empty() {
                            *slot = value.to_string();
                        }
                    }
                }
            }
            None => {
                if let Some(group) = new_palette(name, palette, conflict) {
                    out.palettes.insert(name.clone(), group);
                }
            }
        }
    }
}

fn extend_scale<V: Clone>(base: &mut TokenScale<V>, overlay: Option<&TokenScale<V>>) {
    if let Some(overlay) = overlay {
        base.extend_missing(overlay);
    }
}
