//! Density and accessibility variants.
//!
//! A variant is a [`VariantProfile`]: six groups of multipliers applied across
//! every token category. Any multiplier equal to `1` skips its stage, so the
//! `default` profile returns the tokens untouched.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::color::{self, Hsla};
use crate::compose::ensure_accessible_colors;
use crate::tokens::{BuiltTheme, ThemeTokens, TokenScale};
use crate::units;

/// Contrast multipliers above this also force 7:1 foregrounds.
pub const HIGH_CONTRAST_THRESHOLD: f64 = 1.2;

/// Foreground contrast enforced by strong contrast variants.
pub const HIGH_CONTRAST_MIN_RATIO: f64 = 7.0;

/// Minimum z-index layers in the high-contrast variant.
pub const HIGH_CONTRAST_Z_FLOORS: [(&str, i64); 3] =
    [("modal", 2000), ("popover", 1500), ("tooltip", 2500)];

static RGBA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"rgba\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d*\.?\d+)\s*\)")
        .expect("rgba pattern compiles")
});

/// Built-in variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    #[default]
    Default,
    Compact,
    Comfortable,
    HighContrast,
}

impl Variant {
    /// Every built-in variant.
    pub const ALL: [Self; 4] = [
        Self::Default,
        Self::Compact,
        Self::Comfortable,
        Self::HighContrast,
    ];

    /// Kebab-case identifier.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Compact => "compact",
            Self::Comfortable => "comfortable",
            Self::HighContrast => "high-contrast",
        }
    }

    /// Resolves a name, falling back to [`Variant::Default`] with a warning.
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            warn!(theme.variant = %name, "Unknown variant, using default");
            Self::Default
        })
    }

    /// The multipliers this variant applies.
    pub fn profile(self) -> VariantProfile {
        match self {
            Self::Default => VariantProfile::default(),
            Self::Compact => VariantProfile {
                spacing: SpacingAdjustments { multiplier: 0.75 },
                typography: TypographyAdjustments {
                    size_multiplier: 0.875,
                    font_weight_adjustment: 0,
                    line_height_multiplier: 0.9,
                },
                colors: ColorAdjustments::default(),
                motion: MotionAdjustments {
                    speed_multiplier: 1.25,
                    reduce_motion: false,
                },
                borders: BorderAdjustments {
                    radius_multiplier: 0.75,
                },
                shadows: ShadowAdjustments {
                    intensity_multiplier: 0.8,
                    blur_multiplier: 0.8,
                },
            },
            Self::Comfortable => VariantProfile {
                spacing: SpacingAdjustments { multiplier: 1.25 },
                typography: TypographyAdjustments {
                    size_multiplier: 1.0625,
                    font_weight_adjustment: 0,
                    line_height_multiplier: 1.1,
                },
                colors: ColorAdjustments::default(),
                motion: MotionAdjustments {
                    speed_multiplier: 0.85,
                    reduce_motion: false,
                },
                borders: BorderAdjustments {
                    radius_multiplier: 1.25,
                },
                shadows: ShadowAdjustments {
                    intensity_multiplier: 1.1,
                    blur_multiplier: 1.2,
                },
            },
            Self::HighContrast => VariantProfile {
                spacing: SpacingAdjustments::default(),
                typography: TypographyAdjustments {
                    size_multiplier: 1.125,
                    font_weight_adjustment: 100,
                    line_height_multiplier: 1.1,
                },
                colors: ColorAdjustments {
                    contrast_multiplier: 1.5,
                    saturation_multiplier: 1.1,
                },
                motion: MotionAdjustments {
                    speed_multiplier: 1.0,
                    reduce_motion: true,
                },
                borders: BorderAdjustments::default(),
                shadows: ShadowAdjustments {
                    intensity_multiplier: 1.5,
                    blur_multiplier: 0.5,
                },
            },
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "default" => Ok(Self::Default),
            "compact" => Ok(Self::Compact),
            "comfortable" => Ok(Self::Comfortable),
            "high-contrast" | "highContrast" | "high_contrast" => Ok(Self::HighContrast),
            other => Err(format!("unknown variant '{other}'")),
        }
    }
}

// -----------------------------------------------------------------------------
// Profile
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpacingAdjustments {
    pub multiplier: f64,
}

impl Default for SpacingAdjustments {
    fn default() -> Self {
        Self { multiplier: 1.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TypographyAdjustments {
    pub size_multiplier: f64,
    /// Added to numeric font weights, which are then clamped to `[100, 900]`.
    pub font_weight_adjustment: i32,
    pub line_height_multiplier: f64,
}

impl Default for TypographyAdjustments {
    fn default() -> Self {
        Self {
            size_multiplier: 1.0,
            font_weight_adjustment: 0,
            line_height_multiplier: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColorAdjustments {
    /// Stretches lightness away from 50%.
    pub contrast_multiplier: f64,
    pub saturation_multiplier: f64,
}

impl Default for ColorAdjustments {
    fn default() -> Self {
        Self {
            contrast_multiplier: 1.0,
            saturation_multiplier: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MotionAdjustments {
    /// Durations are divided by this.
    pub speed_multiplier: f64,
    /// Sets every duration to `0ms`.
    pub reduce_motion: bool,
}

impl Default for MotionAdjustments {
    fn default() -> Self {
        Self {
            speed_multiplier: 1.0,
            reduce_motion: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BorderAdjustments {
    pub radius_multiplier: f64,
}

impl Default for BorderAdjustments {
    fn default() -> Self {
        Self {
            radius_multiplier: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShadowAdjustments {
    /// Scales shadow offsets.
    pub intensity_multiplier: f64,
    pub blur_multiplier: f64,
}

impl Default for ShadowAdjustments {
    fn default() -> Self {
        Self {
            intensity_multiplier: 1.0,
            blur_multiplier: 1.0,
        }
    }
}

/// Multipliers for every token category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VariantProfile {
    pub spacing: SpacingAdjustments,
    pub typography: TypographyAdjustments,
    pub colors: ColorAdjustments,
    pub motion: MotionAdjustments,
    pub borders: BorderAdjustments,
    pub shadows: ShadowAdjustments,
}

/// Per-group replacements for a named profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VariantOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacing: Option<SpacingAdjustments>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typography: Option<TypographyAdjustments>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<ColorAdjustments>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motion: Option<MotionAdjustments>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub borders: Option<BorderAdjustments>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadows: Option<ShadowAdjustments>,
}

impl VariantOverrides {
    /// Returns `profile` with every present group replaced.
    pub fn apply_to(&self, profile: VariantProfile) -> VariantProfile {
        VariantProfile {
            spacing: self.spacing.unwrap_or(profile.spacing),
            typography: self.typography.unwrap_or(profile.typography),
            colors: self.colors.unwrap_or(profile.colors),
            motion: self.motion.unwrap_or(profile.motion),
            borders: self.borders.unwrap_or(profile.borders),
            shadows: self.shadows.unwrap_or(profile.shadows),
        }
    }

    /// Returns true when no group is replaced.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// -----------------------------------------------------------------------------
// Transform
// -----------------------------------------------------------------------------

/// Applies the named variant, with optional group overrides, to a theme.
///
/// Unknown names fall back to `default`. The result records the variant in
/// `meta.variant` and refreshes `meta.updatedAt`.
pub fn apply_variant(
    theme: &BuiltTheme,
    name: &str,
    custom: Option<&VariantOverrides>,
) -> BuiltTheme {
    let variant = Variant::from_name(name);
    let profile = custom.map_or_else(|| variant.profile(), |c| c.apply_to(variant.profile()));
    apply_profile(theme, variant, &profile)
}

/// Applies an explicit profile and records `variant` in the metadata.
pub fn apply_profile(theme: &BuiltTheme, variant: Variant, profile: &VariantProfile) -> BuiltTheme {
    debug!(theme.variant = %variant, "Applying variant");

    let mut tokens = theme.tokens.clone();
    scale_spacing(&mut tokens, profile.spacing);
    scale_typography(&mut tokens, profile.typography);
    adjust_colors(&mut tokens, profile.colors);
    scale_motion(&mut tokens, profile.motion);

    let radius = profile.borders.radius_multiplier;
    if radius != 1.0 {
        tokens.radius = tokens.radius.map(|v| units::scale_value(v, radius, &[]));
    }

    if let Some(shadows) = &tokens.shadows {
        tokens.shadows = Some(scale_shadows(shadows, profile.shadows));
    }

    if variant == Variant::HighContrast {
        raise_z_index(&mut tokens.z_index);
    }

    let mut meta = theme.meta.clone();
    meta.variant = variant;
    meta.touch();
    BuiltTheme { tokens, meta }
}

fn scale_spacing(tokens: &mut ThemeTokens, adj: SpacingAdjustments) {
    if adj.multiplier == 1.0 {
        return;
    }
    for value in tokens.spacing.values_mut() {
        *value = units::scale_value(value, adj.multiplier, &["rem"]);
    }
}

fn scale_typography(tokens: &mut ThemeTokens, adj: TypographyAdjustments) {
    let t = &mut tokens.typography;
    if adj.size_multiplier != 1.0 {
        for value in t.font_size.values_mut() {
            *value = units::scale_value(value, adj.size_multiplier, &[]);
        }
    }
    if adj.font_weight_adjustment != 0 {
        for value in t.font_weight.values_mut() {
            if let Ok(weight) = value.trim().parse::<i32>() {
                *value = weight
                    .saturating_add(adj.font_weight_adjustment)
                    .clamp(100, 900)
                    .to_string();
            }
        }
    }
    if adj.line_height_multiplier != 1.0 {
        for value in t.line_height.values_mut() {
            *value = units::scale_value(value, adj.line_height_multiplier, &[]);
        }
    }
}

fn adjust_colors(tokens: &mut ThemeTokens, adj: ColorAdjustments) {
    let contrast = adj.contrast_multiplier;
    let saturation = adj.saturation_multiplier;
    if contrast == 1.0 && saturation == 1.0 {
        return;
    }

    tokens.colors.for_each_mut(|_, value| {
        *value = color::adjust_hsl(value, |c| Hsla {
            l: (0.5 + (c.l - 0.5) * contrast).clamp(0.0, 1.0),
            s: (c.s * saturation).clamp(0.0, 1.0),
            ..c
        });
    });

    if contrast > HIGH_CONTRAST_THRESHOLD {
        tokens.colors = ensure_accessible_colors(&tokens.colors, HIGH_CONTRAST_MIN_RATIO);
    }
}

fn scale_motion(tokens: &mut ThemeTokens, adj: MotionAdjustments) {
    if adj.reduce_motion {
        for value in tokens.motion.duration.values_mut() {
            *value = "0ms".to_string();
        }
    } else if adj.speed_multiplier != 1.0 {
        for value in tokens.motion.duration.values_mut() {
            *value = units::scale_duration(value, adj.speed_multiplier);
        }
    }
}

fn raise_z_index(z_index: &mut TokenScale<i64>) {
    for (layer, floor) in HIGH_CONTRAST_Z_FLOORS {
        match z_index.get_mut(layer) {
            Some(value) => *value = (*value).max(floor),
            None => {
                z_index.insert(layer, floor);
            }
        }
    }
}

/// Scales shadow offsets and blur radii, and alpha for sharper, stronger shadows.
///
/// Only `rgba(...)` alphas are rewritten; other color notations are left as is.
pub fn scale_shadows(shadows: &TokenScale, adj: ShadowAdjustments) -> TokenScale {
    let intensity = adj.intensity_multiplier;
    let blur = adj.blur_multiplier;
    if intensity == 1.0 && blur == 1.0 {
        return shadows.clone();
    }
    let scale_alpha = intensity > 1.0 && blur < 1.0;

    shadows.map_values(|_, value| {
        let layers: Vec<String> = units::split_top_level(value)
            .into_iter()
            .map(|layer| scale_shadow_layer(layer, intensity, blur))
            .collect();
        let joined = layers.join(", ");
        if scale_alpha {
            scale_rgba_alpha(&joined, intensity)
        } else {
            joined
        }
    })
}

fn scale_shadow_layer(layer: &str, intensity: f64, blur: f64) -> String {
    let mut length_index = 0;
    split_words(layer)
        .into_iter()
        .map(|word| {
            if !units::is_css_length(word) {
                return word.to_string();
            }
            let factor = match length_index {
                0 | 1 => intensity,
                2 => blur,
                _ => 1.0,
            };
            length_index += 1;
            if factor == 1.0 {
                word.to_string()
            } else {
                units::scale_value(word, factor, &[])
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Splits on whitespace outside parentheses.
fn split_words(value: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut depth = 0usize;
    let mut start = None;
    for (i, c) in value.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                if let Some(s) = start.take() {
                    words.push(&value[s..i]);
                }
                continue;
            }
            _ => {}
        }
        if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        words.push(&value[s..]);
    }
    words
}

fn scale_rgba_alpha(value: &str, factor: f64) -> String {
    RGBA_RE
        .replace_all(value, |caps: &Captures<'_>| {
            let alpha = caps[4].parse::<f64>().unwrap_or(1.0);
            format!(
                "rgba({}, {}, {}, {})",
                &caps[1],
                &caps[2],
                &caps[3],
                units::format_number((alpha * factor).min(1.0))
            )
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::ThemePreset;
    use crate::scale::contrast_ratio;

    fn light() -> BuiltTheme {
        BuiltTheme::new(ThemePreset::Light.to_tokens(), "light")
    }

    #[test]
    fn test_default_variant_is_noop() {
        let theme = light();
        let out = apply_variant(&theme, "default", None);
        assert_eq!(out.tokens, theme.tokens);
        assert_eq!(out.meta.variant, Variant::Default);
    }

    #[test]
    fn test_unknown_variant_falls_back() {
        let theme = light();
        let out = apply_variant(&theme, "neon", None);
        assert_eq!(out.tokens, theme.tokens);
        assert_eq!(out.meta.variant, Variant::Default);
    }

    #[test]
    fn test_compact_scales_rem_spacing_only() {
        let mut theme = light();
        theme.tokens.spacing.insert("px", "1px".to_string());
        let out = apply_variant(&theme, "compact", None);
        assert_eq!(out.tokens.spacing.get("4").map(String::as_str), Some("0.75rem"));
        assert_eq!(out.tokens.spacing.get("px").map(String::as_str), Some("1px"));
        assert_eq!(out.tokens.spacing.get("0").map(String::as_str), Some("0"));
        assert_eq!(
            out.tokens.motion.duration.get("normal").map(String::as_str),
            Some("240ms")
        );
    }

    #[test]
    fn test_high_contrast_reduces_motion_and_raises_layers() {
        let out = apply_variant(&light(), "high-contrast", None);
        assert!(out.tokens.motion.duration.iter().all(|(_, v)| v == "0ms"));
        assert_eq!(out.tokens.z_index.get("modal"), Some(&2000));
        assert_eq!(out.tokens.z_index.get("popover"), Some(&1500));
        assert_eq!(out.tokens.z_index.get("tooltip"), Some(&2500));
        assert_eq!(
            out.tokens.typography.font_weight.get("normal").map(String::as_str),
            Some("500")
        );
        assert_eq!(out.meta.variant, Variant::HighContrast);
    }

    #[test]
    fn test_high_contrast_enforces_seven_to_one() {
        let out = apply_variant(&light(), "high-contrast", None);
        let c = &out.tokens.colors;
        let ratio = contrast_ratio(&c.foreground, &c.background);
        assert!(ratio >= 7.0, "foreground contrast {ratio}");
    }

    #[test]
    fn test_font_weight_clamped() {
        let mut theme = light();
        theme.tokens.typography.font_weight.insert("black", "900".to_string());
        theme.tokens.typography.font_weight.insert("var", "var(--w)".to_string());
        let out = apply_variant(&theme, "high-contrast", None);
        let weights = &out.tokens.typography.font_weight;
        assert_eq!(weights.get("black").map(String::as_str), Some("900"));
        assert_eq!(weights.get("var").map(String::as_str), Some("var(--w)"));
    }

    #[test]
    fn test_extreme_font_weights_saturate() {
        let mut theme = light();
        let weights = &mut theme.tokens.typography.font_weight;
        weights.insert("huge", i32::MAX.to_string());
        weights.insert("tiny", i32::MIN.to_string());
        let heavier = apply_variant(&theme, "high-contrast", None);
        let weights = &heavier.tokens.typography.font_weight;
        assert_eq!(weights.get("huge").map(String::as_str), Some("900"));
        assert_eq!(weights.get("tiny").map(String::as_str), Some("100"));

        let overrides = VariantOverrides {
            typography: Some(TypographyAdjustments {
                font_weight_adjustment: i32::MIN,
                ..TypographyAdjustments::default()
            }),
            ..VariantOverrides::default()
        };
        let lighter = apply_variant(&theme, "default", Some(&overrides));
        let weights = &lighter.tokens.typography.font_weight;
        assert_eq!(weights.get("huge").map(String::as_str), Some("100"));
        assert_eq!(weights.get("tiny").map(String::as_str), Some("100"));
    }

    #[test]
    fn test_shadow_scaling_with_alpha() {
        let shadows = TokenScale::from([("sm", "0 1px 2px 0 rgba(0, 0, 0, 0.05)")]);
        let out = scale_shadows(
            &shadows,
            ShadowAdjustments {
                intensity_multiplier: 1.5,
                blur_multiplier: 0.5,
            },
        );
        assert_eq!(
            out.get("sm").map(String::as_str),
            Some("0 1.5px 1px 0 rgba(0, 0, 0, 0.075)")
        );
    }

    #[test]
    fn test_shadow_alpha_untouched_for_softer_shadows() {
        let shadows = TokenScale::from([("md", "0 4px 6px -1px rgba(0, 0, 0, 0.1), inset 0 2px 4px #0000001a")]);
        let out = scale_shadows(
            &shadows,
            ShadowAdjustments {
                intensity_multiplier: 1.1,
                blur_multiplier: 1.2,
            },
        );
        assert_eq!(
            out.get("md").map(String::as_str),
            Some("0 4.4px 7.2px -1px rgba(0, 0, 0, 0.1), inset 0 2.2px 4.8px #0000001a")
        );
    }

    #[test]
    fn test_overrides_replace_groups() {
        let overrides = VariantOverrides {
            motion: Some(MotionAdjustments {
                speed_multiplier: 2.0,
                reduce_motion: false,
            }),
            ..VariantOverrides::default()
        };
        let out = apply_variant(&light(), "high-contrast", Some(&overrides));
        assert_eq!(
            out.tokens.motion.duration.get("normal").map(String::as_str),
            Some("150ms")
        );
    }

    #[test]
    fn test_variant_names() {
        assert_eq!("highContrast".parse::<Variant>(), Ok(Variant::HighContrast));
        assert_eq!(Variant::HighContrast.to_string(), "high-contrast");
        assert_eq!(
            serde_json::to_string(&Variant::HighContrast).expect("serialize"),
            "\"high-contrast\""
        );
    }
}
