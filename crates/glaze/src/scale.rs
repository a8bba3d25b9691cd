//! Color scale generation and contrast math.
//!
//! One base color expands into an 11-step lightness scale plus the contextual
//! roles of a [`SemanticColorGroup`]. Contrast uses HSL lightness rather than
//! WCAG relative luminance; it is an approximation, but every threshold in the
//! engine is calibrated against it.

use serde::{Deserialize, Serialize};

use crate::color::{self, Hsla};
use crate::tokens::{ColorScale, SCALE_STEPS, SemanticColorGroup};

/// Target lightness (percent) for each step, lightest first.
pub const STEP_LIGHTNESS: [f64; 11] = [95.0, 90.0, 80.0, 70.0, 60.0, 50.0, 40.0, 30.0, 20.0, 10.0, 5.0];

/// How saturation falls off toward the ends of the scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SaturationCurve {
    /// Saturation is kept at every step.
    Linear,
    /// Linear falloff away from mid lightness.
    EaseIn,
    /// Quadratic falloff: mid tones stay saturated, extremes wash out.
    #[default]
    EaseOut,
    /// Smoothstep falloff.
    EaseInOut,
}

impl SaturationCurve {
    /// Saturation factor in `[0.3, 1.0]` for a lightness in `[0, 1]`.
    pub fn factor(self, lightness: f64) -> f64 {
        let d = (2.0 * (lightness - 0.5).abs()).clamp(0.0, 1.0);
        let falloff = match self {
            Self::Linear => return 1.0,
            Self::EaseIn => d,
            Self::EaseOut => d * d,
            Self::EaseInOut => d * d * (3.0 - 2.0 * d),
        };
        0.3 + 0.7 * (1.0 - falloff)
    }
}

/// Parameters for [`generate_color_scale`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScaleConfig {
    /// Lowest lightness any step may reach, in percent.
    pub min_lightness: f64,
    /// Highest lightness any step may reach, in percent.
    pub max_lightness: f64,
    pub saturation_curve: SaturationCurve,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            min_lightness: 5.0,
            max_lightness: 95.0,
            saturation_curve: SaturationCurve::EaseOut,
        }
    }
}

/// Expands one base color into the 11-step scale.
///
/// The base hue is kept at every step. When `base` does not parse, every step
/// is the original string.
///
/// # Example
///
/// ```rust
/// use glaze::scale::{ScaleConfig, generate_color_scale};
///
/// let scale = generate_color_scale("#2563eb", &ScaleConfig::default());
/// assert_eq!(scale.iter().count(), 11);
/// ```
pub fn generate_color_scale(base: &str, config: &ScaleConfig) -> ColorScale {
    let Some(hsl) = color::parse_hsl(base) else {
        return ColorScale::uniform(base);
    };

    let lo = config.min_lightness.min(config.max_lightness);
    let hi = config.max_lightness.max(config.min_lightness);

    let steps = std::array::from_fn(|i| {
        let l = STEP_LIGHTNESS[i].clamp(lo, hi) / 100.0;
        let s = hsl.s * config.saturation_curve.factor(l);
        Hsla { h: hsl.h, s, l, a: hsl.a }.to_rgba().to_css()
    });
    ColorScale::from_steps(steps)
}

/// Contextual roles derived from a base color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticVariants {
    pub foreground: String,
    pub background: String,
    pub border: String,
    pub muted: String,
    pub accent: String,
}

/// Derives the contextual roles of a palette from its base color.
pub fn generate_semantic_colors(base: &str) -> SemanticVariants {
    SemanticVariants {
        background: color::desaturate(&color::lighten(base, 0.4), 0.2),
        foreground: readable_foreground(base).to_string(),
        border: color::desaturate(&color::lighten(base, 0.2), 0.1),
        muted: color::desaturate(&color::lighten(base, 0.3), 0.3),
        accent: color::saturate(base, 0.1),
    }
}

/// `#ffffff` on perceptually dark colors, `#000000` otherwise.
///
/// Unparseable input counts as light.
pub fn readable_foreground(background: &str) -> &'static str {
    match color::parse_color(background) {
        Some(c) if c.is_dark() => "#ffffff",
        _ => "#000000",
    }
}

/// Generates a complete palette whose `DEFAULT` is step `500`.
pub fn semantic_group(base: &str, config: &ScaleConfig) -> SemanticColorGroup {
    let scale = generate_color_scale(base, config);
    let variants = generate_semantic_colors(base);
    let default = scale.get(SCALE_STEPS[5]).unwrap_or(base).to_string();
    SemanticColorGroup {
        scale,
        default,
        foreground: variants.foreground,
        background: variants.background,
        border: variants.border,
        muted: variants.muted,
        accent: variants.accent,
    }
}

// -----------------------------------------------------------------------------
// Contrast
// -----------------------------------------------------------------------------

/// WCAG conformance level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WcagLevel {
    #[default]
    AA,
    AAA,
}

/// Text size class for WCAG thresholds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextSize {
    #[default]
    Normal,
    Large,
}

impl WcagLevel {
    /// Minimum contrast ratio for this level and text size.
    pub const fn min_ratio(self, size: TextSize) -> f64 {
        match (self, size) {
            (Self::AA, TextSize::Normal) => 4.5,
            (Self::AA, TextSize::Large) => 3.0,
            (Self::AAA, TextSize::Normal) => 7.0,
            (Self::AAA, TextSize::Large) => 4.5,
        }
    }
}

/// Contrast ratio in `[1, 21]`, or `None` when either color fails to parse.
pub fn try_contrast_ratio(a: &str, b: &str) -> Option<f64> {
    let la = color::parse_hsl(a)?.l;
    let lb = color::parse_hsl(b)?.l;
    let (hi, lo) = if la >= lb { (la, lb) } else { (lb, la) };
    Some((hi + 0.05) / (lo + 0.05))
}

/// Contrast ratio, falling back to `1.0` when either color fails to parse.
pub fn contrast_ratio(a: &str, b: &str) -> f64 {
    try_contrast_ratio(a, b).unwrap_or(1.0)
}

/// Whether `fg` on `bg` meets the given level. False when either color is invalid.
pub fn is_accessible(fg: &str, bg: &str, level: WcagLevel, size: TextSize) -> bool {
    try_contrast_ratio(fg, bg).is_some_and(|ratio| ratio >= level.min_ratio(size))
}
