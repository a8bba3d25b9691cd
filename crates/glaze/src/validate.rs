//! Theme validation.
//!
//! [`validate_theme`] runs every check against a built theme and aggregates the
//! findings into a [`ValidationResult`]. Validation is pure: the same theme
//! and config always yield the same issues in the same order.
//!
//! | Category | Errors | Warnings |
//! |----------|--------|----------|
//! | Color | unparseable colors | low contrast pairs, too many hues |
//! | Typography | missing families/sizes, bad lengths | irregular size ratios |
//! | Spacing | bad lengths | non-monotonic scale |
//! | Motion | bad durations/easings | long durations |
//! | Accessibility | contrast (strict only) | contrast, reduced motion |
//! | Performance | | heavy shadows, too many colors |
//! | Structural | missing categories/palettes | missing name/version |
//! | Custom | per rule | per rule |

use std::collections::HashSet;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::color;
use crate::scale::{self, TextSize, WcagLevel};
use crate::tokens::{BuiltTheme, REQUIRED_PALETTES};
use crate::units;
use crate::variant::Variant;

/// Chroma below this counts as gray for the hue diversity check.
const CHROMATIC_SATURATION: f64 = 0.1;

/// Width of a hue bucket, in degrees.
const HUE_BUCKET_DEGREES: f64 = 10.0;

/// Allowed deviation of a font-size step ratio from the average ratio.
const FONT_RATIO_TOLERANCE: f64 = 0.2;

const EASING_KEYWORDS: [&str; 7] = [
    "linear",
    "ease",
    "ease-in",
    "ease-out",
    "ease-in-out",
    "step-start",
    "step-end",
];

/// The foreground/background pairs checked for contrast.
pub const CONTRAST_PAIRS: [(&str, &str); 6] = [
    ("foreground", "background"),
    ("cardForeground", "card"),
    ("popoverForeground", "popover"),
    ("mutedForeground", "muted"),
    ("accentForeground", "accent"),
    ("foreground", "card"),
];

// -----------------------------------------------------------------------------
// Result types
// -----------------------------------------------------------------------------

/// Issue severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

/// Which check produced an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationCategory {
    Color,
    Typography,
    Spacing,
    Motion,
    Accessibility,
    Performance,
    Structural,
    Custom,
}

impl fmt::Display for ValidationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Color => "color",
            Self::Typography => "typography",
            Self::Spacing => "spacing",
            Self::Motion => "motion",
            Self::Accessibility => "accessibility",
            Self::Performance => "performance",
            Self::Structural => "structural",
            Self::Custom => "custom",
        };
        f.write_str(name)
    }
}

/// One finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub category: ValidationCategory,
    /// Dotted token path, e.g. `colors.primary.500`.
    pub path: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ValidationIssue {
    pub fn new(
        category: ValidationCategory,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            path: path.into(),
            message: message.into(),
            suggestions: Vec::new(),
        }
    }

    /// Adds a remediation hint.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.category, self.path, self.message)
    }
}

/// Aggregated findings. `valid` is true exactly when there are no errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Errors belonging to `category`.
    pub fn errors_in(&self, category: ValidationCategory) -> impl Iterator<Item = &ValidationIssue> {
        self.errors.iter().filter(move |i| i.category == category)
    }

    /// Warnings belonging to `category`.
    pub fn warnings_in(
        &self,
        category: ValidationCategory,
    ) -> impl Iterator<Item = &ValidationIssue> {
        self.warnings.iter().filter(move |i| i.category == category)
    }

    /// Every error message, in report order.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|i| i.message.clone()).collect()
    }
}

// -----------------------------------------------------------------------------
// Config
// -----------------------------------------------------------------------------

/// A user-supplied check. `check` returns true when the theme passes.
#[derive(Clone)]
pub struct CustomRule {
    pub name: String,
    pub severity: Severity,
    pub message: String,
    pub check: Arc<dyn Fn(&BuiltTheme) -> bool + Send + Sync>,
}

impl CustomRule {
    pub fn new<F>(name: impl Into<String>, severity: Severity, message: impl Into<String>, check: F) -> Self
    where
        F: Fn(&BuiltTheme) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            severity,
            message: message.into(),
            check: Arc::new(check),
        }
    }
}

impl fmt::Debug for CustomRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomRule")
            .field("name", &self.name)
            .field("severity", &self.severity)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Thresholds and switches for [`validate_theme`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidationConfig {
    pub wcag_level: WcagLevel,
    pub text_size: TextSize,
    /// Report contrast failures as errors instead of warnings.
    pub strict_accessibility: bool,
    pub max_duration_ms: f64,
    /// Top-level layers allowed in one shadow value.
    pub max_shadow_layers: usize,
    /// Distinct color values allowed across the theme.
    pub max_color_count: usize,
    /// Distinct 10-degree hue buckets allowed among chromatic colors.
    pub hue_bucket_limit: usize,
    #[serde(skip)]
    pub custom_rules: Vec<CustomRule>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            wcag_level: WcagLevel::AA,
            text_size: TextSize::Normal,
            strict_accessibility: false,
            max_duration_ms: 1000.0,
            max_shadow_layers: 3,
            max_color_count: 200,
            hue_bucket_limit: 10,
            custom_rules: Vec::new(),
        }
    }
}

impl ValidationConfig {
    /// Adds a custom rule.
    pub fn with_rule(mut self, rule: CustomRule) -> Self {
        self.custom_rules.push(rule);
        self
    }

    /// Minimum contrast ratio implied by the level and text size.
    pub fn min_contrast(&self) -> f64 {
        self.wcag_level.min_ratio(self.text_size)
    }
}

// -----------------------------------------------------------------------------
// Validation
// -----------------------------------------------------------------------------

#[derive(Default)]
struct Report {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Report {
    fn push(&mut self, severity: Severity, issue: ValidationIssue) {
        match severity {
            Severity::Error => self.errors.push(issue),
            Severity::Warning => self.warnings.push(issue),
        }
    }

    fn error(&mut self, issue: ValidationIssue) {
        self.errors.push(issue);
    }

    fn warning(&mut self, issue: ValidationIssue) {
        self.warnings.push(issue);
    }
}

/// A contrast pair below the configured minimum.
struct ContrastFailure {
    fg: &'static str,
    bg: &'static str,
    ratio: f64,
    background: String,
}

/// Runs every check and aggregates the findings.
pub fn validate_theme(theme: &BuiltTheme, config: &ValidationConfig) -> ValidationResult {
    let mut report = Report::default();

    let failures = check_colors(theme, config, &mut report);
    check_typography(theme, &mut report);
    check_spacing(theme, &mut report);
    check_motion(theme, config, &mut report);
    check_accessibility(theme, config, &failures, &mut report);
    check_performance(theme, config, &mut report);
    check_structure(theme, &mut report);
    check_custom_rules(theme, config, &mut report);

    debug!(
        theme.name = %theme.name(),
        validation.errors = report.errors.len(),
        validation.warnings = report.warnings.len(),
        "Theme validated"
    );

    ValidationResult {
        valid: report.errors.is_empty(),
        errors: report.errors,
        warnings: report.warnings,
    }
}

fn check_colors(
    theme: &BuiltTheme,
    config: &ValidationConfig,
    report: &mut Report,
) -> Vec<ContrastFailure> {
    use ValidationCategory::Color;
    let colors = &theme.tokens.colors;

    for (path, value) in colors.leaves() {
        if !color::is_valid_color(value) {
            report.error(
                ValidationIssue::new(Color, format!("colors.{path}"), format!("Invalid color value '{value}'"))
                    .with_suggestion("Use a hex, rgb(), or hsl() color"),
            );
        }
    }

    let min = config.min_contrast();
    let mut failures = Vec::new();
    for (fg, bg) in CONTRAST_PAIRS {
        let (Some(fg_value), Some(bg_value)) = (colors.surface(fg), colors.surface(bg)) else {
            continue;
        };
        let Some(ratio) = scale::try_contrast_ratio(fg_value, bg_value) else {
            continue;
        };
        if ratio < min {
            report.warning(ValidationIssue::new(
                Color,
                format!("colors.{fg}"),
                format!("Contrast ratio {ratio:.2} between {fg} and {bg} is below {min}"),
            ));
            failures.push(ContrastFailure {
                fg,
                bg,
                ratio,
                background: bg_value.to_string(),
            });
        }
    }

    let mut buckets = HashSet::new();
    let defaults = colors.palettes.values().map(|g| g.default.as_str());
    let surfaces = crate::tokens::SURFACE_COLORS
        .iter()
        .filter_map(|k| colors.surface(k));
    for value in defaults.chain(surfaces) {
        if let Some(hsl) = color::parse_hsl(value) {
            if hsl.s >= CHROMATIC_SATURATION && hsl.l > 0.02 && hsl.l < 0.98 {
                buckets.insert((hsl.h / HUE_BUCKET_DEGREES).floor() as i64);
            }
        }
    }
    if buckets.len() > config.hue_bucket_limit {
        report.warning(
            ValidationIssue::new(
                Color,
                "colors",
                format!(
                    "{} distinct hues in use, more than {}",
                    buckets.len(),
                    config.hue_bucket_limit
                ),
            )
            .with_suggestion("Derive accents from fewer base hues"),
        );
    }

    failures
}

fn check_typography(theme: &BuiltTheme, report: &mut Report) {
    use ValidationCategory::Typography;
    let t = &theme.tokens.typography;

    if t.font_family.is_empty() {
        report.error(ValidationIssue::new(Typography, "typography.fontFamily", "Font family is required"));
    }
    if t.font_size.is_empty() {
        report.error(ValidationIssue::new(Typography, "typography.fontSize", "Font size scale is required"));
    }

    let mut sizes = Vec::new();
    for (key, value) in t.font_size.iter() {
        if !units::is_css_length(value) {
            report.error(
                ValidationIssue::new(
                    Typography,
                    format!("typography.fontSize.{key}"),
                    format!("Font size '{value}' is not a valid CSS length"),
                )
                .with_suggestion("Use a length such as 1rem or 16px"),
            );
            continue;
        }
        if let Some(rem) = units::to_rem(value).filter(|r| *r > 0.0) {
            sizes.push((key, rem));
        }
    }

    let ratios: Vec<(&str, f64)> = sizes
        .windows(2)
        .map(|w| (w[1].0, w[1].1 / w[0].1))
        .collect();
    if ratios.len() >= 2 {
        let average = ratios.iter().map(|(_, r)| r).sum::<f64>() / ratios.len() as f64;
        for (key, ratio) in ratios {
            if (ratio - average).abs() > FONT_RATIO_TOLERANCE {
                report.warning(
                    ValidationIssue::new(
                        Typography,
                        format!("typography.fontSize.{key}"),
                        format!("Size ratio {ratio:.3} deviates from the scale average {average:.3}"),
                    )
                    .with_suggestion("Use a consistent modular scale"),
                );
            }
        }
    }
}

fn check_spacing(theme: &BuiltTheme, report: &mut Report) {
    use ValidationCategory::Spacing;

    let mut previous: Option<f64> = None;
    for (key, value) in theme.tokens.spacing.iter() {
        if !units::is_css_length(value) {
            report.error(ValidationIssue::new(
                Spacing,
                format!("spacing.{key}"),
                format!("Spacing '{value}' is not a valid CSS length"),
            ));
            continue;
        }
        let Some(rem) = units::to_rem(value) else {
            continue;
        };
        if previous.is_some_and(|p| rem < p) {
            report.warning(
                ValidationIssue::new(
                    Spacing,
                    format!("spacing.{key}"),
                    format!("Spacing '{value}' is smaller than the previous step"),
                )
                .with_suggestion("Order spacing steps from smallest to largest"),
            );
        }
        previous = Some(rem);
    }
}

fn is_valid_easing(value: &str) -> bool {
    let value = value.trim();
    if EASING_KEYWORDS.contains(&value) {
        return true;
    }
    let Some(args) = value
        .strip_prefix("cubic-bezier(")
        .and_then(|rest| rest.strip_suffix(')'))
    else {
        return false;
    };
    let numbers: Vec<f64> = args
        .split(',')
        .filter_map(|a| a.trim().parse::<f64>().ok())
        .collect();
    numbers.len() == 4
        && args.split(',').count() == 4
        && (0.0..=1.0).contains(&numbers[0])
        && (0.0..=1.0).contains(&numbers[2])
}

fn check_motion(theme: &BuiltTheme, config: &ValidationConfig, report: &mut Report) {
    use ValidationCategory::Motion;
    let motion = &theme.tokens.motion;

    for (key, value) in motion.duration.iter() {
        match units::parse_duration_ms(value) {
            None => report.error(
                ValidationIssue::new(
                    Motion,
                    format!("motion.duration.{key}"),
                    format!("Duration '{value}' must be a number followed by ms or s"),
                )
                .with_suggestion("Use a value such as 150ms or 0.3s"),
            ),
            Some(ms) if ms > config.max_duration_ms => report.warning(ValidationIssue::new(
                Motion,
                format!("motion.duration.{key}"),
                format!("Duration '{value}' exceeds {}ms", config.max_duration_ms),
            )),
            Some(_) => {}
        }
    }

    for (key, value) in motion.easing.iter() {
        if !is_valid_easing(value) {
            report.error(
                ValidationIssue::new(
                    Motion,
                    format!("motion.easing.{key}"),
                    format!("Easing '{value}' is not a keyword or cubic-bezier()"),
                )
                .with_suggestion("Use ease-in-out or cubic-bezier(0.4, 0, 0.2, 1)"),
            );
        }
    }
}

fn check_accessibility(
    theme: &BuiltTheme,
    config: &ValidationConfig,
    failures: &[ContrastFailure],
    report: &mut Report,
) {
    use ValidationCategory::Accessibility;
    let severity = if config.strict_accessibility {
        Severity::Error
    } else {
        Severity::Warning
    };
    let min = config.min_contrast();

    for failure in failures {
        let readable = scale::readable_foreground(&failure.background);
        report.push(
            severity,
            ValidationIssue::new(
                Accessibility,
                format!("colors.{}", failure.fg),
                format!(
                    "{} on {} fails WCAG {:?} ({:.2} < {min})",
                    failure.fg, failure.bg, config.wcag_level, failure.ratio
                ),
            )
            .with_suggestion(format!("Use {readable} for {}", failure.fg))
            .with_suggestion(format!(
                "Increase the lightness difference between {} and {}",
                failure.fg, failure.bg
            )),
        );
    }

    let high_contrast = theme.meta.variant == Variant::HighContrast;
    if !high_contrast && !failures.is_empty() {
        report.warning(ValidationIssue::new(
            Accessibility,
            "meta.variant",
            "Low contrast pairs found; consider offering the high-contrast variant",
        ));
    }

    let animated = theme
        .tokens
        .motion
        .duration
        .iter()
        .any(|(_, v)| units::parse_duration_ms(v).is_some_and(|ms| ms > 0.0));
    if !high_contrast && animated {
        report.warning(
            ValidationIssue::new(
                Accessibility,
                "motion.duration",
                "Animations have no reduced-motion alternative",
            )
            .with_suggestion("Honor prefers-reduced-motion or offer the high-contrast variant"),
        );
    }
}

fn check_performance(theme: &BuiltTheme, config: &ValidationConfig, report: &mut Report) {
    use ValidationCategory::Performance;

    if let Some(shadows) = &theme.tokens.shadows {
        for (key, value) in shadows.iter() {
            let layers = units::split_top_level(value).len();
            if layers > config.max_shadow_layers {
                report.warning(ValidationIssue::new(
                    Performance,
                    format!("shadows.{key}"),
                    format!("Shadow has {layers} layers, more than {}", config.max_shadow_layers),
                ));
            }
        }
    }

    let distinct: HashSet<String> = theme
        .tokens
        .colors
        .leaves()
        .into_iter()
        .map(|(_, v)| v.trim().to_ascii_lowercase())
        .collect();
    if distinct.len() > config.max_color_count {
        report.warning(ValidationIssue::new(
            Performance,
            "colors",
            format!(
                "{} distinct colors, more than {}",
                distinct.len(),
                config.max_color_count
            ),
        ));
    }
}

fn check_structure(theme: &BuiltTheme, report: &mut Report) {
    use ValidationCategory::Structural;
    let tokens = &theme.tokens;

    let typography_empty = tokens.typography.font_family.is_empty()
        && tokens.typography.font_size.is_empty()
        && tokens.typography.font_weight.is_empty()
        && tokens.typography.line_height.is_empty();
    let motion_empty = tokens.motion.duration.is_empty() && tokens.motion.easing.is_empty();

    let categories = [
        ("colors", tokens.colors.palettes.is_empty()),
        ("typography", typography_empty),
        ("spacing", tokens.spacing.is_empty()),
        ("motion", motion_empty),
        ("breakpoints", tokens.breakpoints.is_empty()),
    ];
    for (name, empty) in categories {
        if empty {
            report.error(ValidationIssue::new(Structural, name, format!("Required category '{name}' is empty")));
        }
    }

    for name in REQUIRED_PALETTES {
        if tokens.colors.palette(name).is_none() {
            report.error(
                ValidationIssue::new(
                    Structural,
                    format!("colors.{name}"),
                    format!("Required palette '{name}' is missing"),
                )
                .with_suggestion(format!("Add a '{name}' palette with a DEFAULT color")),
            );
        }
    }

    if theme.meta.name.is_none() {
        report.warning(ValidationIssue::new(Structural, "meta.name", "Theme has no name"));
    }
    if theme.meta.version.is_none() {
        report.warning(ValidationIssue::new(Structural, "meta.version", "Theme has no version"));
    }
}

fn check_custom_rules(theme: &BuiltTheme, config: &ValidationConfig, report: &mut Report) {
    use ValidationCategory::Custom;

    for rule in &config.custom_rules {
        let path = format!("custom.{}", rule.name);
        match catch_unwind(AssertUnwindSafe(|| (rule.check)(theme))) {
            Ok(true) => {}
            Ok(false) => report.push(rule.severity, ValidationIssue::new(Custom, path, rule.message.clone())),
            Err(_) => {
                warn!(validation.rule = %rule.name, "Custom validation rule panicked");
                report.error(ValidationIssue::new(
                    Custom,
                    path,
                    format!("Custom rule '{}' panicked", rule.name),
                ));
            }
        }
    }
}
