//! Integration tests for the build pipeline.
//!
//! Drives `ThemeBuilder` end to end: base resolution, composition, variants,
//! validation, extension hooks, persistence, and CSS output.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use glaze::color::parse_hsl;
use glaze::prelude::*;
use glaze::{SerializedTheme, ThemePreset, ThemeRegistry, ValidationCategory, contrast_ratio};

// ===========================================================================
// Helpers
// ===========================================================================

fn palette(name: &str, seed: &str) -> ColorCustomization {
    ColorCustomization::default().with_palette(name, PaletteCustomization::from_default(seed))
}

/// Routes glaze logs through the test harness; set `RUST_LOG=glaze=debug` to see them.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn lightness(color: &str) -> f64 {
    parse_hsl(color).map(|c| c.l).expect("parseable color")
}

// ===========================================================================
// Composition
// ===========================================================================

#[test]
fn test_primary_seed_generates_full_scale() {
    let mut builder = ThemeBuilder::new().extends("light").with_colors(palette("primary", "#2563eb"));
    let theme = builder.build_sync().expect("build");

    let primary = &theme.tokens.colors.palettes["primary"];
    assert_eq!(primary.default, "#2563eb");
    assert_eq!(primary.scale.iter().count(), 11);
    assert!((lightness(primary.scale.get("50").expect("50")) - 0.95).abs() <= 0.01);
    assert!((lightness(primary.scale.get("500").expect("500")) - 0.50).abs() <= 0.01);
    assert!((lightness(primary.scale.get("950").expect("950")) - 0.05).abs() <= 0.01);
    assert_eq!(primary.foreground, "#ffffff");

    let steps: Vec<f64> = primary.scale.iter().map(|(_, c)| lightness(c)).collect();
    assert!(steps.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_unreadable_foreground_is_repaired() {
    init_logging();
    let colors = ColorCustomization::default()
        .with_surface("foreground", "#777777")
        .with_surface("background", "#888888");
    let mut builder = ThemeBuilder::new().with_colors(colors);
    let theme = builder.build_sync().expect("build");

    assert_eq!(theme.tokens.colors.background, "#888888");
    assert_eq!(theme.tokens.colors.foreground, "#000000");
}

#[test]
fn test_accessibility_pass_can_be_disabled() {
    let colors = ColorCustomization::default()
        .with_surface("foreground", "#777777")
        .with_surface("background", "#888888");
    let conflict = ConflictResolutionConfig {
        preserve_accessibility: false,
        ..ConflictResolutionConfig::default()
    };
    let mut builder = ThemeBuilder::new()
        .with_conflict_resolution(conflict)
        .with_colors(colors);
    let theme = builder.build_sync().expect("build");

    assert_eq!(theme.tokens.colors.foreground, "#777777");
    let validation = builder.last_validation().expect("validated");
    assert!(validation.valid);
    assert!(validation.warnings_in(ValidationCategory::Color).next().is_some());
}

#[test]
fn test_extend_keeps_existing_tokens() {
    let base = ThemePreset::Dark.to_tokens();
    let mut builder = ThemeBuilder::new()
        .extends("dark")
        .with_composition_mode(CompositionMode::Extend)
        .with_spacing(TokenScale::from([("4", "99rem"), ("128", "32rem")]));
    let theme = builder.build_sync().expect("build");

    assert_eq!(theme.tokens.spacing.get("4"), base.spacing.get("4"));
    assert_eq!(theme.tokens.spacing.get("128").map(String::as_str), Some("32rem"));
    assert_eq!(theme.meta.composition_mode, CompositionMode::Extend);
}

#[test]
fn test_customizations_accumulate_later_wins() {
    let mut builder = ThemeBuilder::new()
        .with_spacing(TokenScale::from([("huge", "8rem")]))
        .with_colors(palette("primary", "#16a34a"))
        .with_spacing(TokenScale::from([("huge", "10rem")]));
    let theme = builder.build_sync().expect("build");

    assert_eq!(theme.tokens.spacing.get("huge").map(String::as_str), Some("10rem"));
    assert_eq!(theme.tokens.colors.palettes["primary"].default, "#16a34a");
    let recorded = theme.meta.customizations.spacing.as_ref().expect("recorded");
    assert_eq!(recorded.get("huge").map(String::as_str), Some("10rem"));
}

#[test]
fn test_custom_registry_base() {
    let mut tokens = ThemePreset::Light.to_tokens();
    tokens.colors.background = "#fdf6e3".to_string();
    let registry = ThemeRegistry::with_defaults().with_theme("solarized", tokens);

    let mut builder = ThemeBuilder::new().with_registry(registry).extends("solarized");
    let theme = builder.build_sync().expect("build");
    assert_eq!(theme.meta.base_theme, "solarized");
    assert_eq!(theme.tokens.colors.background, "#fdf6e3");
}

// ===========================================================================
// Variants
// ===========================================================================

#[test]
fn test_high_contrast_removes_motion() {
    let mut builder = ThemeBuilder::new().with_variant("high-contrast");
    let theme = builder.build_sync().expect("build");

    assert_eq!(theme.meta.variant, Variant::HighContrast);
    assert!(theme.tokens.motion.duration.iter().all(|(_, d)| d == "0ms"));
    let ratio = contrast_ratio(&theme.tokens.colors.foreground, &theme.tokens.colors.background);
    assert!(ratio >= 7.0, "ratio {ratio}");
}

#[test]
fn test_compact_shrinks_spacing() {
    let base = ThemePreset::Light.to_tokens();
    let mut builder = ThemeBuilder::new().with_variant("compact");
    let theme = builder.build_sync().expect("build");

    assert_eq!(base.spacing.get("4").map(String::as_str), Some("1rem"));
    assert_eq!(theme.tokens.spacing.get("4").map(String::as_str), Some("0.75rem"));
}

#[test]
fn test_unknown_variant_builds_default() {
    let mut builder = ThemeBuilder::new().with_variant("cozy");
    let theme = builder.build_sync().expect("build");
    assert_eq!(theme.meta.variant, Variant::Default);
    assert_eq!(theme.tokens, ThemePreset::Light.to_tokens());
}

#[test]
fn test_variant_overrides_replace_groups() {
    let overrides: VariantOverrides =
        serde_json::from_str(r#"{"spacing":{"multiplier":2.0}}"#).expect("overrides");
    let mut builder = ThemeBuilder::new()
        .with_variant("compact")
        .with_variant_overrides(overrides);
    let theme = builder.build_sync().expect("build");
    assert_eq!(theme.tokens.spacing.get("4").map(String::as_str), Some("2rem"));
}

// ===========================================================================
// Validation
// ===========================================================================

#[test]
fn test_missing_palette_is_one_structural_error() {
    let mut tokens = ThemePreset::Light.to_tokens();
    tokens.colors.palettes.remove("warning");

    let mut builder = ThemeBuilder::new().extends_tokens(tokens);
    builder.build_sync().expect("build");
    let result = builder.validate(None).expect("validate");

    assert!(!result.valid);
    let structural: Vec<_> = result.errors_in(ValidationCategory::Structural).collect();
    assert_eq!(structural.len(), 1);
    assert_eq!(structural[0].path, "colors.warning");
    assert_eq!(result.errors.len(), 1);
}

#[test]
fn test_strict_build_reports_messages() {
    let mut tokens = ThemePreset::Dark.to_tokens();
    tokens.colors.palettes.remove("success");

    let mut builder = ThemeBuilder::new()
        .with_options(BuilderOptions::default().strict(true))
        .extends_tokens(tokens);
    let err = builder.build_sync().expect_err("strict");
    assert_eq!(
        err.to_string(),
        "Theme validation failed: Required palette 'success' is missing"
    );
}

#[test]
fn test_custom_rule_runs_on_build() {
    let rule = CustomRule::new("named", Severity::Error, "Theme must be named", |t: &BuiltTheme| {
        t.meta.name.is_some()
    });
    let config = ValidationConfig::default().with_rule(rule);

    let mut unnamed = ThemeBuilder::new().with_validation_config(config.clone());
    unnamed.build_sync().expect("build");
    assert!(!unnamed.last_validation().expect("validated").valid);

    let mut named = ThemeBuilder::new().with_validation_config(config).named("Ok");
    named.build_sync().expect("build");
    assert!(named.last_validation().expect("validated").valid);
}

#[test]
fn test_validate_explicit_theme_without_build() {
    let builder = ThemeBuilder::new();
    let theme = BuiltTheme::new(ThemePreset::Dark.to_tokens(), "dark");
    assert!(builder.validate(Some(&theme)).expect("validate").valid);
}

// ===========================================================================
// Extensions
// ===========================================================================

struct Brand {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ThemeExtension for Brand {
    fn name(&self) -> &str {
        "brand"
    }

    async fn before_build(&self, ctx: &HookContext) -> Result<Option<ThemeCustomization>, HookError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(ctx.theme.meta.base_theme, "light");
        Ok(Some(ThemeCustomization {
            colors: Some(palette("primary", "#db2777")),
            ..ThemeCustomization::default()
        }))
    }

    async fn after_build(&self, _ctx: &HookContext) -> Result<Option<ThemeCustomization>, HookError> {
        Ok(Some(ThemeCustomization {
            spacing: Some(TokenScale::from([("gutter", "1.5rem")])),
            ..ThemeCustomization::default()
        }))
    }
}

struct Stalls;

#[async_trait]
impl ThemeExtension for Stalls {
    fn name(&self) -> &str {
        "stalls"
    }

    async fn before_build(&self, _ctx: &HookContext) -> Result<Option<ThemeCustomization>, HookError> {
        tokio::time::sleep(Duration::from_secs(10)).await;
        Ok(None)
    }
}

struct Broken;

#[async_trait]
impl ThemeExtension for Broken {
    fn name(&self) -> &str {
        "broken"
    }

    async fn after_build(&self, _ctx: &HookContext) -> Result<Option<ThemeCustomization>, HookError> {
        Err(HookError::failed("broken", "remote palette unavailable"))
    }
}

struct Gutter;

#[async_trait]
impl ThemeExtension for Gutter {
    fn name(&self) -> &str {
        "gutter"
    }

    async fn after_build(&self, _ctx: &HookContext) -> Result<Option<ThemeCustomization>, HookError> {
        Ok(Some(ThemeCustomization {
            spacing: Some(TokenScale::from([("gutter", "2rem")])),
            ..ThemeCustomization::default()
        }))
    }
}

#[tokio::test]
async fn test_hooks_patch_the_build() {
    init_logging();
    let calls = Arc::new(AtomicUsize::new(0));
    let mut builder = ThemeBuilder::new().with_extension(Brand {
        calls: Arc::clone(&calls),
    });
    let theme = builder.build().await.expect("build");

    assert_eq!(theme.tokens.colors.palettes["primary"].default, "#db2777");
    assert_eq!(theme.tokens.spacing.get("gutter").map(String::as_str), Some("1.5rem"));
    assert_eq!(theme.meta.plugins, ["brand"]);

    builder.build().await.expect("cached");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failing_hooks_do_not_fail_the_build() {
    init_logging();
    let calls = Arc::new(AtomicUsize::new(0));
    let mut builder = ThemeBuilder::new()
        .with_options(BuilderOptions::default().hook_timeout_ms(25))
        .with_extension(Stalls)
        .with_extension(Broken)
        .with_extension(Brand {
            calls: Arc::clone(&calls),
        });
    let theme = builder.build().await.expect("build");

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(theme.tokens.colors.palettes["primary"].default, "#db2777");
    assert_eq!(theme.meta.plugins, ["stalls", "broken", "brand"]);
}

#[tokio::test]
async fn test_after_build_patches_keep_mode_and_get_the_variant() {
    init_logging();
    let mut builder = ThemeBuilder::new()
        .with_composition_mode(CompositionMode::Extend)
        .with_variant("compact")
        .with_extension(Gutter);
    let theme = builder.build().await.expect("build");

    assert_eq!(theme.meta.composition_mode, CompositionMode::Extend);
    assert_eq!(theme.meta.variant, Variant::Compact);
    assert_eq!(theme.tokens.spacing.get("4").map(String::as_str), Some("0.75rem"));
    assert_eq!(theme.tokens.spacing.get("gutter").map(String::as_str), Some("1.5rem"));
}

#[tokio::test]
async fn test_after_build_override_replaces_group() {
    let mut builder = ThemeBuilder::new()
        .with_composition_mode(CompositionMode::Override)
        .with_extension(Gutter);
    let theme = builder.build().await.expect("build");

    assert_eq!(theme.meta.composition_mode, CompositionMode::Override);
    assert_eq!(theme.tokens.spacing.len(), 1);
    assert_eq!(theme.tokens.spacing.get("gutter").map(String::as_str), Some("2rem"));
}

#[tokio::test]
async fn test_build_without_extensions_matches_build_sync() {
    let mut a = ThemeBuilder::new().extends("dark").with_variant("comfortable");
    let mut b = a.clone();
    let async_theme = a.build().await.expect("build");
    let sync_theme = b.build_sync().expect("build");
    assert_eq!(async_theme.tokens, sync_theme.tokens);
}

// ===========================================================================
// Persistence and output
// ===========================================================================

#[test]
fn test_envelope_roundtrip_through_text() {
    let mut builder = ThemeBuilder::new()
        .named("Harbor")
        .versioned("2.1.0")
        .with_colors(palette("secondary", "#0891b2"));
    let theme = builder.build_sync().expect("build");

    let text = builder.serialize(None).expect("serialize").to_json().expect("json");
    let envelope = SerializedTheme::from_json(&text).expect("parse");
    let restored = ThemeBuilder::deserialize(&envelope).expect("restore");

    assert_eq!(restored.last_built(), Some(&theme));
    let css = restored.generate_css_variables(None).expect("css");
    assert_eq!(css["--secondary"], "#0891b2");
}

#[test]
fn test_restored_variant_is_not_applied_twice() {
    let mut builder = ThemeBuilder::new().with_variant("compact");
    builder.build_sync().expect("build");
    let envelope = builder.serialize(None).expect("serialize");

    let mut same = ThemeBuilder::deserialize(&envelope)
        .expect("restore")
        .with_variant("compact");
    let theme = same.build_sync().expect("rebuild");
    assert_eq!(theme.meta.variant, Variant::Compact);
    assert_eq!(theme.tokens.spacing.get("4").map(String::as_str), Some("0.75rem"));

    let mut renamed = ThemeBuilder::deserialize(&envelope).expect("restore").named("Dense");
    let theme = renamed.build_sync().expect("rebuild");
    assert_eq!(theme.meta.variant, Variant::Compact);
    assert_eq!(theme.tokens.spacing.get("4").map(String::as_str), Some("0.75rem"));

    let mut roomier = ThemeBuilder::deserialize(&envelope)
        .expect("restore")
        .with_variant("comfortable");
    let theme = roomier.build_sync().expect("rebuild");
    assert_eq!(theme.meta.variant, Variant::Comfortable);
    assert_eq!(theme.tokens.spacing.get("4").map(String::as_str), Some("0.9375rem"));
}

#[test]
fn test_edited_checksum_rejected() {
    let mut builder = ThemeBuilder::new();
    builder.build_sync().expect("build");
    let mut envelope = builder.serialize(None).expect("serialize");
    let first = if envelope.checksum.starts_with('0') { "1" } else { "0" };
    envelope.checksum.replace_range(0..1, first);

    let err = ThemeBuilder::deserialize(&envelope).expect_err("edited checksum");
    assert!(matches!(err, ThemeError::ChecksumMismatch { .. }));
}

#[test]
fn test_tampered_envelope_rejected() {
    let mut builder = ThemeBuilder::new();
    builder.build_sync().expect("build");
    let mut envelope = builder.serialize(None).expect("serialize");
    if let Some(primary) = envelope.theme.tokens.colors.palettes.get_mut("primary") {
        primary.default = "#ff0000".to_string();
    }

    let err = ThemeBuilder::deserialize(&envelope).expect_err("tampered");
    assert!(err.is_integrity_error());
}

#[test]
fn test_css_variables_follow_variant() {
    let mut builder = ThemeBuilder::new().with_variant("compact");
    builder.build_sync().expect("build");
    let css = builder.generate_css_variables(None).expect("css");

    assert_eq!(css["--spacing-4"], "0.75rem");
    assert!(css.keys().all(|k| k.starts_with("--")));
    assert!(!css.keys().any(|k| k.contains("DEFAULT")));
}
