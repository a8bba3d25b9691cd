#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

use glaze::color::parse_hsl;
use glaze::tokens::SCALE_STEPS;
use glaze::{
    BuiltTheme, ColorCustomization, CompositionMode, ConflictResolutionConfig, PaletteCustomization,
    ScaleConfig, ThemeCustomization, ThemeError, ThemePreset, TokenScale, ValidationConfig, Variant,
    apply_variant, compose, contrast_ratio, deserialize_theme, generate_color_scale,
    serialize_theme, validate_theme,
};
use proptest::prelude::*;

fn hex_color() -> impl Strategy<Value = String> {
    (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(r, g, b)| format!("#{r:02x}{g:02x}{b:02x}"))
}

fn preset() -> impl Strategy<Value = ThemePreset> {
    prop::sample::select(ThemePreset::ALL.to_vec())
}

fn base_theme(preset: ThemePreset) -> BuiltTheme {
    BuiltTheme::new(preset.to_tokens(), preset.id())
}

/// A patch touching colors, spacing, and z-index.
fn customization() -> impl Strategy<Value = ThemeCustomization> {
    (
        prop::sample::select(vec!["primary", "secondary", "brand", "info"]),
        hex_color(),
        prop::option::of(hex_color()),
        prop::collection::btree_map("[a-z]{1,6}", 1u32..64, 0..4),
        prop::collection::btree_map("[a-z]{1,6}", 0i64..5000, 0..3),
    )
        .prop_map(|(name, seed, surface, spacing, z)| {
            let mut colors = ColorCustomization::default()
                .with_palette(name, PaletteCustomization::from_default(seed));
            if let Some(bg) = surface {
                colors = colors.with_surface("background", bg);
            }
            let spacing: TokenScale = spacing
                .into_iter()
                .map(|(k, v)| (k, format!("{}rem", f64::from(v) / 4.0)))
                .collect();
            let z_index: TokenScale<i64> = z.into_iter().collect();
            ThemeCustomization {
                colors: Some(colors),
                spacing: (!spacing.is_empty()).then_some(spacing),
                z_index: (!z_index.is_empty()).then_some(z_index),
                ..ThemeCustomization::default()
            }
        })
}

// =============================================================================
// Color scales and contrast
// =============================================================================

proptest! {
    #[test]
    fn scale_has_every_step_with_base_hue(base in hex_color()) {
        let scale = generate_color_scale(&base, &ScaleConfig::default());
        let hsl = parse_hsl(&base).expect("hex parses");
        let steps: Vec<_> = scale.iter().collect();
        prop_assert_eq!(steps.len(), SCALE_STEPS.len());

        let mut previous = f64::INFINITY;
        for (step, color) in steps {
            let c = parse_hsl(color).expect("generated color parses");
            prop_assert!(c.l <= previous + 0.01, "step {} not darker", step);
            previous = c.l;
            if hsl.s > 0.3 && c.s > 0.3 && (0.2..0.8).contains(&c.l) {
                let diff = (c.h - hsl.h).abs();
                prop_assert!(diff.min(360.0 - diff) <= 5.0, "step {} hue drifted", step);
            }
        }
    }

    #[test]
    fn contrast_is_symmetric_and_bounded(a in hex_color(), b in hex_color()) {
        let ab = contrast_ratio(&a, &b);
        let ba = contrast_ratio(&b, &a);
        prop_assert!((ab - ba).abs() < 1e-9);
        prop_assert!((1.0..=21.0 + 1e-9).contains(&ab));
        prop_assert!((contrast_ratio(&a, &a) - 1.0).abs() < 1e-9);
    }
}

// =============================================================================
// Composition
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn override_is_idempotent(p in preset(), patch in customization()) {
        let conflict = ConflictResolutionConfig::default();
        let once = compose(&base_theme(p), &patch, CompositionMode::Override, &conflict);
        let twice = compose(&once, &patch, CompositionMode::Override, &conflict);
        prop_assert_eq!(&once.tokens, &twice.tokens);
        prop_assert_eq!(once.meta.created_at, twice.meta.created_at);
    }

    #[test]
    fn extend_never_changes_existing_values(p in preset(), patch in customization()) {
        let base = base_theme(p);
        let extended = compose(&base, &patch, CompositionMode::Extend, &ConflictResolutionConfig::default());

        for (key, value) in base.tokens.spacing.iter() {
            prop_assert_eq!(extended.tokens.spacing.get(key), Some(value));
        }
        for (key, value) in base.tokens.z_index.iter() {
            prop_assert_eq!(extended.tokens.z_index.get(key), Some(value));
        }
        for (name, group) in &base.tokens.colors.palettes {
            prop_assert_eq!(extended.tokens.colors.palettes.get(name), Some(group));
        }
        prop_assert_eq!(&extended.tokens.colors.background, &base.tokens.colors.background);
    }

    #[test]
    fn composition_timestamps_are_ordered(p in preset(), patch in customization()) {
        let base = base_theme(p);
        let merged = compose(&base, &patch, CompositionMode::Merge, &ConflictResolutionConfig::default());
        prop_assert_eq!(merged.meta.created_at, base.meta.created_at);
        prop_assert!(merged.meta.updated_at >= merged.meta.created_at);
    }

    #[test]
    fn default_variant_leaves_tokens_alone(p in preset(), patch in customization()) {
        let composed = compose(&base_theme(p), &patch, CompositionMode::Merge, &ConflictResolutionConfig::default());
        let varied = apply_variant(&composed, "default", None);
        prop_assert_eq!(&varied.tokens, &composed.tokens);
        prop_assert_eq!(varied.meta.variant, Variant::Default);
    }
}

// =============================================================================
// Persistence and validation
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn checksum_roundtrips_and_detects_edits(p in preset(), patch in customization(), tamper in hex_color()) {
        let theme = compose(&base_theme(p), &patch, CompositionMode::Merge, &ConflictResolutionConfig::default());
        let envelope = serialize_theme(&theme).expect("serialize");
        prop_assert_eq!(&deserialize_theme(&envelope).expect("verify"), &theme);

        let mut edited = envelope.clone();
        prop_assume!(edited.theme.tokens.colors.border != tamper);
        edited.theme.tokens.colors.border = tamper;
        prop_assert!(deserialize_theme(&edited).is_err());
    }

    #[test]
    fn any_checksum_digit_edit_is_rejected(
        p in preset(),
        index in 0usize..8,
        digit in prop::sample::select(b"0123456789abcdef".to_vec()),
    ) {
        let envelope = serialize_theme(&base_theme(p)).expect("serialize");
        let mut bytes = envelope.checksum.clone().into_bytes();
        prop_assert_eq!(bytes.len(), 8);
        prop_assume!(bytes[index] != digit);
        bytes[index] = digit;

        let mut edited = envelope;
        edited.checksum = String::from_utf8(bytes).expect("hex is ascii");
        let is_mismatch = matches!(deserialize_theme(&edited), Err(ThemeError::ChecksumMismatch { .. }));
        prop_assert!(is_mismatch);
    }

    #[test]
    fn validation_is_deterministic(p in preset(), patch in customization()) {
        let theme = compose(&base_theme(p), &patch, CompositionMode::Merge, &ConflictResolutionConfig::default());
        let config = ValidationConfig::default();
        let a = validate_theme(&theme, &config);
        let b = validate_theme(&theme, &config);
        prop_assert_eq!(a.valid, b.valid);
        prop_assert_eq!(a.error_messages(), b.error_messages());
        prop_assert_eq!(a.warnings.len(), b.warnings.len());
        prop_assert_eq!(a.valid, a.errors.is_empty());
    }
}
