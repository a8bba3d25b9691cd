#![forbid(unsafe_code)]
// Allow these clippy lints for builder ergonomics and color math
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::float_cmp)]
#![allow(clippy::suboptimal_flops)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::struct_field_names)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::enum_glob_use)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::similar_names)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::items_after_test_module)]

//! # Glaze
//!
//! Design-token themes, composed and checked.
//!
//! Glaze takes a base theme (a complete set of color, typography, spacing,
//! motion, breakpoint, radius, shadow, and z-index tokens), layers partial
//! customizations over it, applies a density or contrast variant, and
//! validates the result for well-formed values and readable contrast.
//!
//! - **Color scales**: one seed color becomes an 11-step `50..950` scale.
//! - **Composition**: `merge`, `override`, or `extend` a base with a patch,
//!   resolving color conflicts and repairing unreadable foregrounds.
//! - **Variants**: `compact`, `comfortable`, and `high-contrast` rescale
//!   spacing, type, motion, and shadows.
//! - **Validation**: categorized errors and warnings, WCAG contrast checks,
//!   and caller-defined rules.
//! - **Extensions**: async hooks before and after a build, each bounded by a
//!   timeout.
//! - **Persistence**: checksummed JSON envelopes and CSS custom properties.
//!
//! ## Quick Start
//!
//! ```rust
//! use glaze::{ColorCustomization, PaletteCustomization, ThemeBuilder};
//!
//! let mut builder = ThemeBuilder::new()
//!     .extends("light")
//!     .named("Ocean")
//!     .with_colors(
//!         ColorCustomization::default()
//!             .with_palette("primary", PaletteCustomization::from_default("#2563eb")),
//!     );
//!
//! let theme = builder.build_sync().unwrap();
//! assert_eq!(theme.name(), "Ocean");
//! assert!(builder.last_validation().unwrap().valid);
//! ```
//!
//! ## Color Utilities
//!
//! ```rust
//! use glaze::{contrast_ratio, generate_color_scale, ScaleConfig};
//!
//! let scale = generate_color_scale("#2563eb", &ScaleConfig::default());
//! assert_eq!(scale.iter().count(), 11);
//! assert!(contrast_ratio("#000000", "#ffffff") > 20.0);
//! ```

pub mod builder;
pub mod color;
pub mod compose;
pub mod config;
pub mod error;
pub mod extension;
pub mod output;
pub mod presets;
pub mod registry;
pub mod scale;
pub mod serialize;
pub mod tokens;
pub mod units;
pub mod validate;
pub mod variant;

pub use builder::ThemeBuilder;
pub use color::{Hsla, Rgba, darken, desaturate, is_valid_color, lighten, mix, parse_color, saturate};
pub use compose::{
    CompositionMode, ConflictResolutionConfig, ConflictStrategy, compose, ensure_accessible_colors,
};
pub use config::{BuilderOptions, ConfigFile};
pub use error::{ConfigError, HookError, Result, ThemeError};
pub use extension::{HookContext, HookPhase, ThemeExtension};
pub use output::generate_css_variables;
pub use presets::ThemePreset;
pub use registry::ThemeRegistry;
pub use scale::{
    SaturationCurve, ScaleConfig, SemanticVariants, TextSize, WcagLevel, contrast_ratio,
    generate_color_scale, generate_semantic_colors, is_accessible,
};
pub use serialize::{SerializedTheme, compute_checksum, deserialize_theme, serialize_theme};
pub use tokens::{
    BuiltTheme, ColorCustomization, ColorScale, ColorTokens, MotionCustomization, MotionTokens,
    PaletteCustomization, RadiusTokens, SemanticColorGroup, ThemeCustomization, ThemeMeta,
    ThemeTokens, TokenScale, TypographyCustomization, TypographyTokens,
};
pub use validate::{
    CustomRule, Severity, ValidationCategory, ValidationConfig, ValidationIssue, ValidationResult,
    validate_theme,
};
pub use variant::{Variant, VariantOverrides, VariantProfile, apply_variant};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::builder::ThemeBuilder;
    pub use crate::compose::{CompositionMode, ConflictResolutionConfig, ConflictStrategy};
    pub use crate::config::{BuilderOptions, ConfigFile};
    pub use crate::error::{HookError, ThemeError};
    pub use crate::extension::{HookContext, ThemeExtension};
    pub use crate::tokens::{
        BuiltTheme, ColorCustomization, PaletteCustomization, ThemeCustomization, TokenScale,
    };
    pub use crate::validate::{CustomRule, Severity, ValidationConfig, ValidationResult};
    pub use crate::variant::{Variant, VariantOverrides};
}
