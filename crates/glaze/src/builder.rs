//! Fluent theme builder.
//!
//! [`ThemeBuilder`] collects a base, customizations, a variant, and settings,
//! then runs the pipeline:
//!
//! ```text
//! base tokens -> compose customizations -> variant -> stamp meta -> validate
//! ```
//!
//! [`build_sync`](ThemeBuilder::build_sync) runs it directly.
//! [`build`](ThemeBuilder::build) also runs extension hooks before composition
//! and after the variant. The result is cached until the builder changes.
//!
//! # Example
//!
//! ```rust
//! use glaze::{ColorCustomization, PaletteCustomization, ThemeBuilder};
//!
//! let mut builder = ThemeBuilder::new()
//!     .extends("dark")
//!     .named("Midnight")
//!     .with_colors(
//!         ColorCustomization::default()
//!             .with_palette("primary", PaletteCustomization::from_default("#7c3aed")),
//!     )
//!     .with_variant("compact");
//!
//! let theme = builder.build_sync().unwrap();
//! assert_eq!(theme.meta.base_theme, "dark");
//! let vars = builder.generate_css_variables(None).unwrap();
//! assert!(vars.contains_key("--primary-500"));
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use tracing::{debug, info, trace};

use crate::compose::{CompositionMode, ConflictResolutionConfig, compose};
use crate::config::BuilderOptions;
use crate::error::{Result, ThemeError};
use crate::extension::{HookContext, HookPhase, ThemeExtension, run_phase};
use crate::output;
use crate::registry::ThemeRegistry;
use crate::serialize::{self, SerializedTheme};
use crate::tokens::{
    BuiltTheme, ColorCustomization, MotionCustomization, RadiusTokens, ThemeCustomization,
    ThemeMeta, ThemeTokens, TokenScale, TypographyCustomization,
};
use crate::validate::{ValidationConfig, ValidationResult, validate_theme};
use crate::variant::{Variant, VariantOverrides, apply_variant};

static DEFAULT_REGISTRY: LazyLock<Arc<ThemeRegistry>> =
    LazyLock::new(|| Arc::new(ThemeRegistry::with_defaults()));

/// Where a build starts from.
#[derive(Clone)]
enum BaseSource {
    /// A registry entry; `None` means `options.default_base`.
    Named(Option<String>),
    /// Caller-supplied tokens.
    Tokens { id: String, tokens: Box<ThemeTokens> },
    /// A previously built theme, metadata included.
    Restored(Box<BuiltTheme>),
}

/// Consuming, cloneable theme builder.
#[derive(Clone)]
pub struct ThemeBuilder {
    registry: Arc<ThemeRegistry>,
    base: BaseSource,
    name: Option<String>,
    version: Option<String>,
    customizations: ThemeCustomization,
    variant: String,
    variant_overrides: Option<VariantOverrides>,
    mode: CompositionMode,
    conflict: ConflictResolutionConfig,
    options: BuilderOptions,
    validation: ValidationConfig,
    extensions: Vec<Arc<dyn ThemeExtension>>,
    last_built: Option<BuiltTheme>,
    last_validation: Option<ValidationResult>,
}

impl fmt::Debug for ThemeBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base = match &self.base {
            BaseSource::Named(name) => name.as_deref().unwrap_or(&self.options.default_base),
            BaseSource::Tokens { id, .. } => id.as_str(),
            BaseSource::Restored(theme) => theme.meta.base_theme.as_str(),
        };
        let extensions: Vec<&str> = self.extensions.iter().map(|e| e.name()).collect();
        f.debug_struct("ThemeBuilder")
            .field("base", &base)
            .field("name", &self.name)
            .field("version", &self.version)
            .field("customizations", &self.customizations)
            .field("variant", &self.variant)
            .field("mode", &self.mode)
            .field("conflict", &self.conflict)
            .field("options", &self.options)
            .field("extensions", &extensions)
            .field("cached", &self.last_built.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for ThemeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ThemeBuilder {
    /// A builder on the default base with no customizations.
    pub fn new() -> Self {
        Self {
            registry: Arc::clone(&DEFAULT_REGISTRY),
            base: BaseSource::Named(None),
            name: None,
            version: None,
            customizations: ThemeCustomization::default(),
            variant: Variant::Default.as_str().to_string(),
            variant_overrides: None,
            mode: CompositionMode::default(),
            conflict: ConflictResolutionConfig::default(),
            options: BuilderOptions::default(),
            validation: ValidationConfig::default(),
            extensions: Vec::new(),
            last_built: None,
            last_validation: None,
        }
    }

    fn invalidate(mut self) -> Self {
        if self.last_built.take().is_some() {
            trace!("theme_builder cache invalidated");
        }
        self.last_validation = None;
        self
    }

    fn customize(mut self, patch: &ThemeCustomization) -> Self {
        self.customizations.merge(patch);
        self.invalidate()
    }

    // -------------------------------------------------------------------------
    // Base and settings
    // -------------------------------------------------------------------------

    /// Starts from a registered base theme.
    pub fn extends(mut self, name: impl Into<String>) -> Self {
        self.base = BaseSource::Named(Some(name.into()));
        self.invalidate()
    }

    /// Starts from caller-supplied tokens, recorded as base `"custom"`.
    pub fn extends_tokens(mut self, tokens: ThemeTokens) -> Self {
        self.base = BaseSource::Tokens {
            id: "custom".to_string(),
            tokens: Box::new(tokens),
        };
        self.invalidate()
    }

    /// Uses `registry` to resolve base names.
    pub fn with_registry(mut self, registry: impl Into<Arc<ThemeRegistry>>) -> Self {
        self.registry = registry.into();
        self.invalidate()
    }

    /// Sets `meta.name`.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self.invalidate()
    }

    /// Sets `meta.version`.
    pub fn versioned(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self.invalidate()
    }

    /// Selects a variant by name. Unknown names build as `default`.
    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = variant.into();
        self.invalidate()
    }

    /// Replaces groups of the selected variant's profile.
    pub fn with_variant_overrides(mut self, overrides: VariantOverrides) -> Self {
        self.variant_overrides = Some(overrides);
        self.invalidate()
    }

    pub fn with_composition_mode(mut self, mode: CompositionMode) -> Self {
        self.mode = mode;
        self.invalidate()
    }

    pub fn with_conflict_resolution(mut self, conflict: ConflictResolutionConfig) -> Self {
        self.conflict = conflict;
        self.invalidate()
    }

    pub fn with_options(mut self, options: BuilderOptions) -> Self {
        self.options = options;
        self.invalidate()
    }

    pub fn with_validation_config(mut self, config: ValidationConfig) -> Self {
        self.validation = config;
        self.invalidate()
    }

    /// Registers an extension. Hooks run in registration order during [`build`](Self::build).
    pub fn with_extension(mut self, extension: impl ThemeExtension + 'static) -> Self {
        self.extensions.push(Arc::new(extension));
        self.invalidate()
    }

    // -------------------------------------------------------------------------
    // Customizations
    // -------------------------------------------------------------------------

    /// Folds a whole patch into the accumulated customizations; later calls win.
    pub fn with_customizations(self, patch: ThemeCustomization) -> Self {
        self.customize(&patch)
    }

    pub fn with_colors(self, colors: ColorCustomization) -> Self {
        self.customize(&ThemeCustomization {
            colors: Some(colors),
            ..ThemeCustomization::default()
        })
    }

    pub fn with_typography(self, typography: TypographyCustomization) -> Self {
        self.customize(&ThemeCustomization {
            typography: Some(typography),
            ..ThemeCustomization::default()
        })
    }

    pub fn with_spacing(self, spacing: TokenScale) -> Self {
        self.customize(&ThemeCustomization {
            spacing: Some(spacing),
            ..ThemeCustomization::default()
        })
    }

    pub fn with_motion(self, motion: MotionCustomization) -> Self {
        self.customize(&ThemeCustomization {
            motion: Some(motion),
            ..ThemeCustomization::default()
        })
    }

    pub fn with_breakpoints(self, breakpoints: TokenScale) -> Self {
        self.customize(&ThemeCustomization {
            breakpoints: Some(breakpoints),
            ..ThemeCustomization::default()
        })
    }

    pub fn with_radius(self, radius: RadiusTokens) -> Self {
        self.customize(&ThemeCustomization {
            radius: Some(radius),
            ..ThemeCustomization::default()
        })
    }

    pub fn with_shadows(self, shadows: TokenScale) -> Self {
        self.customize(&ThemeCustomization {
            shadows: Some(shadows),
            ..ThemeCustomization::default()
        })
    }

    pub fn with_z_index(self, z_index: TokenScale<i64>) -> Self {
        self.customize(&ThemeCustomization {
            z_index: Some(z_index),
            ..ThemeCustomization::default()
        })
    }

    pub fn with_animations(self, animations: serde_json::Value) -> Self {
        self.customize(&ThemeCustomization {
            animations: Some(animations),
            ..ThemeCustomization::default()
        })
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// The accumulated customizations.
    pub fn customizations(&self) -> &ThemeCustomization {
        &self.customizations
    }

    pub fn options(&self) -> &BuilderOptions {
        &self.options
    }

    /// The most recent successful build, if still current.
    pub fn last_built(&self) -> Option<&BuiltTheme> {
        self.last_built.as_ref()
    }

    /// Validation of the most recent build, if it was validated.
    pub fn last_validation(&self) -> Option<&ValidationResult> {
        self.last_validation.as_ref()
    }

    // -------------------------------------------------------------------------
    // Pipeline
    // -------------------------------------------------------------------------

    /// Builds the theme without running extension hooks.
    ///
    /// # Errors
    /// Returns `ThemeError::ValidationFailed` in strict mode when validation
    /// reports errors.
    pub fn build_sync(&mut self) -> Result<BuiltTheme> {
        if let Some(theme) = &self.last_built {
            trace!(theme.name = %theme.name(), "theme_builder cache hit");
            return Ok(theme.clone());
        }

        let base = self.instantiate();
        let composed = self.compose_onto(&base, &self.customizations);
        let varied = self.apply_variant(&composed);
        self.finish(varied)
    }

    /// Builds the theme, running `before_build` and `after_build` hooks.
    ///
    /// `before_build` patches join the accumulated customizations.
    /// `after_build` hooks see the composed theme; their patches are composed
    /// with the builder's mode before the variant is applied.
    /// Hooks run sequentially, each bounded by `options.hook_timeout_ms`.
    /// Failing hooks are logged and skipped.
    ///
    /// # Errors
    /// Returns `ThemeError::ValidationFailed` in strict mode when validation
    /// reports errors.
    pub async fn build(&mut self) -> Result<BuiltTheme> {
        if self.extensions.is_empty() || self.last_built.is_some() {
            return self.build_sync();
        }

        let timeout = Duration::from_millis(self.options.hook_timeout_ms);
        let base = self.instantiate();

        let before = HookContext {
            phase: HookPhase::BeforeBuild,
            theme: base.clone(),
            customizations: self.customizations.clone(),
        };
        let mut customizations = self.customizations.clone();
        for patch in run_phase(&self.extensions, &before, timeout).await {
            customizations.merge(&patch);
        }

        let mut composed = self.compose_onto(&base, &customizations);
        let after = HookContext {
            phase: HookPhase::AfterBuild,
            theme: composed.clone(),
            customizations,
        };
        for patch in run_phase(&self.extensions, &after, timeout).await {
            composed = compose(&composed, &patch, self.mode, &self.conflict);
        }

        let mut theme = self.apply_variant(&composed);
        for extension in &self.extensions {
            let name = extension.name().to_string();
            if !theme.meta.plugins.contains(&name) {
                theme.meta.plugins.push(name);
            }
        }
        self.finish(theme)
    }

    fn instantiate(&self) -> BuiltTheme {
        match &self.base {
            BaseSource::Named(name) => {
                let requested = name.as_deref().unwrap_or(&self.options.default_base);
                let (id, tokens) = self.registry.resolve(requested, &self.options.default_base);
                BuiltTheme::new(tokens, id)
            }
            BaseSource::Tokens { id, tokens } => BuiltTheme::new((**tokens).clone(), id.clone()),
            BaseSource::Restored(theme) => {
                let mut theme = (**theme).clone();
                theme.meta.touch();
                theme
            }
        }
    }

    fn compose_onto(&self, base: &BuiltTheme, customizations: &ThemeCustomization) -> BuiltTheme {
        if customizations.is_empty() {
            let mut theme = base.clone();
            theme.meta.composition_mode = self.mode;
            return theme;
        }
        compose(base, customizations, self.mode, &self.conflict)
    }

    /// Applies the requested variant unless `theme` already carries it.
    fn apply_variant(&self, theme: &BuiltTheme) -> BuiltTheme {
        let current = Variant::from_name(&self.variant) == theme.meta.variant;
        let overrides = self.variant_overrides.as_ref().filter(|o| !o.is_empty());
        if current && overrides.is_none() {
            return theme.clone();
        }
        apply_variant(theme, &self.variant, overrides)
    }

    fn finish(&mut self, mut theme: BuiltTheme) -> Result<BuiltTheme> {
        stamp_meta(&mut theme.meta, self.name.as_deref(), self.version.as_deref());

        let validation = (self.options.validate_on_build || self.options.strict)
            .then(|| validate_theme(&theme, &self.validation));

        if let Some(result) = &validation {
            if self.options.strict && !result.valid {
                return Err(ThemeError::validation_failed(result.error_messages()));
            }
            debug!(
                theme.name = %theme.name(),
                validation.valid = result.valid,
                validation.warnings = result.warnings.len(),
                "Build validated"
            );
        }

        info!(
            theme.name = %theme.name(),
            theme.base = %theme.meta.base_theme,
            theme.variant = %theme.meta.variant,
            theme.composition_mode = %theme.meta.composition_mode,
            "Theme built"
        );

        self.last_validation = validation;
        self.last_built = Some(theme.clone());
        Ok(theme)
    }

    // -------------------------------------------------------------------------
    // Consumers
    // -------------------------------------------------------------------------

    fn resolve<'a>(&'a self, theme: Option<&'a BuiltTheme>) -> Result<&'a BuiltTheme> {
        theme.or(self.last_built.as_ref()).ok_or(ThemeError::NotBuilt)
    }

    /// Validates `theme`, or the cached build when `None`.
    ///
    /// # Errors
    /// Returns `ThemeError::NotBuilt` when there is nothing to validate.
    pub fn validate(&self, theme: Option<&BuiltTheme>) -> Result<ValidationResult> {
        Ok(validate_theme(self.resolve(theme)?, &self.validation))
    }

    /// Wraps `theme`, or the cached build, in a checksummed envelope.
    ///
    /// # Errors
    /// Returns `ThemeError::NotBuilt` when there is nothing to serialize.
    pub fn serialize(&self, theme: Option<&BuiltTheme>) -> Result<SerializedTheme> {
        serialize::serialize_theme(self.resolve(theme)?)
    }

    /// CSS custom properties for `theme`, or the cached build.
    ///
    /// # Errors
    /// Returns `ThemeError::NotBuilt` when there is nothing to flatten.
    pub fn generate_css_variables(
        &self,
        theme: Option<&BuiltTheme>,
    ) -> Result<BTreeMap<String, String>> {
        Ok(output::generate_css_variables(self.resolve(theme)?))
    }

    /// Restores a builder from an envelope.
    ///
    /// The restored theme becomes both the base and the cached build, so
    /// `last_built` is available immediately and further customizations
    /// compose on top of it. The variant is seeded from the theme, so asking
    /// for the same variant again leaves the tokens alone; a different one is
    /// applied on top of the already varied tokens.
    ///
    /// # Errors
    /// Returns `ThemeError::ChecksumMismatch` when the envelope was altered.
    pub fn deserialize(data: &SerializedTheme) -> Result<Self> {
        let theme = serialize::deserialize_theme(data)?;
        debug!(
            theme.name = %theme.name(),
            theme.version = %data.version,
            "Theme restored from envelope"
        );
        let mut builder = Self::new();
        builder.name.clone_from(&theme.meta.name);
        builder.version.clone_from(&theme.meta.version);
        builder.mode = theme.meta.composition_mode;
        builder.variant = theme.meta.variant.as_str().to_string();
        builder.base = BaseSource::Restored(Box::new(theme.clone()));
        builder.last_built = Some(theme);
        Ok(builder)
    }
}

fn stamp_meta(meta: &mut ThemeMeta, name: Option<&str>, version: Option<&str>) {
    if let Some(name) = name {
        meta.name = Some(name.to_string());
    }
    if let Some(version) = version {
        meta.version = Some(version.to_string());
    }
    meta.touch();
}
