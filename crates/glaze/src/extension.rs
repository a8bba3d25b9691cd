//! Extension hooks.
//!
//! Extensions observe a build at two points and may contribute patches:
//!
//! - `before_build` sees the base theme and the accumulated customizations.
//!   Its patch is folded into the customizations before composition.
//! - `after_build` sees the composed, variant-adjusted theme. Its patch is
//!   merged onto that theme.
//!
//! Hooks run one at a time in registration order, each bounded by a timeout.
//! A hook that fails, times out, or panics is logged and skipped; the build
//! carries on without its patch.
//!
//! ```rust,ignore
//! struct BrandColors;
//!
//! #[async_trait::async_trait]
//! impl ThemeExtension for BrandColors {
//!     fn name(&self) -> &str {
//!         "brand-colors"
//!     }
//!
//!     async fn before_build(&self, _ctx: &HookContext) -> Result<Option<ThemeCustomization>, HookError> {
//!         Ok(Some(brand_patch()))
//!     }
//! }
//! ```

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use tracing::{debug, warn};

use crate::error::HookError;
use crate::tokens::{BuiltTheme, ThemeCustomization};

/// Where in the build a hook runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPhase {
    BeforeBuild,
    AfterBuild,
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BeforeBuild => f.write_str("before_build"),
            Self::AfterBuild => f.write_str("after_build"),
        }
    }
}

/// What a hook gets to look at.
#[derive(Debug, Clone)]
pub struct HookContext {
    pub phase: HookPhase,
    /// The base theme before the build, or the built theme after it.
    pub theme: BuiltTheme,
    /// Customizations accumulated on the builder so far.
    pub customizations: ThemeCustomization,
}

/// A plugin that participates in theme builds.
#[async_trait]
pub trait ThemeExtension: Send + Sync {
    /// Identifier recorded in `meta.plugins` and in logs.
    fn name(&self) -> &str;

    async fn before_build(
        &self,
        _ctx: &HookContext,
    ) -> Result<Option<ThemeCustomization>, HookError> {
        Ok(None)
    }

    async fn after_build(
        &self,
        _ctx: &HookContext,
    ) -> Result<Option<ThemeCustomization>, HookError> {
        Ok(None)
    }
}

/// Runs one hook of one extension under `timeout`.
pub async fn run_hook(
    extension: &dyn ThemeExtension,
    ctx: &HookContext,
    timeout: Duration,
) -> Result<Option<ThemeCustomization>, HookError> {
    let name = extension.name().to_string();
    let call = match ctx.phase {
        HookPhase::BeforeBuild => extension.before_build(ctx),
        HookPhase::AfterBuild => extension.after_build(ctx),
    };

    match tokio::time::timeout(timeout, AssertUnwindSafe(call).catch_unwind()).await {
        Ok(Ok(result)) => result,
        Ok(Err(_)) => Err(HookError::Panicked { extension: name }),
        Err(_) => Err(HookError::TimedOut {
            extension: name,
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}

/// Runs every extension's hook for `ctx.phase` in order.
///
/// Returns the patches of the hooks that succeeded, in order. Failures are
/// logged and dropped.
pub async fn run_phase(
    extensions: &[Arc<dyn ThemeExtension>],
    ctx: &HookContext,
    timeout: Duration,
) -> Vec<ThemeCustomization> {
    let mut patches = Vec::new();
    for extension in extensions {
        match run_hook(extension.as_ref(), ctx, timeout).await {
            Ok(Some(patch)) => {
                debug!(
                    theme.extension = extension.name(),
                    theme.hook = %ctx.phase,
                    "Extension hook returned a patch"
                );
                patches.push(patch);
            }
            Ok(None) => {}
            Err(err) => {
                warn!(
                    theme.extension = err.extension(),
                    theme.hook = %ctx.phase,
                    error = %err,
                    "Extension hook skipped"
                );
            }
        }
    }
    patches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::ThemePreset;
    use crate::tokens::TokenScale;

    struct Spacing;

    #[async_trait]
    impl ThemeExtension for Spacing {
        fn name(&self) -> &str {
            "spacing"
        }

        async fn before_build(
            &self,
            _ctx: &HookContext,
        ) -> Result<Option<ThemeCustomization>, HookError> {
            Ok(Some(ThemeCustomization {
                spacing: Some(TokenScale::from([("huge", "10rem")])),
                ..ThemeCustomization::default()
            }))
        }
    }

    struct Slow;

    #[async_trait]
    impl ThemeExtension for Slow {
        fn name(&self) -> &str {
            "slow"
        }

        async fn before_build(
            &self,
            _ctx: &HookContext,
        ) -> Result<Option<ThemeCustomization>, HookError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(None)
        }
    }

    struct Panics;

    #[async_trait]
    impl ThemeExtension for Panics {
        fn name(&self) -> &str {
            "panics"
        }

        async fn after_build(
            &self,
            _ctx: &HookContext,
        ) -> Result<Option<ThemeCustomization>, HookError> {
            panic!("extension bug");
        }
    }

    fn ctx(phase: HookPhase) -> HookContext {
        HookContext {
            phase,
            theme: BuiltTheme::new(ThemePreset::Light.to_tokens(), "light"),
            customizations: ThemeCustomization::default(),
        }
    }

    #[tokio::test]
    async fn test_hook_patch_returned() {
        let patch = run_hook(&Spacing, &ctx(HookPhase::BeforeBuild), Duration::from_secs(1))
            .await
            .expect("hook ok");
        assert!(patch.is_some());
        let none = run_hook(&Spacing, &ctx(HookPhase::AfterBuild), Duration::from_secs(1))
            .await
            .expect("hook ok");
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn test_hook_timeout() {
        let err = run_hook(&Slow, &ctx(HookPhase::BeforeBuild), Duration::from_millis(20))
            .await
            .expect_err("should time out");
        assert_eq!(
            err,
            HookError::TimedOut {
                extension: "slow".into(),
                timeout_ms: 20
            }
        );
    }

    #[tokio::test]
    async fn test_hook_panic_caught() {
        let err = run_hook(&Panics, &ctx(HookPhase::AfterBuild), Duration::from_secs(1))
            .await
            .expect_err("should panic");
        assert_eq!(err, HookError::Panicked { extension: "panics".into() });
    }

    #[tokio::test]
    async fn test_phase_skips_failures() {
        let extensions: Vec<Arc<dyn ThemeExtension>> =
            vec![Arc::new(Slow), Arc::new(Spacing), Arc::new(Panics)];
        let patches = run_phase(&extensions, &ctx(HookPhase::BeforeBuild), Duration::from_millis(20)).await;
        assert_eq!(patches.len(), 1);
    }
}
