//! Named base themes.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, warn};

use crate::presets::ThemePreset;
use crate::tokens::ThemeTokens;

/// A lookup table of named base token sets.
///
/// [`ThemeRegistry::with_defaults`] holds the built-in `light` and `dark`
/// presets; applications register their own bases next to them.
#[derive(Clone, Default)]
pub struct ThemeRegistry {
    themes: BTreeMap<String, ThemeTokens>,
}

impl fmt::Debug for ThemeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeRegistry")
            .field("themes", &self.themes.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ThemeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in preset.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for preset in ThemePreset::ALL {
            registry.register(preset.id(), preset.to_tokens());
        }
        registry
    }

    /// Adds or replaces a named base.
    pub fn register(&mut self, name: impl Into<String>, tokens: ThemeTokens) {
        let name = name.into();
        debug!(theme.base = %name, "Registered base theme");
        self.themes.insert(name, tokens);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_theme(mut self, name: impl Into<String>, tokens: ThemeTokens) -> Self {
        self.register(name, tokens);
        self
    }

    /// Returns the tokens registered under `name`.
    pub fn get(&self, name: &str) -> Option<&ThemeTokens> {
        self.themes.get(name)
    }

    /// Returns true when `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.themes.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.themes.keys().map(String::as_str)
    }

    /// Resolves `name`, falling back to `fallback`, then to the `light` preset.
    ///
    /// Returns the identifier actually used together with its tokens.
    pub fn resolve(&self, name: &str, fallback: &str) -> (String, ThemeTokens) {
        if let Some(tokens) = self.get(name) {
            return (name.to_string(), tokens.clone());
        }
        if let Some(tokens) = self.get(fallback) {
            warn!(theme.base = %name, theme.fallback = %fallback, "Unknown base theme, using fallback");
            return (fallback.to_string(), tokens.clone());
        }
        let preset = ThemePreset::Light;
        warn!(theme.base = %name, theme.fallback = %preset, "Unknown base theme and fallback, using built-in preset");
        (preset.id().to_string(), preset.to_tokens())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_registered() {
        let registry = ThemeRegistry::with_defaults();
        assert_eq!(registry.names().collect::<Vec<_>>(), ["dark", "light"]);
    }

    #[test]
    fn test_resolve_falls_back() {
        let registry = ThemeRegistry::with_defaults();
        let (name, tokens) = registry.resolve("ocean", "dark");
        assert_eq!(name, "dark");
        assert_eq!(tokens.colors.background, "#09090b");

        let (name, _) = ThemeRegistry::new().resolve("ocean", "nope");
        assert_eq!(name, "light");
    }

    #[test]
    fn test_custom_base() {
        let mut ocean = ThemePreset::Dark.to_tokens();
        ocean.colors.background = "#001122".into();
        let registry = ThemeRegistry::with_defaults().with_theme("ocean", ocean);
        assert!(registry.contains("ocean"));
        assert_eq!(registry.resolve("ocean", "light").1.colors.background, "#001122");
    }
}
