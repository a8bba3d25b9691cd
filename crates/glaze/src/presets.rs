//! Built-in base token sets.
//!
//! `light` and `dark` share every non-color category; only surfaces and palette
//! seeds differ. Palettes are generated from their seed with the default
//! [`ScaleConfig`], so `DEFAULT` is always the generated `500` step.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use tracing::trace;

use crate::scale::{ScaleConfig, semantic_group};
use crate::tokens::{
    ColorTokens, MotionTokens, RadiusTokens, SemanticColorGroup, ThemeTokens, TokenScale,
    TypographyTokens,
};

/// Built-in theme presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemePreset {
    Light,
    Dark,
}

impl ThemePreset {
    /// Every built-in preset.
    pub const ALL: [Self; 2] = [Self::Light, Self::Dark];

    /// Registry identifier (`"light"` / `"dark"`).
    pub const fn id(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Convert this preset into a concrete token set.
    pub fn to_tokens(self) -> ThemeTokens {
        let tokens = match self {
            Self::Light => light(),
            Self::Dark => dark(),
        };
        trace!(theme.preset = %self, "Loaded theme preset");
        tokens
    }
}

impl fmt::Display for ThemePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ThemePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown theme preset '{other}'")),
        }
    }
}

struct Surfaces {
    background: &'static str,
    foreground: &'static str,
    card: &'static str,
    card_foreground: &'static str,
    popover: &'static str,
    popover_foreground: &'static str,
    border: &'static str,
    input: &'static str,
    ring: &'static str,
    muted: &'static str,
    muted_foreground: &'static str,
    accent: &'static str,
    accent_foreground: &'static str,
}

/// Seeds for primary, secondary, destructive, success, warning.
type Seeds = [&'static str; 5];

fn light() -> ThemeTokens {
    shared_tokens(
        &Surfaces {
            background: "#ffffff",
            foreground: "#0a0a0b",
            card: "#ffffff",
            card_foreground: "#0a0a0b",
            popover: "#ffffff",
            popover_foreground: "#0a0a0b",
            border: "#e4e4e7",
            input: "#e4e4e7",
            ring: "#2563eb",
            muted: "#f4f4f5",
            muted_foreground: "#27272a",
            accent: "#f4f4f5",
            accent_foreground: "#18181b",
        },
        ["#2563eb", "#64748b", "#dc2626", "#16a34a", "#d97706"],
    )
}

fn dark() -> ThemeTokens {
    shared_tokens(
        &Surfaces {
            background: "#09090b",
            foreground: "#fafafa",
            card: "#0c0c0e",
            card_foreground: "#fafafa",
            popover: "#09090b",
            popover_foreground: "#fafafa",
            border: "#27272a",
            input: "#27272a",
            ring: "#3b82f6",
            muted: "#18181b",
            muted_foreground: "#a1a1aa",
            accent: "#27272a",
            accent_foreground: "#fafafa",
        },
        ["#3b82f6", "#94a3b8", "#ef4444", "#22c55e", "#f59e0b"],
    )
}

fn palettes(seeds: Seeds) -> BTreeMap<String, SemanticColorGroup> {
    let config = ScaleConfig::default();
    ["primary", "secondary", "destructive", "success", "warning"]
        .into_iter()
        .zip(seeds)
        .map(|(name, seed)| (name.to_string(), semantic_group(seed, &config)))
        .collect()
}

fn shared_tokens(s: &Surfaces, seeds: Seeds) -> ThemeTokens {
    ThemeTokens {
        colors: ColorTokens {
            background: s.background.into(),
            foreground: s.foreground.into(),
            card: s.card.into(),
            card_foreground: s.card_foreground.into(),
            popover: s.popover.into(),
            popover_foreground: s.popover_foreground.into(),
            border: s.border.into(),
            input: s.input.into(),
            ring: s.ring.into(),
            muted: s.muted.into(),
            muted_foreground: s.muted_foreground.into(),
            accent: s.accent.into(),
            accent_foreground: s.accent_foreground.into(),
            palettes: palettes(seeds),
        },
        typography: TypographyTokens {
            font_family: TokenScale::from([
                ("sans", "ui-sans-serif, system-ui, sans-serif"),
                ("serif", "ui-serif, Georgia, serif"),
                ("mono", "ui-monospace, SFMono-Regular, Menlo, monospace"),
            ]),
            font_size: TokenScale::from([
                ("xs", "0.75rem"),
                ("sm", "0.875rem"),
                ("base", "1rem"),
                ("lg", "1.125rem"),
                ("xl", "1.25rem"),
                ("2xl", "1.5rem"),
                ("3xl", "1.875rem"),
                ("4xl", "2.25rem"),
            ]),
            font_weight: TokenScale::from([
                ("light", "300"),
                ("normal", "400"),
                ("medium", "500"),
                ("semibold", "600"),
                ("bold", "700"),
            ]),
            line_height: TokenScale::from([
                ("none", "1"),
                ("tight", "1.25"),
                ("snug", "1.375"),
                ("normal", "1.5"),
                ("relaxed", "1.625"),
                ("loose", "2"),
            ]),
            letter_spacing: TokenScale::new(),
        },
        spacing: TokenScale::from([
            ("0", "0"),
            ("1", "0.25rem"),
            ("2", "0.5rem"),
            ("3", "0.75rem"),
            ("4", "1rem"),
            ("5", "1.25rem"),
            ("6", "1.5rem"),
            ("8", "2rem"),
            ("10", "2.5rem"),
            ("12", "3rem"),
            ("16", "4rem"),
            ("20", "5rem"),
            ("24", "6rem"),
        ]),
        motion: MotionTokens {
            duration: TokenScale::from([
                ("fast", "150ms"),
                ("normal", "300ms"),
                ("slow", "500ms"),
                ("slower", "700ms"),
            ]),
            easing: TokenScale::from([
                ("linear", "linear"),
                ("in", "cubic-bezier(0.4, 0, 1, 1)"),
                ("out", "cubic-bezier(0, 0, 0.2, 1)"),
                ("inOut", "cubic-bezier(0.4, 0, 0.2, 1)"),
            ]),
        },
        breakpoints: TokenScale::from([
            ("sm", "640px"),
            ("md", "768px"),
            ("lg", "1024px"),
            ("xl", "1280px"),
            ("2xl", "1536px"),
        ]),
        radius: RadiusTokens::Scale(TokenScale::from([
            ("none", "0"),
            ("sm", "0.125rem"),
            ("DEFAULT", "0.25rem"),
            ("md", "0.375rem"),
            ("lg", "0.5rem"),
            ("xl", "0.75rem"),
            ("full", "9999px"),
        ])),
        z_index: TokenScale::from([
            ("base", 0),
            ("dropdown", 1000),
            ("sticky", 1100),
            ("overlay", 1300),
            ("modal", 1400),
            ("popover", 1500),
            ("tooltip", 1600),
            ("toast", 1700),
        ]),
        shadows: Some(TokenScale::from([
            ("sm", "0 1px 2px 0 rgba(0, 0, 0, 0.05)"),
            (
                "DEFAULT",
                "0 1px 3px 0 rgba(0, 0, 0, 0.1), 0 1px 2px -1px rgba(0, 0, 0, 0.1)",
            ),
            (
                "md",
                "0 4px 6px -1px rgba(0, 0, 0, 0.1), 0 2px 4px -2px rgba(0, 0, 0, 0.1)",
            ),
            (
                "lg",
                "0 10px 15px -3px rgba(0, 0, 0, 0.1), 0 4px 6px -4px rgba(0, 0, 0, 0.1)",
            ),
        ])),
        animations: None,
    }
}
