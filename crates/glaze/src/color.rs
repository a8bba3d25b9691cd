//! Color parsing, conversion, and adjustment.
//!
//! Colors travel through the engine as plain strings so that any notation a
//! token author writes survives untouched until it has to be transformed.
//! This module turns those strings into [`Rgba`] / [`Hsla`] values and back:
//!
//! - `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`
//! - `rgb()` / `rgba()` with comma or space separated channels
//! - `hsl()` / `hsla()` with comma or space separated channels
//! - a handful of keywords (`black`, `white`, `transparent`, ...)
//!
//! Nothing here panics on bad input. Parsers return `None`; the string-level
//! adjustment helpers ([`lighten`], [`desaturate`], ...) hand back the original
//! string unchanged so a single malformed token never aborts a build.
//!
//! # Example
//!
//! ```rust
//! use glaze::color::{lighten, parse_color};
//!
//! let rgb = parse_color("#2563eb").unwrap();
//! assert_eq!((rgb.r, rgb.g, rgb.b), (37, 99, 235));
//!
//! // Unparseable input is passed through.
//! assert_eq!(lighten("not-a-color", 0.2), "not-a-color");
//! ```

use std::fmt;

/// An sRGB color with 8-bit channels and a floating alpha in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

/// A color in HSL space. Hue in degrees `[0, 360)`, the rest in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsla {
    pub h: f64,
    pub s: f64,
    pub l: f64,
    pub a: f64,
}

impl Rgba {
    /// Creates an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Formats as `#rrggbb`, or `rgba(r, g, b, a)` when translucent.
    pub fn to_css(&self) -> String {
        if self.a < 1.0 {
            format!(
                "rgba({}, {}, {}, {})",
                self.r,
                self.g,
                self.b,
                crate::units::format_number(self.a)
            )
        } else {
            self.to_hex()
        }
    }

    /// Formats as lowercase `#rrggbb`, dropping alpha.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Converts to HSL.
    pub fn to_hsl(&self) -> Hsla {
        let (h, s, l) = rgb_to_hsl(self.r, self.g, self.b);
        Hsla { h, s, l, a: self.a }
    }

    /// YIQ perceived brightness in `[0, 255]`.
    pub fn brightness(&self) -> f64 {
        (f64::from(self.r) * 299.0 + f64::from(self.g) * 587.0 + f64::from(self.b) * 114.0)
            / 1000.0
    }

    /// Whether the color reads as dark (YIQ brightness below 128).
    pub fn is_dark(&self) -> bool {
        self.brightness() < 128.0
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

impl Hsla {
    /// Converts back to sRGB.
    pub fn to_rgba(&self) -> Rgba {
        let (r, g, b) = hsl_to_rgb(self.h, self.s.clamp(0.0, 1.0), self.l.clamp(0.0, 1.0));
        Rgba {
            r,
            g,
            b,
            a: self.a.clamp(0.0, 1.0),
        }
    }
}

/// Parses a color string in any supported notation.
pub fn parse_color(input: &str) -> Option<Rgba> {
    let raw = input.trim();
    if raw.is_empty() {
        return None;
    }
    if let Some(hex) = raw.strip_prefix('#') {
        return parse_hex(hex);
    }

    let lower = raw.to_ascii_lowercase();
    if let Some((name, args)) = split_function(&lower) {
        return match name {
            "rgb" | "rgba" => parse_rgb_args(&args),
            "hsl" | "hsla" => parse_hsl_args(&args),
            _ => None,
        };
    }

    named_color(&lower)
}

/// Returns true when [`parse_color`] accepts the string.
pub fn is_valid_color(input: &str) -> bool {
    parse_color(input).is_some()
}

/// Parses straight to HSL.
pub fn parse_hsl(input: &str) -> Option<Hsla> {
    parse_color(input).map(|c| c.to_hsl())
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    match hex.len() {
        3 => Some(Rgba::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => Some(Rgba {
            r: nibble(0)?,
            g: nibble(1)?,
            b: nibble(2)?,
            a: f64::from(nibble(3)?) / 255.0,
        }),
        6 => Some(Rgba::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Rgba {
            r: byte(0)?,
            g: byte(2)?,
            b: byte(4)?,
            a: f64::from(byte(6)?) / 255.0,
        }),
        _ => None,
    }
}

/// Splits `name(a, b, c)` / `name(a b c / d)` into the name and its arguments.
fn split_function(s: &str) -> Option<(&str, Vec<&str>)> {
    let open = s.find('(')?;
    let inner = s[open + 1..].strip_suffix(')')?;
    let name = s[..open].trim();
    let args: Vec<&str> = inner
        .split([',', '/', ' ', '\t'])
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .collect();
    Some((name, args))
}

fn parse_channel(arg: &str) -> Option<u8> {
    let value = if let Some(pct) = arg.strip_suffix('%') {
        pct.parse::<f64>().ok()? * 2.55
    } else {
        arg.parse::<f64>().ok()?
    };
    if !value.is_finite() || !(0.0..=255.0).contains(&value) {
        return None;
    }
    Some(value.round() as u8)
}

fn parse_alpha(arg: Option<&&str>) -> Option<f64> {
    let Some(arg) = arg else {
        return Some(1.0);
    };
    let value = if let Some(pct) = arg.strip_suffix('%') {
        pct.parse::<f64>().ok()? / 100.0
    } else {
        arg.parse::<f64>().ok()?
    };
    value.is_finite().then(|| value.clamp(0.0, 1.0))
}

fn parse_fraction(arg: &str) -> Option<f64> {
    let pct = arg.strip_suffix('%')?.parse::<f64>().ok()?;
    (pct.is_finite() && (0.0..=100.0).contains(&pct)).then_some(pct / 100.0)
}

fn parse_rgb_args(args: &[&str]) -> Option<Rgba> {
    if !(3..=4).contains(&args.len()) {
        return None;
    }
    Some(Rgba {
        r: parse_channel(args[0])?,
        g: parse_channel(args[1])?,
        b: parse_channel(args[2])?,
        a: parse_alpha(args.get(3))?,
    })
}

fn parse_hsl_args(args: &[&str]) -> Option<Rgba> {
    if !(3..=4).contains(&args.len()) {
        return None;
    }
    let hue = args[0].trim_end_matches("deg").parse::<f64>().ok()?;
    if !hue.is_finite() {
        return None;
    }
    let hsl = Hsla {
        h: normalize_hue(hue),
        s: parse_fraction(args[1])?,
        l: parse_fraction(args[2])?,
        a: parse_alpha(args.get(3))?,
    };
    Some(hsl.to_rgba())
}

fn named_color(name: &str) -> Option<Rgba> {
    let color = match name {
        "black" => Rgba::BLACK,
        "white" => Rgba::WHITE,
        "red" => Rgba::rgb(255, 0, 0),
        "green" => Rgba::rgb(0, 128, 0),
        "blue" => Rgba::rgb(0, 0, 255),
        "gray" | "grey" => Rgba::rgb(128, 128, 128),
        "transparent" => Rgba {
            r: 0,
            g: 0,
            b: 0,
            a: 0.0,
        },
        _ => return None,
    };
    Some(color)
}

// -----------------------------------------------------------------------------
// String-level adjustments
// -----------------------------------------------------------------------------

/// Applies an HSL transform to a color string.
///
/// Returns the input unchanged when it does not parse.
pub fn adjust_hsl(color: &str, f: impl FnOnce(Hsla) -> Hsla) -> String {
    match parse_hsl(color) {
        Some(hsl) => f(hsl).to_rgba().to_css(),
        None => color.to_string(),
    }
}

/// Raises lightness by `amount` of its current value (`0.4` = 40% lighter).
pub fn lighten(color: &str, amount: f64) -> String {
    adjust_hsl(color, |c| Hsla {
        l: (c.l + c.l * amount).min(1.0),
        ..c
    })
}

/// Lowers lightness by `amount` of its current value.
pub fn darken(color: &str, amount: f64) -> String {
    adjust_hsl(color, |c| Hsla {
        l: (c.l - c.l * amount).max(0.0),
        ..c
    })
}

/// Raises saturation by `amount` of its current value.
pub fn saturate(color: &str, amount: f64) -> String {
    adjust_hsl(color, |c| Hsla {
        s: (c.s + c.s * amount).min(1.0),
        ..c
    })
}

/// Lowers saturation by `amount` of its current value.
pub fn desaturate(color: &str, amount: f64) -> String {
    adjust_hsl(color, |c| Hsla {
        s: (c.s - c.s * amount).max(0.0),
        ..c
    })
}

/// Mixes two colors in Oklab. `ratio` 0.0 yields `a`, 1.0 yields `b`.
///
/// Returns `None` if either color fails to parse.
pub fn mix(a: &str, b: &str, ratio: f64) -> Option<String> {
    let from = parse_color(a)?;
    let to = parse_color(b)?;
    let t = ratio.clamp(0.0, 1.0);

    let (l1, a1, b1) = srgb8_to_oklab(from);
    let (l2, a2, b2) = srgb8_to_oklab(to);
    let lerp = |x: f64, y: f64| x + (y - x) * t;

    let (r, g, bl) = oklab_to_srgb(lerp(l1, l2), lerp(a1, a2), lerp(b1, b2));
    Some(
        Rgba {
            r: to_channel(r),
            g: to_channel(g),
            b: to_channel(bl),
            a: lerp(from.a, to.a),
        }
        .to_css(),
    )
}

// -----------------------------------------------------------------------------
// HSL <-> RGB
// -----------------------------------------------------------------------------

#[allow(clippy::many_single_char_names)]
fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let r = f64::from(r) / 255.0;
    let g = f64::from(g) / 255.0;
    let b = f64::from(b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = f64::midpoint(max, min);

    if (max - min).abs() < f64::EPSILON {
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let mut h = if (max - r).abs() < f64::EPSILON {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if (max - g).abs() < f64::EPSILON {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    h /= 6.0;
    (h * 360.0, s, l)
}

#[allow(clippy::many_single_char_names, clippy::suboptimal_flops)]
fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    if s == 0.0 {
        let v = to_channel(l);
        return (v, v, v);
    }

    let h = normalize_hue(h) / 360.0;
    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }

    (
        to_channel(hue_to_rgb(p, q, h + 1.0 / 3.0)),
        to_channel(hue_to_rgb(p, q, h)),
        to_channel(hue_to_rgb(p, q, h - 1.0 / 3.0)),
    )
}

fn to_channel(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Normalize a hue angle to `[0, 360)`.
pub(crate) fn normalize_hue(h: f64) -> f64 {
    let h = h % 360.0;
    if h < 0.0 { h + 360.0 } else { h }
}

// -----------------------------------------------------------------------------
// Oklab (Björn Ottosson, https://bottosson.github.io/posts/oklab/)
// -----------------------------------------------------------------------------

fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.040_45 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f64) -> f64 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

#[allow(clippy::suboptimal_flops)]
fn srgb8_to_oklab(c: Rgba) -> (f64, f64, f64) {
    let r = srgb_to_linear(f64::from(c.r) / 255.0);
    let g = srgb_to_linear(f64::from(c.g) / 255.0);
    let b = srgb_to_linear(f64::from(c.b) / 255.0);

    let l = (0.412_221_470_8 * r + 0.536_332_536_3 * g + 0.051_445_992_9 * b).cbrt();
    let m = (0.211_903_498_2 * r + 0.680_699_545_1 * g + 0.107_396_956_6 * b).cbrt();
    let s = (0.088_302_461_9 * r + 0.281_718_837_6 * g + 0.629_978_700_5 * b).cbrt();

    (
        0.210_454_255_3 * l + 0.793_617_785_0 * m - 0.004_072_046_8 * s,
        1.977_998_495_1 * l - 2.428_592_205_0 * m + 0.450_593_709_9 * s,
        0.025_904_037_1 * l + 0.782_771_766_2 * m - 0.808_675_766_0 * s,
    )
}

#[allow(clippy::suboptimal_flops)]
fn oklab_to_srgb(l_ok: f64, a: f64, b: f64) -> (f64, f64, f64) {
    let l = (l_ok + 0.396_337_777_4 * a + 0.215_803_757_3 * b).powi(3);
    let m = (l_ok - 0.105_561_345_8 * a - 0.063_854_172_8 * b).powi(3);
    let s = (l_ok - 0.089_484_177_5 * a - 1.291_485_548_0 * b).powi(3);

    (
        linear_to_srgb(4.076_741_662_1 * l - 3.307_711_591_3 * m + 0.230_969_929_2 * s),
        linear_to_srgb(-1.268_438_004_6 * l + 2.609_757_401_1 * m - 0.341_319_396_5 * s),
        linear_to_srgb(-0.004_196_086_3 * l - 0.703_418_614_7 * m + 1.707_614_701_0 * s),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(parse_color("#fff"), Some(Rgba::WHITE));
        assert_eq!(parse_color("#2563eb"), Some(Rgba::rgb(37, 99, 235)));
        assert_eq!(parse_color("#2563EB"), Some(Rgba::rgb(37, 99, 235)));
        let translucent = parse_color("#00000080").expect("8-digit hex");
        assert!((translucent.a - 128.0 / 255.0).abs() < 1e-9);
        assert!(parse_color("#12345").is_none());
        assert!(parse_color("#zzzzzz").is_none());
    }

    #[test]
    fn test_parse_functional_forms() {
        assert_eq!(parse_color("rgb(37, 99, 235)"), Some(Rgba::rgb(37, 99, 235)));
        assert_eq!(parse_color("rgb(37 99 235)"), Some(Rgba::rgb(37, 99, 235)));
        let rgba = parse_color("rgba(0, 0, 0, 0.5)").expect("rgba");
        assert!((rgba.a - 0.5).abs() < 1e-9);
        assert_eq!(parse_color("hsl(0, 100%, 50%)"), Some(Rgba::rgb(255, 0, 0)));
        assert_eq!(parse_color("hsl(120deg 100% 25%)"), Some(Rgba::rgb(0, 128, 0)));
        assert!(parse_color("rgb(300, 0, 0)").is_none());
        assert!(parse_color("hsl(0, 100, 50)").is_none());
    }

    #[test]
    fn test_parse_keywords_and_garbage() {
        assert_eq!(parse_color("White"), Some(Rgba::WHITE));
        assert_eq!(parse_color("transparent").map(|c| c.a), Some(0.0));
        assert!(parse_color("").is_none());
        assert!(parse_color("chartreuse-ish").is_none());
        assert!(parse_color("var(--brand)").is_none());
    }

    #[test]
    fn test_hsl_roundtrip_primaries() {
        for hex in ["#ff0000", "#00ff00", "#0000ff", "#808080", "#2563eb"] {
            let rgb = parse_color(hex).expect("valid");
            assert_eq!(rgb.to_hsl().to_rgba().to_hex(), hex);
        }
    }

    #[test]
    fn test_lighten_darken_relative() {
        // #808080 has lightness ~0.502; +50% of that is ~0.753
        let lighter = parse_hsl(&lighten("#808080", 0.5)).expect("valid");
        assert!((lighter.l - 0.753).abs() < 0.01);

        assert_eq!(darken("#ffffff", 1.0), "#000000");
        assert_eq!(lighten("#000000", 0.5), "#000000");
    }

    #[test]
    fn test_desaturate_to_gray() {
        assert_eq!(desaturate("#ff0000", 1.0), "#808080");
    }

    #[test]
    fn test_adjustments_pass_through_invalid() {
        assert_eq!(lighten("oops", 0.1), "oops");
        assert_eq!(saturate("", 0.1), "");
    }

    #[test]
    fn test_brightness_dark_light() {
        assert!(Rgba::BLACK.is_dark());
        assert!(!Rgba::WHITE.is_dark());
        assert!(parse_color("#2563eb").expect("valid").is_dark());
        assert!(!parse_color("#888888").expect("valid").is_dark());
    }

    #[test]
    fn test_mix_endpoints_and_midpoint() {
        assert_eq!(mix("#ff0000", "#0000ff", 0.0).as_deref(), Some("#ff0000"));
        assert_eq!(mix("#ff0000", "#0000ff", 1.0).as_deref(), Some("#0000ff"));
        let mid = mix("#000000", "#ffffff", 0.5).expect("valid");
        let l = parse_hsl(&mid).expect("valid").l;
        // Oklab midpoint of black/white is a perceptual mid gray, not #808080
        assert!(l > 0.35 && l < 0.5, "unexpected lightness {l}");
        assert!(mix("#000000", "nope", 0.5).is_none());
    }

    #[test]
    fn test_to_css_keeps_alpha() {
        let c = Rgba {
            r: 0,
            g: 0,
            b: 0,
            a: 0.25,
        };
        assert_eq!(c.to_css(), "rgba(0, 0, 0, 0.25)");
    }
}
