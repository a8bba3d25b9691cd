//! CSS length and duration helpers shared by the variant transform and the validator.

use std::sync::LazyLock;

use regex::Regex;

static LENGTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:-?(?:\d+(?:\.\d+)?|\.\d+)(?:px|rem|em|%|vh|vw|vmin|vmax|pt|ch|ex)|0)$")
        .expect("length pattern compiles")
});

static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:\.\d+)?(?:ms|s)$").expect("duration pattern compiles"));

static NUMBER_UNIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-?(?:\d+(?:\.\d+)?|\.\d+))([a-z%]*)$").expect("number pattern compiles")
});

/// Root font size used to compare `px` against `rem`.
pub const ROOT_FONT_PX: f64 = 16.0;

/// Returns true for a single CSS length such as `1.5rem`, `12px`, or `0`.
pub fn is_css_length(value: &str) -> bool {
    LENGTH_RE.is_match(value.trim())
}

/// Returns true for durations such as `150ms` or `0.3s`.
pub fn is_duration(value: &str) -> bool {
    DURATION_RE.is_match(value.trim())
}

/// Splits `"1.25rem"` into `(1.25, "rem")`. Unitless numbers yield an empty unit.
pub fn split_number(value: &str) -> Option<(f64, &str)> {
    let caps = NUMBER_UNIT_RE.captures(value.trim())?;
    let number = caps.get(1)?.as_str().parse::<f64>().ok()?;
    let unit = caps.get(2).map_or("", |m| m.as_str());
    Some((number, unit))
}

/// Converts a length to `rem` for ordering comparisons.
///
/// `em` is treated like `rem`; viewport and percentage units have no fixed
/// size and return `None`.
pub fn to_rem(value: &str) -> Option<f64> {
    let (n, unit) = split_number(value)?;
    match unit {
        "rem" | "em" => Some(n),
        "px" => Some(n / ROOT_FONT_PX),
        "pt" => Some(n * 4.0 / 3.0 / ROOT_FONT_PX),
        "" if n == 0.0 => Some(0.0),
        _ => None,
    }
}

/// Parses a duration into milliseconds.
pub fn parse_duration_ms(value: &str) -> Option<f64> {
    if !is_duration(value) {
        return None;
    }
    let (n, unit) = split_number(value)?;
    match unit {
        "ms" => Some(n),
        "s" => Some(n * 1000.0),
        _ => None,
    }
}

/// Formats a number with at most four decimals and no trailing zeros.
pub fn format_number(value: f64) -> String {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    let text = format!("{rounded:.4}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Multiplies the numeric part of `value`, keeping its unit.
///
/// When `units` is non-empty only those units are scaled. Anything that does
/// not parse is returned unchanged.
pub fn scale_value(value: &str, factor: f64, units: &[&str]) -> String {
    match split_number(value) {
        Some((n, unit)) if units.is_empty() || units.contains(&unit) => {
            format!("{}{unit}", format_number(n * factor))
        }
        _ => value.to_string(),
    }
}

/// Divides a duration by `speed`, rounding `ms` values to whole milliseconds.
pub fn scale_duration(value: &str, speed: f64) -> String {
    if speed <= 0.0 || !is_duration(value) {
        return value.to_string();
    }
    match split_number(value) {
        Some((n, "ms")) => format!("{}ms", (n / speed).round()),
        Some((n, unit)) => format!("{}{unit}", format_number(n / speed)),
        None => value.to_string(),
    }
}

/// Splits a comma-separated list at top level, ignoring commas inside parentheses.
pub fn split_top_level(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in value.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(value[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(value[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}
