//! CSS custom property output.
//!
//! Flattens a built theme into `--name: value` pairs. Keys are kebab-cased,
//! `DEFAULT` entries drop their suffix, and `.` in a key becomes `_` so that
//! `spacing."0.5"` is emitted as `--spacing-0_5`.
//!
//! Animation tokens are opaque and not emitted.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::trace;

use crate::tokens::{BuiltTheme, RadiusTokens, TokenScale};

/// Flattens `theme` into CSS custom properties, sorted by name.
pub fn generate_css_variables(theme: &BuiltTheme) -> BTreeMap<String, String> {
    let mut vars = BTreeMap::new();
    let tokens = &theme.tokens;

    match serde_json::to_value(&tokens.colors) {
        Ok(colors) => walk_colors(&mut vars, &mut Vec::new(), &colors),
        Err(err) => trace!(error = %err, "Colors could not be flattened"),
    }

    let t = &tokens.typography;
    emit_scale(&mut vars, "font", &t.font_family);
    emit_scale(&mut vars, "text", &t.font_size);
    emit_scale(&mut vars, "font-weight", &t.font_weight);
    emit_scale(&mut vars, "leading", &t.line_height);
    emit_scale(&mut vars, "tracking", &t.letter_spacing);
    emit_scale(&mut vars, "spacing", &tokens.spacing);
    emit_scale(&mut vars, "duration", &tokens.motion.duration);
    emit_scale(&mut vars, "easing", &tokens.motion.easing);
    emit_scale(&mut vars, "breakpoint", &tokens.breakpoints);

    match &tokens.radius {
        RadiusTokens::Scalar(value) => {
            vars.insert("--radius".to_string(), value.clone());
        }
        RadiusTokens::Scale(scale) => emit_scale(&mut vars, "radius", scale),
    }
    if let Some(shadows) = &tokens.shadows {
        emit_scale(&mut vars, "shadow", shadows);
    }
    for (key, value) in tokens.z_index.iter() {
        vars.insert(var_name(&["z", key]), value.to_string());
    }

    vars
}

fn emit_scale(vars: &mut BTreeMap<String, String>, prefix: &str, scale: &TokenScale) {
    for (key, value) in scale.iter() {
        vars.insert(var_name(&[prefix, key]), value.clone());
    }
}

fn walk_colors<'a>(vars: &mut BTreeMap<String, String>, path: &mut Vec<&'a str>, value: &'a Value) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                path.push(key);
                walk_colors(vars, path, child);
                path.pop();
            }
        }
        Value::String(color) => {
            vars.insert(var_name(path), color.clone());
        }
        _ => {}
    }
}

/// Builds `--a-b-c` from key parts, dropping `DEFAULT` parts.
fn var_name(parts: &[&str]) -> String {
    let mut name = String::from("-");
    for part in parts.iter().filter(|p| **p != "DEFAULT") {
        name.push('-');
        name.push_str(&kebab(part));
    }
    name
}

fn kebab(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        match c {
            '.' => out.push('_'),
            c if c.is_ascii_uppercase() => {
                if i > 0 {
                    out.push('-');
                }
                out.push(c.to_ascii_lowercase());
            }
            c => out.push(c),
        }
    }
    out
}
