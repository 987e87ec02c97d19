// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Line Protocol rendering for the case tracker export.
//!
//! One line per region record:
//!
//! ```text
//! <measurement>,<tag=value,...> <field=value,...> <timestamp>
//! ```
//!
//! String values get embedded spaces escaped as `\ `; there is no quoting
//! and no numeric type suffix. A value of `0`, `0.0`, `""`, `false`, or
//! `null` drops its key from the line entirely, tags and fields alike, so a
//! zero count is absent from the output rather than written as `0`.

use serde_json::Value;

/// Returns true when a raw value should appear in a line.
///
/// Zero (integer or float), the empty string, `false`, `null`, and any
/// non-scalar value are filtered out. Note the string `"0"` is emittable.
pub fn is_emittable(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i != 0
            } else if let Some(u) = n.as_u64() {
                u != 0
            } else {
                n.as_f64().map(|x| x != 0.0).unwrap_or(false)
            }
        }
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Escapes embedded spaces with a backslash, as unquoted Line Protocol
/// values require.
pub fn escape_spaces(raw: &str) -> String {
    raw.replace(' ', "\\ ")
}

/// Renders one scalar value for a line component.
///
/// Strings are space-escaped; numbers and booleans use their plain text
/// form. Callers filter with [`is_emittable`] first; null and non-scalar
/// values render as an empty string.
pub fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => escape_spaces(s),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Assembles one line from pre-rendered tag and field pairs.
///
/// Pair order is preserved as given. The separators are emitted
/// unconditionally, so a record with no surviving tags or fields still
/// produces a (degenerate) line.
pub fn build_line(
    measurement: &str,
    tags: &[(String, String)],
    fields: &[(String, String)],
    timestamp: i64,
) -> String {
    let tag_part = join_pairs(tags);
    let field_part = join_pairs(fields);
    format!("{},{} {} {}", measurement, tag_part, field_part, timestamp)
}

fn join_pairs(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join(",")
}
