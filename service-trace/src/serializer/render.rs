use serde_json::Value as Json;

/// Renders a sanitized tree on a single line.
///
/// Strings are single-quoted, object keys are bare when they are valid
/// identifiers, and containers nested deeper than `max_depth` (the root is
/// depth 0) print as `[Object]` / `[Array]`.
pub fn render(value: &Json, max_depth: usize) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0, max_depth);
    out
}

fn write_value(out: &mut String, value: &Json, depth: usize, max_depth: usize) {
    match value {
        Json::Null => out.push_str("null"),
        Json::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Json::Number(n) => out.push_str(&n.to_string()),
        Json::String(s) => write_quoted(out, s),
        Json::Array(items) if items.is_empty() => out.push_str("[]"),
        Json::Array(_) if depth > max_depth => out.push_str("[Array]"),
        Json::Array(items) => {
            out.push_str("[ ");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, item, depth + 1, max_depth);
            }
            out.push_str(" ]");
        }
        Json::Object(map) if map.is_empty() => out.push_str("{}"),
        Json::Object(_) if depth > max_depth => out.push_str("[Object]"),
        Json::Object(map) => {
            out.push_str("{ ");
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                if is_identifier(key) {
                    out.push_str(key);
                } else {
                    write_quoted(out, key);
                }
                out.push_str(": ");
                write_value(out, item, depth + 1, max_depth);
            }
            out.push_str(" }");
        }
    }
}

fn write_quoted(out: &mut String, s: &str) {
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}
