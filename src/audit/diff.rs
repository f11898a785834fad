//! Diff generation for audit logging
//!
//! Produces a one-line summary of which top-level fields changed between two
//! serialized records, e.g. `category: "Groceries" -> "Dining Out"`.

use serde_json::Value;

const MAX_TEXT: usize = 50;

/// Summarize the field changes between `before` and `after`
///
/// Returns `None` when nothing changed.
pub fn generate_diff(before: &Value, after: &Value) -> Option<String> {
    let changes = match (before, after) {
        (Value::Object(b), Value::Object(a)) => {
            let mut changes: Vec<String> = b
                .iter()
                .filter_map(|(key, old)| match a.get(key) {
                    Some(new) if new != old => Some(format!(
                        "{}: {} -> {}",
                        key,
                        format_value(old),
                        format_value(new)
                    )),
                    Some(_) => None,
                    None => Some(format!("{}: {} -> (removed)", key, format_value(old))),
                })
                .collect();

            changes.extend(
                a.iter()
                    .filter(|(key, _)| !b.contains_key(*key))
                    .map(|(key, new)| format!("{}: (added) -> {}", key, format_value(new))),
            );
            changes
        }
        _ if before != after => vec![format!(
            "{} -> {}",
            format_value(before),
            format_value(after)
        )],
        _ => Vec::new(),
    };

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) if s.chars().count() > MAX_TEXT => {
            let head: String = s.chars().take(MAX_TEXT - 3).collect();
            format!("\"{}...\"", head)
        }
        Value::String(s) => format!("\"{}\"", s),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
        other => other.to_string(),
    }
}
