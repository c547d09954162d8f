// Best-effort repair of truncated model output into parseable JSON
use serde_json::{Map, Value};

/// The sentinel returned for unrecoverable input. It fails layout assembly
/// structurally, which is the intended degradation path.
pub fn empty_sentinel() -> Value {
    Value::Object(Map::new())
}

/// Repair a truncated/malformed model reply into a parsed JSON value.
///
/// Strips fenced-code markers, discards leading chatter before the first `{`,
/// then scans once tracking string/escape state and open brace/bracket
/// counts. Whatever is still open at end of input gets a synthesized closing
/// suffix: brackets before braces, because truncation in this model's output
/// shape always lands inside the innermost open array.
///
/// This is strictly truncation repair. Corruption inside otherwise-complete
/// structure (a missing comma mid-object) is not fixable here and falls to
/// the empty-object sentinel.
pub fn heal(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return empty_sentinel();
    }

    let cleaned = raw.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();
    let Some(start) = cleaned.find('{') else {
        return empty_sentinel();
    };
    let cleaned = &cleaned[start..];

    let mut open_braces: i64 = 0;
    let mut open_brackets: i64 = 0;
    let mut in_string = false;
    let mut escaped = false;

    for ch in cleaned.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => open_braces += 1,
            '}' if !in_string => open_braces -= 1,
            '[' if !in_string => open_brackets += 1,
            ']' if !in_string => open_brackets -= 1,
            _ => {}
        }
    }

    let mut candidate = String::with_capacity(
        cleaned.len() + open_brackets.max(0) as usize + open_braces.max(0) as usize,
    );
    candidate.push_str(cleaned);
    // Arrays close before objects
    for _ in 0..open_brackets.max(0) {
        candidate.push(']');
    }
    for _ in 0..open_braces.max(0) {
        candidate.push('}');
    }

    match serde_json::from_str(&candidate) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!("Healing failed, returning sentinel: {}", err);
            empty_sentinel()
        }
    }
}
