//! Debug logging for backend traffic
//!
//! Bodies are only logged when the client is configured as verbose, and are
//! truncated so a long session history does not flood the console.

use serde_json::Value;

/// Maximum number of characters of a body written to the log
const MAX_LOGGED_BODY: usize = 2000;

/// Object keys whose values are never logged
const REDACTED_KEYS: &[&str] = &["password"];

/// Safely truncate a string to a maximum number of characters
pub fn safe_truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        // Reserve space for "..." suffix
        let trunc_chars = max_chars.saturating_sub(3);
        format!("{}...", s.chars().take(trunc_chars).collect::<String>())
    }
}

/// Replace credential values anywhere in a JSON document
pub fn redact(body: &Value) -> Value {
    match body {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| {
                    if REDACTED_KEYS.contains(&key.as_str()) {
                        (key.clone(), Value::String("***".to_string()))
                    } else {
                        (key.clone(), redact(value))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact).collect()),
        other => other.clone(),
    }
}

/// Log an outgoing request
pub fn log_request(method: &reqwest::Method, url: &reqwest::Url, body: Option<&Value>, verbose: bool) {
    log::debug!("--> {} {}", method, url);
    if !verbose {
        return;
    }
    if let Some(body) = body {
        let rendered = redact(body).to_string();
        log::debug!("    body: {}", safe_truncate(&rendered, MAX_LOGGED_BODY));
    }
}

/// Log a received response
pub fn log_response(status: reqwest::StatusCode, url: &reqwest::Url, body: &str, verbose: bool) {
    log::debug!(
        "<-- {} {} ({} bytes)",
        status.as_u16(),
        url,
        body.len()
    );
    if verbose && !body.is_empty() {
        let rendered = match serde_json::from_str::<Value>(body) {
            Ok(json) => redact(&json).to_string(),
            Err(_) => body.to_string(),
        };
        log::debug!("    body: {}", safe_truncate(&rendered, MAX_LOGGED_BODY));
    }
}
