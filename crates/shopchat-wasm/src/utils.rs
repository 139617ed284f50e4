use chrono::{DateTime, Utc};
use wasm_bindgen::JsValue;

/// Route prefix of a chat session page
pub const CHAT_ROUTE_PREFIX: &str = "/chat/";

/// Escape HTML to prevent XSS
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub fn chat_path(session_id: &str) -> String {
    format!("{}{}", CHAT_ROUTE_PREFIX, session_id)
}

/// Session id of a `/chat/{id}` path, ignoring a trailing slash
pub fn session_id_from_path(pathname: &str) -> Option<String> {
    let rest = pathname.strip_prefix(CHAT_ROUTE_PREFIX)?;
    let id = rest.trim_end_matches('/');
    if id.is_empty() || id.contains('/') {
        None
    } else {
        Some(id.to_string())
    }
}

/// Get session ID from URL path
pub fn get_session_id_from_url() -> Result<String, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
    let pathname = window
        .location()
        .pathname()
        .map_err(|_| JsValue::from_str("Failed to get pathname"))?;

    session_id_from_path(&pathname)
        .ok_or_else(|| JsValue::from_str(&format!("Invalid chat URL: {}", pathname)))
}

/// 24-hour `HH:MM`
pub fn format_clock(hours: u32, minutes: u32) -> String {
    format!("{:02}:{:02}", hours, minutes)
}

/// Format a timestamp as local wall-clock time
pub fn format_time(timestamp: &DateTime<Utc>) -> String {
    let date = js_sys::Date::new(&JsValue::from_f64(timestamp.timestamp_millis() as f64));
    format_clock(date.get_hours(), date.get_minutes())
}
