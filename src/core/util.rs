//! Common utilities

/// Treat missing and blank values alike; returns the trimmed value otherwise
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Truncate string to max bytes, returning (truncated_string, was_truncated)
pub fn truncate_string(s: &str, max_bytes: usize) -> (String, bool) {
    if s.len() <= max_bytes {
        return (s.to_string(), false);
    }

    // Find a valid UTF-8 boundary
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }

    (s[..end].to_string(), true)
}

/// Shorten an HTTP error body for logs and error messages
pub fn snippet(body: &str) -> String {
    let (text, truncated) = truncate_string(body.trim(), 300);
    if truncated {
        format!("{}…", text)
    } else {
        text
    }
}
