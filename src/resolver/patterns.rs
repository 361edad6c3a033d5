use crate::app::{FreshetError, Result};

/// Supported URL path shapes, tried in order; first match wins. Each
/// marker's extractor takes the path segment that follows it.
const PATH_MARKERS: &[&str] = &[
    "youtube.com/@",
    "youtube.com/channel/",
    "youtube.com/c/",
    "youtube.com/user/",
];

/// Normalize raw user input (URL, `@handle`, bare handle, or raw
/// channel id) to a handle/id string.
///
/// Empty input is rejected before any network call.
pub fn normalize_input(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FreshetError::InvalidInput(
            "channel handle or URL is empty".into(),
        ));
    }

    for marker in PATH_MARKERS {
        if let Some(rest) = segment_after(trimmed, marker) {
            return Ok(rest.to_string());
        }
    }

    // A bare `@handle` anywhere in the input.
    if let Some(pos) = trimmed.find('@') {
        let handle = take_segment(&trimmed[pos + 1..]);
        if !handle.is_empty() {
            return Ok(handle.to_string());
        }
    }

    // No shape matched: the trimmed input verbatim, minus a leading `@`.
    Ok(trimmed.replacen('@', "", 1))
}

fn segment_after<'a>(input: &'a str, marker: &str) -> Option<&'a str> {
    let start = input.find(marker)? + marker.len();
    let segment = take_segment(&input[start..]);
    (!segment.is_empty()).then_some(segment)
}

/// Everything up to the next path/query delimiter or whitespace.
fn take_segment(s: &str) -> &str {
    let end = s
        .find(|c: char| c == '/' || c == '?' || c.is_whitespace())
        .unwrap_or(s.len());
    &s[..end]
}
