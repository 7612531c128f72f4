//! The marker line that opens a config document.
//!
//! A header is recognized only when it is the exact first line of the text:
//! no leading whitespace, trailing whitespace (and `\r`) ignored. It is kept as
//! a raw text prefix so re-encoding the YAML body never touches it.

/// Header written in front of every merged document unless configured otherwise.
pub const DEFAULT_HEADER: &str = "#kairos-config";

/// Headers accepted when no explicit header is expected.
pub const KNOWN_HEADERS: &[&str] = &[DEFAULT_HEADER, "#cloud-config", "#node-config"];

/// Check whether `text` starts with a header.
///
/// With a non-empty `expected`, the first line must equal it. With an empty
/// `expected`, any of [`KNOWN_HEADERS`] matches. Returns the matched header, or
/// an empty string when there is no match.
pub fn has_header<'a>(text: &'a str, expected: &str) -> (bool, &'a str) {
    let first = first_line(text);
    let matched = if expected.is_empty() {
        KNOWN_HEADERS.contains(&first)
    } else {
        first == expected
    };
    if matched { (true, first) } else { (false, "") }
}

/// Split a recognized header off the front of `text`.
///
/// Returns the header (if the first line is one of `recognized`) and the
/// remaining body.
pub fn split_header<'a>(text: &'a str, recognized: &[&str]) -> (Option<&'a str>, &'a str) {
    let first = first_line(text);
    if first.is_empty() || !recognized.contains(&first) {
        return (None, text);
    }
    let body = match text.split_once('\n') {
        Some((_, rest)) => rest,
        None => "",
    };
    (Some(first), body)
}

/// Put `header` back as the literal first line of `body`.
pub fn attach_header(header: Option<&str>, body: &str) -> String {
    match header {
        Some(h) => format!("{h}\n{body}"),
        None => body.to_string(),
    }
}

/// The header set a scan recognizes: the configured header plus the known ones.
pub fn recognized_headers(configured: Option<&str>) -> Vec<&str> {
    let mut headers: Vec<&str> = KNOWN_HEADERS.to_vec();
    if let Some(h) = configured
        && !h.is_empty()
        && !headers.contains(&h)
    {
        headers.push(h);
    }
    headers
}

fn first_line(text: &str) -> &str {
    let line = text.split('\n').next().unwrap_or_default();
    line.trim_end()
}
