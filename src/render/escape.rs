/// escape_text
///
/// Escapes the five HTML-significant characters so the result can be placed
/// in element content or a quoted attribute value.
pub fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Schemes a rendered `href`/`src` may carry. Relative URLs are always allowed.
const ALLOWED_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];

/// safe_url
///
/// Returns the URL when it is relative or uses an allowed scheme, `None`
/// otherwise (e.g. `javascript:` or `data:` URLs).
///
/// Browsers ignore embedded whitespace and control characters when parsing a
/// scheme, so those are stripped before the scheme is inspected.
pub fn safe_url(url: &str) -> Option<&str> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return None;
    }

    let compact: String = trimmed
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .collect();

    let scheme_end = compact.find(':');
    let path_start = compact.find(['/', '?', '#']);

    match (scheme_end, path_start) {
        // "images/a.png", "/blog", "#top", "?page=2"
        (None, _) => Some(trimmed),
        (Some(colon), Some(slash)) if slash < colon => Some(trimmed),
        (Some(colon), _) => {
            let scheme = compact[..colon].to_ascii_lowercase();
            ALLOWED_SCHEMES
                .contains(&scheme.as_str())
                .then_some(trimmed)
        }
    }
}
