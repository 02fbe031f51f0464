//! Utility functions for the Limitless back-office

/// Normalise an email address for storage and lookups
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Clean a free-text search term for use in a `LIKE` pattern
///
/// Wildcards are escaped and the term is trimmed and capped at 100 characters.
/// Returns `None` when nothing searchable is left.
#[must_use]
pub fn sanitize_search_term(term: &str) -> Option<String> {
    let trimmed = term.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut escaped = String::with_capacity(trimmed.len());
    for ch in trimmed.chars().take(100) {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    Some(escaped)
}

/// Clamp requested pagination to sane bounds
///
/// Returns `(limit, offset)`.
#[must_use]
pub fn clamp_page(
    limit: Option<i64>,
    offset: Option<i64>,
    default_limit: i64,
    max_limit: i64,
) -> (i64, i64) {
    let limit = limit.unwrap_or(default_limit).clamp(1, max_limit.max(1));
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}

/// Best-effort client address from proxy headers, falling back to `unknown`
#[must_use]
pub fn client_address<'a>(
    forwarded_for: Option<&'a str>,
    real_ip: Option<&'a str>,
    peer: Option<&'a str>,
) -> &'a str {
    forwarded_for
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .or_else(|| real_ip.map(str::trim).filter(|value| !value.is_empty()))
        .or(peer)
        .unwrap_or("unknown")
}

/// Escape a value for a CSV cell so spreadsheet apps do not evaluate it as a formula
#[must_use]
pub fn csv_safe(value: &str) -> String {
    if value.starts_with(['=', '+', '-', '@']) {
        format!("'{value}")
    } else {
        value.to_string()
    }
}
