//! Media URL resolution.

/// Resolve a media path against `base`.
///
/// Absolute URLs (`http://`, `https://`, protocol-relative `//`) and `data:`
/// URIs are returned untouched, so the function is idempotent. Relative paths
/// are joined to `base` with exactly one `/` between them.
pub fn get_media_url(base: &str, path: &str) -> String {
    let path = path.trim();
    if path.is_empty() || is_absolute(path) {
        return path.to_string();
    }

    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Resolve an optional media path, dropping blank values.
pub fn resolve_optional(base: &str, path: Option<String>) -> Option<String> {
    path.filter(|p| !p.trim().is_empty())
        .map(|p| get_media_url(base, &p))
}

fn is_absolute(path: &str) -> bool {
    let lower = path.get(..8).unwrap_or(path).to_ascii_lowercase();
    lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("data:")
        || path.starts_with("//")
}
