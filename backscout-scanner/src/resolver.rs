use url::Url;

/// Resolve `href` against the page it was found on.
///
/// Returns `None` when either side fails to parse, which callers treat as
/// "skip this link".
pub fn resolve_url(base: &str, href: &str) -> Option<String> {
    let base_url = Url::parse(base).ok()?;
    let resolved = base_url.join(href).ok()?;
    Some(resolved.to_string())
}

/// Prefix `https://` onto seeds and links that carry no http(s) scheme.
pub fn ensure_scheme(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// Only http(s) URLs are worth recursing into.
pub fn is_crawlable(url: &str) -> bool {
    Url::parse(url)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}
