//! URL helpers for links and image sources found on a page.

use url::Url;

/// Resolves `href` against the page URL the way a browser reports
/// `element.href`. Dot segments are normalised; a page URL that does not
/// parse leaves the link as written.
pub fn resolve(page_url: &str, href: &str) -> String {
    let href = href.trim();
    if href.is_empty() {
        return String::new();
    }

    match Url::parse(page_url).and_then(|base| base.join(href)) {
        Ok(url) => url.into(),
        // No usable base (e.g. a local file path), keep the link as written
        Err(_) => href.to_string(),
    }
}

/// Drops everything from the first `?` on.
pub fn strip_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}
