//! Website name derivation from a page URL

use url::Url;

/// Derive the website name shown for a page: the URL's hostname with the
/// first `www.` removed.
///
/// Returns an empty string when the URL cannot be parsed or has no host.
///
/// # Examples
/// ```
/// use readlog::services::website::website_from_url;
///
/// assert_eq!(website_from_url("https://www.example.com/post/1"), "example.com");
/// assert_eq!(website_from_url("not a url"), "");
/// ```
pub fn website_from_url(raw: &str) -> String {
    Url::parse(raw.trim())
        .ok()
        .and_then(|url| url.host_str().map(|host| host.replacen("www.", "", 1)))
        .unwrap_or_default()
}
