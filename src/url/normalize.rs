use crate::ExtractError;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Default sitemap path used when the input does not name a sitemap
pub const INDEX_FILENAME: &str = "/sitemap_index.xml";

/// Alternate sitemap path tried when the index cannot be resolved
pub const FALLBACK_FILENAME: &str = "/sitemap.xml";

/// A canonical sitemap URL
///
/// Always starts with `http://` or `https://` and always ends in `.xml`.
/// Only constructed through [`normalize_sitemap_url`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedUrl(String);

impl NormalizedUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this URL points at the default sitemap index filename
    pub fn is_index(&self) -> bool {
        self.0.ends_with(INDEX_FILENAME)
    }

    /// The alternate URL to try when this one fails to resolve
    ///
    /// Only index URLs have a fallback: the same origin with `/sitemap.xml`.
    /// A URL that already names `sitemap.xml` gets none.
    pub fn fallback(&self) -> Option<NormalizedUrl> {
        if !self.is_index() {
            return None;
        }
        let url = Url::parse(&self.0).ok()?;
        Some(NormalizedUrl(format!(
            "{}{}",
            url.origin().ascii_serialization(),
            FALLBACK_FILENAME
        )))
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalizes raw input into a sitemap URL
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace
/// 2. Prepend `https://` when no `http://` or `https://` scheme is present
/// 3. Parse the URL; reject if malformed or if it has no host
/// 4. Keep the path if it already ends in `/sitemap_index.xml` or `/sitemap.xml`,
///    otherwise replace the whole path with `/sitemap_index.xml`
/// 5. Return origin + path (query and fragment are dropped)
///
/// # Arguments
///
/// * `raw` - The string as entered by the user
///
/// # Returns
///
/// * `Ok(NormalizedUrl)` - The canonical sitemap URL
/// * `Err(ExtractError::InvalidUrl)` - The input is not a URL even with a scheme added
///
/// # Examples
///
/// ```
/// use sitemap_harvest::url::normalize_sitemap_url;
///
/// let url = normalize_sitemap_url("example.com").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/sitemap_index.xml");
///
/// let url = normalize_sitemap_url("http://example.com/blog/sitemap.xml").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/blog/sitemap.xml");
/// ```
pub fn normalize_sitemap_url(raw: &str) -> Result<NormalizedUrl, ExtractError> {
    let trimmed = raw.trim();
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let parsed = Url::parse(&with_scheme).map_err(|_| ExtractError::InvalidUrl(trimmed.to_string()))?;
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(ExtractError::InvalidUrl(trimmed.to_string()));
    }

    let path = parsed.path();
    let path = if path.ends_with(INDEX_FILENAME) || path.ends_with(FALLBACK_FILENAME) {
        path
    } else {
        INDEX_FILENAME
    };

    Ok(NormalizedUrl(format!(
        "{}{}",
        parsed.origin().ascii_serialization(),
        path
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_domain_gets_https_and_index() {
        let result = normalize_sitemap_url("example.com").unwrap();
        assert_eq!(result.as_str(), "https://example.com/sitemap_index.xml");
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let result = normalize_sitemap_url("  example.com/page \n").unwrap();
        assert_eq!(result.as_str(), "https://example.com/sitemap_index.xml");
    }

    #[test]
    fn test_http_scheme_preserved() {
        let result = normalize_sitemap_url("http://example.com").unwrap();
        assert_eq!(result.as_str(), "http://example.com/sitemap_index.xml");
    }

    #[test]
    fn test_non_sitemap_path_replaced() {
        let result = normalize_sitemap_url("https://example.com/blog/post?id=3").unwrap();
        assert_eq!(result.as_str(), "https://example.com/sitemap_index.xml");
    }

    #[test]
    fn test_sitemap_xml_path_kept() {
        let result = normalize_sitemap_url("https://example.com/sitemap.xml").unwrap();
        assert_eq!(result.as_str(), "https://example.com/sitemap.xml");
    }

    #[test]
    fn test_nested_sitemap_index_path_kept() {
        let result = normalize_sitemap_url("example.com/news/sitemap_index.xml").unwrap();
        assert_eq!(result.as_str(), "https://example.com/news/sitemap_index.xml");
    }

    #[test]
    fn test_other_xml_filename_replaced() {
        let result = normalize_sitemap_url("https://example.com/feed.xml").unwrap();
        assert_eq!(result.as_str(), "https://example.com/sitemap_index.xml");
    }

    #[test]
    fn test_query_after_sitemap_dropped() {
        let result = normalize_sitemap_url("https://example.com/sitemap.xml?page=2").unwrap();
        assert_eq!(result.as_str(), "https://example.com/sitemap.xml");
    }

    #[test]
    fn test_port_kept_in_origin() {
        let result = normalize_sitemap_url("http://127.0.0.1:8080/sitemap.xml").unwrap();
        assert_eq!(result.as_str(), "http://127.0.0.1:8080/sitemap.xml");
    }

    #[test]
    fn test_host_lowercased() {
        let result = normalize_sitemap_url("EXAMPLE.com").unwrap();
        assert_eq!(result.as_str(), "https://example.com/sitemap_index.xml");
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        for raw in ["", "   ", "https://", "exa mple.com", "http://[::1"] {
            let result = normalize_sitemap_url(raw);
            assert!(
                matches!(result, Err(ExtractError::InvalidUrl(_))),
                "expected InvalidUrl for {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_idempotent_on_sitemap_urls() {
        for raw in [
            "example.com",
            "https://example.com/sitemap.xml",
            "http://example.com/a/b/sitemap_index.xml",
            "https://sub.example.org:8443/sitemap.xml",
        ] {
            let once = normalize_sitemap_url(raw).unwrap();
            let twice = normalize_sitemap_url(once.as_str()).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_always_ends_in_xml() {
        for raw in ["example.com", "example.com/x/y/", "http://example.com/sitemap.xml"] {
            let url = normalize_sitemap_url(raw).unwrap();
            assert!(url.as_str().ends_with(".xml"));
            assert!(url.as_str().starts_with("http://") || url.as_str().starts_with("https://"));
        }
    }

    #[test]
    fn test_fallback_only_for_index() {
        let index = normalize_sitemap_url("example.com").unwrap();
        assert_eq!(
            index.fallback().unwrap().as_str(),
            "https://example.com/sitemap.xml"
        );

        let plain = normalize_sitemap_url("https://example.com/sitemap.xml").unwrap();
        assert!(plain.fallback().is_none());
    }

    #[test]
    fn test_fallback_uses_origin_root() {
        let index = normalize_sitemap_url("https://example.com/news/sitemap_index.xml").unwrap();
        assert_eq!(
            index.fallback().unwrap().as_str(),
            "https://example.com/sitemap.xml"
        );
    }
}
