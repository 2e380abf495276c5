//! URL handling module for Sitemap-Harvest
//!
//! Turns whatever the user typed (a bare domain, a site URL, or a full sitemap
//! URL) into the canonical sitemap URL that is fetched and used as cache key.

mod normalize;

pub use normalize::{normalize_sitemap_url, NormalizedUrl, FALLBACK_FILENAME, INDEX_FILENAME};
