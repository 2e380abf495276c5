//! Sitemap resolution
//!
//! Turns a normalized sitemap URL into the flat list of page URLs it
//! describes. A sitemap index is expanded exactly one level: its sub-sitemaps
//! are fetched and their `<url>` entries concatenated in order, but any index
//! entries inside a sub-sitemap are ignored.
//!
//! Resolution is a two-step attempt sequence. The primary URL is tried first;
//! if that fails and the URL is a `/sitemap_index.xml`, the whole resolution
//! is retried once against `/sitemap.xml` on the same origin.

use super::control::StopHandle;
use super::fetcher::SitemapSource;
use super::parser::parse_sitemap;
use super::rate_limiter::RateLimiter;
use crate::url::NormalizedUrl;
use crate::{ExtractError, ExtractResult};

/// Which attempt produced a resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Primary,
    Fallback,
}

/// Page URLs resolved for one input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Page URLs, in sub-sitemap order then document order
    pub urls: Vec<String>,

    /// False if a stop request cut index expansion short
    pub complete: bool,

    /// The URL that was actually resolved
    pub resolved_from: NormalizedUrl,

    pub attempt: Attempt,
}

/// Resolves sitemap URLs through a `SitemapSource`
pub struct SitemapResolver<S> {
    source: S,
    stop: StopHandle,
}

impl<S: SitemapSource> SitemapResolver<S> {
    /// Creates a resolver that checks `stop` between sub-sitemaps
    pub fn new(source: S, stop: StopHandle) -> Self {
        Self { source, stop }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Resolves `url`, falling back to `/sitemap.xml` for index URLs
    ///
    /// The caller is expected to have acquired a rate-limit slot for the
    /// primary fetch. Sub-sitemap fetches and the fallback attempt acquire
    /// their own slots from `limiter`.
    ///
    /// # Errors
    ///
    /// Returns the primary error when no fallback applies, or a `Network`
    /// error when the fallback also fails.
    pub async fn resolve(
        &self,
        url: &NormalizedUrl,
        limiter: &mut RateLimiter,
    ) -> ExtractResult<Resolution> {
        let primary_error = match self.resolve_once(url, limiter).await {
            Ok((urls, complete)) => {
                return Ok(Resolution {
                    urls,
                    complete,
                    resolved_from: url.clone(),
                    attempt: Attempt::Primary,
                })
            }
            Err(e) => e,
        };

        let Some(fallback) = url.fallback() else {
            return Err(primary_error);
        };

        tracing::info!(
            "Resolving {} failed ({}), trying {}",
            url,
            primary_error,
            fallback
        );

        limiter.acquire().await;
        match self.resolve_once(&fallback, limiter).await {
            Ok((urls, complete)) => Ok(Resolution {
                urls,
                complete,
                resolved_from: fallback,
                attempt: Attempt::Fallback,
            }),
            Err(ExtractError::Network(message)) => Err(ExtractError::Network(message)),
            Err(e) => Err(ExtractError::Network(format!(
                "{} (fallback {} also failed)",
                e, fallback
            ))),
        }
    }

    /// Fetches `url` and expands it one level if it is an index
    async fn resolve_once(
        &self,
        url: &NormalizedUrl,
        limiter: &mut RateLimiter,
    ) -> ExtractResult<(Vec<String>, bool)> {
        let body = self.source.fetch_sitemap(url.as_str()).await?;
        let document = parse_sitemap(&body, url.as_str())?;

        if !document.is_index() {
            return Ok((document.urls, true));
        }

        tracing::debug!(
            "{} is a sitemap index with {} sub-sitemaps",
            url,
            document.sitemaps.len()
        );

        let mut urls = Vec::new();
        for sub_sitemap in &document.sitemaps {
            if self.stop.is_requested() {
                tracing::debug!("Stop requested while expanding {}", url);
                return Ok((urls, false));
            }

            limiter.acquire().await;
            let body = self.source.fetch_sitemap(sub_sitemap).await?;
            let sub_document = parse_sitemap(&body, sub_sitemap)?;
            urls.extend(sub_document.urls);
        }

        Ok((urls, true))
    }
}
