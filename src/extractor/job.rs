//! Batch job orchestration
//!
//! A `BatchJob` owns the persisted `BatchState` of one extraction run and
//! drives it through the inputs strictly in order:
//! - Normalizing each raw input
//! - Serving it from the sitemap cache, or rate limiting and resolving it
//! - Recording rows or a per-item error
//! - Persisting the full state after every item
//!
//! A stop request is honored at the next item boundary. Dropping the future
//! returned by `start` or `resume` leaves the last persisted snapshot
//! resumable.

use super::control::StopHandle;
use super::fetcher::{ProxyFetcher, SitemapSource};
use super::rate_limiter::RateLimiter;
use super::resolver::SitemapResolver;
use crate::cache::SitemapCache;
use crate::config::Config;
use crate::output::{format_progress, write_csv};
use crate::state::BatchState;
use crate::storage::{self, SharedStore, BATCH_STATE_KEY};
use crate::url::{normalize_sitemap_url, NormalizedUrl};
use crate::{ExtractError, ExtractResult, SitemapError};
use std::path::PathBuf;

/// Message reported when `start` receives no usable input
pub const EMPTY_INPUT_MESSAGE: &str = "Please enter at least one sitemap URL.";

/// Log line appended when a stop request ends the loop
pub const STOPPED_MESSAGE: &str = "Extraction stopped by user.";

/// Log line appended when a completed run produced no rows
pub const NOTHING_EXTRACTED_MESSAGE: &str = "No URLs extracted for CSV.";

/// Totals reported when a run ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSummary {
    pub processed: usize,
    pub total: usize,
    pub rows: usize,
    pub errors: usize,
    /// Where the CSV was written, if it was
    pub csv_path: Option<PathBuf>,
}

/// How a call to `start` or `resume` ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// Every input was processed
    Completed(JobSummary),
    /// A stop request ended the run early
    Stopped(JobSummary),
    /// `resume` found no interrupted run
    NothingToResume,
}

/// Result of handling a single input
struct ItemResult {
    sitemap_url: NormalizedUrl,
    pages: Vec<String>,
    cached: bool,
}

/// Sequential, resumable extraction over a list of sitemap inputs
pub struct BatchJob<S> {
    store: SharedStore,
    cache: SitemapCache,
    resolver: SitemapResolver<S>,
    limiter: RateLimiter,
    state: BatchState,
    stop: StopHandle,
    max_inputs: usize,
    csv_path: PathBuf,
    config_hash: Option<String>,
}

impl BatchJob<ProxyFetcher> {
    /// Creates a job that fetches through the configured proxies
    ///
    /// # Arguments
    ///
    /// * `config` - The extractor configuration
    /// * `store` - Store holding the batch state and cache
    /// * `config_hash` - Hash recorded in new runs and checked on resume
    ///
    /// # Returns
    ///
    /// * `Ok(BatchJob)` - Job loaded with any persisted state
    /// * `Err(SitemapError)` - Failed to build the client or read the store
    pub fn from_config(
        config: &Config,
        store: SharedStore,
        config_hash: Option<String>,
    ) -> Result<Self, SitemapError> {
        let fetcher = ProxyFetcher::from_config(&config.fetcher)?;
        Self::new(config, store, fetcher, config_hash)
    }
}

impl<S: SitemapSource> BatchJob<S> {
    /// Creates a job over `source`, loading the persisted state if present
    pub fn new(
        config: &Config,
        store: SharedStore,
        source: S,
        config_hash: Option<String>,
    ) -> Result<Self, SitemapError> {
        let state = storage::load::<BatchState>(&store, BATCH_STATE_KEY)?.unwrap_or_default();
        let stop = StopHandle::new();

        Ok(Self {
            cache: SitemapCache::with_ttl_hours(store.clone(), config.cache.ttl_hours),
            store,
            resolver: SitemapResolver::new(source, stop.clone()),
            limiter: RateLimiter::from_config(&config.rate_limit),
            state,
            stop,
            max_inputs: config.batch.max_inputs,
            csv_path: PathBuf::from(&config.output.csv_path),
            config_hash,
        })
    }

    /// The current state snapshot
    pub fn state(&self) -> &BatchState {
        &self.state
    }

    /// A handle that can stop this job from another task
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn cache(&self) -> &SitemapCache {
        &self.cache
    }

    /// Starts a fresh run over `raw_urls`, replacing any previous state
    ///
    /// Blank lines are dropped and the list is cut to the configured
    /// maximum.
    ///
    /// # Errors
    ///
    /// `SitemapError::Validation` if nothing usable remains; the existing
    /// state is left untouched in that case.
    pub async fn start<I, T>(&mut self, raw_urls: I) -> Result<JobOutcome, SitemapError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let inputs: Vec<String> = raw_urls
            .into_iter()
            .map(|raw| raw.as_ref().trim().to_string())
            .filter(|raw| !raw.is_empty())
            .take(self.max_inputs)
            .collect();

        if inputs.is_empty() {
            return Err(SitemapError::Validation(EMPTY_INPUT_MESSAGE.to_string()));
        }

        tracing::info!("Starting extraction of {} sitemap inputs", inputs.len());

        self.stop.reset();
        self.state = BatchState::new(inputs, self.config_hash.clone());
        self.persist()?;

        self.run().await
    }

    /// Continues an interrupted run from its persisted position
    pub async fn resume(&mut self) -> Result<JobOutcome, SitemapError> {
        if let Some(persisted) = storage::load::<BatchState>(&self.store, BATCH_STATE_KEY)? {
            self.state = persisted;
        }

        if !self.state.is_resumable() {
            tracing::info!("No interrupted extraction to resume");
            return Ok(JobOutcome::NothingToResume);
        }

        if self.config_hash.is_some() && self.state.config_hash != self.config_hash {
            tracing::warn!("Configuration changed since this extraction was started");
        }

        tracing::info!(
            "Resuming extraction at {}/{}",
            self.state.processed_count,
            self.state.total_count
        );

        self.stop.reset();
        self.state.stop_requested = false;
        self.persist()?;

        self.run().await
    }

    /// Requests a stop at the next item boundary
    ///
    /// An in-flight fetch is allowed to finish.
    pub fn stop(&mut self) -> Result<(), SitemapError> {
        self.stop.request_stop();
        self.state.stop_requested = true;
        self.persist()
    }

    /// Removes the persisted state and the sitemap cache
    pub fn clear_all(&mut self) -> Result<(), SitemapError> {
        storage::remove(&self.store, BATCH_STATE_KEY)?;
        self.cache.clear()?;
        self.state = BatchState::default();
        tracing::info!("Cleared extraction state and sitemap cache");
        Ok(())
    }

    /// The sequential processing loop
    async fn run(&mut self) -> Result<JobOutcome, SitemapError> {
        self.absorb_external_stop()?;
        let mut interrupted = false;

        while let Some(raw_url) = self.state.next_input().map(str::to_string) {
            if self.stop.is_requested() {
                tracing::info!("{}", STOPPED_MESSAGE);
                self.state.push_log(STOPPED_MESSAGE);
                break;
            }

            match self.process_item(&raw_url).await {
                Ok(Some(item)) => {
                    tracing::info!(
                        "Extracted {} URLs from {}{}",
                        item.pages.len(),
                        item.sitemap_url,
                        if item.cached { " (cached)" } else { "" }
                    );
                    self.state
                        .record_success(item.sitemap_url.as_str(), &item.pages, item.cached);
                }
                Ok(None) => {
                    // Index expansion was cut short; the item is redone on resume
                    tracing::info!("{}", STOPPED_MESSAGE);
                    self.state.push_log(STOPPED_MESSAGE);
                    interrupted = true;
                    break;
                }
                Err(e) => {
                    tracing::warn!("Error processing {}: {}", raw_url, e);
                    self.state.record_error(&raw_url, &e.to_string());
                }
            }

            self.state.advance();
            tracing::info!(
                "{}",
                format_progress(self.state.processed_count, self.state.total_count)
            );
            self.absorb_external_stop()?;
            self.persist()?;
            tokio::task::yield_now().await;
        }

        self.finish(interrupted)
    }

    /// Handles one input; `Ok(None)` means a stop interrupted it
    async fn process_item(&mut self, raw_url: &str) -> ExtractResult<Option<ItemResult>> {
        let sitemap_url = normalize_sitemap_url(raw_url)?;

        let cached = self
            .cache
            .get(&sitemap_url)
            .map_err(|e| ExtractError::Cache(e.to_string()))?;
        if let Some(entry) = cached {
            return Ok(Some(ItemResult {
                sitemap_url,
                pages: entry.urls,
                cached: true,
            }));
        }

        self.limiter.acquire().await;
        let resolution = self.resolver.resolve(&sitemap_url, &mut self.limiter).await?;
        if !resolution.complete {
            return Ok(None);
        }

        self.cache
            .put(&sitemap_url, resolution.urls.clone())
            .map_err(|e| ExtractError::Cache(e.to_string()))?;

        Ok(Some(ItemResult {
            sitemap_url,
            pages: resolution.urls,
            cached: false,
        }))
    }

    /// Wraps up after the loop exits
    ///
    /// `interrupted` means a stop landed inside an item. The run is then left
    /// running so `resume` picks that item up again.
    fn finish(&mut self, interrupted: bool) -> Result<JobOutcome, SitemapError> {
        let stopped = !self.state.is_complete();
        let mut csv_path = None;

        if !stopped {
            if self.state.output_rows.is_empty() {
                tracing::warn!("{}", NOTHING_EXTRACTED_MESSAGE);
                self.state.push_log(NOTHING_EXTRACTED_MESSAGE);
            } else {
                write_csv(&self.state.output_rows, &self.csv_path)?;
                tracing::info!(
                    "Exported {} rows to {}",
                    self.state.output_rows.len(),
                    self.csv_path.display()
                );
                self.state.push_log(format!(
                    "Exported {} URLs to {}",
                    self.state.output_rows.len(),
                    self.csv_path.display()
                ));
                csv_path = Some(self.csv_path.clone());
            }
        }

        if !self.state.errors.is_empty() {
            let summary = format!("Summary: {} errors occurred.", self.state.errors.len());
            tracing::warn!("{}", summary);
            self.state.push_log(summary);
        }

        if self.stop.is_requested() {
            self.state.stop_requested = true;
        }
        self.state.running = interrupted;
        self.persist()?;

        let summary = JobSummary {
            processed: self.state.processed_count,
            total: self.state.total_count,
            rows: self.state.output_rows.len(),
            errors: self.state.errors.len(),
            csv_path,
        };

        Ok(if stopped {
            JobOutcome::Stopped(summary)
        } else {
            JobOutcome::Completed(summary)
        })
    }

    /// Picks up a stop requested through the store by another process
    fn absorb_external_stop(&mut self) -> Result<(), SitemapError> {
        let persisted = storage::load::<BatchState>(&self.store, BATCH_STATE_KEY)?;
        if let Some(persisted) = persisted {
            if persisted.stop_requested && persisted.started_at == self.state.started_at {
                self.stop.request_stop();
            }
        }

        if self.stop.is_requested() {
            self.state.stop_requested = true;
        }
        Ok(())
    }

    fn persist(&mut self) -> Result<(), SitemapError> {
        self.state.updated_at = chrono::Utc::now();
        storage::save(&self.store, BATCH_STATE_KEY, &self.state)?;
        Ok(())
    }
}

/// Requests a stop of whatever run is recorded in `store`
///
/// Used when the running job lives in another process; it observes the
/// persisted flag at its next item boundary.
///
/// # Returns
///
/// * `Ok(true)` - A running job was flagged
/// * `Ok(false)` - No job is running
pub fn request_stop(store: &SharedStore) -> Result<bool, SitemapError> {
    let Some(mut state) = storage::load::<BatchState>(store, BATCH_STATE_KEY)? else {
        return Ok(false);
    };

    if !state.running {
        return Ok(false);
    }

    state.stop_requested = true;
    storage::save(store, BATCH_STATE_KEY, &state)?;
    Ok(true)
}
