//! Catalog source loader.
//!
//! Fetches every configured source concurrently, tolerates individual
//! failures, and merges the results in configuration order. Sources are
//! either `http(s)://` URLs or filesystem paths.
//!
//! Each successful payload is kept in a `moka` cache. When a later fetch of
//! the same source fails, the cached payload stands in for it (network first,
//! cache as fallback).

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use modshelf_core::{Catalog, MergeStats};
use moka::future::Cache;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Errors for a single source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("source is not a JSON array")]
    NotArray,

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors for a whole catalog load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("catalog not loaded yet")]
    NotLoaded,

    #[error("no catalog sources configured")]
    NoSources,

    #[error("all {0} catalog sources failed")]
    AllSourcesFailed(usize),
}

// =============================================================================
// Sources
// =============================================================================

/// Where a catalog source lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Http(Url),
    File(PathBuf),
}

impl Source {
    /// Interpret a source spec. Anything that is not an `http(s)` URL is a path.
    #[must_use]
    pub fn parse(spec: &str) -> Self {
        let spec = spec.trim();
        match Url::parse(spec) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self::Http(url),
            _ => Self::File(PathBuf::from(spec)),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(url) => write!(f, "{url}"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

// =============================================================================
// Reports
// =============================================================================

/// Outcome of one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceStatus {
    /// Fetched now.
    Fresh { items: usize },
    /// Fetch failed; an earlier payload was used.
    Cached { items: usize, reason: String },
    /// Fetch failed with nothing to fall back on.
    Failed { reason: String },
}

/// Outcome of one source, labelled.
#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub source: String,
    #[serde(flatten)]
    pub status: SourceStatus,
}

/// Summary of a catalog load.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub sources: Vec<SourceReport>,
    pub stats: MergeStats,
}

impl LoadReport {
    /// Number of sources that produced no items.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.sources
            .iter()
            .filter(|s| matches!(s.status, SourceStatus::Failed { .. }))
            .count()
    }

    /// Number of sources served from the fallback cache.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.sources
            .iter()
            .filter(|s| matches!(s.status, SourceStatus::Cached { .. }))
            .count()
    }
}

// =============================================================================
// CatalogLoader
// =============================================================================

/// Loads and merges catalog sources.
#[derive(Clone)]
pub struct CatalogLoader {
    inner: Arc<CatalogLoaderInner>,
}

struct CatalogLoaderInner {
    client: reqwest::Client,
    sources: Vec<Source>,
    timeout: Duration,
    cache: Cache<String, Arc<Vec<Value>>>,
}

impl CatalogLoader {
    /// Create a loader for the given source specs.
    #[must_use]
    pub fn new(sources: &[String], timeout: Duration, cache_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(64)
            .time_to_live(cache_ttl)
            .build();

        Self {
            inner: Arc::new(CatalogLoaderInner {
                client: reqwest::Client::new(),
                sources: sources.iter().map(|s| Source::parse(s)).collect(),
                timeout,
                cache,
            }),
        }
    }

    #[must_use]
    pub fn sources(&self) -> &[Source] {
        &self.inner.sources
    }

    /// Fetch every source and merge them into one catalog.
    ///
    /// # Errors
    ///
    /// Returns an error when no sources are configured or every source
    /// failed without a cached fallback.
    #[instrument(skip(self), fields(sources = self.inner.sources.len()))]
    pub async fn load(&self) -> Result<(Catalog, LoadReport), LoadError> {
        if self.inner.sources.is_empty() {
            return Err(LoadError::NoSources);
        }

        let outcomes = join_all(
            self.inner
                .sources
                .iter()
                .map(|source| self.fetch_with_fallback(source)),
        )
        .await;

        let mut reports = Vec::with_capacity(outcomes.len());
        let mut payloads = Vec::with_capacity(outcomes.len());
        for (source, (payload, status)) in self.inner.sources.iter().zip(outcomes) {
            reports.push(SourceReport {
                source: source.to_string(),
                status,
            });
            if let Some(values) = payload {
                payloads.push(values);
            }
        }

        if payloads.is_empty() {
            return Err(LoadError::AllSourcesFailed(reports.len()));
        }

        let (catalog, stats) = Catalog::merge_values(payloads);
        let report = LoadReport {
            sources: reports,
            stats,
        };

        info!(
            items = stats.merged,
            duplicates = stats.duplicates,
            invalid = stats.invalid,
            failed = report.failed(),
            cached = report.cached(),
            "Catalog loaded"
        );

        Ok((catalog, report))
    }

    /// Fetch a source, falling back to its last good payload.
    async fn fetch_with_fallback(&self, source: &Source) -> (Option<Vec<Value>>, SourceStatus) {
        let key = source.to_string();

        match self.fetch(source).await {
            Ok(values) => {
                let items = values.len();
                debug!(source = %key, items, "Fetched catalog source");
                self.inner
                    .cache
                    .insert(key, Arc::new(values.clone()))
                    .await;
                (Some(values), SourceStatus::Fresh { items })
            }
            Err(e) => {
                let reason = e.to_string();
                if let Some(cached) = self.inner.cache.get(&key).await {
                    warn!(source = %key, error = %reason, "Source failed, serving cached copy");
                    let items = cached.len();
                    (
                        Some(cached.as_ref().clone()),
                        SourceStatus::Cached { items, reason },
                    )
                } else {
                    warn!(source = %key, error = %reason, "Source failed");
                    (None, SourceStatus::Failed { reason })
                }
            }
        }
    }

    async fn fetch(&self, source: &Source) -> Result<Vec<Value>, SourceError> {
        let timeout = self.inner.timeout;
        let body = tokio::time::timeout(timeout, self.read(source))
            .await
            .map_err(|_| SourceError::Timeout(timeout))??;

        match serde_json::from_slice::<Value>(&body)? {
            Value::Array(values) => Ok(values),
            _ => Err(SourceError::NotArray),
        }
    }

    async fn read(&self, source: &Source) -> Result<Vec<u8>, SourceError> {
        match source {
            Source::Http(url) => {
                let response = self
                    .inner
                    .client
                    .get(cache_busted(url))
                    .send()
                    .await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(SourceError::Status(status.as_u16()));
                }
                Ok(response.bytes().await?.to_vec())
            }
            Source::File(path) => Ok(tokio::fs::read(path).await?),
        }
    }
}

/// Append a cache-busting parameter so intermediaries never serve stale data.
fn cache_busted(url: &Url) -> Url {
    let mut url = url.clone();
    let stamp = chrono::Utc::now().timestamp_millis().to_string();
    url.query_pairs_mut().append_pair("v", &stamp);
    url
}
