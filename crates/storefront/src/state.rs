//! Application state shared across handlers.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use modshelf_core::Catalog;
use tracing::{info, instrument, warn};

use crate::config::StorefrontConfig;
use crate::error::AppError;
use crate::loader::{CatalogLoader, LoadError, LoadReport};
use crate::search::SearchIndex;
use crate::storage::{FileStore, KeyValueStore, Preferences, StorageError};

/// An immutable catalog with its search index.
#[derive(Debug)]
pub struct Snapshot {
    pub catalog: Catalog,
    pub index: SearchIndex,
    pub report: LoadReport,
    pub loaded_at: DateTime<Utc>,
}

/// Catalog currently served, or why there is none.
#[derive(Debug, Clone)]
enum CatalogSlot {
    Ready(Arc<Snapshot>),
    Failed(LoadError),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The catalog snapshot is swapped atomically on
/// reload; handlers hold their own `Arc` to the snapshot they started with.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    loader: CatalogLoader,
    prefs: Preferences,
    catalog: RwLock<CatalogSlot>,
}

impl AppState {
    /// Create state with the preference file in the configured data directory.
    ///
    /// The catalog starts unloaded; call [`AppState::reload`].
    ///
    /// # Errors
    ///
    /// Returns an error if the preference store cannot be opened.
    pub fn new(config: StorefrontConfig) -> Result<Self, StorageError> {
        let store = FileStore::open(&config.data_dir)?;
        Self::with_store(config, Arc::new(store))
    }

    /// Create state over any key-value store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or migrated.
    pub fn with_store(
        config: StorefrontConfig,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, StorageError> {
        let loader = CatalogLoader::new(
            &config.sources,
            config.fetch_timeout,
            config.source_cache_ttl,
        );
        let prefs = Preferences::open(store)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                loader,
                prefs,
                catalog: RwLock::new(CatalogSlot::Failed(LoadError::NotLoaded)),
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn loader(&self) -> &CatalogLoader {
        &self.inner.loader
    }

    #[must_use]
    pub fn prefs(&self) -> &Preferences {
        &self.inner.prefs
    }

    /// The catalog snapshot being served.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Load`] when no catalog is loaded.
    pub fn snapshot(&self) -> Result<Arc<Snapshot>, AppError> {
        let slot = self
            .inner
            .catalog
            .read()
            .map_err(|_| AppError::Internal("catalog lock poisoned".to_string()))?;
        match &*slot {
            CatalogSlot::Ready(snapshot) => Ok(Arc::clone(snapshot)),
            CatalogSlot::Failed(e) => Err(AppError::Load(e.clone())),
        }
    }

    /// Whether a catalog is loaded.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.snapshot().is_ok()
    }

    /// Fetch every source again and swap in the new snapshot.
    ///
    /// A failed reload replaces a previous snapshot with the error, so the
    /// list view shows the retry page.
    ///
    /// # Errors
    ///
    /// Returns an error when every source fails or the index cannot be built.
    #[instrument(skip(self))]
    pub async fn reload(&self) -> Result<Arc<Snapshot>, AppError> {
        let outcome = self.inner.loader.load().await;

        let slot = match outcome {
            Ok((catalog, report)) => {
                let index = SearchIndex::build(&catalog)?;
                info!(items = catalog.len(), "Catalog snapshot ready");
                CatalogSlot::Ready(Arc::new(Snapshot {
                    catalog,
                    index,
                    report,
                    loaded_at: Utc::now(),
                }))
            }
            Err(e) => {
                warn!(error = %e, "Catalog load failed");
                CatalogSlot::Failed(e)
            }
        };

        {
            let mut current = self
                .inner
                .catalog
                .write()
                .map_err(|_| AppError::Internal("catalog lock poisoned".to_string()))?;
            *current = slot.clone();
        }

        match slot {
            CatalogSlot::Ready(snapshot) => Ok(snapshot),
            CatalogSlot::Failed(e) => Err(AppError::Load(e)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn state(sources: &[String]) -> AppState {
        let sources = sources.join(",");
        let config = StorefrontConfig::from_lookup(|key| match key {
            "MODSHELF_SITE_URL" => Some("https://shop.example/".to_string()),
            "MODSHELF_SOURCES" => Some(sources.clone()),
            _ => None,
        })
        .unwrap();
        AppState::with_store(config, Arc::new(MemoryStore::new())).unwrap()
    }

    #[tokio::test]
    async fn test_unloaded_state_is_not_ready() {
        let state = state(&["/nonexistent/modshelf.json".to_string()]);
        assert!(!state.is_ready());
        assert!(matches!(
            state.snapshot(),
            Err(AppError::Load(LoadError::NotLoaded))
        ));
    }

    #[tokio::test]
    async fn test_reload_swaps_snapshot() {
        let dir = std::env::temp_dir().join(format!("modshelf-state-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("a.json");
        std::fs::write(&path, r#"[{"name": "A", "type": "x"}]"#).unwrap();

        let state = state(&[path.display().to_string()]);
        let first = state.reload().await.unwrap();
        assert_eq!(first.catalog.len(), 1);
        assert!(state.is_ready());

        std::fs::write(&path, r#"[{"name": "A", "type": "x"}, {"name": "B", "type": "y"}]"#)
            .unwrap();
        let second = state.reload().await.unwrap();
        assert_eq!(second.catalog.len(), 2);
        assert_eq!(first.catalog.len(), 1);
        assert_eq!(second.report.sources.len(), 1);
        assert_eq!(second.report.failed(), 0);
        assert!(second.loaded_at >= first.loaded_at);
    }

    #[tokio::test]
    async fn test_failed_reload_reports_error() {
        let state = state(&["/nonexistent/modshelf.json".to_string()]);
        let result = state.reload().await;
        assert!(matches!(
            result,
            Err(AppError::Load(LoadError::AllSourcesFailed(1)))
        ));
        assert!(!state.is_ready());
    }
}
