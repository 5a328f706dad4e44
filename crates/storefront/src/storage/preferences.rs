//! Typed preference keys over a [`KeyValueStore`].
//!
//! Values are stored the way a browser would keep them in `localStorage`:
//! plain strings for the search text, sort mode, theme, and banner flag, and
//! JSON arrays for filters, recent searches, and favorites. A value that
//! cannot be read falls back to its default.

use std::sync::Arc;

use modshelf_core::{Favorites, FilterSet, RecentSearches, SortMode, Theme};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::{KeyValueStore, StorageError};

pub const THEME_KEY: &str = "theme";
pub const SEARCH_KEY: &str = "fmp_search";
pub const SORT_KEY: &str = "fmp_sort";
pub const FILTERS_KEY: &str = "fmp_filters";
pub const BANNER_KEY: &str = "hideBanner";
pub const RECENTS_KEY: &str = "recentSearches";
pub const FAVORITES_KEY: &str = "fmp_favorites";
pub const VERSION_KEY: &str = "fmp_storage_version";

/// Current storage schema version. Bump on incompatible key or format changes.
pub const STORAGE_VERSION: &str = "1";

/// Every key owned by the app, excluding the version key.
pub const ALL_APP_KEYS: &[&str] = &[
    THEME_KEY,
    SEARCH_KEY,
    SORT_KEY,
    FILTERS_KEY,
    BANNER_KEY,
    RECENTS_KEY,
    FAVORITES_KEY,
];

/// The visitor's persisted preferences.
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for Preferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preferences").finish_non_exhaustive()
    }
}

impl Preferences {
    /// Wrap a store, wiping app keys if they were written by another schema
    /// version.
    ///
    /// # Errors
    ///
    /// Returns an error if the version check cannot read or write the store.
    pub fn open(store: Arc<dyn KeyValueStore>) -> Result<Self, StorageError> {
        let prefs = Self { store };
        let saved = prefs.store.get(VERSION_KEY)?;
        if saved.as_deref() != Some(STORAGE_VERSION) {
            prefs.clear_app_keys()?;
            info!(
                from = saved.as_deref().unwrap_or("none"),
                to = STORAGE_VERSION,
                "Preference storage reset"
            );
        }
        Ok(prefs)
    }

    /// Remove every app key and rewrite the version.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn reset(&self) -> Result<(), StorageError> {
        self.clear_app_keys()
    }

    fn clear_app_keys(&self) -> Result<(), StorageError> {
        for key in ALL_APP_KEYS {
            self.store.remove(key)?;
        }
        self.store.set(VERSION_KEY, STORAGE_VERSION)
    }

    // =========================================================================
    // Raw access
    // =========================================================================

    fn text(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                debug!(key, error = %e, "Preference unreadable, using default");
                None
            }
        }
    }

    fn json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.text(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(key, error = %e, "Malformed preference, using default");
                None
            }
        }
    }

    fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        self.store.set(key, &serde_json::to_string(value)?)
    }

    // =========================================================================
    // Theme
    // =========================================================================

    /// Stored theme; `None` follows the system preference.
    #[must_use]
    pub fn theme(&self) -> Option<Theme> {
        self.text(THEME_KEY).and_then(|raw| Theme::parse(&raw))
    }

    /// Store a theme.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn set_theme(&self, theme: Theme) -> Result<(), StorageError> {
        self.store.set(THEME_KEY, theme.as_str())
    }

    // =========================================================================
    // Search, sort, filters
    // =========================================================================

    #[must_use]
    pub fn search(&self) -> String {
        self.text(SEARCH_KEY).unwrap_or_default()
    }

    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn set_search(&self, query: &str) -> Result<(), StorageError> {
        self.store.set(SEARCH_KEY, query)
    }

    #[must_use]
    pub fn sort(&self) -> SortMode {
        self.text(SORT_KEY)
            .map(|raw| SortMode::parse(&raw))
            .unwrap_or_default()
    }

    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn set_sort(&self, sort: SortMode) -> Result<(), StorageError> {
        self.store.set(SORT_KEY, sort.as_str())
    }

    #[must_use]
    pub fn filters(&self) -> FilterSet {
        self.json(FILTERS_KEY).unwrap_or_default()
    }

    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn set_filters(&self, filters: &FilterSet) -> Result<(), StorageError> {
        self.set_json(FILTERS_KEY, filters)
    }

    /// Toggle a category filter and return the new selection.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn toggle_filter(&self, category: &str) -> Result<FilterSet, StorageError> {
        let mut filters = self.filters();
        filters.toggle(category);
        self.set_filters(&filters)?;
        Ok(filters)
    }

    // =========================================================================
    // Banner
    // =========================================================================

    #[must_use]
    pub fn banner_hidden(&self) -> bool {
        self.text(BANNER_KEY).is_some_and(|v| !v.is_empty())
    }

    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn hide_banner(&self) -> Result<(), StorageError> {
        self.store.set(BANNER_KEY, "1")
    }

    // =========================================================================
    // Recent searches
    // =========================================================================

    #[must_use]
    pub fn recent(&self) -> RecentSearches {
        self.json(RECENTS_KEY).unwrap_or_default()
    }

    /// Move `term` to the front of the recent search history.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn record_recent(&self, term: &str) -> Result<RecentSearches, StorageError> {
        let mut recent = self.recent();
        recent.record(term);
        self.set_json(RECENTS_KEY, &recent)?;
        Ok(recent)
    }

    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn clear_recent(&self) -> Result<(), StorageError> {
        self.store.remove(RECENTS_KEY)
    }

    // =========================================================================
    // Favorites
    // =========================================================================

    #[must_use]
    pub fn favorites(&self) -> Favorites {
        self.json(FAVORITES_KEY).unwrap_or_default()
    }

    /// Toggle a favorite. Returns whether the item is a favorite afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn toggle_favorite(&self, name: &str) -> Result<bool, StorageError> {
        let mut favorites = self.favorites();
        let now_favorite = favorites.toggle(name);
        self.set_json(FAVORITES_KEY, &favorites)?;
        Ok(now_favorite)
    }

    /// Remove a single favorite. Returns whether it was present.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn remove_favorite(&self, name: &str) -> Result<bool, StorageError> {
        let mut favorites = self.favorites();
        let removed = favorites.remove(name);
        if removed {
            self.set_json(FAVORITES_KEY, &favorites)?;
        }
        Ok(removed)
    }

    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn clear_favorites(&self) -> Result<(), StorageError> {
        self.set_json(FAVORITES_KEY, &Favorites::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn prefs() -> (Arc<MemoryStore>, Preferences) {
        let store = Arc::new(MemoryStore::new());
        let prefs = Preferences::open(store.clone()).unwrap();
        (store, prefs)
    }

    #[test]
    fn test_defaults() {
        let (_, prefs) = prefs();
        assert_eq!(prefs.search(), "");
        assert_eq!(prefs.sort(), SortMode::Name);
        assert!(prefs.filters().is_all());
        assert!(!prefs.banner_hidden());
        assert!(prefs.recent().is_empty());
        assert!(prefs.favorites().is_empty());
        assert_eq!(prefs.theme(), None);
    }

    #[test]
    fn test_version_mismatch_wipes_app_keys() {
        let store = Arc::new(MemoryStore::new());
        store.set(VERSION_KEY, "0").unwrap();
        store.set(FAVORITES_KEY, r#"["A"]"#).unwrap();
        store.set(THEME_KEY, "dark").unwrap();
        store.set("unrelated", "kept").unwrap();

        let prefs = Preferences::open(store.clone()).unwrap();
        assert!(prefs.favorites().is_empty());
        assert_eq!(prefs.theme(), None);
        assert_eq!(store.get(VERSION_KEY).unwrap().as_deref(), Some(STORAGE_VERSION));
        assert_eq!(store.get("unrelated").unwrap().as_deref(), Some("kept"));
    }

    #[test]
    fn test_matching_version_keeps_keys() {
        let store = Arc::new(MemoryStore::new());
        store.set(VERSION_KEY, STORAGE_VERSION).unwrap();
        store.set(SORT_KEY, "discount").unwrap();

        let prefs = Preferences::open(store).unwrap();
        assert_eq!(prefs.sort(), SortMode::Discount);
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let (store, prefs) = prefs();
        store.set(FILTERS_KEY, "{not json").unwrap();
        store.set(FAVORITES_KEY, "42").unwrap();
        store.set(SORT_KEY, "sideways").unwrap();

        assert!(prefs.filters().is_all());
        assert!(prefs.favorites().is_empty());
        assert_eq!(prefs.sort(), SortMode::Name);

        store.set(FILTERS_KEY, "[]").unwrap();
        assert!(prefs.filters().is_all());
    }

    #[test]
    fn test_favorite_double_toggle_restores_stored_list() {
        let (store, prefs) = prefs();
        prefs.toggle_favorite("Alpha").unwrap();
        let before = store.get(FAVORITES_KEY).unwrap();

        assert!(prefs.toggle_favorite("Beta").unwrap());
        assert!(!prefs.toggle_favorite("Beta").unwrap());
        assert_eq!(store.get(FAVORITES_KEY).unwrap(), before);
    }

    #[test]
    fn test_filter_toggle_persists() {
        let (store, prefs) = prefs();
        prefs.toggle_filter("Bots").unwrap();
        assert_eq!(store.get(FILTERS_KEY).unwrap().as_deref(), Some(r#"["bots"]"#));
        prefs.toggle_filter("bots").unwrap();
        assert_eq!(store.get(FILTERS_KEY).unwrap().as_deref(), Some(r#"["all"]"#));
    }

    #[test]
    fn test_recent_history() {
        let (_, prefs) = prefs();
        for term in ["one", "two", "three", "four", "five", "six"] {
            prefs.record_recent(term).unwrap();
        }
        let recent = prefs.recent();
        assert_eq!(recent.len(), 5);
        assert_eq!(recent.iter().next(), Some("six"));

        prefs.clear_recent().unwrap();
        assert!(prefs.recent().is_empty());
    }

    #[test]
    fn test_reset() {
        let (store, prefs) = prefs();
        prefs.hide_banner().unwrap();
        prefs.set_theme(Theme::Dark).unwrap();
        prefs.set_search("bot").unwrap();

        prefs.reset().unwrap();
        assert!(!prefs.banner_hidden());
        assert_eq!(prefs.theme(), None);
        assert_eq!(prefs.search(), "");
        assert_eq!(store.get(VERSION_KEY).unwrap().as_deref(), Some(STORAGE_VERSION));
    }
}
