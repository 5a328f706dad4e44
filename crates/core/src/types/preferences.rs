//! Preference value types.
//!
//! These are the values a visitor's choices are persisted as: sort mode,
//! active category filters, recent search history, favorites, and theme.
//! Each type is a plain value with serde support; persistence lives with
//! the storefront.

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Sort modes
// =============================================================================

/// Catalog sort mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// Recent items first, then by name. Keeps rank order when searching.
    #[default]
    Name,
    /// Newest release first.
    ReleaseDate,
    /// Most recently updated first.
    UpdateDate,
    /// Only promoted items, biggest discount first.
    Discount,
}

impl SortMode {
    pub const ALL: [Self; 4] = [
        Self::Name,
        Self::ReleaseDate,
        Self::UpdateDate,
        Self::Discount,
    ];

    /// Parse a sort mode, falling back to [`SortMode::Name`].
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "release_date" => Self::ReleaseDate,
            "update_date" => Self::UpdateDate,
            "discount" => Self::Discount,
            _ => Self::Name,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::ReleaseDate => "release_date",
            Self::UpdateDate => "update_date",
            Self::Discount => "discount",
        }
    }

    /// Label for the sort selector.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::ReleaseDate => "Newest",
            Self::UpdateDate => "Recently updated",
            Self::Discount => "Deals",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort order of the favorites page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FavoritesSort {
    #[default]
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "name-desc")]
    NameDesc,
    /// By type, then by name.
    #[serde(rename = "type")]
    Type,
}

impl FavoritesSort {
    pub const ALL: [Self; 3] = [Self::Name, Self::NameDesc, Self::Type];

    /// Parse a sort order, falling back to [`FavoritesSort::Name`].
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "name-desc" => Self::NameDesc,
            "type" => Self::Type,
            _ => Self::Name,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::NameDesc => "name-desc",
            Self::Type => "type",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Name => "Name (A-Z)",
            Self::NameDesc => "Name (Z-A)",
            Self::Type => "Type",
        }
    }
}

// =============================================================================
// Category filters
// =============================================================================

/// Category label meaning "no filter".
pub const ALL_CATEGORIES: &str = "all";

/// Active category filters.
///
/// Stored as lowercase labels. `["all"]` and the empty set both mean no
/// filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct FilterSet(Vec<String>);

impl Default for FilterSet {
    fn default() -> Self {
        Self(vec![ALL_CATEGORIES.to_string()])
    }
}

impl FilterSet {
    /// No filtering.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Whether no category filter is active.
    #[must_use]
    pub fn is_all(&self) -> bool {
        self.0.is_empty() || self.0.iter().any(|c| c == ALL_CATEGORIES)
    }

    /// Whether `kind` passes the filter.
    #[must_use]
    pub fn matches(&self, kind: &str) -> bool {
        self.is_all() || self.contains(kind)
    }

    /// Whether `category` is explicitly selected.
    #[must_use]
    pub fn contains(&self, category: &str) -> bool {
        let category = category.trim().to_lowercase();
        self.0.iter().any(|c| *c == category)
    }

    /// Selected categories, excluding `all`.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .map(String::as_str)
            .filter(|c| *c != ALL_CATEGORIES)
    }

    /// Toggle a category button.
    ///
    /// `all` clears every selection. Toggling a category adds or removes it;
    /// removing the last one returns to `all`.
    pub fn toggle(&mut self, category: &str) {
        let category = category.trim().to_lowercase();
        if category.is_empty() || category == ALL_CATEGORIES {
            *self = Self::all();
            return;
        }

        self.0.retain(|c| c != ALL_CATEGORIES);
        if let Some(pos) = self.0.iter().position(|c| *c == category) {
            self.0.remove(pos);
        } else {
            self.0.push(category);
        }

        if self.0.is_empty() {
            *self = Self::all();
        }
    }
}

impl From<Vec<String>> for FilterSet {
    fn from(values: Vec<String>) -> Self {
        let mut categories: Vec<String> = Vec::with_capacity(values.len());
        for value in values {
            let value = value.trim().to_lowercase();
            if !value.is_empty() && !categories.contains(&value) {
                categories.push(value);
            }
        }
        if categories.is_empty() || categories.iter().any(|c| c == ALL_CATEGORIES) {
            return Self::all();
        }
        Self(categories)
    }
}

impl From<FilterSet> for Vec<String> {
    fn from(set: FilterSet) -> Self {
        set.0
    }
}

// =============================================================================
// Recent searches
// =============================================================================

/// Bounded history of recent searches, most recent first.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct RecentSearches(Vec<String>);

impl RecentSearches {
    /// Maximum number of remembered searches.
    pub const MAX: usize = 5;

    /// Record a search, moving it to the front.
    ///
    /// Blank input is ignored. Duplicates are compared case-insensitively.
    pub fn record(&mut self, term: &str) {
        let term = term.trim();
        if term.is_empty() {
            return;
        }
        let lowered = term.to_lowercase();
        self.0.retain(|existing| existing.to_lowercase() != lowered);
        self.0.insert(0, term.to_string());
        self.0.truncate(Self::MAX);
    }

    /// Whether `name` is among the recent searches (case-insensitive).
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        let name = name.trim().to_lowercase();
        self.0.iter().any(|term| term.to_lowercase() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for RecentSearches {
    fn from(values: Vec<String>) -> Self {
        let mut recent = Self::default();
        // Rebuild oldest first so the stored order is kept.
        for value in values.iter().take(Self::MAX).rev() {
            recent.record(value);
        }
        recent
    }
}

impl From<RecentSearches> for Vec<String> {
    fn from(recent: RecentSearches) -> Self {
        recent.0
    }
}

// =============================================================================
// Favorites
// =============================================================================

/// Ordered set of favorited item names.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Favorites(Vec<String>);

impl Favorites {
    /// Whether `name` is a favorite (case-insensitive).
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Add `name` when absent, remove it when present.
    ///
    /// Returns whether the item is a favorite afterwards.
    pub fn toggle(&mut self, name: &str) -> bool {
        if let Some(pos) = self.position(name) {
            self.0.remove(pos);
            false
        } else if name.trim().is_empty() {
            false
        } else {
            self.0.push(name.trim().to_string());
            true
        }
    }

    /// Remove `name`. Returns whether it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        self.position(name).map(|pos| self.0.remove(pos)).is_some()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        let name = name.trim().to_lowercase();
        self.0.iter().position(|fav| fav.to_lowercase() == name)
    }
}

impl From<Vec<String>> for Favorites {
    fn from(values: Vec<String>) -> Self {
        let mut favorites = Self::default();
        for value in values {
            if !favorites.contains(&value) && !value.trim().is_empty() {
                favorites.0.push(value.trim().to_string());
            }
        }
        favorites
    }
}

impl From<Favorites> for Vec<String> {
    fn from(favorites: Favorites) -> Self {
        favorites.0
    }
}

// =============================================================================
// Theme
// =============================================================================

/// Color theme. An unset theme follows the system preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// The opposite theme.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_mode_parse_fallback() {
        assert_eq!(SortMode::parse("discount"), SortMode::Discount);
        assert_eq!(SortMode::parse("release_date"), SortMode::ReleaseDate);
        assert_eq!(SortMode::parse("popularity"), SortMode::Name);
        for mode in SortMode::ALL {
            assert_eq!(SortMode::parse(mode.as_str()), mode);
        }
    }

    #[test]
    fn test_favorites_sort_parse() {
        assert_eq!(FavoritesSort::parse("name-desc"), FavoritesSort::NameDesc);
        assert_eq!(FavoritesSort::parse("bogus"), FavoritesSort::Name);
    }

    #[test]
    fn test_filter_all_equals_empty() {
        let all = FilterSet::all();
        let empty = FilterSet(Vec::new());
        assert!(all.is_all());
        assert!(empty.is_all());
        assert!(all.matches("bots"));
        assert!(empty.matches("bots"));
    }

    #[test]
    fn test_filter_toggle() {
        let mut filters = FilterSet::all();
        filters.toggle("Bots");
        assert!(!filters.is_all());
        assert!(filters.matches("bots"));
        assert!(!filters.matches("scripts"));

        filters.toggle("scripts");
        assert_eq!(filters.categories().collect::<Vec<_>>(), vec!["bots", "scripts"]);

        filters.toggle("bots");
        filters.toggle("scripts");
        assert!(filters.is_all());
    }

    #[test]
    fn test_filter_all_clears() {
        let mut filters = FilterSet::all();
        filters.toggle("bots");
        filters.toggle("all");
        assert_eq!(filters, FilterSet::all());
    }

    #[test]
    fn test_filter_from_stored_list() {
        let stored = FilterSet::from(vec!["Bots".into(), "all".into()]);
        assert!(stored.is_all());
        let stored = FilterSet::from(vec!["Bots".into(), "bots".into()]);
        assert_eq!(stored.categories().count(), 1);
    }

    #[test]
    fn test_recent_bounded_and_deduped() {
        let mut recent = RecentSearches::default();
        for term in ["a", "b", "c", "d", "e", "f"] {
            recent.record(term);
        }
        assert_eq!(recent.len(), RecentSearches::MAX);
        assert_eq!(recent.iter().next(), Some("f"));
        assert!(!recent.contains("a"));

        recent.record("D");
        assert_eq!(recent.iter().collect::<Vec<_>>(), vec!["D", "f", "e", "c", "b"]);
    }

    #[test]
    fn test_recent_ignores_blank() {
        let mut recent = RecentSearches::default();
        recent.record("   ");
        assert!(recent.is_empty());
    }

    #[test]
    fn test_recent_from_stored_keeps_order() {
        let stored = RecentSearches::from(vec!["x".into(), "y".into(), "X".into()]);
        assert_eq!(stored.iter().collect::<Vec<_>>(), vec!["x", "y"]);
    }

    #[test]
    fn test_favorites_double_toggle_restores() {
        let mut favorites = Favorites::from(vec!["Alpha".to_string()]);
        let before = favorites.clone();
        assert!(favorites.toggle("Beta"));
        assert!(!favorites.toggle("beta"));
        assert_eq!(favorites, before);

        assert!(!favorites.toggle("alpha"));
        assert!(favorites.toggle("Alpha"));
        assert_eq!(favorites, before);
    }

    #[test]
    fn test_favorites_remove_and_clear() {
        let mut favorites = Favorites::from(vec!["A".into(), "B".into()]);
        assert!(favorites.remove("a"));
        assert!(!favorites.remove("a"));
        favorites.clear();
        assert!(favorites.is_empty());
    }

    #[test]
    fn test_favorites_serde_shape() {
        let favorites = Favorites::from(vec!["A".into(), "a".into(), "B".into()]);
        let json = serde_json::to_string(&favorites).unwrap();
        assert_eq!(json, r#"["A","B"]"#);
    }

    #[test]
    fn test_theme_toggle() {
        assert_eq!(Theme::parse("dark"), Some(Theme::Dark));
        assert_eq!(Theme::parse("auto"), None);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
    }
}
