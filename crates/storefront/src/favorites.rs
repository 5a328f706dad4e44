//! Favorites page projection.

use std::cmp::Ordering;

use modshelf_core::{Catalog, CatalogItem, Favorites, FavoritesSort};

use crate::views::MiniCardView;

/// What the favorites page shows.
#[derive(Debug, Clone)]
pub struct FavoritesPage {
    /// Saved names, matched or not.
    pub total: usize,
    pub cards: Vec<MiniCardView>,
    /// Nothing saved at all.
    pub empty: bool,
    /// Something saved, but the search matched none of it.
    pub no_results: bool,
}

impl FavoritesPage {
    /// Project the catalog onto the saved names, then search and sort.
    #[must_use]
    pub fn new(catalog: &Catalog, favorites: &Favorites, query: &str, sort: FavoritesSort) -> Self {
        let query = query.trim().to_lowercase();

        let mut items: Vec<&CatalogItem> = catalog
            .items()
            .iter()
            .filter(|item| favorites.contains(&item.name))
            .filter(|item| query.is_empty() || matches_query(item, &query))
            .collect();
        items.sort_by(|a, b| compare(a, b, sort));

        let total = favorites.len();
        Self {
            total,
            empty: total == 0,
            no_results: total > 0 && items.is_empty() && !query.is_empty(),
            cards: items.into_iter().map(card).collect(),
        }
    }

    /// `"No saved tools yet"` or `"N saved tool(s)"`.
    #[must_use]
    pub fn count_text(&self) -> String {
        match self.total {
            0 => "No saved tools yet".to_string(),
            1 => "1 saved tool".to_string(),
            n => format!("{n} saved tools"),
        }
    }
}

fn matches_query(item: &CatalogItem, query: &str) -> bool {
    item.name.to_lowercase().contains(query)
        || item
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(query))
        || item.kind.to_lowercase().contains(query)
        || item.tags.join(" ").to_lowercase().contains(query)
}

fn compare(a: &CatalogItem, b: &CatalogItem, sort: FavoritesSort) -> Ordering {
    match sort {
        FavoritesSort::Name => a.key().cmp(&b.key()),
        FavoritesSort::NameDesc => b.key().cmp(&a.key()),
        FavoritesSort::Type => a
            .kind_key()
            .cmp(&b.kind_key())
            .then_with(|| a.key().cmp(&b.key())),
    }
}

fn card(item: &CatalogItem) -> MiniCardView {
    MiniCardView {
        description: item.description_or_default().to_string(),
        ..MiniCardView::new(item, 3, None)
    }
}
