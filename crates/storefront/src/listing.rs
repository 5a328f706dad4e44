//! Listing pipeline: filter, search, sort, then batch.

use chrono::{DateTime, Utc};
use modshelf_core::{Catalog, CatalogItem, FilterSet, RecentSearches, SortMode};
use rust_decimal::Decimal;

use crate::search::{self, SearchError, SearchIndex};

/// Inputs of one listing.
#[derive(Debug, Clone, Copy)]
pub struct ListingQuery<'a> {
    pub query: &'a str,
    pub filters: &'a FilterSet,
    pub sort: SortMode,
    pub recent: &'a RecentSearches,
    pub now: DateTime<Utc>,
}

impl ListingQuery<'_> {
    fn has_query(&self) -> bool {
        !self.query.trim().is_empty()
    }
}

/// Compute the ordered catalog positions for a listing.
///
/// With a query, the ranked results are intersected with the category
/// filter, keeping rank order.
///
/// # Errors
///
/// Returns an error if the search index fails.
pub fn listing(
    catalog: &Catalog,
    index: &SearchIndex,
    q: &ListingQuery<'_>,
) -> Result<Vec<usize>, SearchError> {
    let items = catalog.items();
    let ranked = search::rank(catalog, index, q.query, q.recent)?;

    let mut positions: Vec<usize> = ranked
        .into_iter()
        .map(|hit| hit.position)
        .filter(|&p| items.get(p).is_some_and(|item| q.filters.matches(&item.kind)))
        .collect();

    sort(items, &mut positions, q);
    Ok(positions)
}

fn sort(items: &[CatalogItem], positions: &mut Vec<usize>, q: &ListingQuery<'_>) {
    let item = |p: usize| &items[p];

    match q.sort {
        SortMode::Name => {
            if !q.has_query() {
                positions.sort_by(|&a, &b| {
                    let (a, b) = (item(a), item(b));
                    b.is_recent(q.now)
                        .cmp(&a.is_recent(q.now))
                        .then_with(|| a.key().cmp(&b.key()))
                });
            }
        }
        SortMode::ReleaseDate => {
            positions.sort_by(|&a, &b| item(b).released_at().cmp(&item(a).released_at()));
        }
        SortMode::UpdateDate => {
            positions.sort_by(|&a, &b| item(b).updated_at().cmp(&item(a).updated_at()));
        }
        SortMode::Discount => {
            positions.retain(|&p| item(p).is_promoted(q.now));
            positions.sort_by(|&a, &b| {
                discount_value(item(b), q.now).cmp(&discount_value(item(a), q.now))
            });
        }
    }
}

/// Numeric discount used for ordering; zero when absent or inactive.
fn discount_value(item: &CatalogItem, now: DateTime<Utc>) -> Decimal {
    if item.discount_active(now) {
        item.discount_percent().unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    }
}

// =============================================================================
// Batching
// =============================================================================

/// One incremental slice of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub positions: Vec<usize>,
    pub offset: usize,
    pub total: usize,
    /// Offset of the following batch, if anything remains.
    pub next_offset: Option<usize>,
}

impl Batch {
    /// Slice `results` starting at `offset`.
    #[must_use]
    pub fn slice(results: &[usize], offset: usize, size: usize) -> Self {
        let total = results.len();
        let start = offset.min(total);
        let end = start.saturating_add(size.max(1)).min(total);
        Self {
            positions: results[start..end].to_vec(),
            offset: start,
            total,
            next_offset: (end < total).then_some(end),
        }
    }

    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.next_offset.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        "2026-03-10T12:00:00Z".parse().unwrap()
    }

    fn catalog() -> Catalog {
        let (catalog, _) = Catalog::merge_values(vec![vec![
            json!({"name": "Zeta Bot", "type": "bots", "release_date": "2026-03-08"}),
            json!({"name": "Alpha Bot", "type": "bots", "release_date": "2025-01-01",
                   "discount": "25", "discount_expiry": "2026-04-01"}),
            json!({"name": "Card Checker", "type": "checkers", "update_date": "2026-02-01",
                   "discount": 50, "discount_expiry": "2026-03-01"}),
            json!({"name": "Netflix Cookies", "type": "cookies", "offer": "Buy 2 get 1"}),
            json!({"name": "Methods Pack", "type": "methods", "discount": "10% off"}),
        ]]);
        catalog
    }

    fn run(catalog: &Catalog, query: &str, filters: &FilterSet, sort: SortMode) -> Vec<String> {
        let index = SearchIndex::build(catalog).unwrap();
        let recent = RecentSearches::default();
        let q = ListingQuery {
            query,
            filters,
            sort,
            recent: &recent,
            now: now(),
        };
        listing(catalog, &index, &q)
            .unwrap()
            .into_iter()
            .map(|p| catalog.items()[p].name.clone())
            .collect()
    }

    #[test]
    fn test_name_sort_puts_recent_first() {
        let names = run(&catalog(), "", &FilterSet::all(), SortMode::Name);
        assert_eq!(
            names,
            vec!["Zeta Bot", "Alpha Bot", "Card Checker", "Methods Pack", "Netflix Cookies"]
        );
    }

    #[test]
    fn test_all_filter_equals_no_filter() {
        let catalog = catalog();
        let all = run(&catalog, "", &FilterSet::all(), SortMode::Name);
        let empty: FilterSet = serde_json::from_str("[]").unwrap();
        assert_eq!(run(&catalog, "", &empty, SortMode::Name), all);
    }

    #[test]
    fn test_query_intersects_filters_in_rank_order() {
        let mut filters = FilterSet::all();
        filters.toggle("bots");
        let names = run(&catalog(), "bot", &filters, SortMode::Name);
        assert_eq!(names, vec!["Zeta Bot", "Alpha Bot"]);

        let mut filters = FilterSet::all();
        filters.toggle("checkers");
        assert!(run(&catalog(), "bot", &filters, SortMode::Name).is_empty());
    }

    #[test]
    fn test_release_date_missing_is_oldest() {
        let names = run(&catalog(), "", &FilterSet::all(), SortMode::ReleaseDate);
        assert_eq!(&names[..2], &["Zeta Bot", "Alpha Bot"]);
    }

    #[test]
    fn test_update_date_sort() {
        let names = run(&catalog(), "", &FilterSet::all(), SortMode::UpdateDate);
        assert_eq!(names[0], "Card Checker");
    }

    #[test]
    fn test_discount_sort_skips_expired() {
        let names = run(&catalog(), "", &FilterSet::all(), SortMode::Discount);
        assert_eq!(names, vec!["Alpha Bot", "Methods Pack", "Netflix Cookies"]);
        assert!(!names.contains(&"Card Checker".to_string()));
    }

    #[test]
    fn test_recent_window() {
        let catalog = catalog();
        let item = catalog.find("zeta bot").unwrap();
        assert!(item.is_recent(now()));
        assert!(!item.is_recent(now() + Duration::days(30)));
    }

    #[test]
    fn test_batches() {
        let results: Vec<usize> = (0..45).collect();
        let first = Batch::slice(&results, 0, 20);
        assert_eq!(first.positions.len(), 20);
        assert_eq!(first.next_offset, Some(20));

        let last = Batch::slice(&results, 40, 20);
        assert_eq!(last.positions, vec![40, 41, 42, 43, 44]);
        assert!(!last.has_more());

        let past = Batch::slice(&results, 100, 20);
        assert!(past.positions.is_empty());
        assert_eq!(past.offset, 45);
    }
}
