//! Merged item catalog.
//!
//! A catalog is built from several sources, each a list of raw JSON items.
//! Sources are merged in order; items without a name or type are dropped and
//! the first occurrence of a name (compared case-insensitively) wins.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use serde_json::Value;

use crate::types::CatalogItem;

/// Counters describing a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    /// Items kept.
    pub merged: usize,
    /// Items dropped because their name was already taken.
    pub duplicates: usize,
    /// Items dropped because they were malformed.
    pub invalid: usize,
}

/// Number of items in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    /// Lowercase category label.
    pub key: String,
    pub count: usize,
}

/// Immutable, deduplicated list of catalog items in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    /// Merge raw sources in order.
    #[must_use]
    pub fn merge_values<I>(sources: I) -> (Self, MergeStats)
    where
        I: IntoIterator<Item = Vec<Value>>,
    {
        let mut items = Vec::new();
        let mut seen = HashSet::new();
        let mut stats = MergeStats::default();

        for value in sources.into_iter().flatten() {
            let Some(item) = CatalogItem::from_value(value) else {
                stats.invalid += 1;
                continue;
            };
            if seen.insert(item.key()) {
                items.push(item);
            } else {
                stats.duplicates += 1;
            }
        }

        stats.merged = items.len();
        (Self { items }, stats)
    }

    #[must_use]
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up an item by name, ignoring case.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.is_named(name))
    }

    /// Per-category item counts, sorted by category label.
    #[must_use]
    pub fn categories(&self) -> Vec<CategoryCount> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for item in &self.items {
            *counts.entry(item.kind_key()).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(key, count)| CategoryCount { key, count })
            .collect()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a CatalogItem;
    type IntoIter = std::slice::Iter<'a, CatalogItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_three_sources() {
        let sources = vec![
            vec![json!({"name": "A", "type": "x"})],
            vec![json!({"name": "a", "type": "y"})],
            vec![json!({"name": "B", "type": "x"})],
        ];
        let (catalog, stats) = Catalog::merge_values(sources);
        let names: Vec<&str> = catalog.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(catalog.find("a").unwrap().kind, "x");
        assert_eq!(stats, MergeStats { merged: 2, duplicates: 1, invalid: 0 });
    }

    #[test]
    fn test_merge_drops_invalid() {
        let sources = vec![vec![
            json!({"name": "A"}),
            json!("loose string"),
            json!({"name": "", "type": "x"}),
            json!({"name": "B", "type": "x"}),
        ]];
        let (catalog, stats) = Catalog::merge_values(sources);
        assert_eq!(catalog.len(), 1);
        assert_eq!(stats.invalid, 3);
    }

    #[test]
    fn test_dedup_keeps_exactly_one() {
        let sources = vec![vec![
            json!({"name": "Tool", "type": "x"}),
            json!({"name": "TOOL", "type": "x"}),
            json!({"name": "tool", "type": "x"}),
        ]];
        let (catalog, _) = Catalog::merge_values(sources);
        assert_eq!(
            catalog.items().iter().filter(|i| i.is_named("tool")).count(),
            1
        );
    }

    #[test]
    fn test_categories_sorted_with_counts() {
        let sources = vec![vec![
            json!({"name": "A", "type": "Scripts"}),
            json!({"name": "B", "type": "bots"}),
            json!({"name": "C", "type": "scripts"}),
        ]];
        let (catalog, _) = Catalog::merge_values(sources);
        let categories = catalog.categories();
        assert_eq!(
            categories,
            vec![
                CategoryCount { key: "bots".into(), count: 1 },
                CategoryCount { key: "scripts".into(), count: 2 },
            ]
        );
    }

    #[test]
    fn test_find_ignores_case() {
        let (catalog, _) = Catalog::merge_values(vec![vec![
            json!({"name": "First", "type": "x"}),
            json!({"name": "Second", "type": "x"}),
        ]]);
        assert_eq!(catalog.find("second").map(|item| item.name.as_str()), Some("Second"));
        assert!(catalog.find("third").is_none());
    }
}
