//! Tiered catalog search.
//!
//! A query is matched in four tiers, each item appearing once in the
//! highest tier it reaches:
//!
//! 1. exact name match
//! 2. name prefix match
//! 3. substring match across name, keywords, and tags
//! 4. fuzzy match over weighted fields, using a Tantivy index
//!
//! Tiers 1-3 keep catalog order. The fuzzy tier is ordered by score, with
//! items the visitor searched for recently boosted.

mod highlight;
mod indexer;

use modshelf_core::{Catalog, CatalogItem, RecentSearches};
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, BoostQuery, FuzzyTermQuery, Occur, Query};
use tantivy::schema::{
    Field, INDEXED, IndexRecordOption, STORED, Schema, TextFieldIndexing, TextOptions, Value,
};
use tantivy::{IndexReader, ReloadPolicy, Term};
use tracing::instrument;

pub use highlight::{Highlighter, escape_html};
pub use indexer::build_index;

/// Tokenizer registered on every index.
pub(crate) const TOKENIZER: &str = "catalog";

/// Field weights for the fuzzy tier.
pub const NAME_WEIGHT: f32 = 1.0;
pub const KEYWORDS_WEIGHT: f32 = 0.6;
pub const TAGS_WEIGHT: f32 = 0.5;
pub const DESCRIPTION_WEIGHT: f32 = 0.3;
pub const LONG_DESCRIPTION_WEIGHT: f32 = 0.2;
pub const TYPE_WEIGHT: f32 = 0.1;
/// Extra weight for items named in the recent search history.
pub const RECENT_WEIGHT: f32 = 0.8;

/// Query terms shorter than this are ignored by the fuzzy tier.
pub const MIN_FUZZY_TERM_CHARS: usize = 2;

/// Autocomplete suggestion count.
pub const SUGGESTION_LIMIT: usize = 6;

/// Matching tier of a search hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    Exact,
    Prefix,
    Substring,
    Fuzzy,
    /// Empty query; everything matches.
    All,
}

/// One ranked item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Position of the item in catalog order.
    pub position: usize,
    pub tier: Tier,
    /// Fuzzy score; zero outside the fuzzy tier.
    pub score: f32,
}

/// Schema field handles for the search index.
#[derive(Clone)]
pub struct SearchFields {
    /// Catalog position, stored to map hits back to items.
    pub position: Field,
    pub name: Field,
    pub keywords: Field,
    pub tags: Field,
    pub description: Field,
    pub long_description: Field,
    pub kind: Field,
}

impl SearchFields {
    /// Searchable fields with their weights.
    fn weighted(&self) -> [(Field, f32); 6] {
        [
            (self.name, NAME_WEIGHT),
            (self.keywords, KEYWORDS_WEIGHT),
            (self.tags, TAGS_WEIGHT),
            (self.description, DESCRIPTION_WEIGHT),
            (self.long_description, LONG_DESCRIPTION_WEIGHT),
            (self.kind, TYPE_WEIGHT),
        ]
    }
}

/// In-memory fuzzy index over one catalog.
pub struct SearchIndex {
    reader: IndexReader,
    fields: SearchFields,
    len: usize,
}

impl std::fmt::Debug for SearchIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchIndex").field("len", &self.len).finish()
    }
}

impl SearchIndex {
    /// Index a catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if Tantivy fails to build or open the index.
    pub fn build(catalog: &Catalog) -> Result<Self, SearchError> {
        let (index, fields) = build_index(catalog)?;
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| SearchError::Index(format!("Failed to create reader: {e}")))?;

        Ok(Self {
            reader,
            fields,
            len: catalog.len(),
        })
    }

    /// Build the schema for the search index.
    pub(crate) fn build_schema() -> (Schema, SearchFields) {
        let mut schema_builder = Schema::builder();

        let position = schema_builder.add_u64_field("position", INDEXED | STORED);

        let text_indexing = TextFieldIndexing::default()
            .set_tokenizer(TOKENIZER)
            .set_index_option(IndexRecordOption::WithFreqs);
        let text_options = TextOptions::default().set_indexing_options(text_indexing);

        let name = schema_builder.add_text_field("name", text_options.clone());
        let keywords = schema_builder.add_text_field("keywords", text_options.clone());
        let tags = schema_builder.add_text_field("tags", text_options.clone());
        let description = schema_builder.add_text_field("description", text_options.clone());
        let long_description =
            schema_builder.add_text_field("long_description", text_options.clone());
        let kind = schema_builder.add_text_field("type", text_options);

        let fields = SearchFields {
            position,
            name,
            keywords,
            tags,
            description,
            long_description,
            kind,
        };

        (schema_builder.build(), fields)
    }

    /// Number of indexed items.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Fuzzy-match a query, returning `(position, score)` pairs by
    /// descending score.
    ///
    /// # Errors
    ///
    /// Returns an error if the search fails.
    pub fn fuzzy(&self, query: &str) -> Result<Vec<(usize, f32)>, SearchError> {
        let terms = query_terms(query);
        if terms.is_empty() || self.len == 0 {
            return Ok(Vec::new());
        }

        let mut subqueries: Vec<(Occur, Box<dyn Query>)> = Vec::new();
        for term in &terms {
            let distance = edit_distance(term);
            for (field, weight) in self.fields.weighted() {
                let term = Term::from_field_text(field, term);
                let fuzzy = FuzzyTermQuery::new_prefix(term, distance, true);
                subqueries.push((Occur::Should, Box::new(BoostQuery::new(Box::new(fuzzy), weight))));
            }
        }
        let query = BooleanQuery::new(subqueries);

        let searcher = self.reader.searcher();
        let top_docs = searcher
            .search(&query, &TopDocs::with_limit(self.len))
            .map_err(|e| SearchError::Query(format!("Search failed: {e}")))?;

        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let doc = searcher
                .doc::<tantivy::TantivyDocument>(address)
                .map_err(|e| SearchError::Query(format!("Failed to retrieve doc: {e}")))?;
            let position = doc
                .get_first(self.fields.position)
                .and_then(|v| v.as_u64())
                .and_then(|p| usize::try_from(p).ok())
                .ok_or_else(|| SearchError::Query("Document without position".to_string()))?;
            hits.push((position, score));
        }
        Ok(hits)
    }
}

/// Split a query the way the index tokenizer splits text.
fn query_terms(query: &str) -> Vec<String> {
    query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= MIN_FUZZY_TERM_CHARS)
        .map(str::to_lowercase)
        .collect()
}

/// Allowed edits for a term: none for very short terms, more for long ones.
fn edit_distance(term: &str) -> u8 {
    match term.chars().count() {
        0..=2 => 0,
        3..=6 => 1,
        _ => 2,
    }
}

// =============================================================================
// Ranking
// =============================================================================

/// Rank the catalog against a query.
///
/// An empty query returns every item in catalog order.
///
/// # Errors
///
/// Returns an error if the fuzzy tier fails.
#[instrument(skip(catalog, index, recent), fields(items = catalog.len()))]
pub fn rank(
    catalog: &Catalog,
    index: &SearchIndex,
    query: &str,
    recent: &RecentSearches,
) -> Result<Vec<Hit>, SearchError> {
    let q = query.trim().to_lowercase();
    let items = catalog.items();

    if q.is_empty() {
        return Ok((0..items.len())
            .map(|position| Hit {
                position,
                tier: Tier::All,
                score: 0.0,
            })
            .collect());
    }

    let mut tiers: Vec<Option<Tier>> = items.iter().map(|item| literal_tier(item, &q)).collect();
    let mut hits: Vec<Hit> = Vec::new();
    for tier in [Tier::Exact, Tier::Prefix, Tier::Substring] {
        hits.extend(
            tiers
                .iter()
                .enumerate()
                .filter(|(_, t)| **t == Some(tier))
                .map(|(position, _)| Hit {
                    position,
                    tier,
                    score: 0.0,
                }),
        );
    }

    let mut fuzzy: Vec<Hit> = index
        .fuzzy(&q)?
        .into_iter()
        .filter_map(|(position, score)| {
            let slot = tiers.get_mut(position)?;
            if slot.is_some() {
                return None;
            }
            *slot = Some(Tier::Fuzzy);
            let boosted = items
                .get(position)
                .filter(|item| recent.contains(&item.name))
                .map_or(score, |_| score * (1.0 + RECENT_WEIGHT));
            Some(Hit {
                position,
                tier: Tier::Fuzzy,
                score: boosted,
            })
        })
        .collect();
    fuzzy.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.position.cmp(&b.position))
    });
    hits.extend(fuzzy);

    Ok(hits)
}

/// Exact, prefix, or substring tier of an item, if any.
fn literal_tier(item: &CatalogItem, q: &str) -> Option<Tier> {
    let name = item.name.to_lowercase();
    if name == q {
        return Some(Tier::Exact);
    }
    if name.starts_with(q) {
        return Some(Tier::Prefix);
    }
    let in_list = |list: &[String]| list.join(" ").to_lowercase().contains(q);
    if name.contains(q) || in_list(&item.keywords) || in_list(&item.tags) {
        return Some(Tier::Substring);
    }
    None
}

/// Autocomplete: the first names of the ranking.
///
/// # Errors
///
/// Returns an error if ranking fails.
pub fn suggestions(
    catalog: &Catalog,
    index: &SearchIndex,
    query: &str,
    recent: &RecentSearches,
) -> Result<Vec<String>, SearchError> {
    if query.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(rank(catalog, index, query, recent)?
        .into_iter()
        .filter_map(|hit| catalog.items().get(hit.position))
        .take(SUGGESTION_LIMIT)
        .map(|item| item.name.clone())
        .collect())
}

/// Search errors.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Index error: {0}")]
    Index(String),
    #[error("Query error: {0}")]
    Query(String),
    #[error("Build error: {0}")]
    Build(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> Catalog {
        let (catalog, _) = Catalog::merge_values(vec![vec![
            json!({"name": "Bot Builder", "type": "bots", "tags": ["automation"]}),
            json!({"name": "Bot", "type": "bots"}),
            json!({"name": "Sniper Bot", "type": "bots", "keywords": "sniper, fast"}),
            json!({"name": "Card Checker", "type": "checkers", "tags": "bot, cards"}),
            json!({"name": "Netflix Cookies", "type": "cookies",
                   "description": "Premium streaming access"}),
            json!({"name": "Spotify Cookies", "type": "cookies",
                   "description": "Premium music streaming"}),
        ]]);
        catalog
    }

    fn names(catalog: &Catalog, hits: &[Hit]) -> Vec<String> {
        hits.iter()
            .map(|h| catalog.items()[h.position].name.clone())
            .collect()
    }

    #[test]
    fn test_empty_query_returns_all() {
        let catalog = catalog();
        let index = SearchIndex::build(&catalog).unwrap();
        let hits = rank(&catalog, &index, "   ", &RecentSearches::default()).unwrap();
        assert_eq!(hits.len(), catalog.len());
        assert!(hits.iter().all(|h| h.tier == Tier::All));
    }

    #[test]
    fn test_tier_order() {
        let catalog = catalog();
        let index = SearchIndex::build(&catalog).unwrap();
        let hits = rank(&catalog, &index, "BOT", &RecentSearches::default()).unwrap();
        let names = names(&catalog, &hits);
        assert_eq!(&names[..4], &["Bot", "Bot Builder", "Sniper Bot", "Card Checker"]);
        assert_eq!(hits[0].tier, Tier::Exact);
        assert_eq!(hits[1].tier, Tier::Prefix);
        assert_eq!(hits[2].tier, Tier::Substring);
        assert_eq!(hits[3].tier, Tier::Substring);
    }

    #[test]
    fn test_exact_name_ranks_first() {
        let catalog = catalog();
        let index = SearchIndex::build(&catalog).unwrap();
        for item in catalog.items() {
            let hits = rank(&catalog, &index, &item.name, &RecentSearches::default()).unwrap();
            assert_eq!(catalog.items()[hits[0].position].name, item.name);
        }
    }

    #[test]
    fn test_each_item_once() {
        let catalog = catalog();
        let index = SearchIndex::build(&catalog).unwrap();
        let hits = rank(&catalog, &index, "bot", &RecentSearches::default()).unwrap();
        let mut positions: Vec<usize> = hits.iter().map(|h| h.position).collect();
        positions.sort_unstable();
        positions.dedup();
        assert_eq!(positions.len(), hits.len());
    }

    #[test]
    fn test_fuzzy_tolerates_typos() {
        let catalog = catalog();
        let index = SearchIndex::build(&catalog).unwrap();
        let hits = rank(&catalog, &index, "spotfy", &RecentSearches::default()).unwrap();
        let names = names(&catalog, &hits);
        assert_eq!(names.first().map(String::as_str), Some("Spotify Cookies"));
        assert_eq!(hits[0].tier, Tier::Fuzzy);
    }

    #[test]
    fn test_fuzzy_matches_description() {
        let catalog = catalog();
        let index = SearchIndex::build(&catalog).unwrap();
        let hits = rank(&catalog, &index, "streaming", &RecentSearches::default()).unwrap();
        let names = names(&catalog, &hits);
        assert!(names.contains(&"Netflix Cookies".to_string()));
        assert!(names.contains(&"Spotify Cookies".to_string()));
    }

    #[test]
    fn test_recent_boost_reorders_fuzzy_tier() {
        let catalog = catalog();
        let index = SearchIndex::build(&catalog).unwrap();

        let plain = rank(&catalog, &index, "premium", &RecentSearches::default()).unwrap();
        assert_eq!(names(&catalog, &plain)[0], "Netflix Cookies");

        let mut recent = RecentSearches::default();
        recent.record("Spotify Cookies");
        let boosted = rank(&catalog, &index, "premium", &recent).unwrap();
        assert_eq!(names(&catalog, &boosted)[0], "Spotify Cookies");
    }

    #[test]
    fn test_no_match() {
        let catalog = catalog();
        let index = SearchIndex::build(&catalog).unwrap();
        let hits = rank(&catalog, &index, "zebra", &RecentSearches::default()).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_suggestions_limit() {
        let catalog = catalog();
        let index = SearchIndex::build(&catalog).unwrap();
        let results = suggestions(&catalog, &index, "o", &RecentSearches::default()).unwrap();
        assert!(results.len() <= SUGGESTION_LIMIT);
        assert!(suggestions(&catalog, &index, "", &RecentSearches::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_query_terms() {
        assert_eq!(query_terms("Sniper-Bot x"), vec!["sniper", "bot"]);
        assert_eq!(edit_distance("ab"), 0);
        assert_eq!(edit_distance("spotfy"), 1);
        assert_eq!(edit_distance("streaming"), 2);
    }
}
