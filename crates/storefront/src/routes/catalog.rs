//! Catalog list and detail route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use modshelf_core::{ALL_CATEGORIES, CatalogItem, FilterSet, SortMode};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::detail::{DetailView, PageMeta};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::listing::{Batch, ListingQuery, listing};
use crate::loader::LoadError;
use crate::routes::Layout;
use crate::search::{self, Highlighter};
use crate::state::{AppState, Snapshot};
use crate::views::{CardView, detail_href};

// =============================================================================
// Query & Form Types
// =============================================================================

/// Query parameters of the list and detail page.
#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    /// Item name selecting the detail view.
    pub tool: Option<String>,
    /// Search text; the saved search when absent.
    pub q: Option<String>,
    /// Sort mode; the saved mode when absent.
    pub sort: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CardsQuery {
    #[serde(default)]
    pub offset: usize,
    pub q: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SuggestQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub q: String,
    /// Also reset the category filters.
    #[serde(default)]
    pub clear_filters: bool,
}

#[derive(Debug, Deserialize)]
pub struct SortForm {
    pub sort: String,
}

#[derive(Debug, Deserialize)]
pub struct FilterForm {
    pub category: String,
    /// Select only this category instead of toggling it.
    #[serde(default)]
    pub only: bool,
}

// =============================================================================
// View Types
// =============================================================================

#[derive(Debug, Clone)]
pub struct FilterButton {
    pub key: String,
    pub label: String,
    /// `None` on the "All" button.
    pub count: Option<usize>,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct SortOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

#[derive(Debug, Clone)]
pub struct Suggestion {
    pub name: String,
    pub href: String,
}

#[derive(Debug, Clone, Copy)]
pub struct Stats {
    pub total: usize,
    pub categories: usize,
    pub favorites: usize,
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "catalog/index.html")]
pub struct CatalogIndexTemplate {
    pub layout: Layout,
    pub query: String,
    pub sort_options: Vec<SortOption>,
    pub filter_buttons: Vec<FilterButton>,
    pub recent: Vec<Suggestion>,
    pub stats: Stats,
    pub total: usize,
    pub results_text: String,
    pub cards: Vec<CardView>,
    pub next_url: Option<String>,
}

/// Next batch of cards (HTMX fragment).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cards.html")]
pub struct CardsTemplate {
    pub cards: Vec<CardView>,
    pub next_url: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "catalog/detail.html")]
pub struct CatalogDetailTemplate {
    pub layout: Layout,
    pub detail: DetailView,
    /// Filter value of the item's category, for the breadcrumb link.
    pub category_key: String,
}

/// Full-page error with a retry action.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/error.html")]
pub struct CatalogErrorTemplate {
    pub layout: Layout,
    pub message: String,
}

/// Autocomplete suggestions (HTMX fragment).
#[derive(Template, WebTemplate)]
#[template(path = "partials/suggest.html")]
pub struct SuggestTemplate {
    pub query: String,
    pub suggestions: Vec<Suggestion>,
    /// Recent searches, shown for an empty query.
    pub recent: Vec<Suggestion>,
}

// =============================================================================
// Handlers
// =============================================================================

/// List view, or the detail view of `?tool=`.
///
/// An unknown item name falls back to the list view. When no catalog could
/// be loaded, responds 503 with the retry page.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<IndexQuery>,
) -> Result<Response> {
    let snapshot = match state.snapshot() {
        Ok(snapshot) => snapshot,
        Err(AppError::Load(e)) => return Ok(unavailable(&state, &e)),
        Err(e) => return Err(e),
    };

    if let Some(name) = params.tool.as_deref() {
        if let Some(item) = snapshot.catalog.find(name) {
            return show_detail(&state, &snapshot, item);
        }
        debug!(tool = name, "Unknown item, showing list");
    }

    let query = params.q.unwrap_or_else(|| state.prefs().search());
    let sort = params
        .sort
        .as_deref()
        .map_or_else(|| state.prefs().sort(), SortMode::parse);
    let filters = state.prefs().filters();

    let results = run_listing(&state, &snapshot, &query, &filters, sort)?;
    let batch = Batch::slice(&results, 0, state.config().batch_size);
    let cards = cards_for(&state, &snapshot, &batch, &query);
    let favorites = state.prefs().favorites().len();

    Ok(CatalogIndexTemplate {
        layout: Layout::new(&state, PageMeta::site(state.config()), "/"),
        sort_options: SortMode::ALL
            .iter()
            .map(|mode| SortOption {
                value: mode.as_str(),
                label: mode.label(),
                selected: *mode == sort,
            })
            .collect(),
        filter_buttons: filter_buttons(&snapshot, &filters),
        recent: recent_suggestions(&state, &snapshot),
        stats: Stats {
            total: snapshot.catalog.len(),
            categories: snapshot.catalog.categories().len(),
            favorites,
        },
        total: results.len(),
        results_text: results_text(results.len()),
        next_url: batch.next_offset.map(|next| next_url(next, &query, sort)),
        cards,
        query,
    }
    .into_response())
}

/// Next batch of cards for the incremental renderer.
#[instrument(skip(state))]
pub async fn cards(
    State(state): State<AppState>,
    Query(params): Query<CardsQuery>,
) -> Result<Response> {
    let snapshot = state.snapshot()?;
    let query = params.q.unwrap_or_else(|| state.prefs().search());
    let sort = params
        .sort
        .as_deref()
        .map_or_else(|| state.prefs().sort(), SortMode::parse);
    let filters = state.prefs().filters();

    let results = run_listing(&state, &snapshot, &query, &filters, sort)?;
    let batch = Batch::slice(&results, params.offset, state.config().batch_size);

    Ok(CardsTemplate {
        cards: cards_for(&state, &snapshot, &batch, &query),
        next_url: batch.next_offset.map(|next| next_url(next, &query, sort)),
    }
    .into_response())
}

/// Autocomplete: the top ranked names, or recent searches for an empty query.
#[instrument(skip(state))]
pub async fn suggest(
    State(state): State<AppState>,
    Query(params): Query<SuggestQuery>,
) -> Result<Response> {
    let snapshot = state.snapshot()?;
    let query = params.q.trim().to_string();

    let names = search::suggestions(
        &snapshot.catalog,
        &snapshot.index,
        &query,
        &state.prefs().recent(),
    )?;

    Ok(SuggestTemplate {
        recent: if query.is_empty() {
            recent_suggestions(&state, &snapshot)
        } else {
            Vec::new()
        },
        suggestions: names
            .into_iter()
            .map(|name| Suggestion {
                href: detail_href(&name),
                name,
            })
            .collect(),
        query,
    }
    .into_response())
}

/// Save the search text and remember it as a recent search.
#[instrument(skip(state))]
pub async fn search(State(state): State<AppState>, Form(form): Form<SearchForm>) -> Result<Redirect> {
    let query = form.q.trim();
    state.prefs().set_search(query)?;
    state.prefs().record_recent(query)?;
    if form.clear_filters {
        state.prefs().set_filters(&FilterSet::all())?;
    }
    add_breadcrumb("catalog", "Searched", Some(&[("query", query)]));
    Ok(Redirect::to("/"))
}

/// Save the sort mode.
#[instrument(skip(state))]
pub async fn sort(State(state): State<AppState>, Form(form): Form<SortForm>) -> Result<Redirect> {
    state.prefs().set_sort(SortMode::parse(&form.sort))?;
    Ok(Redirect::to("/"))
}

/// Toggle a category filter, or select only it.
#[instrument(skip(state))]
pub async fn toggle_filter(
    State(state): State<AppState>,
    Form(form): Form<FilterForm>,
) -> Result<Redirect> {
    if form.only {
        let mut filters = FilterSet::all();
        filters.toggle(&form.category);
        state.prefs().set_filters(&filters)?;
    } else {
        state.prefs().toggle_filter(&form.category)?;
    }
    Ok(Redirect::to("/"))
}

/// Reload every catalog source.
///
/// Always redirects to the list view, which shows the retry page again if
/// the reload failed.
#[instrument(skip(state))]
pub async fn retry(State(state): State<AppState>) -> Redirect {
    add_breadcrumb("catalog", "Retry requested", None);
    if let Err(e) = state.reload().await {
        warn!(error = %e, "Catalog retry failed");
    }
    Redirect::to("/")
}

// =============================================================================
// Helpers
// =============================================================================

fn show_detail(state: &AppState, snapshot: &Snapshot, item: &CatalogItem) -> Result<Response> {
    state.prefs().record_recent(&item.name)?;

    let detail = DetailView::new(
        state.config(),
        &snapshot.catalog,
        item,
        &state.prefs().favorites(),
        Utc::now(),
    );
    let path = detail_href(&item.name);

    Ok(CatalogDetailTemplate {
        layout: Layout::new(state, PageMeta::item(state.config(), item), path),
        category_key: item.kind_key(),
        detail,
    }
    .into_response())
}

fn unavailable(state: &AppState, error: &LoadError) -> Response {
    let message = match error {
        LoadError::NotLoaded => "The catalog is still loading.",
        LoadError::NoSources => "No catalog sources are configured.",
        LoadError::AllSourcesFailed(_) => "Failed to load the catalog.",
    };
    (
        StatusCode::SERVICE_UNAVAILABLE,
        CatalogErrorTemplate {
            layout: Layout::new(state, PageMeta::site(state.config()), "/"),
            message: message.to_string(),
        },
    )
        .into_response()
}

fn run_listing(
    state: &AppState,
    snapshot: &Snapshot,
    query: &str,
    filters: &FilterSet,
    sort: SortMode,
) -> Result<Vec<usize>> {
    let recent = state.prefs().recent();
    let q = ListingQuery {
        query,
        filters,
        sort,
        recent: &recent,
        now: Utc::now(),
    };
    Ok(listing(&snapshot.catalog, &snapshot.index, &q)?)
}

fn cards_for(state: &AppState, snapshot: &Snapshot, batch: &Batch, query: &str) -> Vec<CardView> {
    let favorites = state.prefs().favorites();
    let highlighter = Highlighter::new(query);
    let now = Utc::now();
    batch
        .positions
        .iter()
        .filter_map(|&p| snapshot.catalog.items().get(p))
        .map(|item| CardView::new(item, &favorites, highlighter.as_ref(), now))
        .collect()
}

fn filter_buttons(snapshot: &Snapshot, filters: &FilterSet) -> Vec<FilterButton> {
    let all = FilterButton {
        key: ALL_CATEGORIES.to_string(),
        label: "All".to_string(),
        count: None,
        active: filters.is_all(),
    };
    std::iter::once(all)
        .chain(snapshot.catalog.categories().into_iter().map(|c| FilterButton {
            label: capitalize(&c.key),
            active: !filters.is_all() && filters.contains(&c.key),
            count: Some(c.count),
            key: c.key,
        }))
        .collect()
}

/// Recent terms that name an item open its detail view; others rerun the
/// search.
fn recent_suggestions(state: &AppState, snapshot: &Snapshot) -> Vec<Suggestion> {
    state
        .prefs()
        .recent()
        .iter()
        .map(|term| Suggestion {
            name: term.to_string(),
            href: snapshot.catalog.find(term).map_or_else(
                || format!("/?q={}", urlencoding::encode(term)),
                |item| detail_href(&item.name),
            ),
        })
        .collect()
}

fn next_url(offset: usize, query: &str, sort: SortMode) -> String {
    format!(
        "/cards?offset={offset}&q={}&sort={}",
        urlencoding::encode(query),
        sort.as_str()
    )
}

fn results_text(count: usize) -> String {
    match count {
        0 => "No tools found. Try adjusting your search or filters.".to_string(),
        1 => "1 tool found.".to_string(),
        n => format!("{n} tools found."),
    }
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_url_encodes_query() {
        assert_eq!(
            next_url(20, "sniper bot&x", SortMode::Discount),
            "/cards?offset=20&q=sniper%20bot%26x&sort=discount"
        );
    }

    #[test]
    fn test_results_text() {
        assert_eq!(results_text(1), "1 tool found.");
        assert_eq!(results_text(3), "3 tools found.");
        assert!(results_text(0).starts_with("No tools found"));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("bots"), "Bots");
        assert_eq!(capitalize(""), "");
    }
}
