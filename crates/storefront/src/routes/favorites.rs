//! Favorites route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use modshelf_core::FavoritesSort;
use serde::Deserialize;
use tracing::instrument;

use crate::detail::PageMeta;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::favorites::FavoritesPage;
use crate::filters;
use crate::routes::Layout;
use crate::state::AppState;
use crate::views::MiniCardView;

/// Event fired after any favorites change.
const FAVORITES_CHANGED: &str = "favorites-changed";

#[derive(Debug, Default, Deserialize)]
pub struct FavoritesQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub sort: String,
}

#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    pub name: String,
    /// `detail` renders the larger detail-page button.
    #[serde(default)]
    pub variant: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoveForm {
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct SortChoice {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "favorites/index.html")]
pub struct FavoritesTemplate {
    pub layout: Layout,
    pub query: String,
    pub sort_choices: Vec<SortChoice>,
    pub count_text: String,
    pub cards: Vec<MiniCardView>,
    pub empty: bool,
    pub no_results: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "favorites/confirm.html")]
pub struct ConfirmClearTemplate {
    pub layout: Layout,
    pub count_text: String,
}

/// Favorite toggle button (HTMX fragment).
#[derive(Template, WebTemplate)]
#[template(path = "partials/fav_button.html")]
pub struct FavButtonTemplate {
    pub fav_name: String,
    pub fav_active: bool,
    /// Larger detail-page style.
    pub fav_detail: bool,
}

/// Favorites page with its own search and sort.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<FavoritesQuery>,
) -> Result<Response> {
    let snapshot = state.snapshot()?;
    let sort = FavoritesSort::parse(&params.sort);
    let page = FavoritesPage::new(
        &snapshot.catalog,
        &state.prefs().favorites(),
        &params.q,
        sort,
    );

    let mut meta = PageMeta::site(state.config());
    meta.title = format!("Favorites - {}", state.config().site_name);

    Ok(FavoritesTemplate {
        layout: Layout::new(&state, meta, "/favorites"),
        query: params.q.trim().to_string(),
        sort_choices: FavoritesSort::ALL
            .iter()
            .map(|s| SortChoice {
                value: s.as_str(),
                label: s.label(),
                selected: *s == sort,
            })
            .collect(),
        count_text: page.count_text(),
        empty: page.empty,
        no_results: page.no_results,
        cards: page.cards,
    }
    .into_response())
}

/// Toggle a favorite and return the updated button.
#[instrument(skip(state))]
pub async fn toggle(State(state): State<AppState>, Form(form): Form<ToggleForm>) -> Result<Response> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("missing item name".to_string()));
    }

    let favorite = state.prefs().toggle_favorite(name)?;
    add_breadcrumb(
        "favorites",
        if favorite { "Added favorite" } else { "Removed favorite" },
        Some(&[("item", name)]),
    );

    Ok((
        AppendHeaders([("HX-Trigger", FAVORITES_CHANGED)]),
        FavButtonTemplate {
            fav_name: name.to_string(),
            fav_active: favorite,
            fav_detail: form.variant == "detail",
        },
    )
        .into_response())
}

/// Remove one favorite.
#[instrument(skip(state))]
pub async fn remove(State(state): State<AppState>, Form(form): Form<RemoveForm>) -> Result<Redirect> {
    state.prefs().remove_favorite(&form.name)?;
    Ok(Redirect::to("/favorites"))
}

/// Confirmation step before clearing every favorite.
#[instrument(skip(state))]
pub async fn confirm_clear(State(state): State<AppState>) -> Result<Response> {
    let count = state.prefs().favorites().len();
    if count == 0 {
        return Ok(Redirect::to("/favorites").into_response());
    }

    let mut meta = PageMeta::site(state.config());
    meta.title = format!("Clear favorites - {}", state.config().site_name);

    Ok(ConfirmClearTemplate {
        layout: Layout::new(&state, meta, "/favorites/clear"),
        count_text: if count == 1 {
            "1 saved tool".to_string()
        } else {
            format!("{count} saved tools")
        },
    }
    .into_response())
}

/// Clear every favorite.
#[instrument(skip(state))]
pub async fn clear(State(state): State<AppState>) -> Result<Redirect> {
    state.prefs().clear_favorites()?;
    add_breadcrumb("favorites", "Cleared favorites", None);
    Ok(Redirect::to("/favorites"))
}
