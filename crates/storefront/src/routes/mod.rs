//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                    - List view (q, sort), or detail view (?tool=)
//! GET  /cards               - Next batch of cards (HTMX, offset)
//! GET  /suggest             - Autocomplete fragment (HTMX, q)
//! POST /search              - Save the search text
//! POST /sort                - Save the sort mode
//! POST /filters/toggle      - Toggle a category filter
//! POST /retry               - Reload catalog sources
//!
//! # Favorites
//! GET  /favorites           - Favorites page (q, sort)
//! POST /favorites/toggle    - Toggle a favorite (returns button fragment)
//! POST /favorites/remove    - Remove one favorite
//! GET  /favorites/clear     - Confirm clearing all favorites
//! POST /favorites/clear     - Clear all favorites
//!
//! # Preferences
//! POST /prefs/theme         - Toggle light/dark theme
//! POST /prefs/banner        - Dismiss the announcement banner
//! POST /prefs/recent/clear  - Clear recent searches
//! POST /prefs/reset         - Remove every stored preference
//!
//! # Health
//! GET  /health              - Liveness
//! GET  /health/ready        - Readiness (catalog loaded)
//! ```

pub mod catalog;
pub mod favorites;
pub mod health;
pub mod prefs;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};
use serde::Deserialize;

use crate::detail::PageMeta;
use crate::state::AppState;

/// Page chrome shared by every full-page template.
#[derive(Debug, Clone)]
pub struct Layout {
    pub site_name: String,
    pub meta: PageMeta,
    /// Stored theme; `None` follows the system preference.
    pub theme: Option<&'static str>,
    pub banner_hidden: bool,
    pub favorites_count: usize,
    /// Path of the current page, for forms that return here.
    pub path: String,
}

impl Layout {
    #[must_use]
    pub fn new(state: &AppState, meta: PageMeta, path: impl Into<String>) -> Self {
        let prefs = state.prefs();
        Self {
            site_name: state.config().site_name.clone(),
            meta,
            theme: prefs.theme().map(|theme| theme.as_str()),
            banner_hidden: prefs.banner_hidden(),
            favorites_count: prefs.favorites().len(),
            path: path.into(),
        }
    }
}

/// Optional return path carried by preference forms.
#[derive(Debug, Default, Deserialize)]
pub struct ReturnTo {
    #[serde(default)]
    pub next: Option<String>,
}

impl ReturnTo {
    /// Redirect to `next` when it is a local path, else to `/`.
    #[must_use]
    pub fn redirect(&self) -> Redirect {
        Redirect::to(local_path(self.next.as_deref()))
    }
}

/// Only same-site paths are followed.
fn local_path(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => "/",
    }
}

/// Create the favorites routes router.
pub fn favorites_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(favorites::index))
        .route("/toggle", post(favorites::toggle))
        .route("/remove", post(favorites::remove))
        .route("/clear", get(favorites::confirm_clear).post(favorites::clear))
}

/// Create the preference routes router.
pub fn prefs_routes() -> Router<AppState> {
    Router::new()
        .route("/theme", post(prefs::toggle_theme))
        .route("/banner", post(prefs::hide_banner))
        .route("/recent/clear", post(prefs::clear_recent))
        .route("/reset", post(prefs::reset))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::index))
        .route("/cards", get(catalog::cards))
        .route("/suggest", get(catalog::suggest))
        .route("/search", post(catalog::search))
        .route("/sort", post(catalog::sort))
        .route("/filters/toggle", post(catalog::toggle_filter))
        .route("/retry", post(catalog::retry))
        .nest("/favorites", favorites_routes())
        .nest("/prefs", prefs_routes())
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
}
