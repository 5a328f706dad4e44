//! Preference route handlers.

use axum::{
    Form,
    extract::State,
    response::Redirect,
};
use modshelf_core::Theme;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::error::Result;
use crate::routes::ReturnTo;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ThemeForm {
    /// Theme the page currently shows, which may come from the system
    /// preference when none is stored.
    #[serde(default)]
    pub current: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
}

/// Switch between light and dark.
#[instrument(skip(state))]
pub async fn toggle_theme(
    State(state): State<AppState>,
    Form(form): Form<ThemeForm>,
) -> Result<Redirect> {
    let current = state
        .prefs()
        .theme()
        .or_else(|| form.current.as_deref().and_then(Theme::parse))
        .unwrap_or(Theme::Light);
    state.prefs().set_theme(current.toggled())?;
    Ok(ReturnTo { next: form.next }.redirect())
}

/// Dismiss the announcement banner for good.
#[instrument(skip(state))]
pub async fn hide_banner(
    State(state): State<AppState>,
    Form(form): Form<ReturnTo>,
) -> Result<Redirect> {
    state.prefs().hide_banner()?;
    Ok(form.redirect())
}

/// Forget recent searches.
#[instrument(skip(state))]
pub async fn clear_recent(
    State(state): State<AppState>,
    Form(form): Form<ReturnTo>,
) -> Result<Redirect> {
    state.prefs().clear_recent()?;
    Ok(form.redirect())
}

/// Remove every stored preference, favorites included.
#[instrument(skip(state))]
pub async fn reset(State(state): State<AppState>, Form(form): Form<ReturnTo>) -> Result<Redirect> {
    state.prefs().reset()?;
    info!("Preferences reset");
    Ok(form.redirect())
}
