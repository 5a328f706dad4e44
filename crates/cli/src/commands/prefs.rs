//! Preference commands.

use modshelf_core::Theme;
use thiserror::Error;
use tracing::info;

use super::open_state;

#[derive(Debug, Error)]
pub enum PrefsCommandError {
    #[error("Unknown theme {0:?}; expected light or dark")]
    UnknownTheme(String),
}

/// Print every stored preference.
///
/// # Errors
///
/// Returns an error if the preference file cannot be opened.
#[allow(clippy::print_stdout)]
pub fn show() -> Result<(), Box<dyn std::error::Error>> {
    let state = open_state()?;
    let prefs = state.prefs();

    let filters = prefs.filters();
    let recent = prefs.recent();
    let favorites = prefs.favorites();

    println!(
        "theme:      {}",
        prefs.theme().map_or("system", |theme| theme.as_str())
    );
    println!("search:     {:?}", prefs.search());
    println!("sort:       {}", prefs.sort().as_str());
    println!("filters:    {}", filters.categories().collect::<Vec<_>>().join(", "));
    println!("banner:     {}", if prefs.banner_hidden() { "hidden" } else { "shown" });
    println!("recent:     {}", recent.iter().collect::<Vec<_>>().join(", "));
    println!("favorites:  {}", favorites.iter().collect::<Vec<_>>().join(", "));
    Ok(())
}

/// Store a theme.
///
/// # Errors
///
/// Returns an error for an unknown theme or if the preference file cannot be
/// written.
pub fn set_theme(theme: &str) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = Theme::parse(theme).ok_or_else(|| PrefsCommandError::UnknownTheme(theme.to_string()))?;
    open_state()?.prefs().set_theme(parsed)?;
    info!(theme = parsed.as_str(), "Theme stored");
    Ok(())
}

/// Forget recent searches.
///
/// # Errors
///
/// Returns an error if the preference file cannot be written.
pub fn clear_recent() -> Result<(), Box<dyn std::error::Error>> {
    open_state()?.prefs().clear_recent()?;
    info!("Recent searches cleared");
    Ok(())
}

/// Remove every stored preference.
///
/// # Errors
///
/// Returns an error if the preference file cannot be written.
pub fn reset() -> Result<(), Box<dyn std::error::Error>> {
    open_state()?.prefs().reset()?;
    info!("Preferences reset");
    Ok(())
}
