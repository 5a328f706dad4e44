//! Subcommand implementations.

pub mod catalog;
pub mod favorites;
pub mod prefs;

use modshelf_storefront::config::StorefrontConfig;
use modshelf_storefront::state::AppState;

/// Site URL used for share links when `MODSHELF_SITE_URL` is not set.
const LOCAL_SITE_URL: &str = "http://127.0.0.1:3000/";

/// Load the storefront configuration.
///
/// The CLI never serves pages, so the site URL falls back to the local
/// storefront address.
///
/// # Errors
///
/// Returns an error if a variable is set to an invalid value.
pub fn load_config() -> Result<StorefrontConfig, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let config = StorefrontConfig::from_lookup(|key| {
        std::env::var(key)
            .ok()
            .or_else(|| (key == "MODSHELF_SITE_URL").then(|| LOCAL_SITE_URL.to_string()))
    })?;
    Ok(config)
}

/// Open the shared application state without loading the catalog.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the preference file
/// cannot be opened.
pub fn open_state() -> Result<AppState, Box<dyn std::error::Error>> {
    Ok(AppState::new(load_config()?)?)
}
