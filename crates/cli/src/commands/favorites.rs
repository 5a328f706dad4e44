//! Favorites commands.

use modshelf_core::FavoritesSort;
use modshelf_storefront::favorites::FavoritesPage;
use tracing::info;

use super::open_state;

/// Print the favorites page.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded.
#[allow(clippy::print_stdout)]
pub async fn list(query: &str, sort: &str) -> Result<(), Box<dyn std::error::Error>> {
    let state = open_state()?;
    let snapshot = state.reload().await?;
    let page = FavoritesPage::new(
        &snapshot.catalog,
        &state.prefs().favorites(),
        query,
        FavoritesSort::parse(sort),
    );

    println!("{}", page.count_text());
    if page.no_results {
        println!("No favorites match {query:?}.");
    }
    for card in &page.cards {
        println!("  {:<32} {:<12} {}", card.name, card.kind, card.description);
    }
    Ok(())
}

/// Toggle an item in or out of favorites.
///
/// The name must exist in the catalog so the stored set stays meaningful.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded, the item is unknown, or
/// the preference file cannot be written.
#[allow(clippy::print_stdout)]
pub async fn toggle(name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let state = open_state()?;
    let snapshot = state.reload().await?;
    let item = snapshot
        .catalog
        .find(name)
        .ok_or_else(|| super::catalog::CatalogCommandError::NotFound(name.to_string()))?;

    if state.prefs().toggle_favorite(&item.name)? {
        println!("♥ Saved {}", item.name);
    } else {
        println!("♡ Removed {}", item.name);
    }
    Ok(())
}

/// Remove one favorite.
///
/// # Errors
///
/// Returns an error if the preference file cannot be written.
#[allow(clippy::print_stdout)]
pub fn remove(name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let state = open_state()?;
    if state.prefs().remove_favorite(name)? {
        println!("Removed {name}");
    } else {
        println!("{name} is not a favorite");
    }
    Ok(())
}

/// Remove every favorite.
///
/// # Errors
///
/// Returns an error if the preference file cannot be written.
pub fn clear() -> Result<(), Box<dyn std::error::Error>> {
    let state = open_state()?;
    let count = state.prefs().favorites().len();
    state.prefs().clear_favorites()?;
    info!(count, "Cleared favorites");
    Ok(())
}
