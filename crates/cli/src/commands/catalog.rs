//! Catalog commands: search, show, validate.
//!
//! # Usage
//!
//! ```bash
//! modshelf search "sniper" --category bot
//! modshelf show "#tool=Discord%20Sniper%20Bot"
//! modshelf validate
//! ```

use chrono::Utc;
use modshelf_core::{DetailFragment, FilterSet, SortMode};
use modshelf_storefront::detail::DetailView;
use modshelf_storefront::listing::{ListingQuery, listing};
use modshelf_storefront::loader::SourceStatus;
use thiserror::Error;
use tracing::info;

use super::open_state;

/// Errors specific to catalog commands.
#[derive(Debug, Error)]
pub enum CatalogCommandError {
    /// No item has the requested name.
    #[error("No item named {0:?}")]
    NotFound(String),

    /// Some sources could not be loaded.
    #[error("{failed} of {total} sources failed")]
    SourcesFailed { failed: usize, total: usize },
}

/// Print the ranked, filtered, sorted listing.
///
/// Filters and sort default to the stored preferences, as in the storefront.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or searched.
#[allow(clippy::print_stdout)]
pub async fn search(
    query: &str,
    sort: Option<&str>,
    categories: &[String],
    limit: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = open_state()?;
    let snapshot = state.reload().await?;
    let prefs = state.prefs();

    let filters = if categories.is_empty() {
        prefs.filters()
    } else {
        let mut filters = FilterSet::all();
        for category in categories {
            filters.toggle(category);
        }
        filters
    };
    let sort = sort.map_or_else(|| prefs.sort(), SortMode::parse);
    let recent = prefs.recent();

    let results = listing(
        &snapshot.catalog,
        &snapshot.index,
        &ListingQuery {
            query,
            filters: &filters,
            sort,
            recent: &recent,
            now: Utc::now(),
        },
    )?;

    info!(query, sort = sort.as_str(), results = results.len(), "Search complete");

    if results.is_empty() {
        println!("No tools found. Try adjusting your search or filters.");
        return Ok(());
    }

    let favorites = prefs.favorites();
    for item in results
        .iter()
        .take(limit)
        .filter_map(|&p| snapshot.catalog.items().get(p))
    {
        let marker = if favorites.contains(&item.name) { "♥" } else { " " };
        println!(
            "{marker} {:<32} {:<12} {}",
            item.name,
            item.kind,
            item.price.as_deref().unwrap_or("-")
        );
    }
    if results.len() > limit {
        println!("… {} more", results.len() - limit);
    }
    Ok(())
}

/// Print the detail view of one item.
///
/// `target` is an item name, a `#tool=` fragment, or a URL carrying one.
/// Opening an item records it as a recent search.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or no item matches.
#[allow(clippy::print_stdout)]
pub async fn show(target: &str) -> Result<(), Box<dyn std::error::Error>> {
    let name = DetailFragment::parse(target)
        .map(|fragment| fragment.name().to_string())
        .unwrap_or_else(|_| target.trim().to_string());

    let state = open_state()?;
    let snapshot = state.reload().await?;
    let item = snapshot
        .catalog
        .find(&name)
        .ok_or_else(|| CatalogCommandError::NotFound(name.clone()))?;

    state.prefs().record_recent(&item.name)?;
    let view = DetailView::new(
        state.config(),
        &snapshot.catalog,
        item,
        &state.prefs().favorites(),
        Utc::now(),
    );

    println!("{}{}", view.name, if view.favorite { " ♥" } else { "" });
    println!("{}", view.summary);
    if !view.badges.is_empty() {
        let labels: Vec<&str> = view.badges.iter().map(|b| b.label.as_str()).collect();
        println!("[{}]", labels.join("] ["));
    }
    println!();

    if view.pricing.is_empty() {
        println!("Price: {}", item.price.as_deref().unwrap_or("Contact owner"));
    } else {
        println!("Pricing:");
        for (tier, price) in &view.pricing {
            println!("  {tier}: {price}");
        }
    }
    for row in &view.meta {
        println!("{}: {}", row.label, row.value);
    }
    println!("Requirements: {}", view.requirements);
    println!("Contact ({}): {}", view.contact_label, view.contact_url);
    if !view.tags.is_empty() {
        println!("Tags: {}", view.tags.join(", "));
    }
    println!();
    println!("{}", item.full_description());
    println!();
    println!("Share: {}", view.share_url);

    if !view.similar.is_empty() {
        println!();
        println!("You might also like:");
        for card in &view.similar {
            println!("  {} ({})", card.name, card.kind);
        }
    }
    Ok(())
}

/// Load every configured source and print its status.
///
/// # Errors
///
/// Returns an error if any source failed, or if nothing loaded at all.
#[allow(clippy::print_stdout)]
pub async fn validate() -> Result<(), Box<dyn std::error::Error>> {
    let state = open_state()?;
    let (catalog, report) = state.loader().load().await?;

    for source in &report.sources {
        match &source.status {
            SourceStatus::Fresh { items } => println!("ok      {} ({items} items)", source.source),
            SourceStatus::Cached { items, reason } => {
                println!("cached  {} ({items} items): {reason}", source.source);
            }
            SourceStatus::Failed { reason } => println!("FAILED  {}: {reason}", source.source),
        }
    }
    println!(
        "{} items, {} duplicates dropped, {} invalid dropped, {} categories",
        report.stats.merged,
        report.stats.duplicates,
        report.stats.invalid,
        catalog.categories().len()
    );

    let failed = report.failed();
    if failed > 0 {
        return Err(CatalogCommandError::SourcesFailed {
            failed,
            total: report.sources.len(),
        }
        .into());
    }
    Ok(())
}
