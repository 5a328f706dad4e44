//! Modshelf CLI - the catalog pipeline from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Search the catalog
//! modshelf search "spotify" --sort update_date
//!
//! # Show one item, by name or by a shared link
//! modshelf show "https://shop.example/#tool=Proxy%20Scraper"
//!
//! # Manage favorites
//! modshelf favorites add "Proxy Scraper"
//! modshelf favorites list --sort type
//!
//! # Check every configured source
//! modshelf validate
//! ```
//!
//! # Commands
//!
//! - `search` - Ranked, filtered, sorted listing
//! - `show` - Detail view of one item
//! - `favorites` - List, add, remove, or clear favorites
//! - `prefs` - Show or change stored preferences
//! - `validate` - Load every source and report its status
//!
//! Configuration comes from the same `MODSHELF_*` environment variables as
//! the storefront, so both share one preference file.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "modshelf")]
#[command(author, version, about = "Modshelf catalog tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the catalog
    Search {
        /// Search text; empty lists everything
        #[arg(default_value = "")]
        query: String,

        /// Sort mode (`name`, `release_date`, `update_date`, `discount`)
        #[arg(short, long)]
        sort: Option<String>,

        /// Restrict to a category; repeat for several
        #[arg(short, long = "category")]
        categories: Vec<String>,

        /// Maximum rows printed
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// Show the detail view of one item
    Show {
        /// Item name, `#tool=` fragment, or shared URL
        target: String,
    },
    /// Manage favorites
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
    /// Show or change stored preferences
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },
    /// Load every source and report its status
    Validate,
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// List favorites
    List {
        /// Filter favorites by text
        #[arg(short, long, default_value = "")]
        query: String,

        /// Sort order (`name`, `name-desc`, `type`)
        #[arg(short, long, default_value = "name")]
        sort: String,
    },
    /// Toggle an item in or out of favorites
    Toggle { name: String },
    /// Remove an item from favorites
    Remove { name: String },
    /// Remove every favorite
    Clear,
}

#[derive(Subcommand)]
enum PrefsAction {
    /// Print every stored preference
    Show,
    /// Set the theme (`light` or `dark`)
    Theme { theme: String },
    /// Forget recent searches
    ClearRecent,
    /// Remove every stored preference, favorites included
    Reset,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "modshelf=info,modshelf_storefront=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Search {
            query,
            sort,
            categories,
            limit,
        } => {
            commands::catalog::search(&query, sort.as_deref(), &categories, limit).await?;
        }
        Commands::Show { target } => commands::catalog::show(&target).await?,
        Commands::Validate => commands::catalog::validate().await?,
        Commands::Favorites { action } => match action {
            FavoritesAction::List { query, sort } => {
                commands::favorites::list(&query, &sort).await?;
            }
            FavoritesAction::Toggle { name } => commands::favorites::toggle(&name).await?,
            FavoritesAction::Remove { name } => commands::favorites::remove(&name)?,
            FavoritesAction::Clear => commands::favorites::clear()?,
        },
        Commands::Prefs { action } => match action {
            PrefsAction::Show => commands::prefs::show()?,
            PrefsAction::Theme { theme } => commands::prefs::set_theme(&theme)?,
            PrefsAction::ClearRecent => commands::prefs::clear_recent()?,
            PrefsAction::Reset => commands::prefs::reset()?,
        },
    }
    Ok(())
}
