//! Core types for Modshelf.
//!
//! This module provides type-safe wrappers for the catalog's domain concepts.

pub mod fragment;
pub mod item;
pub mod preferences;
pub mod promotion;
pub mod stock;
pub mod timestamp;

pub use fragment::{DetailFragment, FragmentError};
pub use item::{CatalogItem, DEFAULT_DESCRIPTION, PricingTable};
pub use preferences::{
    ALL_CATEGORIES, Favorites, FavoritesSort, FilterSet, RecentSearches, SortMode, Theme,
};
pub use promotion::{leading_decimal, promotion_active};
pub use stock::Stock;
pub use timestamp::{RECENT_WINDOW_DAYS, days_left, is_recent, parse_timestamp, time_left};
