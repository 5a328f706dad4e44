//! Modshelf Core - Shared catalog types library.
//!
//! This crate provides the domain types used across all Modshelf components:
//! - `storefront` - Local catalog storefront (search, filters, favorites)
//! - `cli` - Command-line access to the same catalog pipeline
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no persistence. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Catalog items, stock, promotions, timestamps, preference values
//!   and the detail-view URL fragment
//! - [`catalog`] - Merging several item sources into one deduplicated catalog

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod types;

pub use catalog::{Catalog, CategoryCount, MergeStats};
pub use types::*;
