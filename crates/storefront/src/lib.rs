//! Modshelf storefront library.
//!
//! Loads catalog sources, indexes them for search, and serves the catalog,
//! detail, and favorites pages. Exposed as a library so the router can be
//! driven by tests and by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod detail;
pub mod error;
pub mod favorites;
pub mod filters;
pub mod listing;
pub mod loader;
pub mod middleware;
pub mod routes;
pub mod search;
pub mod state;
pub mod storage;
pub mod views;

use axum::{Router, middleware::from_fn};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::Level;

use crate::state::AppState;

/// Directory of the bundled static assets.
pub const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Build the full application router.
///
/// Layers, outermost first: Sentry hub and transactions, request tracing,
/// request ID, cache policy.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .with_state(state)
        .layer(from_fn(middleware::cache_control_middleware))
        .layer(from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::span!(
                    Level::INFO,
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::config::StorefrontConfig;
    use crate::storage::MemoryStore;

    fn state() -> AppState {
        let config = StorefrontConfig::from_lookup(|key| match key {
            "MODSHELF_SITE_URL" => Some("https://shop.example/".to_string()),
            _ => None,
        })
        .unwrap();
        AppState::with_store(config, Arc::new(MemoryStore::new())).unwrap()
    }

    #[tokio::test]
    async fn test_health_needs_no_catalog() {
        let response = app(state())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_list_before_load_is_unavailable() {
        let response = app(state())
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response.headers().get("cache-control").unwrap(),
            "no-cache"
        );
    }

    #[tokio::test]
    async fn test_static_assets_served() {
        let response = app(state())
            .oneshot(Request::get("/static/app.js").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
