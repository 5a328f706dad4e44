//! End-to-end tests for favorites.

#![allow(clippy::unwrap_used)]

use modshelf_integration_tests::TestContext;
use reqwest::StatusCode;

const ITEMS: &str = r#"[
    {"name": "Alpha", "type": "bot", "description": "First"},
    {"name": "Beta", "type": "tool", "description": "Second"}
]"#;

#[tokio::test]
async fn test_double_toggle_restores_favorites() {
    let ctx = TestContext::start(&[ITEMS]).await;

    let resp = ctx
        .client
        .post(ctx.url("/favorites/toggle"))
        .form(&[("name", "Alpha")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("hx-trigger").and_then(|v| v.to_str().ok()),
        Some("favorites-changed")
    );
    let body = resp.text().await.unwrap();
    assert!(body.contains("fav-btn active"));

    let (_, page) = ctx.get("/favorites").await;
    assert!(page.contains("1 saved tool"));
    assert!(page.contains("Alpha"));

    let (_, body) = ctx
        .post("/favorites/toggle", &[("name", "Alpha"), ("variant", "detail")])
        .await;
    assert!(body.contains("♡ Save"));

    let (_, page) = ctx.get("/favorites").await;
    assert!(page.contains("No saved tools yet"));
}

#[tokio::test]
async fn test_favorites_search_and_no_results() {
    let ctx = TestContext::start(&[ITEMS]).await;
    ctx.post("/favorites/toggle", &[("name", "Alpha")]).await;
    ctx.post("/favorites/toggle", &[("name", "Beta")]).await;

    let (_, page) = ctx.get("/favorites?q=second").await;
    assert!(page.contains("Beta"));
    assert!(!page.contains(">Alpha<"));

    let (_, page) = ctx.get("/favorites?q=zebra").await;
    assert!(page.contains("No favorites match"));
}

#[tokio::test]
async fn test_remove_and_clear() {
    let ctx = TestContext::start(&[ITEMS]).await;
    ctx.post("/favorites/toggle", &[("name", "Alpha")]).await;
    ctx.post("/favorites/toggle", &[("name", "Beta")]).await;

    let (status, page) = ctx.post("/favorites/remove", &[("name", "Alpha")]).await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("1 saved tool"));

    let (_, confirm) = ctx.get("/favorites/clear").await;
    assert!(confirm.contains("Clear all favorites?"));

    let (_, page) = ctx.post("/favorites/clear", &[]).await;
    assert!(page.contains("No saved tools yet"));

    // Nothing left to confirm.
    let (_, page) = ctx.get("/favorites/clear").await;
    assert!(!page.contains("Clear all favorites?"));
}

#[tokio::test]
async fn test_card_reflects_favorite() {
    let ctx = TestContext::start(&[ITEMS]).await;
    ctx.post("/favorites/toggle", &[("name", "Beta")]).await;

    let (_, body) = ctx.get("/").await;
    assert!(body.contains("fav-btn active"));
    assert!(body.contains("<span class=\"nav-count\">1</span>"));
}
