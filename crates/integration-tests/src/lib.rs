//! Integration tests for the Modshelf storefront.
//!
//! Each test boots the full router (middleware included) on an ephemeral
//! port, with catalog sources written to a throwaway directory and an
//! in-memory preference store, then drives it over HTTP with `reqwest`.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p modshelf-integration-tests
//! ```

#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use modshelf_storefront::config::StorefrontConfig;
use modshelf_storefront::state::AppState;
use modshelf_storefront::storage::MemoryStore;
use reqwest::Client;
use tokio::net::TcpListener;

/// A storefront served on `127.0.0.1:0`.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    pub state: AppState,
    dir: PathBuf,
}

impl TestContext {
    /// Boot with one source file per entry of `sources`.
    pub async fn start(sources: &[&str]) -> Self {
        Self::start_with(sources, 20).await
    }

    /// Boot with a custom batch size.
    pub async fn start_with(sources: &[&str], batch_size: usize) -> Self {
        let dir = scratch_dir();
        for (i, contents) in sources.iter().enumerate() {
            std::fs::write(source_path(&dir, i), contents).expect("Failed to write source");
        }
        Self::boot(dir, sources.len(), batch_size).await
    }

    /// Boot with `count` sources whose files do not exist yet.
    pub async fn start_missing(count: usize) -> Self {
        Self::boot(scratch_dir(), count, 20).await
    }

    /// Write (or overwrite) source `index`.
    pub fn write_source(&self, index: usize, contents: &str) {
        std::fs::write(source_path(&self.dir, index), contents).expect("Failed to write source");
    }

    /// Absolute URL of `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET `path` and return the status and body.
    pub async fn get(&self, path: &str) -> (reqwest::StatusCode, String) {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Request failed");
        let status = resp.status();
        (status, resp.text().await.expect("Failed to read body"))
    }

    /// POST a form to `path`, following the redirect, and return the final
    /// status and body.
    pub async fn post(&self, path: &str, form: &[(&str, &str)]) -> (reqwest::StatusCode, String) {
        let resp = self
            .client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("Request failed");
        let status = resp.status();
        (status, resp.text().await.expect("Failed to read body"))
    }

    async fn boot(dir: PathBuf, count: usize, batch_size: usize) -> Self {
        let sources = (0..count)
            .map(|i| source_path(&dir, i).display().to_string())
            .collect::<Vec<_>>()
            .join(",");
        let batch_size = batch_size.to_string();
        let data_dir = dir.join("prefs").display().to_string();

        let config = StorefrontConfig::from_lookup(|key| match key {
            "MODSHELF_SITE_URL" => Some("https://shop.example/".to_string()),
            "MODSHELF_SOURCES" => Some(sources.clone()),
            "MODSHELF_BATCH_SIZE" => Some(batch_size.clone()),
            "MODSHELF_DATA_DIR" => Some(data_dir.clone()),
            _ => None,
        })
        .expect("Invalid test configuration");

        let state = AppState::with_store(config, Arc::new(MemoryStore::new()))
            .expect("Failed to open preferences");
        // A failed initial load is a valid starting point for retry tests.
        let _ = state.reload().await;

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind listener");
        let addr = listener.local_addr().expect("Failed to read local address");
        let app = modshelf_storefront::app(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server failed");
        });

        Self {
            client: Client::new(),
            base_url: format!("http://{addr}"),
            state,
            dir,
        }
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("modshelf-it-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("Failed to create scratch directory");
    dir
}

fn source_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("source-{index}.json"))
}

/// Names of the cards in a rendered page, in order.
#[must_use]
pub fn card_names(html: &str) -> Vec<String> {
    html.match_indices("<article class=\"tool-card")
        .filter_map(|(start, _)| {
            let rest = html.get(start..)?;
            let attr = rest.find("data-name=\"")? + "data-name=\"".len();
            let value = rest.get(attr..)?;
            let end = value.find('"')?;
            value.get(..end).map(str::to_string)
        })
        .collect()
}
