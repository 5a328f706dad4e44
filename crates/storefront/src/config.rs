//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MODSHELF_SITE_URL` - Public URL of the catalog, used for canonical and share links
//!
//! ## Optional
//! - `MODSHELF_HOST` - Bind address (default: 127.0.0.1)
//! - `MODSHELF_PORT` - Listen port (default: 3000)
//! - `MODSHELF_SITE_NAME` - Site name shown in titles (default: Modshelf)
//! - `MODSHELF_SOURCES` - Comma-separated catalog sources, URLs or paths
//!   (default: the bundled `data/*.json` files)
//! - `MODSHELF_DATA_DIR` - Directory holding the visitor's preferences (default: .modshelf)
//! - `MODSHELF_BATCH_SIZE` - Cards rendered per batch (default: 20)
//! - `MODSHELF_FETCH_TIMEOUT_SECS` - Per-source fetch timeout (default: 10)
//! - `MODSHELF_SOURCE_CACHE_TTL_SECS` - How long a fetched source may stand in for a
//!   failed fetch (default: 3600)
//! - `MODSHELF_CONTACT_LINKS` - `channel=url` pairs, comma-separated
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Sources loaded when `MODSHELF_SOURCES` is not set.
pub const DEFAULT_SOURCES: &[&str] = &[
    "data/tools.json",
    "data/bots.json",
    "data/checkers.json",
    "data/game.json",
    "data/others.json",
    "data/cookies.json",
    "data/methods.json",
    "data/membership.json",
];

const DEFAULT_CONTACT_LINKS: &[(&str, &str)] = &[
    ("telegram", "https://t.me/modshelf"),
    ("discord", "https://discord.gg/modshelf"),
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the catalog
    pub site_url: String,
    /// Site name used in page titles
    pub site_name: String,
    /// Catalog sources in merge order
    pub sources: Vec<String>,
    /// Directory holding the preference file
    pub data_dir: PathBuf,
    /// Cards per incremental batch
    pub batch_size: usize,
    /// Per-source fetch timeout
    pub fetch_timeout: Duration,
    /// Lifetime of the source fallback cache
    pub source_cache_ttl: Duration,
    /// Contact channel to link mapping
    pub contact_links: Vec<(String, String)>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(&lookup);

        let site_url = env.required("MODSHELF_SITE_URL")?;
        Url::parse(&site_url).map_err(|e| {
            ConfigError::InvalidEnvVar("MODSHELF_SITE_URL".to_string(), e.to_string())
        })?;

        let sources = env
            .optional("MODSHELF_SOURCES")
            .map(|raw| split_list(&raw))
            .filter(|list| !list.is_empty())
            .unwrap_or_else(|| DEFAULT_SOURCES.iter().map(ToString::to_string).collect());

        let batch_size: usize = env.parsed("MODSHELF_BATCH_SIZE", 20)?;
        if batch_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "MODSHELF_BATCH_SIZE".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let contact_links = match env.optional("MODSHELF_CONTACT_LINKS") {
            Some(raw) => parse_contact_links(&raw)?,
            None => DEFAULT_CONTACT_LINKS
                .iter()
                .map(|(channel, link)| ((*channel).to_string(), (*link).to_string()))
                .collect(),
        };

        Ok(Self {
            host: env.parsed("MODSHELF_HOST", IpAddr::from([127, 0, 0, 1]))?,
            port: env.parsed("MODSHELF_PORT", 3000)?,
            site_url,
            site_name: env
                .optional("MODSHELF_SITE_NAME")
                .unwrap_or_else(|| "Modshelf".to_string()),
            sources,
            data_dir: env
                .optional("MODSHELF_DATA_DIR")
                .map_or_else(|| PathBuf::from(".modshelf"), PathBuf::from),
            batch_size,
            fetch_timeout: Duration::from_secs(env.parsed("MODSHELF_FETCH_TIMEOUT_SECS", 10)?),
            source_cache_ttl: Duration::from_secs(
                env.parsed("MODSHELF_SOURCE_CACHE_TTL_SECS", 3600)?,
            ),
            contact_links,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env.parsed("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: env.parsed("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Link for a contact channel, or `#` when the channel is unknown.
    #[must_use]
    pub fn contact_link(&self, channel: Option<&str>) -> &str {
        let Some(channel) = channel.map(|c| c.trim().to_lowercase()) else {
            return "#";
        };
        self.contact_links
            .iter()
            .find(|(name, _)| *name == channel)
            .map_or("#", |(_, link)| link.as_str())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a, F>(&'a F);

impl<F> Env<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional, non-blank variable.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parsed<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |raw| {
            raw.parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_contact_links(raw: &str) -> Result<Vec<(String, String)>, ConfigError> {
    split_list(raw)
        .into_iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(channel, link)| (channel.trim().to_lowercase(), link.trim().to_string()))
                .filter(|(channel, link)| !channel.is_empty() && !link.is_empty())
                .ok_or_else(|| {
                    ConfigError::InvalidEnvVar(
                        "MODSHELF_CONTACT_LINKS".to_string(),
                        format!("expected channel=url, got '{pair}'"),
                    )
                })
        })
        .collect()
}
