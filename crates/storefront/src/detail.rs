//! Detail view model and page metadata.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use modshelf_core::{Catalog, CatalogItem, DetailFragment, Favorites, days_left};
use regex::Regex;
use serde_json::json;

use crate::config::StorefrontConfig;
use crate::search::escape_html;
use crate::views::{self, Badge, BadgeMode, ImageView, MiniCardView};

/// Descriptions longer than this collapse behind a "Show more" toggle.
pub const COLLAPSE_THRESHOLD: usize = 400;

/// Similar items shown under a detail view.
pub const SIMILAR_LIMIT: usize = 6;

/// Default social preview image.
pub const DEFAULT_IMAGE: &str = "/static/icon.svg";

/// A line starting with an emoji renders as a feature bullet.
static FEATURE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([\x{1F300}-\x{1FAFF}\x{2600}-\x{27BF}\x{FE00}-\x{FEFF}])\s*(.+)")
        .expect("Invalid regex")
});

// =============================================================================
// Page metadata
// =============================================================================

/// Document title, social preview tags, and JSON-LD breadcrumb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMeta {
    pub title: String,
    pub og_title: String,
    pub description: String,
    /// Canonical and `og:url`.
    pub url: String,
    pub image: String,
    /// `BreadcrumbList` JSON, safe to embed in a `<script>` element.
    pub breadcrumb_json: String,
}

impl PageMeta {
    /// Metadata of the list view.
    #[must_use]
    pub fn site(config: &StorefrontConfig) -> Self {
        let title = format!("{} - Mods, Tools, and Free Offers", config.site_name);
        Self {
            og_title: title.clone(),
            title,
            description: default_description(config),
            url: config.site_url.clone(),
            image: DEFAULT_IMAGE.to_string(),
            breadcrumb_json: breadcrumb(Vec::new()),
        }
    }

    /// Metadata of an item's detail view.
    #[must_use]
    pub fn item(config: &StorefrontConfig, item: &CatalogItem) -> Self {
        let title = format!("{} - {}", item.name, config.site_name);
        let kind = if item.kind.is_empty() { "Tools" } else { &item.kind };
        let elements = vec![
            json!({"@type": "ListItem", "position": 1, "name": "Home", "item": config.site_url}),
            json!({"@type": "ListItem", "position": 2, "name": kind, "item": config.site_url}),
            json!({"@type": "ListItem", "position": 3, "name": item.name}),
        ];

        Self {
            og_title: title.clone(),
            title,
            description: item
                .description
                .clone()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| default_description(config)),
            url: DetailFragment::new(&item.name).url(&config.site_url),
            image: item.image.clone().unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
            breadcrumb_json: breadcrumb(elements),
        }
    }
}

fn default_description(config: &StorefrontConfig) -> String {
    format!(
        "{} offers mods, custom tools, and automation scripts along with free offers.",
        config.site_name
    )
}

fn breadcrumb(elements: Vec<serde_json::Value>) -> String {
    let ld = json!({
        "@context": "https://schema.org",
        "@type": "BreadcrumbList",
        "itemListElement": elements,
    });
    // A literal "</" would close the surrounding script element.
    ld.to_string().replace("</", "<\\/")
}

// =============================================================================
// Detail view
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaRow {
    pub label: &'static str,
    pub value: String,
}

/// Everything the detail template renders.
#[derive(Debug, Clone)]
pub struct DetailView {
    pub name: String,
    pub kind: String,
    pub summary: String,
    pub badges: Vec<Badge>,
    pub favorite: bool,
    /// Shareable `#tool=` URL.
    pub share_url: String,
    pub image: ImageView,
    /// Gallery images; empty unless there is more than one.
    pub gallery: Vec<ImageView>,
    pub video: Option<String>,
    /// Pricing rows; empty when the item has a single price.
    pub pricing: Vec<(String, String)>,
    /// Single price as escaped HTML with line breaks.
    pub price_html: Option<String>,
    pub meta: Vec<MetaRow>,
    pub contact_url: String,
    pub contact_label: String,
    pub requirements: String,
    pub tags: Vec<String>,
    pub popular: bool,
    pub description_html: String,
    pub collapsible: bool,
    pub similar: Vec<MiniCardView>,
}

impl DetailView {
    #[must_use]
    pub fn new(
        config: &StorefrontConfig,
        catalog: &Catalog,
        item: &CatalogItem,
        favorites: &Favorites,
        now: DateTime<Utc>,
    ) -> Self {
        let gallery_urls = item.gallery();
        let gallery = if gallery_urls.len() > 1 {
            gallery_urls
                .iter()
                .enumerate()
                .map(|(i, url)| ImageView::single(url, &format!("gallery image {}", i + 1)))
                .collect()
        } else {
            Vec::new()
        };

        let pricing = item
            .pricing
            .as_ref()
            .map(|table| table.rows().to_vec())
            .unwrap_or_default();
        let price_html = if pricing.is_empty() {
            item.price
                .as_deref()
                .filter(|p| !p.trim().is_empty())
                .map(|p| views::nl2br(&escape_html(p)))
        } else {
            None
        };

        let full = item.full_description();

        Self {
            name: item.name.clone(),
            kind: item.kind.clone(),
            summary: item.summary().to_string(),
            badges: views::badges(item, BadgeMode::Detail, now),
            favorite: favorites.contains(&item.name),
            share_url: DetailFragment::new(&item.name).url(&config.site_url),
            image: ImageView::for_item(item),
            gallery,
            video: item.video.clone().filter(|v| !v.trim().is_empty()),
            pricing,
            price_html,
            meta: meta_rows(item, now),
            contact_url: config.contact_link(item.contact.as_deref()).to_string(),
            contact_label: item
                .contact
                .clone()
                .unwrap_or_else(|| "Telegram".to_string()),
            requirements: item.requirements_or_default(),
            tags: item.tags.clone(),
            popular: item.popular,
            description_html: format_description(full),
            collapsible: full.chars().count() > COLLAPSE_THRESHOLD,
            similar: similar(catalog, item, now)
                .into_iter()
                .map(|other| MiniCardView::new(other, 2, Some(60)))
                .collect(),
        }
    }
}

/// Meta grid rows.
#[must_use]
pub fn meta_rows(item: &CatalogItem, now: DateTime<Utc>) -> Vec<MetaRow> {
    let mut rows = Vec::new();
    let row = |label, value: String| MetaRow { label, value };

    if let Some(discount) = item.discount.as_deref().filter(|d| !d.is_empty()) {
        let value = item
            .discount_percent()
            .map_or_else(|| discount.to_string(), |p| format!("{}%", p.normalize()));
        rows.push(row("Discount", value));
    }
    if let Some(expiry) = item.offer_expires_at() {
        rows.push(row("Offer Ends", format!("{} days left", days_left(expiry, now))));
    }
    rows.push(row("Stock", item.stock.label()));
    rows.push(row(
        "Released",
        item.release_date.clone().unwrap_or_else(|| "N/A".to_string()),
    ));
    rows.push(row(
        "Updated",
        item.update_date.clone().unwrap_or_else(|| "N/A".to_string()),
    ));
    if !item.kind.is_empty() {
        rows.push(row("Type", item.kind.clone()));
    }
    if let Some(version) = item.version.as_deref().filter(|v| !v.is_empty()) {
        rows.push(row("Version", version.to_string()));
    }
    rows
}

/// Escape a description, turning emoji-led lines into feature bullets.
#[must_use]
pub fn format_description(text: &str) -> String {
    text.split('\n')
        .map(|line| match FEATURE_LINE_RE.captures(line) {
            Some(caps) => format!(
                r#"<span class="feature-line"><span class="feature-icon">{}</span><span>{}</span></span>"#,
                &caps[1],
                escape_html(&caps[2])
            ),
            None => escape_html(line),
        })
        .collect::<Vec<_>>()
        .join("<br>")
}

/// Items related to `item` by shared tags, type, and keywords.
///
/// Scores: +3 per shared tag, +2 same type, +1 per shared keyword, +0.5
/// popular, +0.5 recently updated. Only positive scores are kept; the best
/// [`SIMILAR_LIMIT`] are returned, ties in catalog order.
#[must_use]
pub fn similar<'a>(
    catalog: &'a Catalog,
    item: &CatalogItem,
    now: DateTime<Utc>,
) -> Vec<&'a CatalogItem> {
    let lower = |list: &[String]| -> Vec<String> { list.iter().map(|s| s.to_lowercase()).collect() };
    let tags = lower(&item.tags);
    let keywords = lower(&item.keywords);
    let kind = item.kind_key();

    let mut scored: Vec<(f64, &CatalogItem)> = catalog
        .items()
        .iter()
        .filter(|other| other.name != item.name)
        .map(|other| {
            let mut score = 0.0;
            score += 3.0 * shared(&lower(&other.tags), &tags);
            if !kind.is_empty() && other.kind_key() == kind {
                score += 2.0;
            }
            score += shared(&lower(&other.keywords), &keywords);
            if other.popular {
                score += 0.5;
            }
            if other.is_updated(now) {
                score += 0.5;
            }
            (score, other)
        })
        .filter(|(score, _)| *score > 0.0)
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored
        .into_iter()
        .take(SIMILAR_LIMIT)
        .map(|(_, other)| other)
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn shared(values: &[String], set: &[String]) -> f64 {
    values.iter().filter(|v| set.contains(v)).count() as f64
}
