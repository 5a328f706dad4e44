//! View models shared by the catalog and favorites templates.
//!
//! Every `*_html` field is escaped here and rendered with `|safe`.

use chrono::{DateTime, Utc};
use modshelf_core::{CatalogItem, DetailFragment, Favorites, time_left};

use crate::search::{Highlighter, escape_html};

/// Placeholder image served from `/static`.
pub const PLACEHOLDER_IMAGE: &str = "/static/placeholder.svg";

/// A lazily loaded image with its fallback chain.
///
/// `fallbacks` holds the URLs to try after `src` fails, in order. `app.js`
/// walks them on load errors and, once they run out, replaces the image
/// with a `.no-image` element showing the alt text.
#[derive(Debug, Clone)]
pub struct ImageView {
    pub src: String,
    pub alt: String,
    /// JSON array of URLs after `src`, for the `data-fallbacks` attribute.
    pub fallbacks: String,
}

impl ImageView {
    /// Main image of an item, falling back to its alternates.
    #[must_use]
    pub fn for_item(item: &CatalogItem) -> Self {
        Self::chain(&item.gallery(), &item.name)
    }

    /// A single image.
    #[must_use]
    pub fn single(src: &str, alt: &str) -> Self {
        Self::chain(&[src], alt)
    }

    fn chain(urls: &[&str], alt: &str) -> Self {
        let mut chain: Vec<&str> = Vec::with_capacity(urls.len() + 1);
        for url in urls.iter().copied().chain([PLACEHOLDER_IMAGE]) {
            if !chain.contains(&url) {
                chain.push(url);
            }
        }
        let (src, rest) = chain.split_first().map_or((PLACEHOLDER_IMAGE, &[][..]), |(s, r)| (*s, r));
        Self {
            src: src.to_string(),
            alt: alt.to_string(),
            fallbacks: serde_json::to_string(rest).unwrap_or_else(|_| "[]".to_string()),
        }
    }
}

// =============================================================================
// Badges
// =============================================================================

/// Where badges are rendered; NEW and UPDATED only show on the detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeMode {
    Card,
    Detail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    /// CSS modifier: `new-badge`, `updated-badge`, `discount-badge`, `offer-badge`.
    pub kind: &'static str,
    pub label: String,
    /// Expiry timestamp for the live countdown.
    pub expiry: Option<String>,
}

impl Badge {
    fn new(kind: &'static str, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            expiry: None,
        }
    }
}

/// Promotion and freshness badges for an item.
#[must_use]
pub fn badges(item: &CatalogItem, mode: BadgeMode, now: DateTime<Utc>) -> Vec<Badge> {
    let mut badges = Vec::new();

    if mode == BadgeMode::Detail {
        if item.is_new(now) {
            badges.push(Badge::new("new-badge", "NEW"));
        }
        if item.is_updated(now) {
            badges.push(Badge::new("updated-badge", "UPDATED"));
        }
    }

    if item.discount_active(now) {
        let percent = item.discount_percent();
        let label = percent.map_or_else(
            || item.discount.clone().unwrap_or_default(),
            |p| format!("-{}%", p.normalize()),
        );
        badges.push(Badge::new("discount-badge", label));

        let countdown = item
            .discount_expires_at()
            .filter(|_| percent.is_some())
            .and_then(|expiry| time_left(expiry, now).map(|left| (expiry, left)));
        if let Some((expiry, left)) = countdown {
            badges.push(Badge {
                expiry: Some(expiry.to_rfc3339()),
                ..Badge::new("discount-badge", left)
            });
        }
    }

    if let Some(offer) = item.offer.as_ref().filter(|_| item.offer_active(now)) {
        badges.push(Badge::new("offer-badge", offer.clone()));
    }

    badges
}

// =============================================================================
// Cards
// =============================================================================

/// One card in the listing grid.
#[derive(Debug, Clone)]
pub struct CardView {
    pub name: String,
    /// Detail link, `/?tool=<name>`.
    pub href: String,
    pub name_html: String,
    pub description_html: String,
    pub tags: Vec<String>,
    pub popular: bool,
    pub is_new: bool,
    pub is_updated: bool,
    pub badges: Vec<Badge>,
    pub image: ImageView,
    pub favorite: bool,
}

impl CardView {
    #[must_use]
    pub fn new(
        item: &CatalogItem,
        favorites: &Favorites,
        highlighter: Option<&Highlighter>,
        now: DateTime<Utc>,
    ) -> Self {
        let mark = |text: &str| highlighter.map_or_else(|| escape_html(text), |h| h.apply(text));
        let description = item.description.as_deref().unwrap_or_default();

        Self {
            name: item.name.clone(),
            href: detail_href(&item.name),
            name_html: mark(&item.name),
            description_html: nl2br(&mark(description)),
            tags: item.tags.clone(),
            popular: item.popular,
            is_new: item.is_new(now),
            is_updated: item.is_updated(now),
            badges: badges(item, BadgeMode::Card, now),
            image: ImageView::for_item(item),
            favorite: favorites.contains(&item.name),
        }
    }
}

/// Small card used for similar items and the favorites page.
#[derive(Debug, Clone)]
pub struct MiniCardView {
    pub name: String,
    pub href: String,
    pub kind: String,
    pub description: String,
    pub tags: Vec<String>,
    pub image: ImageView,
}

impl MiniCardView {
    /// Card with at most `tags` tags and the description cut to
    /// `description_chars` characters.
    #[must_use]
    pub fn new(item: &CatalogItem, tags: usize, description_chars: Option<usize>) -> Self {
        let description = item.description.as_deref().unwrap_or_default();
        let description = match description_chars {
            Some(max) => truncate(description, max),
            None => description.to_string(),
        };
        let kind = if item.kind.trim().is_empty() {
            "Tool".to_string()
        } else {
            item.kind.clone()
        };

        Self {
            name: item.name.clone(),
            href: detail_href(&item.name),
            kind,
            description,
            tags: item.tags.iter().take(tags).cloned().collect(),
            image: ImageView::single(item.image.as_deref().unwrap_or(PLACEHOLDER_IMAGE), &item.name),
        }
    }
}

/// Detail page link for an item.
#[must_use]
pub fn detail_href(name: &str) -> String {
    format!("/{}", DetailFragment::new(name).query())
}

/// Cut `text` to `max` characters, appending an ellipsis when cut.
#[must_use]
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max).collect();
    cut.push('…');
    cut
}

/// Turn newlines of already escaped text into `<br>`.
#[must_use]
pub fn nl2br(html: &str) -> String {
    html.replace('\n', "<br>")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        "2026-03-10T12:00:00Z".parse().unwrap()
    }

    fn item(value: serde_json::Value) -> CatalogItem {
        CatalogItem::from_value(value).unwrap()
    }

    #[test]
    fn test_image_chain() {
        let item = item(json!({"name": "A", "type": "x", "image": "a.png", "images": ["b.png"]}));
        let image = ImageView::for_item(&item);
        assert_eq!(image.src, "a.png");
        assert_eq!(image.fallbacks, r#"["b.png","/static/placeholder.svg"]"#);

        let bare = ImageView::for_item(&self::item(json!({"name": "B", "type": "x"})));
        assert_eq!(bare.src, PLACEHOLDER_IMAGE);
        assert_eq!(bare.fallbacks, "[]");
    }

    #[test]
    fn test_image_chain_never_retries_src() {
        let item = item(json!({
            "name": "A", "type": "x", "image": "a.png", "images": ["a.png", "b.png", "a.png"]
        }));
        let image = ImageView::for_item(&item);
        let rest: Vec<String> = serde_json::from_str(&image.fallbacks).unwrap();
        assert_eq!(rest, vec!["b.png", PLACEHOLDER_IMAGE]);
        assert!(!rest.contains(&image.src));
    }

    #[test]
    fn test_card_badges() {
        let item = item(json!({
            "name": "A", "type": "x", "release_date": "2026-03-09",
            "discount": "25", "discount_expiry": "2026-03-12T12:00:00Z",
            "offer": "Free trial"
        }));
        let card = badges(&item, BadgeMode::Card, now());
        let labels: Vec<&str> = card.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["-25%", "⏳ 2d 0m left", "Free trial"]);
        assert!(card[1].expiry.is_some());

        let detail = badges(&item, BadgeMode::Detail, now());
        assert_eq!(detail[0].label, "NEW");
    }

    #[test]
    fn test_text_discount_badge() {
        let item = item(json!({"name": "A", "type": "x", "discount": "Half price"}));
        let badges = badges(&item, BadgeMode::Card, now());
        assert_eq!(badges.len(), 1);
        assert_eq!(badges[0].label, "Half price");
    }

    #[test]
    fn test_card_highlight_and_escape() {
        let item = item(json!({"name": "Sniper <Bot>", "type": "bots",
                               "description": "Fast bot\nfor drops"}));
        let mut favorites = Favorites::default();
        favorites.toggle("sniper <bot>");
        let h = Highlighter::new("bot").unwrap();

        let card = CardView::new(&item, &favorites, Some(&h), now());
        assert_eq!(card.name_html, "Sniper &lt;<mark>Bot</mark>&gt;");
        assert_eq!(card.description_html, "Fast <mark>bot</mark><br>for drops");
        assert!(card.favorite);
        assert_eq!(card.href, "/?tool=Sniper%20%3CBot%3E");
    }

    #[test]
    fn test_mini_card() {
        let item = item(json!({"name": "A", "type": "x", "tags": ["1", "2", "3"],
                               "description": "x".repeat(80)}));
        let card = MiniCardView::new(&item, 2, Some(60));
        assert_eq!(card.tags, vec!["1", "2"]);
        assert_eq!(card.description.chars().count(), 61);
        assert!(card.description.ends_with('…'));
    }
}
