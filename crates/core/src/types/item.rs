//! Catalog item model.
//!
//! Items arrive as loosely-typed JSON objects. Only `name` and `type` are
//! required; every other field degrades to a default when missing. Fields
//! that sources write inconsistently (tags and keywords as either a
//! comma-delimited string or an array, prices and discounts as either text or
//! numbers) are normalized during deserialization.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::promotion::{leading_decimal, promotion_active};
use super::stock::Stock;
use super::timestamp::{is_recent, parse_timestamp};

/// Description shown when an item has none.
pub const DEFAULT_DESCRIPTION: &str = "No description available.";

/// One listed product or tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Display name; unique within a catalog (case-insensitive).
    #[serde(default, deserialize_with = "text_or_number_required")]
    pub name: String,
    /// Category label.
    #[serde(default, rename = "type", deserialize_with = "text_or_number_required")]
    pub kind: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub long_description: Option<String>,
    #[serde(default, deserialize_with = "list_or_delimited")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "list_or_delimited")]
    pub keywords: Vec<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub image: Option<String>,
    /// Alternate and gallery images, in display order.
    #[serde(default, deserialize_with = "list_or_delimited")]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub video: Option<String>,
    /// Free-form single price, possibly multi-line.
    #[serde(default, deserialize_with = "text_or_number")]
    pub price: Option<String>,
    /// Ordered price table; takes precedence over `price`.
    #[serde(default, deserialize_with = "object_or_none")]
    pub pricing: Option<PricingTable>,
    #[serde(default)]
    pub stock: Stock,
    #[serde(default, deserialize_with = "text_or_number")]
    pub release_date: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub update_date: Option<String>,
    /// Percentage (`"20"`, `20`) or a textual deal.
    #[serde(default, deserialize_with = "text_or_number")]
    pub discount: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub discount_expiry: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub offer: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub offer_expiry: Option<String>,
    /// Contact channel identifier, e.g. `telegram` or `discord`.
    #[serde(default, deserialize_with = "text_or_number")]
    pub contact: Option<String>,
    /// Free-form requirements note shown on request.
    #[serde(default, deserialize_with = "text_or_number")]
    pub requirements: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub popular: bool,
}

impl CatalogItem {
    /// Build an item from a JSON value.
    ///
    /// Returns `None` when the value is not an object, cannot be read, or is
    /// missing its name or type.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value::<Self>(value)
            .ok()
            .filter(Self::is_listable)
    }

    /// Whether the item has the fields required to be listed.
    #[must_use]
    pub fn is_listable(&self) -> bool {
        !self.name.trim().is_empty() && !self.kind.trim().is_empty()
    }

    /// Case-insensitive identity key.
    #[must_use]
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }

    /// Lowercase category label used for filtering.
    #[must_use]
    pub fn kind_key(&self) -> String {
        self.kind.trim().to_lowercase()
    }

    /// Whether this item is the one named `name`, ignoring case.
    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }

    /// Short description, falling back to the default text.
    #[must_use]
    pub fn description_or_default(&self) -> &str {
        non_empty(self.description.as_deref()).unwrap_or(DEFAULT_DESCRIPTION)
    }

    /// One-line summary: the description, else the first line of the long
    /// description, else the default text.
    #[must_use]
    pub fn summary(&self) -> &str {
        non_empty(self.description.as_deref())
            .or_else(|| {
                non_empty(self.long_description.as_deref())
                    .and_then(|long| long.lines().next())
            })
            .unwrap_or(DEFAULT_DESCRIPTION)
    }

    /// Full description: the long description, else the description, else
    /// the default text.
    #[must_use]
    pub fn full_description(&self) -> &str {
        non_empty(self.long_description.as_deref())
            .or_else(|| non_empty(self.description.as_deref()))
            .unwrap_or(DEFAULT_DESCRIPTION)
    }

    /// Requirements note, falling back to a prompt to contact the owner.
    #[must_use]
    pub fn requirements_or_default(&self) -> String {
        non_empty(self.requirements.as_deref()).map_or_else(
            || format!("Requirements for {}…\n\nPlease contact the owner.", self.name),
            String::from,
        )
    }

    /// All images in gallery order: the main image followed by alternates.
    #[must_use]
    pub fn gallery(&self) -> Vec<&str> {
        self.image
            .as_deref()
            .into_iter()
            .chain(self.images.iter().map(String::as_str))
            .filter(|url| !url.trim().is_empty())
            .collect()
    }

    #[must_use]
    pub fn released_at(&self) -> Option<DateTime<Utc>> {
        self.release_date.as_deref().and_then(parse_timestamp)
    }

    #[must_use]
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.update_date.as_deref().and_then(parse_timestamp)
    }

    /// Released within the recent window.
    #[must_use]
    pub fn is_new(&self, now: DateTime<Utc>) -> bool {
        is_recent(self.released_at(), now)
    }

    /// Updated within the recent window.
    #[must_use]
    pub fn is_updated(&self, now: DateTime<Utc>) -> bool {
        is_recent(self.updated_at(), now)
    }

    /// Released or updated within the recent window.
    #[must_use]
    pub fn is_recent(&self, now: DateTime<Utc>) -> bool {
        self.is_new(now) || self.is_updated(now)
    }

    #[must_use]
    pub fn discount_active(&self, now: DateTime<Utc>) -> bool {
        promotion_active(
            self.discount.as_deref(),
            self.discount_expiry.as_deref(),
            now,
        )
    }

    #[must_use]
    pub fn offer_active(&self, now: DateTime<Utc>) -> bool {
        promotion_active(self.offer.as_deref(), self.offer_expiry.as_deref(), now)
    }

    /// Has a running discount or offer.
    #[must_use]
    pub fn is_promoted(&self, now: DateTime<Utc>) -> bool {
        self.discount_active(now) || self.offer_active(now)
    }

    /// Numeric discount percentage, when the discount is a number.
    #[must_use]
    pub fn discount_percent(&self) -> Option<Decimal> {
        self.discount.as_deref().and_then(leading_decimal)
    }

    #[must_use]
    pub fn discount_expires_at(&self) -> Option<DateTime<Utc>> {
        self.discount_expiry.as_deref().and_then(parse_timestamp)
    }

    #[must_use]
    pub fn offer_expires_at(&self) -> Option<DateTime<Utc>> {
        self.offer_expiry.as_deref().and_then(parse_timestamp)
    }
}

/// Ordered label to price table, e.g. `{"1 month": "$5", "Lifetime": "$40"}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct PricingTable(Vec<(String, String)>);

impl PricingTable {
    /// Rows in source order.
    #[must_use]
    pub fn rows(&self) -> &[(String, String)] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for PricingTable {
    fn from(map: Map<String, Value>) -> Self {
        Self(
            map.into_iter()
                .filter_map(|(label, value)| value_to_text(value).map(|v| (label, v)))
                .collect(),
        )
    }
}

impl From<PricingTable> for Map<String, Value> {
    fn from(table: PricingTable) -> Self {
        table
            .0
            .into_iter()
            .map(|(label, value)| (label, Value::String(value)))
            .collect()
    }
}

// =============================================================================
// Lenient field readers
// =============================================================================

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Accept a string or a number; anything else becomes `None`.
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_text(Value::deserialize(deserializer)?))
}

fn text_or_number_required<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(text_or_number(deserializer)?.unwrap_or_default())
}

/// Accept an array of strings or a single comma-delimited string.
fn list_or_delimited<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let list = match Value::deserialize(deserializer)? {
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(String::from)
            .collect(),
        Value::Array(values) => values
            .into_iter()
            .filter_map(value_to_text)
            .map(|s| s.trim().to_string())
            .collect(),
        _ => Vec::new(),
    };
    Ok(list)
}

/// Accept a JSON object as a price table; any other shape becomes `None`.
fn object_or_none<'de, D>(deserializer: D) -> Result<Option<PricingTable>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => Some(PricingTable::from(map)).filter(|table| !table.is_empty()),
        _ => None,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "yes" | "1"),
        _ => false,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_requires_name_and_type() {
        assert!(CatalogItem::from_value(json!({"name": "A", "type": "x"})).is_some());
        assert!(CatalogItem::from_value(json!({"name": "A"})).is_none());
        assert!(CatalogItem::from_value(json!({"type": "x"})).is_none());
        assert!(CatalogItem::from_value(json!({"name": "  ", "type": "x"})).is_none());
        assert!(CatalogItem::from_value(json!(["not", "an", "object"])).is_none());
    }

    #[test]
    fn test_delimited_tags_normalize() {
        let item = CatalogItem::from_value(json!({
            "name": "Bot", "type": "bots",
            "tags": "fast, cheap ,,auto",
            "keywords": ["alpha", " beta ", 3]
        }))
        .unwrap();
        assert_eq!(item.tags, vec!["fast", "cheap", "auto"]);
        assert_eq!(item.keywords, vec!["alpha", "beta", "3"]);
    }

    #[test]
    fn test_unexpected_tag_shape_is_empty() {
        let item =
            CatalogItem::from_value(json!({"name": "Bot", "type": "bots", "tags": {"a": 1}}))
                .unwrap();
        assert!(item.tags.is_empty());
    }

    #[test]
    fn test_description_fallbacks() {
        let bare = CatalogItem::from_value(json!({"name": "A", "type": "x"})).unwrap();
        assert_eq!(bare.summary(), DEFAULT_DESCRIPTION);
        assert_eq!(bare.full_description(), DEFAULT_DESCRIPTION);

        let long_only = CatalogItem::from_value(json!({
            "name": "A", "type": "x", "long_description": "First line\nSecond line"
        }))
        .unwrap();
        assert_eq!(long_only.summary(), "First line");
        assert_eq!(long_only.full_description(), "First line\nSecond line");
        assert_eq!(long_only.description_or_default(), DEFAULT_DESCRIPTION);
    }

    #[test]
    fn test_pricing_keeps_source_order() {
        let item = CatalogItem::from_value(json!({
            "name": "A", "type": "x",
            "pricing": {"Weekly": "$3", "Monthly": "$9", "Lifetime": 40}
        }))
        .unwrap();
        let rows = item.pricing.unwrap();
        let labels: Vec<&str> = rows.rows().iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["Weekly", "Monthly", "Lifetime"]);
        assert_eq!(rows.rows()[2].1, "40");
    }

    #[test]
    fn test_malformed_optional_fields_keep_item() {
        let item = CatalogItem::from_value(json!({
            "name": "A", "type": "x",
            "pricing": "free",
            "stock": [1, 2],
            "price": {"amount": 5},
            "images": 7,
            "popular": null,
            "release_date": ["2026-01-01"]
        }))
        .unwrap();
        assert!(item.pricing.is_none());
        assert_eq!(item.stock, Stock::Unknown);
        assert!(item.price.is_none());
        assert!(item.images.is_empty());
        assert!(!item.popular);
        assert!(item.released_at().is_none());

        let listed = CatalogItem::from_value(json!({"name": "B", "type": "x", "pricing": [["a", 1]]}));
        assert!(listed.is_some_and(|item| item.pricing.is_none()));
    }

    #[test]
    fn test_numeric_discount() {
        let item =
            CatalogItem::from_value(json!({"name": "A", "type": "x", "discount": 15})).unwrap();
        assert_eq!(item.discount.as_deref(), Some("15"));
        assert_eq!(item.discount_percent(), Some(Decimal::from(15)));
        assert!(item.discount_active(now()));
    }

    #[test]
    fn test_expired_offer_not_promoted() {
        let item = CatalogItem::from_value(json!({
            "name": "A", "type": "x",
            "offer": "Free trial", "offer_expiry": "2026-01-01"
        }))
        .unwrap();
        assert!(!item.offer_active(now()));
        assert!(!item.is_promoted(now()));
    }

    #[test]
    fn test_recent_flags() {
        let item = CatalogItem::from_value(json!({
            "name": "A", "type": "x",
            "release_date": "2025-01-01", "update_date": "2026-03-08"
        }))
        .unwrap();
        assert!(!item.is_new(now()));
        assert!(item.is_updated(now()));
        assert!(item.is_recent(now()));
    }

    #[test]
    fn test_gallery_order() {
        let item = CatalogItem::from_value(json!({
            "name": "A", "type": "x",
            "image": "a.png", "images": ["b.png", "", "c.png"]
        }))
        .unwrap();
        assert_eq!(item.gallery(), vec!["a.png", "b.png", "c.png"]);
    }

    #[test]
    fn test_is_named_ignores_case() {
        let item = CatalogItem::from_value(json!({"name": "Sniper Bot", "type": "x"})).unwrap();
        assert!(item.is_named("sniper bot"));
        assert!(item.is_named(" SNIPER BOT "));
        assert!(!item.is_named("sniper"));
    }

    #[test]
    fn test_lenient_popular() {
        let item =
            CatalogItem::from_value(json!({"name": "A", "type": "x", "popular": "yes"})).unwrap();
        assert!(item.popular);
    }
}
