//! Stock indicator.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stock indicator as written by catalog sources.
///
/// Sources use either a count or a free-form label such as `"unlimited"`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum Stock {
    /// A known number of units.
    Count(u64),
    /// A descriptive label.
    Label(String),
    /// No stock information; buyers should ask the owner.
    #[default]
    Unknown,
}

impl Stock {
    /// Human-readable stock label.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Count(0) => "Out of stock".to_string(),
            Self::Count(n) => format!("{n} in stock"),
            Self::Label(label) => match label.to_lowercase().as_str() {
                "unlimited" => "Unlimited".to_string(),
                "very limited" => "Very limited".to_string(),
                _ => label.clone(),
            },
            Self::Unknown => "Contact owner".to_string(),
        }
    }
}

impl From<Value> for Stock {
    fn from(value: Value) -> Self {
        match value {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| {
                    // Negative or fractional counts are clamped to whole units.
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    n.as_f64().map(|f| f.max(0.0).floor() as u64)
                })
                .map_or(Self::Unknown, Self::Count),
            Value::String(s) if !s.trim().is_empty() => Self::Label(s),
            _ => Self::Unknown,
        }
    }
}

impl From<Stock> for Value {
    fn from(stock: Stock) -> Self {
        match stock {
            Stock::Count(n) => Self::from(n),
            Stock::Label(s) => Self::String(s),
            Stock::Unknown => Self::Null,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_count_labels() {
        assert_eq!(Stock::Count(0).label(), "Out of stock");
        assert_eq!(Stock::Count(12).label(), "12 in stock");
    }

    #[test]
    fn test_named_labels() {
        assert_eq!(Stock::Label("UNLIMITED".into()).label(), "Unlimited");
        assert_eq!(Stock::Label("very limited".into()).label(), "Very limited");
        assert_eq!(Stock::Label("On request".into()).label(), "On request");
    }

    #[test]
    fn test_unknown_label() {
        assert_eq!(Stock::Unknown.label(), "Contact owner");
    }

    #[test]
    fn test_from_json() {
        assert_eq!(Stock::from(json!(5)), Stock::Count(5));
        assert_eq!(Stock::from(json!("unlimited")), Stock::Label("unlimited".into()));
        assert_eq!(Stock::from(json!(null)), Stock::Unknown);
        assert_eq!(Stock::from(json!(true)), Stock::Unknown);
    }
}
