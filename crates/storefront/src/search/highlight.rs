//! Match highlighting for card text.

use regex::{Regex, RegexBuilder};

/// Wraps case-insensitive occurrences of a query in `<mark>`.
///
/// Output is HTML-escaped and safe to render unescaped.
#[derive(Debug, Clone)]
pub struct Highlighter {
    pattern: Regex,
}

impl Highlighter {
    /// Build a highlighter for a query. Returns `None` for a blank query.
    ///
    /// The whole query is highlighted, along with each word of it that is
    /// at least two characters long.
    #[must_use]
    pub fn new(query: &str) -> Option<Self> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        let mut needles: Vec<&str> = std::iter::once(query)
            .chain(query.split_whitespace().filter(|w| w.chars().count() >= 2))
            .collect();
        needles.sort_by_key(|n| std::cmp::Reverse(n.len()));
        needles.dedup();

        let alternation = needles
            .iter()
            .map(|n| regex::escape(n))
            .collect::<Vec<_>>()
            .join("|");

        RegexBuilder::new(&alternation)
            .case_insensitive(true)
            .build()
            .ok()
            .map(|pattern| Self { pattern })
    }

    /// Escape `text` and mark every match.
    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 16);
        let mut last = 0;
        for m in self.pattern.find_iter(text) {
            out.push_str(&escape_html(&text[last..m.start()]));
            out.push_str("<mark>");
            out.push_str(&escape_html(m.as_str()));
            out.push_str("</mark>");
            last = m.end();
        }
        out.push_str(&escape_html(&text[last..]));
        out
    }
}

/// Escape text for HTML element or attribute content, the way templates
/// escape their variables.
#[must_use]
pub fn escape_html(text: &str) -> String {
    askama::filters::escape(text, askama::filters::Html)
        .map(|safe| safe.to_string())
        .unwrap_or_default()
}
