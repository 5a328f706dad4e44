//! Detail-view URL fragment codec.
//!
//! The detail view of an item is addressed with `#tool=<url-encoded-name>`.
//! Any other fragment, or no fragment at all, selects the list view.

use std::fmt;

use thiserror::Error;

const TOOL_PREFIX: &str = "tool=";

/// Errors from parsing a detail fragment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FragmentError {
    /// The fragment does not start with `tool=`.
    #[error("not a detail fragment")]
    NotDetail,
    /// The fragment names no item.
    #[error("detail fragment has an empty name")]
    EmptyName,
    /// The name is not valid percent-encoded UTF-8.
    #[error("detail fragment is not valid UTF-8: {0}")]
    Encoding(String),
}

/// A parsed `#tool=<name>` fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailFragment {
    name: String,
}

impl DetailFragment {
    /// Fragment selecting the item called `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Parse a fragment.
    ///
    /// Accepts `#tool=x`, `tool=x`, or a full URL carrying such a fragment.
    ///
    /// # Errors
    ///
    /// Returns an error when the input has no `tool=` fragment, names an
    /// empty item, or is badly encoded.
    pub fn parse(input: &str) -> Result<Self, FragmentError> {
        let input = input.trim();
        let fragment = match input.split_once('#') {
            Some((_, fragment)) => fragment,
            None => input,
        };

        let encoded = fragment
            .strip_prefix(TOOL_PREFIX)
            .ok_or(FragmentError::NotDetail)?;

        // Form posts encode spaces as '+'.
        let encoded = encoded.replace('+', "%20");
        let name = urlencoding::decode(&encoded)
            .map_err(|e| FragmentError::Encoding(e.to_string()))?;

        if name.trim().is_empty() {
            return Err(FragmentError::EmptyName);
        }

        Ok(Self::new(name.into_owned()))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Percent-encoded name.
    #[must_use]
    pub fn encoded_name(&self) -> String {
        urlencoding::encode(&self.name).into_owned()
    }

    /// Absolute URL of the detail view below `base`.
    #[must_use]
    pub fn url(&self, base: &str) -> String {
        let base = base.split('#').next().unwrap_or(base);
        format!("{base}{self}")
    }

    /// Query-string form used by the server-rendered route.
    #[must_use]
    pub fn query(&self) -> String {
        format!("?{TOOL_PREFIX}{}", self.encoded_name())
    }
}

impl fmt::Display for DetailFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{TOOL_PREFIX}{}", self.encoded_name())
    }
}
