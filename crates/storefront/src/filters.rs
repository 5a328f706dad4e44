//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Returns `"s"` unless the count is exactly one.
///
/// Usage in templates: `{{ count }} tool{{ count|plural }}`
#[askama::filter_fn]
pub fn plural(count: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(plural_suffix(&count.to_string()))
}

fn plural_suffix(count: &str) -> &'static str {
    if count.trim() == "1" { "" } else { "s" }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use askama::Template;

    use crate::filters;

    #[derive(Template)]
    #[template(source = "{{ count }} tool{{ count|plural }}", ext = "txt")]
    struct Counted {
        count: usize,
    }

    #[test]
    fn test_plural_suffix() {
        assert_eq!(Counted { count: 0 }.render().unwrap(), "0 tools");
        assert_eq!(Counted { count: 1 }.render().unwrap(), "1 tool");
        assert_eq!(Counted { count: 12 }.render().unwrap(), "12 tools");
    }
}
