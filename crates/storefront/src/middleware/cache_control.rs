//! Cache policy headers.
//!
//! Images may be cached for a week without revalidation. JSON, HTML,
//! scripts, and stylesheets must be revalidated on every use so a reload
//! always sees the latest catalog and assets. Other responses, and responses
//! that already set `Cache-Control`, are left alone.

use axum::{
    extract::Request,
    http::{
        HeaderValue,
        header::{CACHE_CONTROL, CONTENT_TYPE},
    },
    middleware::Next,
    response::Response,
};

const IMMUTABLE: &str = "public, max-age=604800, immutable";
const REVALIDATE: &str = "no-cache";

/// Set `Cache-Control` from the response content type.
pub async fn cache_control_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    if headers.contains_key(CACHE_CONTROL) {
        return response;
    }

    let policy = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(policy_for);
    if let Some(policy) = policy {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static(policy));
    }

    response
}

/// Cache policy for a content type.
fn policy_for(content_type: &str) -> Option<&'static str> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if mime.starts_with("image/") {
        return Some(IMMUTABLE);
    }
    match mime.as_str() {
        "application/json" | "text/html" | "text/css" | "text/javascript"
        | "application/javascript" => Some(REVALIDATE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_for() {
        assert_eq!(policy_for("image/png"), Some(IMMUTABLE));
        assert_eq!(policy_for("image/svg+xml"), Some(IMMUTABLE));
        assert_eq!(policy_for("text/html; charset=utf-8"), Some(REVALIDATE));
        assert_eq!(policy_for("application/json"), Some(REVALIDATE));
        assert_eq!(policy_for("text/javascript"), Some(REVALIDATE));
        assert_eq!(policy_for("text/css"), Some(REVALIDATE));
        assert_eq!(policy_for("font/woff2"), None);
    }
}
