//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transactions)
//! 2. `TraceLayer` (request spans)
//! 3. Request ID (`x-request-id` on span, Sentry scope, and response)
//! 4. Cache control (per content type)

pub mod cache_control;
pub mod request_id;

pub use cache_control::cache_control_middleware;
pub use request_id::request_id_middleware;
