//! Request plumbing shared by the handlers
use axum::http::HeaderMap;
use simple_submit_core::RequestContext;
use tower_http::cors::CorsLayer;

/// Header carrying the authenticated user name, set by the fronting proxy
pub const USER_HEADER: &str = "x-user";

pub fn cors() -> CorsLayer {
    CorsLayer::permissive()
}

/// Caller identity of a request. A missing or blank header is anonymous.
pub fn request_context(headers: &HeaderMap) -> RequestContext {
    let user = headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|user| !user.is_empty())
        .map(str::to_string);
    RequestContext::new(user)
}
