//! Helpers for responding to HTMX-driven requests.

use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};

pub const HX_REQUEST: &str = "hx-request";
pub const HX_REDIRECT: &str = "HX-Redirect";
pub const HX_TRIGGER: &str = "HX-Trigger";

/// Fired after an invitation is created, resent or cancelled.
pub const INVITATIONS_CHANGED: &str = "invitations-changed";

pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get(HX_REQUEST)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == "true")
        .unwrap_or(false)
}

/// Sends the browser to `location`: a full-page redirect for HTMX requests,
/// a `303 See Other` otherwise.
pub fn redirect(headers: &HeaderMap, location: &str) -> Response {
    if !is_htmx(headers) {
        return Redirect::to(location).into_response();
    }

    match HeaderValue::from_str(location) {
        Ok(value) => {
            let mut response = StatusCode::OK.into_response();
            response.headers_mut().insert(HX_REDIRECT, value);
            response
        }
        Err(_) => Redirect::to("/").into_response(),
    }
}

/// Adds an `HX-Trigger` event to `response`.
pub fn with_trigger(mut response: Response, event: &'static str) -> Response {
    response
        .headers_mut()
        .insert(HX_TRIGGER, HeaderValue::from_static(event));
    response
}
