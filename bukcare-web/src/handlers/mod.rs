pub mod admin;
pub mod app;
pub mod auth;
pub mod metrics;
pub mod portal;
pub mod signup;

use crate::auth::signin_location;
use crate::htmx;
use crate::session::SessionStore;
use axum::http::HeaderMap;
use axum::response::Response;
use chrono::NaiveDate;
use tower_sessions::Session;

/// The backend no longer accepts this session's token: forget it and send the
/// browser to sign in, coming back to `return_to` afterwards.
pub(crate) async fn session_expired(session: Session, headers: &HeaderMap, return_to: &str) -> Response {
    if let Err(e) = SessionStore::new(session).clear().await {
        tracing::error!(error = %e, "Failed to clear expired session");
    }
    tracing::info!(return_to, "Backend rejected session token, signing out");
    htmx::redirect(headers, &signin_location(Some(return_to)))
}

/// Reference date for age checks.
pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
