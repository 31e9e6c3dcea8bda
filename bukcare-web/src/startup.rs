use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post},
    Router,
};
use service_core::middleware::{
    security_headers::security_headers_middleware, tracing::request_id_middleware,
};
use service_core::observability::REQUEST_ID_HEADER;
use time::Duration;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::handlers::{admin, app, auth, metrics, portal, signup};
use crate::middleware::{auth::require_role, metrics::track_metrics};
use crate::models::Role;
use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(state.settings.server.secure_cookies)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(
            state.settings.server.session_inactivity_minutes,
        )));

    Router::new()
        .route("/", get(app::index))
        .route("/about", get(app::about))
        .route("/services", get(app::services))
        .route("/contact", get(app::contact))
        .route("/health", get(app::health_check))
        .route("/metrics", get(metrics::metrics))
        .route("/signin", get(auth::signin_page).post(auth::signin_handler))
        .route("/logout", post(auth::logout_handler))
        .route("/signup", get(signup::signup_page))
        .route("/signup/email", post(signup::submit_email))
        .route("/signup/otp", post(signup::submit_otp))
        .route("/signup/otp/resend", post(signup::resend_otp))
        .route("/signup/back", post(signup::back))
        .route("/signup/profile", post(signup::submit_profile))
        .route(
            "/doctor/signup",
            get(signup::doctor_signup_page).post(signup::submit_doctor_signup),
        )
        .merge(admin_routes())
        .merge(portal_routes(Role::Doctor))
        .merge(portal_routes(Role::Staff))
        .merge(portal_routes(Role::Patient))
        .route_layer(from_fn(track_metrics))
        .nest_service(
            "/static",
            ServeDir::new(concat!(env!("CARGO_MANIFEST_DIR"), "/static")),
        )
        .fallback(app::fallback)
        .layer(session_layer)
        .layer(from_fn(security_headers_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/dashboard", get(admin::dashboard))
        .route("/admin/profile", get(admin::profile))
        .route("/admin/stats", get(admin::stats_fragment))
        .route("/admin/activities", get(admin::activities_fragment))
        .route("/admin/search", get(admin::search))
        .route("/admin/invite", post(admin::invite))
        .route("/admin/invitations", get(admin::invitations_fragment))
        .route("/admin/invitations/:id/resend", post(admin::resend_invitation))
        .route("/admin/invitations/:id/cancel", delete(admin::cancel_invitation))
        .route_layer(from_fn_with_state(Role::Admin, require_role))
}

/// Dashboard, appointments and profile pages of a non-admin role.
fn portal_routes(role: Role) -> Router<AppState> {
    let prefix = role.path_prefix();

    Router::new()
        .route(role.home_path(), get(portal::home))
        .route(&format!("{}/appointments", prefix), get(portal::appointments))
        .route(&format!("{}/profile", prefix), get(portal::profile))
        .route_layer(from_fn_with_state(role, require_role))
}
