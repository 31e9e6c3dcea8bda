use super::session_expired;
use crate::error::ApiError;
use crate::models::{Role, User};
use crate::session::AuthSession;
use crate::AppState;
use askama::Template;
use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

pub struct NavLink {
    pub href: String,
    pub label: &'static str,
    pub active: bool,
}

/// Shared layout for role pages: header, role navigation and one section.
#[derive(Template)]
#[template(path = "portal/page.html")]
pub struct PortalTemplate {
    pub user: User,
    pub role: Role,
    pub section: &'static str,
    pub title: &'static str,
    pub nav: Vec<NavLink>,
    pub notice: Option<String>,
}

impl PortalTemplate {
    pub fn new(user: User, role: Role, section: &'static str) -> Self {
        let title = match section {
            "appointments" => "Appointments",
            "profile" => "My Profile",
            _ => "Dashboard",
        };

        Self {
            nav: nav_for(role, section),
            user,
            role,
            section,
            title,
            notice: None,
        }
    }
}

fn nav_for(role: Role, section: &str) -> Vec<NavLink> {
    let prefix = role.path_prefix();
    let mut links = vec![NavLink {
        href: role.home_path().to_string(),
        label: "Dashboard",
        active: section == "home",
    }];

    if role != Role::Admin {
        links.push(NavLink {
            href: format!("{}/appointments", prefix),
            label: "Appointments",
            active: section == "appointments",
        });
    }

    links.push(NavLink {
        href: format!("{}/profile", prefix),
        label: "Profile",
        active: section == "profile",
    });
    links
}

/// The gate admitted this session, so its role is known.
fn role_of(auth: &AuthSession) -> Role {
    auth.role().unwrap_or(Role::Patient)
}

pub async fn home(auth: AuthSession) -> impl IntoResponse {
    let role = role_of(&auth);
    PortalTemplate::new(auth.user, role, "home")
}

pub async fn appointments(auth: AuthSession) -> impl IntoResponse {
    let role = role_of(&auth);
    PortalTemplate::new(auth.user, role, "appointments")
}

pub async fn profile(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    auth: AuthSession,
) -> Response {
    render_profile(&state, session, &headers, auth).await
}

/// Profile page with fresh details from the backend, falling back to the
/// identity stored at sign-in when the backend cannot be reached.
pub(crate) async fn render_profile(
    state: &AppState,
    session: Session,
    headers: &HeaderMap,
    auth: AuthSession,
) -> Response {
    let role = role_of(&auth);

    match state.api.current_user(&auth.access_token).await {
        Ok(user) => PortalTemplate::new(user, role, "profile").into_response(),
        Err(ApiError::AuthRequired) => {
            let return_to = format!("{}/profile", role.path_prefix());
            session_expired(session, headers, &return_to).await
        }
        Err(e) => {
            tracing::warn!(user_id = %auth.user.id, error = %e, "Showing stored profile");
            let mut page = PortalTemplate::new(auth.user, role, "profile");
            page.notice = Some("Showing saved profile details. Some information may be out of date.".to_string());
            page.into_response()
        }
    }
}
