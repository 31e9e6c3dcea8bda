use super::portal::render_profile;
use super::session_expired;
use crate::error::ApiError;
use crate::htmx;
use crate::invitations::{InviteError, InviteForm};
use crate::models::{DashboardStats, Invitation, User, UserSearchResult};
use crate::services::metrics;
use crate::session::AuthSession;
use crate::utils::format_time_ago;
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use chrono::Utc;
use serde::Deserialize;
use tower_sessions::Session;
use uuid::Uuid;

const DASHBOARD_PATH: &str = "/admin/dashboard";

/// Values and messages of the invite form.
#[derive(Debug, Clone)]
pub struct InviteFormView {
    pub email: String,
    pub role: String,
    pub email_error: Option<String>,
    pub role_error: Option<String>,
    pub error: Option<String>,
    pub success: Option<String>,
}

impl Default for InviteFormView {
    fn default() -> Self {
        Self {
            email: String::new(),
            role: "doctor".to_string(),
            email_error: None,
            role_error: None,
            error: None,
            success: None,
        }
    }
}

#[derive(Template)]
#[template(path = "admin/dashboard.html")]
pub struct AdminDashboardTemplate {
    pub user: User,
    pub debounce_ms: u64,
    pub invite: InviteFormView,
}

#[derive(Template)]
#[template(path = "admin/stats.html")]
pub struct StatsFragment {
    pub stats: DashboardStats,
    pub notice: Option<String>,
}

pub struct ActivityRow {
    pub title: String,
    pub description: String,
    pub user_name: String,
    pub when: String,
}

#[derive(Template)]
#[template(path = "admin/activities.html")]
pub struct ActivitiesFragment {
    pub activities: Vec<ActivityRow>,
    pub notice: Option<String>,
}

#[derive(Template)]
#[template(path = "admin/search_results.html")]
pub struct SearchResultsFragment {
    pub query: String,
    pub results: Vec<UserSearchResult>,
    pub notice: Option<String>,
}

#[derive(Template)]
#[template(path = "admin/invite_form.html")]
pub struct InviteFormFragment {
    pub invite: InviteFormView,
}

#[derive(Template)]
#[template(path = "admin/invitations.html")]
pub struct InvitationsFragment {
    pub invitations: Vec<Invitation>,
    pub notice: Option<String>,
}

#[derive(Template)]
#[template(path = "fragments/notice.html")]
pub struct NoticeFragment {
    pub kind: &'static str,
    pub message: String,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

pub async fn dashboard(State(state): State<AppState>, auth: AuthSession) -> impl IntoResponse {
    AdminDashboardTemplate {
        user: auth.user,
        debounce_ms: state.settings.search.debounce_ms,
        invite: InviteFormView::default(),
    }
}

pub async fn profile(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    auth: AuthSession,
) -> Response {
    render_profile(&state, session, &headers, auth).await
}

pub async fn stats_fragment(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    auth: AuthSession,
) -> Response {
    match state.api.dashboard_stats(&auth.access_token).await {
        Ok(stats) => StatsFragment {
            stats,
            notice: None,
        }
        .into_response(),
        Err(ApiError::AuthRequired) => session_expired(session, &headers, DASHBOARD_PATH).await,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load dashboard stats");
            StatsFragment {
                stats: DashboardStats::default(),
                notice: Some("Failed to load dashboard statistics".to_string()),
            }
            .into_response()
        }
    }
}

pub async fn activities_fragment(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    auth: AuthSession,
) -> Response {
    match state.api.recent_activities(&auth.access_token).await {
        Ok(activities) => {
            let now = Utc::now();
            let activities = activities
                .into_iter()
                .map(|a| ActivityRow {
                    title: a.title(),
                    when: format_time_ago(a.created_at, now),
                    user_name: a.user_name.unwrap_or_default(),
                    description: a.description,
                })
                .collect();

            ActivitiesFragment {
                activities,
                notice: None,
            }
            .into_response()
        }
        Err(ApiError::AuthRequired) => session_expired(session, &headers, DASHBOARD_PATH).await,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load recent activities");
            ActivitiesFragment {
                activities: Vec::new(),
                notice: Some("Failed to load recent activities".to_string()),
            }
            .into_response()
        }
    }
}

/// Debounced user search. Responses overtaken by a newer search from the same
/// admin are dropped with `204 No Content` so HTMX leaves the newer results
/// in place.
pub async fn search(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    auth: AuthSession,
    Query(query): Query<SearchQuery>,
) -> Response {
    let key = auth.user.id.as_str();
    let sequence = state.search.dispatch(key);
    let term = query.q.trim();

    if term.is_empty() {
        return SearchResultsFragment {
            query: String::new(),
            results: Vec::new(),
            notice: None,
        }
        .into_response();
    }

    let result = state.api.search_users(term, &auth.access_token).await;

    if !state.search.is_latest(key, sequence) {
        metrics::record_stale_search();
        tracing::debug!(sequence, "Discarding stale search response");
        return StatusCode::NO_CONTENT.into_response();
    }

    match result {
        Ok(results) => SearchResultsFragment {
            query: term.to_string(),
            results,
            notice: None,
        }
        .into_response(),
        Err(ApiError::AuthRequired) => session_expired(session, &headers, DASHBOARD_PATH).await,
        Err(e) => {
            tracing::warn!(error = %e, "User search failed");
            SearchResultsFragment {
                query: term.to_string(),
                results: Vec::new(),
                notice: Some("Search failed. Please try again.".to_string()),
            }
            .into_response()
        }
    }
}

pub async fn invite(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    auth: AuthSession,
    Form(form): Form<InviteForm>,
) -> Response {
    let result = match form.validate() {
        Ok(request) => state
            .api
            .invite_user(&request, &auth.access_token)
            .await
            .map(|_| request)
            .map_err(InviteError::from),
        Err(e) => Err(e),
    };

    match result {
        Ok(request) => {
            tracing::info!(role = %request.role, "Invitation sent");
            let invite = InviteFormView {
                success: Some(format!(
                    "Invitation sent successfully to {}",
                    request.email
                )),
                ..InviteFormView::default()
            };
            htmx::with_trigger(
                InviteFormFragment { invite }.into_response(),
                htmx::INVITATIONS_CHANGED,
            )
        }
        Err(InviteError::Api(ApiError::AuthRequired)) => {
            session_expired(session, &headers, DASHBOARD_PATH).await
        }
        Err(e) => {
            tracing::info!(error = %e, "Invitation rejected");
            let invite = InviteFormView {
                email: form.email.trim().to_string(),
                role: form.role.clone(),
                email_error: e.email_error(),
                role_error: e.role_error(),
                error: match &e {
                    InviteError::Api(_) => Some(e.to_string()),
                    _ => None,
                },
                success: None,
            };
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                InviteFormFragment { invite },
            )
                .into_response()
        }
    }
}

pub async fn invitations_fragment(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    auth: AuthSession,
) -> Response {
    match state.api.pending_invitations(&auth.access_token).await {
        Ok(invitations) => InvitationsFragment {
            invitations,
            notice: None,
        }
        .into_response(),
        Err(ApiError::AuthRequired) => session_expired(session, &headers, DASHBOARD_PATH).await,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load pending invitations");
            InvitationsFragment {
                invitations: Vec::new(),
                notice: Some("Failed to load pending invitations".to_string()),
            }
            .into_response()
        }
    }
}

pub async fn resend_invitation(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    auth: AuthSession,
    Path(id): Path<Uuid>,
) -> Response {
    let result = state.api.resend_invitation(id, &auth.access_token).await;
    invitation_action(session, &headers, result, "Invitation resent successfully").await
}

pub async fn cancel_invitation(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    auth: AuthSession,
    Path(id): Path<Uuid>,
) -> Response {
    let result = state.api.cancel_invitation(id, &auth.access_token).await;
    invitation_action(session, &headers, result, "Invitation cancelled successfully").await
}

async fn invitation_action(
    session: Session,
    headers: &HeaderMap,
    result: Result<crate::models::ActionResponse, ApiError>,
    default_message: &str,
) -> Response {
    match result {
        Ok(response) => {
            let message = response
                .message
                .unwrap_or_else(|| default_message.to_string());
            htmx::with_trigger(
                NoticeFragment {
                    kind: "success",
                    message,
                }
                .into_response(),
                htmx::INVITATIONS_CHANGED,
            )
        }
        Err(ApiError::AuthRequired) => session_expired(session, headers, DASHBOARD_PATH).await,
        Err(e) => {
            tracing::warn!(error = %e, "Invitation action failed");
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                NoticeFragment {
                    kind: "error",
                    message: e.to_string(),
                },
            )
                .into_response()
        }
    }
}
