use crate::auth::safe_next;
use crate::htmx;
use crate::session::SessionStore;
use crate::validation::ValidationReport;
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use service_core::error::AppError;
use tower_sessions::Session;
use validator::Validate;

#[derive(Template)]
#[template(path = "auth/signin.html")]
pub struct SigninTemplate {
    pub next: String,
    pub registered: bool,
}

#[derive(Template)]
#[template(path = "fragments/errors.html")]
pub struct ErrorsFragment {
    pub messages: Vec<String>,
}

impl ErrorsFragment {
    pub fn single(message: impl Into<String>) -> Self {
        Self {
            messages: vec![message.into()],
        }
    }

    pub fn unprocessable(self) -> Response {
        (StatusCode::UNPROCESSABLE_ENTITY, self).into_response()
    }
}

#[derive(Deserialize)]
pub struct SigninQuery {
    pub next: Option<String>,
    #[serde(default)]
    pub registered: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct SignInForm {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

pub async fn signin_page(
    session: Session,
    headers: HeaderMap,
    Query(query): Query<SigninQuery>,
) -> Result<Response, AppError> {
    // Already signed in with a usable role: go straight to the dashboard.
    if let Some(auth) = SessionStore::new(session).restore().await? {
        if let Ok(role) = auth.role() {
            let location = safe_next(query.next.as_deref()).unwrap_or(role.home_path());
            return Ok(htmx::redirect(&headers, location));
        }
    }

    Ok(SigninTemplate {
        next: safe_next(query.next.as_deref())
            .unwrap_or_default()
            .to_string(),
        registered: query.registered.is_some(),
    }
    .into_response())
}

pub async fn signin_handler(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(payload): Form<SignInForm>,
) -> Result<Response, AppError> {
    if let Err(errors) = payload.validate() {
        let report = ValidationReport::from(errors);
        return Ok(ErrorsFragment {
            messages: report.messages(),
        }
        .unprocessable());
    }

    let (tokens, user) = match state.api.login(payload.email.trim(), &payload.password).await {
        Ok(result) => result,
        Err(e) => {
            tracing::info!(error = %e, "Sign-in rejected");
            return Ok(ErrorsFragment::single(e.to_string()).unprocessable());
        }
    };

    let role = match user.role() {
        Ok(role) => role,
        Err(unknown) => {
            tracing::warn!(user_id = %user.id, role = %unknown.0, "Refusing sign-in for unknown role");
            return Ok(ErrorsFragment::single(
                "Your account type is not supported. Please contact the clinic.",
            )
            .unprocessable());
        }
    };

    // New identity, new session id.
    session.cycle_id().await.map_err(|e| {
        AppError::InternalError(anyhow::anyhow!("Failed to rotate session id: {}", e))
    })?;
    SessionStore::new(session).save(&tokens, &user).await?;

    tracing::info!(user_id = %user.id, role = %role, "User signed in");

    let location = safe_next(payload.next.as_deref()).unwrap_or(role.home_path());
    Ok(htmx::redirect(&headers, location))
}

pub async fn logout_handler(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let store = SessionStore::new(session);

    // A corrupted session restores as `None` and is cleared either way.
    if let Some(auth) = store.restore().await? {
        state.search.forget(&auth.user.id);
        tracing::info!(user_id = %auth.user.id, "User signed out");
    }

    store.clear().await?;

    Ok(htmx::redirect(&headers, "/"))
}
