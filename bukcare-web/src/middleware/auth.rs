use crate::auth::{authorize, signin_location, GateDecision};
use crate::htmx;
use crate::models::Role;
use crate::session::{AuthSession, SessionStore};
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use service_core::error::AppError;
use tower_sessions::Session;

/// Admits the request only for a signed-in user of `role`; everyone else is
/// redirected by the gate. On success the [`AuthSession`] snapshot is placed
/// in the request extensions.
pub async fn require_role(
    State(role): State<Role>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    let auth = match SessionStore::new(session).restore().await {
        Ok(auth) => auth,
        Err(e) => return AppError::from(e).into_response(),
    };

    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or("/")
        .to_string();

    match (authorize(auth.as_ref(), &[role], &path), auth) {
        (GateDecision::Render, Some(auth)) => {
            request.extensions_mut().insert(auth);
            next.run(request).await
        }
        (decision, _) => {
            // Fragment URLs are not useful as a post-login destination.
            let location = match &decision {
                GateDecision::RedirectToSignin { .. } if htmx::is_htmx(request.headers()) => {
                    signin_location(None)
                }
                other => other.location().unwrap_or_else(|| signin_location(None)),
            };

            tracing::info!(path = %path, required = %role, location = %location, "Access denied by route gate");
            htmx::redirect(request.headers(), &location)
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthSession>()
            .cloned()
            .ok_or_else(|| Redirect::to("/signin").into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::services::auth_api::AuthTokens;
    use axum::{
        body::Body,
        http::{header::LOCATION, Request, StatusCode},
        middleware::from_fn_with_state,
        routing::{get, post},
        Router,
    };
    use secrecy::Secret;
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, SessionManagerLayer};

    /// `/login/<role>` stores a session for that role; `/admin` is admin-only.
    fn app() -> Router {
        async fn login(session: Session, axum::extract::Path(role): axum::extract::Path<String>) -> StatusCode {
            let user = User {
                id: "1".into(),
                email: "u@clinic.ph".into(),
                user_type: role,
                first_name: String::new(),
                last_name: String::new(),
            };
            let tokens = AuthTokens {
                access: Secret::new("a".into()),
                refresh: Secret::new("r".into()),
            };
            SessionStore::new(session).save(&tokens, &user).await.unwrap();
            StatusCode::OK
        }

        async fn admin_page(auth: AuthSession) -> String {
            format!("hello {}", auth.user.email)
        }

        Router::new()
            .route(
                "/admin",
                get(admin_page).route_layer(from_fn_with_state(Role::Admin, require_role)),
            )
            .route("/login/:role", post(login))
            .layer(SessionManagerLayer::new(MemoryStore::default()))
    }

    async fn cookie_for(app: &Router, role: &str) -> String {
        let response = app
            .clone()
            .oneshot(
                Request::post(format!("/login/{role}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let cookie = response.headers()["set-cookie"].to_str().unwrap();
        cookie.split(';').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn anonymous_is_sent_to_signin() {
        let response = app()
            .oneshot(Request::get("/admin").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/signin?next=%2Fadmin");
    }

    #[tokio::test]
    async fn doctor_is_sent_home() {
        let app = app();
        let cookie = cookie_for(&app, "doctor").await;

        let response = app
            .oneshot(
                Request::get("/admin")
                    .header("cookie", cookie)
                    .header(htmx::HX_REQUEST, "true")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()[htmx::HX_REDIRECT], "/doctor/dashboard");
    }

    #[tokio::test]
    async fn admin_is_admitted() {
        let app = app();
        let cookie = cookie_for(&app, "admin").await;

        let response = app
            .oneshot(
                Request::get("/admin")
                    .header("cookie", cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
