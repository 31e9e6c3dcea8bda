use crate::session::SessionStore;
use askama::Template;
use axum::response::{IntoResponse, Redirect};
use tower_sessions::Session;

#[derive(Template)]
#[template(path = "public/index.html")]
pub struct IndexTemplate {
    pub home: Option<&'static str>,
}

#[derive(Template)]
#[template(path = "public/about.html")]
pub struct AboutTemplate {
    pub home: Option<&'static str>,
}

#[derive(Template)]
#[template(path = "public/services.html")]
pub struct ServicesTemplate {
    pub home: Option<&'static str>,
}

#[derive(Template)]
#[template(path = "public/contact.html")]
pub struct ContactTemplate {
    pub home: Option<&'static str>,
}

/// Dashboard link for the navigation bar when someone is signed in.
async fn signed_in_home(session: Session) -> Option<&'static str> {
    match SessionStore::new(session).restore().await {
        Ok(auth) => auth
            .and_then(|auth| auth.role().ok())
            .map(|role| role.home_path()),
        Err(e) => {
            tracing::warn!(error = %e, "Could not read session for public page");
            None
        }
    }
}

pub async fn index(session: Session) -> impl IntoResponse {
    IndexTemplate {
        home: signed_in_home(session).await,
    }
}

pub async fn about(session: Session) -> impl IntoResponse {
    AboutTemplate {
        home: signed_in_home(session).await,
    }
}

pub async fn services(session: Session) -> impl IntoResponse {
    ServicesTemplate {
        home: signed_in_home(session).await,
    }
}

pub async fn contact(session: Session) -> impl IntoResponse {
    ContactTemplate {
        home: signed_in_home(session).await,
    }
}

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn fallback() -> impl IntoResponse {
    Redirect::to("/")
}
