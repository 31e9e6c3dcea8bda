#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use base64::{engine::general_purpose, Engine as _};
use bukcare_web::config::{
    BackendSettings, SearchSettings, ServerSettings, Settings, TelemetrySettings,
};
use bukcare_web::startup::build_router;
use bukcare_web::AppState;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn test_settings(backend_url: &str) -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            secure_cookies: false,
            session_inactivity_minutes: 60,
        },
        backend: BackendSettings {
            url: backend_url.to_string(),
            admin_path: "/admin".to_string(),
            timeout_seconds: 5,
        },
        telemetry: TelemetrySettings {
            service_name: "bukcare-web-test".to_string(),
            log_level: "warn".to_string(),
            otlp_endpoint: None,
        },
        search: SearchSettings { debounce_ms: 300 },
    }
}

pub fn app_for(server: &MockServer) -> Router {
    let state = AppState::new(test_settings(&server.uri())).expect("client builds");
    build_router(state)
}

/// Unsigned token carrying `claims` as its payload.
pub fn token_with(claims: &Value) -> String {
    let header = general_purpose::URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = general_purpose::URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.sig", header, payload)
}

/// Backend that accepts any login as `user`.
pub async fn mount_login(server: &MockServer, user: Value) {
    let access = token_with(&json!({
        "user_id": user["id"],
        "email": user["email"],
        "user_type": user["user_type"],
    }));

    Mock::given(method("POST"))
        .and(path("/auth/login/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access": access, "refresh": "refresh-1"})),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/auth/user/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user))
        .mount(server)
        .await;
}

pub fn form_request(uri: &str, body: String, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

pub fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// `name=value` part of the session cookie set by `response`, if any.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("id="))
        .and_then(|value| value.split(';').next())
        .map(str::to_string)
}

pub fn location(response: &Response<Body>) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Signs in through the form and returns the session cookie.
pub async fn sign_in(app: &Router, email: &str) -> String {
    let body = serde_urlencoded::to_string([("email", email), ("password", "secret1")]).unwrap();
    let response = app
        .clone()
        .oneshot(form_request("/signin", body, None))
        .await
        .unwrap();

    assert_eq!(response.status(), 303, "sign-in should redirect");
    session_cookie(&response).expect("sign-in sets a session cookie")
}
