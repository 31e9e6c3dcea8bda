mod common;

use axum::http::StatusCode;
use serde_json::json;
use std::time::Duration;
use tower::util::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn admin_app() -> (MockServer, axum::Router, String) {
    let server = MockServer::start().await;
    common::mount_login(
        &server,
        json!({"id": 1, "email": "admin@bukcare.ph", "user_type": "admin",
               "first_name": "Ana", "last_name": "Reyes"}),
    )
    .await;
    let app = common::app_for(&server);
    let cookie = common::sign_in(&app, "admin@bukcare.ph").await;
    (server, app, cookie)
}

#[tokio::test]
async fn stale_search_response_is_discarded() {
    let (server, app, cookie) = admin_app().await;
    Mock::given(method("GET"))
        .and(path("/admin/users/search/"))
        .and(query_param("q", "an"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/users/search/"))
        .and(query_param("q", "ana"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 2, "first_name": "Ana", "last_name": "Cruz", "email": "ana@bukcare.ph", "role": "doctor"}
        ])))
        .mount(&server)
        .await;

    let slow = tokio::spawn(
        app.clone()
            .oneshot(common::get_request("/admin/search?q=an", Some(&cookie))),
    );
    tokio::time::sleep(Duration::from_millis(100)).await;
    let fast = app
        .oneshot(common::get_request("/admin/search?q=ana", Some(&cookie)))
        .await
        .unwrap();

    assert_eq!(fast.status(), StatusCode::OK);
    assert!(common::body_text(fast).await.contains("Ana Cruz"));

    let slow = slow.await.unwrap().unwrap();
    assert_eq!(slow.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn stats_failure_shows_notice_instead_of_error_page() {
    let (server, app, cookie) = admin_app().await;
    Mock::given(method("GET"))
        .and(path("/admin/dashboard/stats/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>boom</html>"))
        .mount(&server)
        .await;

    let response = app
        .oneshot(common::get_request("/admin/stats", Some(&cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(common::body_text(response)
        .await
        .contains("Failed to load dashboard statistics"));
}

#[tokio::test]
async fn invite_triggers_invitation_refresh() {
    let (server, app, cookie) = admin_app().await;
    Mock::given(method("POST"))
        .and(path("/admin/users/invite/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let response = app
        .oneshot(common::form_request(
            "/admin/invite",
            "email=new.doc%40bukcare.ph&role=doctor".to_string(),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["hx-trigger"], "invitations-changed");
    assert!(common::body_text(response)
        .await
        .contains("Invitation sent successfully to new.doc@bukcare.ph"));
}

#[tokio::test]
async fn pending_invitation_conflict_is_reported_on_email() {
    let (server, app, cookie) = admin_app().await;
    Mock::given(method("POST"))
        .and(path("/admin/users/invite/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(
            json!({"error": "A pending invitation already exists for this email"}),
        ))
        .mount(&server)
        .await;

    let response = app
        .oneshot(common::form_request(
            "/admin/invite",
            "email=dup%40bukcare.ph&role=staff".to_string(),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = common::body_text(response).await;
    assert!(body.contains("A pending invitation already exists for this email"));
    assert!(!body.contains("A user with this email already exists"));
}

#[tokio::test]
async fn expired_token_signs_the_admin_out() {
    let (server, app, cookie) = admin_app().await;
    Mock::given(method("GET"))
        .and(path("/admin/invitations/pending/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "expired"})))
        .mount(&server)
        .await;

    let response = app
        .clone()
        .oneshot(common::get_request("/admin/invitations", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        common::location(&response),
        "/signin?next=%2Fadmin%2Fdashboard"
    );

    let response = app
        .oneshot(common::get_request("/admin/dashboard", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}
