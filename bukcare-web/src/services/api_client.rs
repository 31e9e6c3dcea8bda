use crate::config::BackendSettings;
use crate::error::ApiError;
use reqwest::{header::CONTENT_TYPE, Client, Method, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use service_core::observability::{TracedClientExt, TracedRequest};
use std::time::Duration;

/// JSON client for the REST backend.
///
/// Every call attaches the bearer token when one is given, propagates the
/// current trace context and sorts failures into [`ApiError`]. Nothing is
/// retried.
pub struct ApiClient {
    client: Client,
    base_url: String,
    admin_path: String,
}

impl ApiClient {
    pub fn new(settings: &BackendSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.url.trim_end_matches('/').to_string(),
            admin_path: settings.admin_path.trim_end_matches('/').to_string(),
        })
    }

    /// Path of an admin management endpoint, e.g. `admin_path("/dashboard/stats/")`.
    pub fn admin_path(&self, path: &str) -> String {
        format!("{}{}", self.admin_path, path)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&Secret<String>>,
    ) -> Result<T, ApiError> {
        let request = self.client.traced_get(&self.url(path));
        self.execute(Method::GET, path, request, token).await
    }

    pub async fn get_with_query<T, Q>(
        &self,
        path: &str,
        query: &Q,
        token: Option<&Secret<String>>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let request = self.client.traced_get(&self.url(path)).query(query);
        self.execute(Method::GET, path, request, token).await
    }

    pub async fn post<T, B>(
        &self,
        path: &str,
        body: &B,
        token: Option<&Secret<String>>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.client.traced_post(&self.url(path)).json(body);
        self.execute(Method::POST, path, request, token).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&Secret<String>>,
    ) -> Result<T, ApiError> {
        let request = self.client.traced_delete(&self.url(path));
        self.execute(Method::DELETE, path, request, token).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        request: TracedRequest,
        token: Option<&Secret<String>>,
    ) -> Result<T, ApiError> {
        let request = match token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        };

        let response = request.send().await.map_err(|e| {
            tracing::error!(%method, path, error = %e, "Backend request failed");
            ApiError::NetworkUnreachable
        })?;

        decode(response, token.is_some()).await.inspect_err(|e| {
            tracing::warn!(%method, path, error = %e, "Backend call returned an error");
        })
    }
}

/// Turns a backend response into `T`, checking in order: expired token,
/// JSON content type, parseable body, success status.
async fn decode<T: DeserializeOwned>(
    response: reqwest::Response,
    authenticated: bool,
) -> Result<T, ApiError> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED && authenticated {
        return Err(ApiError::AuthRequired);
    }

    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("application/json"))
        .unwrap_or(false);

    if !is_json {
        return Err(ApiError::ServerNonJsonResponse);
    }

    let body = response.bytes().await?;
    let payload: Value = serde_json::from_slice(&body)
        .map_err(|_| ApiError::InvalidResponse("Invalid response from server".to_string()))?;

    if !status.is_success() {
        return Err(ApiError::from_status(status, &payload));
    }

    serde_json::from_value(payload).map_err(|e| {
        tracing::warn!(error = %e, "Unexpected response shape from backend");
        ApiError::InvalidResponse("Invalid response from server".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(&BackendSettings {
            url: server.uri(),
            admin_path: "/admin".to_string(),
            timeout_seconds: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn attaches_bearer_token_and_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/users/search/"))
            .and(query_param("q", "ana"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let token = Secret::new("tok-1".to_string());
        let results: Vec<Value> = client
            .get_with_query(
                &client.admin_path("/users/search/"),
                &[("q", "ana")],
                Some(&token),
            )
            .await
            .unwrap();

        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn html_body_is_server_non_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/user/"))
            .respond_with(
                ResponseTemplate::new(500)
                    .insert_header("content-type", "text/html")
                    .set_body_string("<h1>Server Error</h1>"),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get::<Value>("/auth/user/", None)
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::ServerNonJsonResponse));
    }

    #[tokio::test]
    async fn error_status_uses_payload_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login/"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"error": "Invalid credentials"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .post::<Value, _>("/auth/login/", &json!({}), None)
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(err.to_string(), "Invalid credentials");
    }

    #[tokio::test]
    async fn unauthorized_with_token_is_auth_required() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "expired"})))
            .mount(&server)
            .await;

        let token = Secret::new("stale".to_string());
        let err = client_for(&server)
            .delete::<Value>("/admin/invitations/x/cancel/", Some(&token))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::AuthRequired));
    }

    #[tokio::test]
    async fn unreachable_backend() {
        let client = ApiClient::new(&BackendSettings {
            url: "http://127.0.0.1:9".to_string(),
            admin_path: "/admin".to_string(),
            timeout_seconds: 2,
        })
        .unwrap();

        let err = client.get::<Value>("/auth/user/", None).await.unwrap_err();
        assert!(matches!(err, ApiError::NetworkUnreachable));
        assert_eq!(
            err.to_string(),
            "Unable to connect to server. Please check your connection."
        );
    }
}
