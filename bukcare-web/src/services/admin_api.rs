use super::api_client::ApiClient;
use crate::error::ApiError;
use crate::models::{
    ActionResponse, Activity, DashboardStats, Invitation, InviteRequest, InviteResponse,
    UserSearchResult,
};
use secrecy::Secret;
use uuid::Uuid;

/// Admin management endpoints, all relative to the configured admin prefix.
impl ApiClient {
    pub async fn dashboard_stats(&self, token: &Secret<String>) -> Result<DashboardStats, ApiError> {
        self.get(&self.admin_path("/dashboard/stats/"), Some(token))
            .await
    }

    pub async fn recent_activities(&self, token: &Secret<String>) -> Result<Vec<Activity>, ApiError> {
        self.get(&self.admin_path("/dashboard/activities/"), Some(token))
            .await
    }

    pub async fn search_users(
        &self,
        query: &str,
        token: &Secret<String>,
    ) -> Result<Vec<UserSearchResult>, ApiError> {
        self.get_with_query(
            &self.admin_path("/users/search/"),
            &[("q", query)],
            Some(token),
        )
        .await
    }

    pub async fn invite_user(
        &self,
        request: &InviteRequest,
        token: &Secret<String>,
    ) -> Result<InviteResponse, ApiError> {
        self.post(&self.admin_path("/users/invite/"), request, Some(token))
            .await
    }

    pub async fn pending_invitations(
        &self,
        token: &Secret<String>,
    ) -> Result<Vec<Invitation>, ApiError> {
        self.get(&self.admin_path("/invitations/pending/"), Some(token))
            .await
    }

    pub async fn resend_invitation(
        &self,
        id: Uuid,
        token: &Secret<String>,
    ) -> Result<ActionResponse, ApiError> {
        let path = self.admin_path(&format!("/invitations/{}/resend/", id));
        self.post(&path, &serde_json::json!({}), Some(token)).await
    }

    pub async fn cancel_invitation(
        &self,
        id: Uuid,
        token: &Secret<String>,
    ) -> Result<ActionResponse, ApiError> {
        let path = self.admin_path(&format!("/invitations/{}/cancel/", id));
        self.delete(&path, Some(token)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendSettings;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(&BackendSettings {
            url: format!("{}/api/v1", server.uri()),
            admin_path: "/admin".to_string(),
            timeout_seconds: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn cancel_uses_delete_on_invitation_path() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();
        Mock::given(method("DELETE"))
            .and(path(format!("/api/v1/admin/invitations/{}/cancel/", id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true, "message": "Invitation cancelled successfully"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let token = Secret::new("t".to_string());
        let response = client_for(&server).cancel_invitation(id, &token).await.unwrap();
        assert!(response.success);
    }

    #[tokio::test]
    async fn invite_surfaces_field_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/admin/users/invite/"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "success": false,
                "errors": {"email": ["A user with this email already exists."]}
            })))
            .mount(&server)
            .await;

        let token = Secret::new("t".to_string());
        let err = client_for(&server)
            .invite_user(
                &InviteRequest {
                    email: "doc@clinic.ph".into(),
                    role: "doctor".into(),
                },
                &token,
            )
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "A user with this email already exists.");
    }
}
