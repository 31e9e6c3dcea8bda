use super::api_client::ApiClient;
use crate::error::ApiError;
use crate::models::User;
use crate::utils::jwt::decode_jwt_claims;
use secrecy::Secret;
use serde::Deserialize;

/// Token pair issued by `POST /auth/login/`.
#[derive(Debug, Clone)]
pub struct AuthTokens {
    pub access: Secret<String>,
    pub refresh: Secret<String>,
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(default)]
    access: Option<String>,
    #[serde(default)]
    refresh: Option<String>,
}

impl ApiClient {
    /// Exchanges credentials for tokens and resolves the user's identity.
    ///
    /// Identity comes from `GET /auth/user/`; when that call fails for any
    /// reason other than an expired token, the access token's claims are used
    /// instead.
    pub async fn login(&self, email: &str, password: &str) -> Result<(AuthTokens, User), ApiError> {
        let response: LoginResponse = self
            .post(
                "/auth/login/",
                &serde_json::json!({ "email": email, "password": password }),
                None,
            )
            .await?;

        let (access, refresh) = match (response.access, response.refresh) {
            (Some(access), Some(refresh)) if !access.is_empty() && !refresh.is_empty() => {
                (access, refresh)
            }
            _ => {
                return Err(ApiError::InvalidResponse(
                    "Invalid login response: Missing authentication tokens".to_string(),
                ))
            }
        };

        let claims = decode_jwt_claims(&access).map_err(|e| {
            tracing::warn!(error = %e, "Access token payload could not be decoded");
            ApiError::InvalidResponse("Invalid authentication token received".to_string())
        })?;

        let tokens = AuthTokens {
            access: Secret::new(access),
            refresh: Secret::new(refresh),
        };

        let user = match self.current_user(&tokens.access).await {
            Ok(user) => user,
            Err(ApiError::AuthRequired) => return Err(ApiError::AuthRequired),
            Err(e) => {
                tracing::warn!(error = %e, "Falling back to token claims for user identity");
                claims.into_user()
            }
        };

        Ok((tokens, user))
    }

    pub async fn current_user(&self, access_token: &Secret<String>) -> Result<User, ApiError> {
        self.get("/auth/user/", Some(access_token)).await
    }
}
