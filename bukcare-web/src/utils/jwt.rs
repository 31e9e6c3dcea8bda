use crate::models::{Role, User};
use anyhow::Result;
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use serde_json::Value;

/// Identity claims carried in the backend's access token payload.
#[derive(Debug, Deserialize)]
pub struct JwtClaims {
    #[serde(default)]
    pub user_id: Option<Value>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_type: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl JwtClaims {
    /// Identity to use when `GET /auth/user/` is unavailable.
    pub fn into_user(self) -> User {
        let id = match self.user_id {
            Some(Value::String(s)) => s,
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };

        User {
            id,
            email: self.email.unwrap_or_default(),
            user_type: self
                .user_type
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| Role::Patient.as_str().to_string()),
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
        }
    }
}

/// Decode JWT claims without validation.
///
/// The token was just issued to us by the backend over the login call; the
/// signature is the backend's concern and is checked there on every request.
pub fn decode_jwt_claims(token: &str) -> Result<JwtClaims> {
    let parts: Vec<&str> = token.split('.').collect();

    if parts.len() != 3 {
        return Err(anyhow::anyhow!("Invalid JWT format"));
    }

    // Some issuers pad the segment, URL_SAFE_NO_PAD rejects that.
    let payload = general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|e| anyhow::anyhow!("Failed to decode JWT payload: {}", e))?;

    let claims: JwtClaims = serde_json::from_slice(&payload)
        .map_err(|e| anyhow::anyhow!("Failed to parse JWT claims: {}", e))?;

    Ok(claims)
}

#[cfg(test)]
pub(crate) fn encode_test_token(payload: &Value) -> String {
    let header = general_purpose::URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{}.{}.signature", header, body)
}
