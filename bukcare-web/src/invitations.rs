//! Admin invitations for new doctor and staff accounts.

use crate::error::ApiError;
use crate::models::{InviteRequest, Role};
use crate::validation::{validate_email, ValidationReport};
use serde::Deserialize;
use thiserror::Error;

/// Roles an admin may invite.
pub const INVITABLE_ROLES: [Role; 2] = [Role::Doctor, Role::Staff];

#[derive(Debug, Clone, Deserialize)]
pub struct InviteForm {
    #[serde(default)]
    pub email: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    Role::Doctor.as_str().to_string()
}

impl InviteForm {
    pub fn validate(&self) -> Result<InviteRequest, InviteError> {
        let mut report = ValidationReport::new();
        let email = self.email.trim();

        if email.is_empty() {
            report.push("email", "Email address is required");
        } else if !validate_email(email) {
            report.push("email", "Please enter a valid email address");
        }

        let role = self
            .role
            .parse::<Role>()
            .ok()
            .filter(|r| INVITABLE_ROLES.contains(r));
        if role.is_none() {
            report.push("role", "Please select a role");
        }

        match role {
            Some(role) if report.is_valid() => Ok(InviteRequest {
                email: email.to_string(),
                role: role.as_str().to_string(),
            }),
            _ => Err(InviteError::Validation(report)),
        }
    }
}

#[derive(Debug, Error)]
pub enum InviteError {
    #[error("{0}")]
    Validation(ValidationReport),

    #[error("A user with this email already exists")]
    UserExists,

    #[error("A pending invitation already exists for this email")]
    PendingInvitation,

    #[error(transparent)]
    Api(ApiError),
}

impl InviteError {
    /// Message to show under the email input, if the failure belongs there.
    pub fn email_error(&self) -> Option<String> {
        match self {
            InviteError::Validation(report) => report.error_for("email").map(str::to_string),
            InviteError::UserExists | InviteError::PendingInvitation => Some(self.to_string()),
            InviteError::Api(_) => None,
        }
    }

    pub fn role_error(&self) -> Option<String> {
        match self {
            InviteError::Validation(report) => report.error_for("role").map(str::to_string),
            _ => None,
        }
    }
}

impl From<ApiError> for InviteError {
    fn from(err: ApiError) -> Self {
        let message = match &err {
            ApiError::Http { message, .. } => message.as_str(),
            _ => "",
        };

        // "A pending invitation already exists..." also contains "already exists".
        if message.contains("pending invitation") {
            InviteError::PendingInvitation
        } else if message.contains("already exists") {
            InviteError::UserExists
        } else {
            InviteError::Api(err)
        }
    }
}
