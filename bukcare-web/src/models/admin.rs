//! Payloads of the admin management endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardStats {
    pub total_patients: u64,
    pub total_doctors: u64,
    pub total_staff: u64,
    pub total_appointments: u64,
    pub pending_approvals: u64,
    pub active_sessions: u64,
    pub pending_invites: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Activity {
    pub id: i64,
    pub activity_type: String,
    pub description: String,
    #[serde(default)]
    pub user_name: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl Activity {
    pub fn title(&self) -> String {
        let mut title = String::with_capacity(self.activity_type.len());
        for (i, word) in self.activity_type.split('_').enumerate() {
            if i > 0 {
                title.push(' ');
            }
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                title.extend(first.to_uppercase());
                title.push_str(chars.as_str());
            }
        }
        title
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserSearchResult {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    /// `doctor`, `staff`, `patient` or the backend's catch-all `user`.
    pub role: String,
}

impl UserSearchResult {
    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Sent,
    Accepted,
    Cancelled,
    Expired,
    #[serde(other)]
    Unknown,
}

impl InvitationStatus {
    pub fn label(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "Pending",
            InvitationStatus::Sent => "Sent",
            InvitationStatus::Accepted => "Accepted",
            InvitationStatus::Cancelled => "Cancelled",
            InvitationStatus::Expired => "Expired",
            InvitationStatus::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Invitation {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub status: InvitationStatus,
    #[serde(default)]
    pub invited_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub is_expired: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct InviteRequest {
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InviteResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub invitation: Option<Invitation>,
}

/// Body of resend/cancel responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_tolerate_missing_counters() {
        let stats: DashboardStats =
            serde_json::from_str(r#"{"total_patients": 12, "pending_invites": 3}"#).unwrap();
        assert_eq!(stats.total_patients, 12);
        assert_eq!(stats.pending_invites, 3);
        assert_eq!(stats.total_doctors, 0);
    }

    #[test]
    fn activity_title_from_type() {
        let activity: Activity = serde_json::from_str(
            r#"{"id": 1, "activity_type": "user_invited", "description": "Invited a@b.ph as doctor",
                "user_name": "Admin", "created_at": "2026-10-01T08:00:00Z", "metadata": {}}"#,
        )
        .unwrap();
        assert_eq!(activity.title(), "User Invited");
    }

    #[test]
    fn invitation_with_unexpected_status() {
        let invitation: Invitation = serde_json::from_str(
            r#"{"id": "7f9c24e8-3b12-4fef-91e1-ec6a4a5c1b9f", "email": "doc@clinic.ph",
                "role": "doctor", "status": "revoked", "invited_by_name": "",
                "created_at": "2026-10-01T08:00:00Z", "expires_at": "2026-10-08T08:00:00Z",
                "is_expired": false}"#,
        )
        .unwrap();
        assert_eq!(invitation.status, InvitationStatus::Unknown);
    }
}
