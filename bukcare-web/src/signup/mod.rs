//! Three-step account creation: email, one-time code, profile.
//!
//! The wizard is a set of transitions over [`SignupDraft`]. Each transition
//! either yields the next draft or a [`SignupError`] and leaves the caller's
//! draft untouched, so a failed step never advances.

mod wizard;

pub use wizard::SignupWizard;

use crate::error::ApiError;
use crate::session::{SessionError, SessionStorage};
use crate::validation::{FieldError, SignupData, ValidationReport};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SIGNUP_DRAFT_KEY: &str = "signup_draft";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum SignupDraft {
    /// `email` keeps the last address entered so the form can be prefilled
    /// after going back.
    EmailEntry { email: String },
    OtpPending { email: String },
    ProfileCompletion { email: String },
    Done,
}

impl Default for SignupDraft {
    fn default() -> Self {
        SignupDraft::EmailEntry {
            email: String::new(),
        }
    }
}

impl SignupDraft {
    pub fn step_name(&self) -> &'static str {
        match self {
            SignupDraft::EmailEntry { .. } => "email",
            SignupDraft::OtpPending { .. } => "otp",
            SignupDraft::ProfileCompletion { .. } => "profile",
            SignupDraft::Done => "done",
        }
    }

    pub fn email(&self) -> &str {
        match self {
            SignupDraft::EmailEntry { email }
            | SignupDraft::OtpPending { email }
            | SignupDraft::ProfileCompletion { email } => email,
            SignupDraft::Done => "",
        }
    }

    /// Reads the draft for this browser. Anything unreadable starts over.
    pub async fn load<S: SessionStorage + ?Sized>(storage: &S) -> Result<Self, SessionError> {
        let Some(raw) = storage.read(SIGNUP_DRAFT_KEY).await? else {
            return Ok(SignupDraft::default());
        };

        Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Discarding unreadable signup draft");
            SignupDraft::default()
        }))
    }

    /// Persists the draft; `Done` removes it.
    pub async fn store<S: SessionStorage + ?Sized>(&self, storage: &S) -> Result<(), SessionError> {
        match self {
            SignupDraft::Done => storage.remove(SIGNUP_DRAFT_KEY).await,
            draft => storage
                .write(SIGNUP_DRAFT_KEY, serde_json::to_string(draft)?)
                .await,
        }
    }
}

/// Profile fields as submitted in the last step.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileForm {
    pub first_name: String,
    #[serde(default)]
    pub middle_name: String,
    pub last_name: String,
    pub contact_number: String,
    pub password: String,
    pub confirm_password: String,
    pub sex: String,
    pub date_of_birth: String,
    pub street: String,
    pub barangay: String,
    pub city_municipality: String,
    pub province: String,
    #[serde(default)]
    pub zip_code: String,
}

impl ProfileForm {
    pub fn into_signup_data(self, email: &str) -> SignupData {
        SignupData {
            email: email.to_string(),
            first_name: self.first_name,
            middle_name: self.middle_name,
            last_name: self.last_name,
            contact_number: self.contact_number,
            password: self.password,
            sex: self.sex,
            date_of_birth: self.date_of_birth,
            street: self.street,
            barangay: self.barangay,
            city_municipality: self.city_municipality,
            province: self.province,
            zip_code: self.zip_code,
        }
    }
}

/// Body of `POST /auth/complete-signup/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompleteSignupRequest {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub contact_number: String,
    pub password: String,
    pub sex: String,
    pub date_of_birth: String,
    pub street: String,
    pub barangay: String,
    pub city_municipality: String,
    pub province: String,
    pub zip_code: Option<String>,
}

impl From<SignupData> for CompleteSignupRequest {
    fn from(data: SignupData) -> Self {
        let username = data
            .email
            .split('@')
            .next()
            .unwrap_or_default()
            .to_string();

        Self {
            username,
            email: data.email,
            first_name: data.first_name.trim().to_string(),
            middle_name: non_blank(data.middle_name),
            last_name: data.last_name.trim().to_string(),
            contact_number: data.contact_number,
            password: data.password,
            sex: sex_code(&data.sex),
            date_of_birth: data.date_of_birth,
            street: data.street,
            barangay: data.barangay,
            city_municipality: data.city_municipality,
            province: data.province,
            zip_code: non_blank(data.zip_code),
        }
    }
}

/// Single-letter code the backend stores (`M` or `F`).
fn sex_code(value: &str) -> String {
    match value.trim().to_ascii_lowercase().as_str() {
        "m" | "male" => "M".to_string(),
        "f" | "female" => "F".to_string(),
        other => other.to_uppercase(),
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Remote half of the wizard.
#[async_trait]
pub trait SignupApi: Send + Sync {
    async fn send_otp(&self, email: &str) -> Result<(), ApiError>;
    async fn verify_otp(&self, email: &str, otp: &str) -> Result<(), ApiError>;
    async fn complete_signup(&self, request: &CompleteSignupRequest) -> Result<(), ApiError>;
}

#[derive(Debug, Error)]
pub enum SignupError {
    #[error("{0}")]
    Validation(ValidationReport),

    #[error("Email already exists. Please sign in instead.")]
    DuplicateEmail,

    #[error("Verification code has expired. Please request a new one.")]
    ExpiredCode,

    #[error("Invalid verification code. Please try again.")]
    InvalidCode,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Email not verified. Please verify your email first.")]
    EmailNotVerified,

    #[error("Account with this email or phone already exists.")]
    AccountExists,

    /// Per-field rejections from the backend's `details` object.
    #[error("Invalid data: {}", join_messages(.0))]
    InvalidData(Vec<FieldError>),

    #[error("This step is no longer available. Please start again.")]
    OutOfOrder,

    #[error(transparent)]
    Api(#[from] ApiError),
}

fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl SignupError {
    /// Field-level errors to show next to inputs.
    pub fn field_errors(&self) -> Vec<FieldError> {
        match self {
            SignupError::Validation(report) => report.errors.clone(),
            SignupError::InvalidData(errors) => errors.clone(),
            SignupError::PasswordMismatch => {
                vec![FieldError::new("confirm_password", self.to_string())]
            }
            _ => Vec::new(),
        }
    }

    /// Metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            SignupError::Validation(_) => "validation",
            SignupError::DuplicateEmail => "duplicate_email",
            SignupError::ExpiredCode => "expired_code",
            SignupError::InvalidCode => "invalid_code",
            SignupError::PasswordMismatch => "password_mismatch",
            SignupError::EmailNotVerified => "email_not_verified",
            SignupError::AccountExists => "account_exists",
            SignupError::InvalidData(_) => "invalid_data",
            SignupError::OutOfOrder => "out_of_order",
            SignupError::Api(_) => "api",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::MemoryStorage;

    #[test]
    fn request_defaults_username_and_nulls_blank_optionals() {
        let data = ProfileForm {
            first_name: " Juan ".into(),
            last_name: "Cruz".into(),
            middle_name: "  ".into(),
            zip_code: "1800".into(),
            ..Default::default()
        }
        .into_signup_data("juan.cruz@clinic.ph");

        let request = CompleteSignupRequest::from(data);
        assert_eq!(request.username, "juan.cruz");
        assert_eq!(request.first_name, "Juan");
        assert_eq!(request.middle_name, None);
        assert_eq!(request.zip_code.as_deref(), Some("1800"));

        let json = serde_json::to_value(&request).unwrap();
        assert!(json["middle_name"].is_null());
    }

    #[test]
    fn request_sends_single_letter_sex() {
        for (input, code) in [("F", "F"), ("female", "F"), ("Male", "M"), (" m ", "M")] {
            let data = ProfileForm {
                sex: input.into(),
                ..Default::default()
            }
            .into_signup_data("a@b.ph");
            assert_eq!(CompleteSignupRequest::from(data).sex, code);
        }
    }

    #[tokio::test]
    async fn draft_round_trips_through_storage() {
        let storage = MemoryStorage::default();
        let draft = SignupDraft::OtpPending {
            email: "a@b.ph".into(),
        };
        draft.store(&storage).await.unwrap();
        assert_eq!(SignupDraft::load(&storage).await.unwrap(), draft);

        SignupDraft::Done.store(&storage).await.unwrap();
        assert!(storage.keys().is_empty());
        assert_eq!(
            SignupDraft::load(&storage).await.unwrap(),
            SignupDraft::default()
        );
    }

    #[tokio::test]
    async fn unreadable_draft_starts_over() {
        let storage = MemoryStorage::with(&[(SIGNUP_DRAFT_KEY, r#"{"step":"warp"}"#)]);
        assert_eq!(
            SignupDraft::load(&storage).await.unwrap(),
            SignupDraft::default()
        );
    }

    #[test]
    fn invalid_data_message_joins_fields() {
        let err = SignupError::InvalidData(vec![
            FieldError::new("zip_code", "Ensure this field has no more than 10 characters."),
            FieldError::new("barangay", "This field may not be blank."),
        ]);
        assert_eq!(
            err.to_string(),
            "Invalid data: Ensure this field has no more than 10 characters., This field may not be blank."
        );
    }
}
