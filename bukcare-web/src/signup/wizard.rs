use super::{CompleteSignupRequest, ProfileForm, SignupApi, SignupDraft, SignupError};
use crate::error::ApiError;
use crate::services::metrics;
use crate::validation::{
    validate_confirm_password, validate_email, validate_otp, validate_signup_data, FieldError,
    ValidationReport,
};
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde_json::Value;

pub struct SignupWizard<'a, A: SignupApi + ?Sized> {
    api: &'a A,
}

impl<'a, A: SignupApi + ?Sized> SignupWizard<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// EmailEntry -> OtpPending once the backend has sent a code.
    pub async fn submit_email(
        &self,
        draft: &SignupDraft,
        email: &str,
    ) -> Result<SignupDraft, SignupError> {
        let result = self.submit_email_inner(draft, email.trim()).await;
        record("email", &result);
        result
    }

    async fn submit_email_inner(
        &self,
        draft: &SignupDraft,
        email: &str,
    ) -> Result<SignupDraft, SignupError> {
        if !matches!(draft, SignupDraft::EmailEntry { .. }) {
            return Err(SignupError::OutOfOrder);
        }

        if !validate_email(email) {
            return Err(SignupError::Validation(ValidationReport::single(
                "email",
                "Please enter a valid email address",
            )));
        }

        self.api.send_otp(email).await.map_err(send_otp_error)?;
        tracing::info!("Verification code sent");

        Ok(SignupDraft::OtpPending {
            email: email.to_string(),
        })
    }

    /// OtpPending -> ProfileCompletion once the code is accepted.
    pub async fn submit_otp(
        &self,
        draft: &SignupDraft,
        otp: &str,
    ) -> Result<SignupDraft, SignupError> {
        let result = self.submit_otp_inner(draft, otp.trim()).await;
        record("otp", &result);
        result
    }

    async fn submit_otp_inner(
        &self,
        draft: &SignupDraft,
        otp: &str,
    ) -> Result<SignupDraft, SignupError> {
        let SignupDraft::OtpPending { email } = draft else {
            return Err(SignupError::OutOfOrder);
        };

        if !validate_otp(otp) {
            return Err(SignupError::Validation(ValidationReport::single(
                "otp",
                "OTP must be 6 digits",
            )));
        }

        self.api
            .verify_otp(email, otp)
            .await
            .map_err(|e| match e {
                e if e.is_http_with(StatusCode::BAD_REQUEST, "expired") => SignupError::ExpiredCode,
                e if e.is_http_with(StatusCode::BAD_REQUEST, "Invalid") => SignupError::InvalidCode,
                e => SignupError::Api(e),
            })?;

        Ok(SignupDraft::ProfileCompletion {
            email: email.clone(),
        })
    }

    /// Asks for a fresh code; the draft stays in OtpPending.
    pub async fn resend(&self, draft: &SignupDraft) -> Result<SignupDraft, SignupError> {
        let result = match draft {
            SignupDraft::OtpPending { email } => self
                .api
                .send_otp(email)
                .await
                .map(|_| draft.clone())
                .map_err(send_otp_error),
            _ => Err(SignupError::OutOfOrder),
        };
        record("resend", &result);
        result
    }

    /// One step back, keeping the address: ProfileCompletion -> OtpPending
    /// and OtpPending -> EmailEntry.
    pub fn back(&self, draft: &SignupDraft) -> Result<SignupDraft, SignupError> {
        match draft {
            SignupDraft::ProfileCompletion { email } => Ok(SignupDraft::OtpPending {
                email: email.clone(),
            }),
            SignupDraft::OtpPending { email } => Ok(SignupDraft::EmailEntry {
                email: email.clone(),
            }),
            SignupDraft::EmailEntry { .. } => Ok(draft.clone()),
            _ => Err(SignupError::OutOfOrder),
        }
    }

    /// ProfileCompletion -> Done once the backend creates the account.
    ///
    /// Password confirmation and the profile validator both run before any
    /// call is made.
    pub async fn submit_profile(
        &self,
        draft: &SignupDraft,
        form: ProfileForm,
        today: NaiveDate,
    ) -> Result<SignupDraft, SignupError> {
        let result = self.submit_profile_inner(draft, form, today).await;
        record("profile", &result);
        result
    }

    async fn submit_profile_inner(
        &self,
        draft: &SignupDraft,
        form: ProfileForm,
        today: NaiveDate,
    ) -> Result<SignupDraft, SignupError> {
        let SignupDraft::ProfileCompletion { email } = draft else {
            return Err(SignupError::OutOfOrder);
        };

        if !validate_confirm_password(&form.password, &form.confirm_password) {
            return Err(SignupError::PasswordMismatch);
        }

        let data = form.into_signup_data(email);
        validate_signup_data(&data, today)
            .into_result()
            .map_err(SignupError::Validation)?;

        let request = CompleteSignupRequest::from(data);
        self.api
            .complete_signup(&request)
            .await
            .map_err(complete_signup_error)?;

        tracing::info!(username = %request.username, "Account created");
        Ok(SignupDraft::Done)
    }
}

fn send_otp_error(err: ApiError) -> SignupError {
    if err.is_http_with(StatusCode::BAD_REQUEST, "already exists") {
        SignupError::DuplicateEmail
    } else {
        SignupError::Api(err)
    }
}

fn complete_signup_error(err: ApiError) -> SignupError {
    if err.is_http_with(StatusCode::BAD_REQUEST, "not verified") {
        return SignupError::EmailNotVerified;
    }
    if err.is_http_with(StatusCode::BAD_REQUEST, "already exists") {
        return SignupError::AccountExists;
    }
    if err.status() == Some(StatusCode::BAD_REQUEST) {
        if let Some(fields) = err.details().and_then(detail_errors) {
            return SignupError::InvalidData(fields);
        }
    }
    SignupError::Api(err)
}

/// Flattens a `{"field": ["message", ...]}` object.
fn detail_errors(details: &Value) -> Option<Vec<FieldError>> {
    let object = details.as_object()?;
    let mut errors = Vec::new();

    for (field, value) in object {
        match value {
            Value::String(message) => errors.push(FieldError::new(field.as_str(), message.as_str())),
            Value::Array(items) => errors.extend(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|message| FieldError::new(field.as_str(), message)),
            ),
            _ => {}
        }
    }

    (!errors.is_empty()).then_some(errors)
}

fn record(step: &str, result: &Result<SignupDraft, SignupError>) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    };
    metrics::record_signup_transition(step, outcome);
    if let Err(e) = result {
        tracing::info!(step, outcome, error = %e, "Signup step rejected");
    }
}
