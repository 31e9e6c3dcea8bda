use super::today;
use crate::htmx;
use crate::signup::{ProfileForm, SignupDraft, SignupError, SignupWizard};
use crate::validation::{
    validate_doctor_signup_data, DoctorSignupData, FieldError, SPECIALIZATIONS,
};
use crate::AppState;
use askama::Template;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use service_core::error::AppError;
use tower_sessions::Session;

/// Profile values echoed back into the form. Passwords are never echoed.
#[derive(Debug, Clone, Default)]
pub struct ProfileValues {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub contact_number: String,
    pub sex: String,
    pub date_of_birth: String,
    pub street: String,
    pub barangay: String,
    pub city_municipality: String,
    pub province: String,
    pub zip_code: String,
}

impl From<&ProfileForm> for ProfileValues {
    fn from(form: &ProfileForm) -> Self {
        Self {
            first_name: form.first_name.clone(),
            middle_name: form.middle_name.clone(),
            last_name: form.last_name.clone(),
            contact_number: form.contact_number.clone(),
            sex: form.sex.clone(),
            date_of_birth: form.date_of_birth.clone(),
            street: form.street.clone(),
            barangay: form.barangay.clone(),
            city_municipality: form.city_municipality.clone(),
            province: form.province.clone(),
            zip_code: form.zip_code.clone(),
        }
    }
}

/// Everything the wizard card needs to render one step.
#[derive(Debug, Clone, Default)]
pub struct SignupCard {
    pub step: &'static str,
    pub email: String,
    pub message: Option<String>,
    pub notice: Option<String>,
    pub errors: Vec<FieldError>,
    pub profile: ProfileValues,
}

impl SignupCard {
    pub fn for_draft(draft: &SignupDraft) -> Self {
        Self {
            step: draft.step_name(),
            email: draft.email().to_string(),
            ..Default::default()
        }
    }

    fn with_error(mut self, error: &SignupError) -> Self {
        let errors = error.field_errors();
        if errors.is_empty() {
            self.message = Some(error.to_string());
        }
        self.errors = errors;
        self
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn is_selected_sex(&self, value: &str) -> bool {
        self.profile.sex.eq_ignore_ascii_case(value)
    }
}

#[derive(Template)]
#[template(path = "auth/signup.html")]
pub struct SignupPageTemplate {
    pub card: SignupCard,
}

#[derive(Template)]
#[template(path = "auth/signup_card.html")]
pub struct SignupCardTemplate {
    pub card: SignupCard,
}

#[derive(Deserialize)]
pub struct EmailForm {
    #[serde(default)]
    pub email: String,
}

#[derive(Deserialize)]
pub struct OtpForm {
    #[serde(default)]
    pub otp: String,
}

pub async fn signup_page(session: Session) -> Result<impl IntoResponse, AppError> {
    let draft = SignupDraft::load(&session).await?;
    Ok(SignupPageTemplate {
        card: SignupCard::for_draft(&draft),
    })
}

pub async fn submit_email(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<EmailForm>,
) -> Result<Response, AppError> {
    let draft = SignupDraft::load(&session).await?;
    let result = SignupWizard::new(state.api.as_ref())
        .submit_email(&draft, &form.email)
        .await;

    // Keep what was typed so it can be corrected.
    let rejected = SignupCard {
        email: form.email.trim().to_string(),
        ..SignupCard::for_draft(&draft)
    };
    respond(&session, &headers, result, rejected, None).await
}

pub async fn submit_otp(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<OtpForm>,
) -> Result<Response, AppError> {
    let draft = SignupDraft::load(&session).await?;
    let result = SignupWizard::new(state.api.as_ref())
        .submit_otp(&draft, &form.otp)
        .await;

    respond(&session, &headers, result, SignupCard::for_draft(&draft), None).await
}

pub async fn resend_otp(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let draft = SignupDraft::load(&session).await?;
    let result = SignupWizard::new(state.api.as_ref()).resend(&draft).await;

    let notice = format!("A new verification code has been sent to {}", draft.email());
    respond(
        &session,
        &headers,
        result,
        SignupCard::for_draft(&draft),
        Some(notice),
    )
    .await
}

pub async fn back(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let draft = SignupDraft::load(&session).await?;
    let result = SignupWizard::new(state.api.as_ref()).back(&draft);

    respond(&session, &headers, result, SignupCard::for_draft(&draft), None).await
}

pub async fn submit_profile(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<ProfileForm>,
) -> Result<Response, AppError> {
    let draft = SignupDraft::load(&session).await?;
    let rejected = SignupCard {
        profile: ProfileValues::from(&form),
        ..SignupCard::for_draft(&draft)
    };

    let result = SignupWizard::new(state.api.as_ref())
        .submit_profile(&draft, form, today())
        .await;

    respond(&session, &headers, result, rejected, None).await
}

/// Persists an advanced draft and renders its card, or re-renders the
/// current step with the error. `Done` ends the wizard on the sign-in page.
async fn respond(
    session: &Session,
    headers: &HeaderMap,
    result: Result<SignupDraft, SignupError>,
    rejected: SignupCard,
    notice: Option<String>,
) -> Result<Response, AppError> {
    match result {
        Ok(SignupDraft::Done) => {
            SignupDraft::Done.store(session).await?;
            Ok(htmx::redirect(headers, "/signin?registered=1"))
        }
        Ok(next) => {
            next.store(session).await?;
            let card = SignupCard {
                notice,
                ..SignupCard::for_draft(&next)
            };
            Ok(SignupCardTemplate { card }.into_response())
        }
        Err(e) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            SignupCardTemplate {
                card: rejected.with_error(&e),
            },
        )
            .into_response()),
    }
}

/// Doctor registration values echoed back into the form, without passwords.
#[derive(Debug, Clone, Default)]
pub struct DoctorSignupCard {
    pub fname: String,
    pub mname: String,
    pub lname: String,
    pub ext: String,
    pub email: String,
    pub phone: String,
    pub license_number: String,
    pub specialization: Vec<String>,
    pub other_specialization: String,
    pub errors: Vec<FieldError>,
    pub received: bool,
}

impl DoctorSignupCard {
    fn from_pairs(pairs: &[(String, String)], data: &DoctorSignupData) -> Self {
        let value_of = |name: &str| {
            pairs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
                .unwrap_or_default()
        };

        Self {
            fname: data.fname.clone(),
            mname: value_of("mname"),
            lname: data.lname.clone(),
            ext: value_of("ext"),
            email: data.email.clone(),
            phone: data.phone.clone(),
            license_number: data.license_number.clone(),
            specialization: data.specialization.clone(),
            other_specialization: data.other_specialization.clone(),
            errors: Vec::new(),
            received: false,
        }
    }

    pub fn is_checked(&self, option: &str) -> bool {
        self.specialization.iter().any(|s| s == option)
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

#[derive(Template)]
#[template(path = "auth/doctor_signup.html")]
pub struct DoctorSignupPageTemplate {
    pub card: DoctorSignupCard,
    pub options: &'static [&'static str],
}

#[derive(Template)]
#[template(path = "auth/doctor_signup_card.html")]
pub struct DoctorSignupCardTemplate {
    pub card: DoctorSignupCard,
    pub options: &'static [&'static str],
}

pub async fn doctor_signup_page() -> impl IntoResponse {
    DoctorSignupPageTemplate {
        card: DoctorSignupCard::default(),
        options: &SPECIALIZATIONS,
    }
}

/// Checks a doctor registration and reports every problem in form order.
pub async fn submit_doctor_signup(Form(pairs): Form<Vec<(String, String)>>) -> Response {
    let data = DoctorSignupData::from_pairs(&pairs);
    let report = validate_doctor_signup_data(&data);
    let mut card = DoctorSignupCard::from_pairs(&pairs, &data);

    if !report.is_valid() {
        tracing::info!(errors = report.errors.len(), "Doctor registration rejected");
        card.errors = report.errors;
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            DoctorSignupCardTemplate {
                card,
                options: &SPECIALIZATIONS,
            },
        )
            .into_response();
    }

    tracing::info!(
        specializations = data.specialization.len(),
        "Doctor registration received"
    );
    card.received = true;
    DoctorSignupCardTemplate {
        card,
        options: &SPECIALIZATIONS,
    }
    .into_response()
}
