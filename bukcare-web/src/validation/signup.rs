use super::predicates::*;
use super::ValidationReport;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const PHONE_MESSAGE: &str = "Please enter a valid Philippine phone number (09XXXXXXXXX)";
const PASSWORD_MESSAGE: &str = "Password must be at least 6 characters long";
const OTHER_SPECIALIZATION: &str = "Other";

/// Choices offered on the doctor registration form.
pub const SPECIALIZATIONS: [&str; 8] = [
    "Cardiology",
    "Dermatology",
    "Pediatrics",
    "Psychiatry",
    "Neurology",
    "Orthopedics",
    "General Medicine",
    OTHER_SPECIALIZATION,
];

/// Patient profile collected in the last sign-up step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupData {
    pub email: String,
    pub first_name: String,
    #[serde(default)]
    pub middle_name: String,
    pub last_name: String,
    pub contact_number: String,
    pub password: String,
    pub sex: String,
    pub date_of_birth: String,
    pub street: String,
    pub barangay: String,
    pub city_municipality: String,
    pub province: String,
    #[serde(default)]
    pub zip_code: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoctorSignupData {
    pub fname: String,
    pub lname: String,
    pub email: String,
    pub phone: String,
    pub license_number: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub specialization: Vec<String>,
    #[serde(default)]
    pub other_specialization: String,
}

impl DoctorSignupData {
    /// Builds the form from urlencoded pairs, where every checked
    /// specialization arrives as its own `specialization` pair.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut data = Self::default();

        for (key, value) in pairs {
            match key.as_str() {
                "fname" => data.fname = value.clone(),
                "lname" => data.lname = value.clone(),
                "email" => data.email = value.trim().to_string(),
                "phone" => data.phone = value.trim().to_string(),
                "license_number" => data.license_number = value.clone(),
                "password" => data.password = value.clone(),
                "confirm_password" => data.confirm_password = value.clone(),
                "specialization" if !data.specialization.contains(value) => {
                    data.specialization.push(value.clone())
                }
                "other_specialization" => data.other_specialization = value.clone(),
                _ => {}
            }
        }

        // Free text only counts while "Other" is ticked.
        if !data.specialization.iter().any(|s| s == OTHER_SPECIALIZATION) {
            data.other_specialization.clear();
        }

        data
    }
}

pub fn validate_signup_data(data: &SignupData, today: NaiveDate) -> ValidationReport {
    let mut report = ValidationReport::new();

    report.check(
        validate_email(&data.email),
        "email",
        "Please enter a valid email address",
    );
    report.check(
        validate_name(&data.first_name),
        "first_name",
        "First name is required",
    );
    report.check(
        validate_name(&data.last_name),
        "last_name",
        "Last name is required",
    );
    report.check(
        validate_phone(&data.contact_number),
        "contact_number",
        PHONE_MESSAGE,
    );
    report.check(
        validate_password(&data.password),
        "password",
        PASSWORD_MESSAGE,
    );
    report.check(validate_sex(&data.sex), "sex", "Please select a valid gender");
    report.check(
        validate_dob(&data.date_of_birth, today),
        "date_of_birth",
        "Please enter a valid date of birth (must be at least 13 years old)",
    );
    report.check(
        validate_name(&data.street),
        "street",
        "Street address is required",
    );
    report.check(
        validate_name(&data.barangay),
        "barangay",
        "Barangay is required",
    );
    report.check(
        validate_name(&data.city_municipality),
        "city_municipality",
        "City/Municipality is required",
    );
    report.check(
        validate_name(&data.province),
        "province",
        "Province is required",
    );

    report
}

pub fn validate_doctor_signup_data(data: &DoctorSignupData) -> ValidationReport {
    let mut report = ValidationReport::new();

    report.check(validate_name(&data.fname), "fname", "First name is required");
    report.check(validate_name(&data.lname), "lname", "Last name is required");
    report.check(
        validate_email(&data.email),
        "email",
        "Please enter a valid email address",
    );
    report.check(validate_phone(&data.phone), "phone", PHONE_MESSAGE);
    report.check(
        validate_name(&data.license_number),
        "license_number",
        "License number is required",
    );
    report.check(
        validate_password(&data.password),
        "password",
        PASSWORD_MESSAGE,
    );
    report.check(
        validate_confirm_password(&data.password, &data.confirm_password),
        "confirm_password",
        "Passwords do not match",
    );
    report.check(
        !data.specialization.is_empty(),
        "specialization",
        "Please select at least one specialization",
    );

    let wants_other = data
        .specialization
        .iter()
        .any(|s| s == OTHER_SPECIALIZATION);
    report.check(
        !wants_other || validate_name(&data.other_specialization),
        "other_specialization",
        "Please specify your specialization in the 'Other' field",
    );

    report
}
