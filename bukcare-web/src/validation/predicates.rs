use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Mobile numbers in the national `09XXXXXXXXX` format.
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^09\d{9}$").expect("valid phone regex"));

static OTP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{6}$").expect("valid otp regex"));

const MIN_PASSWORD_LEN: usize = 6;
const MIN_AGE_YEARS: i32 = 13;

pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// At least six characters, counted as Unicode scalar values.
pub fn validate_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

pub fn validate_confirm_password(password: &str, confirm_password: &str) -> bool {
    password == confirm_password
}

pub fn validate_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

pub fn validate_name(name: &str) -> bool {
    !name.trim().is_empty()
}

/// `YYYY-MM-DD`, strictly before `today`, and at least 13 full years old on `today`.
pub fn validate_dob(date_of_birth: &str, today: NaiveDate) -> bool {
    let Ok(birth) = NaiveDate::parse_from_str(date_of_birth.trim(), "%Y-%m-%d") else {
        return false;
    };

    if birth >= today {
        return false;
    }

    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }

    age >= MIN_AGE_YEARS
}

pub fn validate_otp(otp: &str) -> bool {
    OTP_RE.is_match(otp)
}

pub fn validate_sex(sex: &str) -> bool {
    matches!(
        sex.trim().to_ascii_lowercase().as_str(),
        "m" | "f" | "male" | "female"
    )
}
