use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::auth::error_codes;

pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]{2,}$").unwrap());

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(alias = "confirmPassword")]
    pub confirm_password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterError {
    MissingName,
    InvalidEmail,
    PasswordTooShort,
    PasswordMismatch,
    EmailTaken,
}

impl RegisterError {
    pub fn code(self) -> &'static str {
        match self {
            RegisterError::MissingName => "MissingName",
            RegisterError::InvalidEmail => "InvalidEmail",
            RegisterError::PasswordTooShort => "PasswordTooShort",
            RegisterError::PasswordMismatch => "PasswordMismatch",
            RegisterError::EmailTaken => "EmailTaken",
        }
    }

    pub fn message(self) -> &'static str {
        error_codes::message_for(Some(self.code())).unwrap_or(error_codes::DEFAULT_MESSAGE)
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_SHAPE_RE.is_match(email)
}

/// Checks run in order; the first failure is reported.
pub fn validate_registration(form: &RegisterForm) -> Result<(), RegisterError> {
    if form.name.trim().is_empty() {
        return Err(RegisterError::MissingName);
    }
    if !is_valid_email(&normalize_email(&form.email)) {
        return Err(RegisterError::InvalidEmail);
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(RegisterError::PasswordTooShort);
    }
    if form.password != form.confirm_password {
        return Err(RegisterError::PasswordMismatch);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(password: &str, confirm: &str) -> RegisterForm {
        RegisterForm {
            name: "Ada Lovelace".into(),
            email: "Ada@Example.com".into(),
            password: password.into(),
            confirm_password: confirm.into(),
        }
    }

    #[test]
    fn test_mismatched_confirmation_is_rejected() {
        assert_eq!(
            validate_registration(&form("analytical1", "analytical2")),
            Err(RegisterError::PasswordMismatch)
        );
    }

    #[test]
    fn test_matching_passwords_pass() {
        assert_eq!(validate_registration(&form("analytical1", "analytical1")), Ok(()));
    }

    #[test]
    fn test_short_password_reported_before_mismatch() {
        assert_eq!(
            validate_registration(&form("short", "other")),
            Err(RegisterError::PasswordTooShort)
        );
    }

    #[test]
    fn test_blank_name_and_bad_email() {
        let mut f = form("analytical1", "analytical1");
        f.name = "   ".into();
        assert_eq!(validate_registration(&f), Err(RegisterError::MissingName));

        let mut f = form("analytical1", "analytical1");
        f.email = "not-an-email".into();
        assert_eq!(validate_registration(&f), Err(RegisterError::InvalidEmail));
    }

    #[test]
    fn test_camel_case_confirmation_field_is_accepted() {
        let f: RegisterForm = serde_json::from_str(
            r#"{"name":"A","email":"a@b.co","password":"12345678","confirmPassword":"12345678"}"#,
        )
        .unwrap();
        assert_eq!(f.confirm_password, "12345678");
    }

    #[test]
    fn test_every_error_has_a_table_message() {
        for err in [
            RegisterError::MissingName,
            RegisterError::InvalidEmail,
            RegisterError::PasswordTooShort,
            RegisterError::PasswordMismatch,
            RegisterError::EmailTaken,
        ] {
            assert_ne!(err.message(), error_codes::DEFAULT_MESSAGE);
        }
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }
}
