use validator::{ValidateEmail, ValidationError, ValidationErrors};

/// Trimmed, lower-cased form used for storage and lookups.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Normalizes and checks an email, reporting failures against `field`.
pub fn checked_email(email: &str) -> Result<String, ValidationErrors> {
    let normalized = normalize_email(email);
    if normalized.validate_email() {
        Ok(normalized)
    } else {
        Err(single_error("email", "invalid_email", "Invalid email format"))
    }
}

pub fn single_error(
    field: &'static str,
    code: &'static str,
    message: &'static str,
) -> ValidationErrors {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    let mut errors = ValidationErrors::new();
    errors.add(field, error);
    errors
}

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
