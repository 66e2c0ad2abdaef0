//! Shared input checks.

use crate::error::ValidationError;

const PASSWORD_SYMBOLS: &str = "@$!%*?&";

/// Returns the trimmed value, or a `Required` error when missing or blank.
pub fn required(field: &str, value: Option<&str>) -> Result<String, ValidationError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ValidationError::required(field)),
    }
}

/// Returns the value, or a `Required` error when missing.
pub fn present<T>(field: &str, value: Option<T>) -> Result<T, ValidationError> {
    value.ok_or_else(|| ValidationError::required(field))
}

/// Returns the trimmed value when present and non-blank.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Loose structural email check: `local@domain.tld` without whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

/// Validates and normalizes (trim + lowercase) an email field.
pub fn email(field: &str, value: Option<&str>) -> Result<String, ValidationError> {
    let value = required(field, value)?;
    if is_valid_email(&value) {
        Ok(value.to_lowercase())
    } else {
        Err(ValidationError::InvalidEmail {
            field: field.to_string(),
        })
    }
}

/// At least 8 characters drawn from letters, digits and `@$!%*?&`, with
/// at least one of each: lowercase, uppercase, digit, symbol.
pub fn check_password(password: &str) -> Result<(), ValidationError> {
    let allowed = password
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SYMBOLS.contains(c));
    let strong = password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SYMBOLS.contains(c));

    if allowed && strong {
        Ok(())
    } else {
        Err(ValidationError::WeakPassword)
    }
}
