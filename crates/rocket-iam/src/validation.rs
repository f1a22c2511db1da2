//! Registration input rules.

use std::sync::LazyLock;

use regex::Regex;

use rocket_core::{ErrorCode, ServiceError};

static LOGIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{3,50}$").expect("static regex is valid"));

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("static regex is valid")
});

pub const MAX_EMAIL_LEN: usize = 255;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;

/// 3-50 characters of `[A-Za-z0-9_]`, case sensitive.
pub fn validate_login(login: &str) -> Result<(), ServiceError> {
    if login.is_empty() {
        return Err(ErrorCode::EmptyLogin.into());
    }
    if !LOGIN_RE.is_match(login) {
        return Err(ErrorCode::InvalidLogin.into());
    }
    Ok(())
}

/// `local@domain.tld` shape, at most 255 characters.
pub fn validate_email(email: &str) -> Result<(), ServiceError> {
    if email.is_empty() {
        return Err(ErrorCode::EmptyEmail.into());
    }
    if email.len() > MAX_EMAIL_LEN || !EMAIL_RE.is_match(email) {
        return Err(ErrorCode::InvalidEmail.into());
    }
    Ok(())
}

/// 8-128 characters with at least one uppercase letter, one lowercase
/// letter, one digit and one non-alphanumeric character.
pub fn validate_password(password: &str) -> Result<(), ServiceError> {
    if password.is_empty() {
        return Err(ErrorCode::EmptyPassword.into());
    }
    let len = password.chars().count();
    let strong = (MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len)
        && password.chars().any(char::is_uppercase)
        && password.chars().any(char::is_lowercase)
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| !c.is_alphanumeric());
    if !strong {
        return Err(ErrorCode::WeakPassword.into());
    }
    Ok(())
}
