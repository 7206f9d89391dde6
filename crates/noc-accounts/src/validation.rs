//! Input validation for account operations.

use noc_authorization::Role;
use serde::Deserialize;
use validator::{Validate, ValidationError};

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 255;

/// Registration input.
#[derive(Clone, Deserialize, Validate)]
pub struct NewAccount {
    #[validate(
        length(min = 3, max = 50, message = "Username must be 3-50 characters"),
        custom(function = "validate_alphanumeric")
    )]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 255, message = "Password must be 8-255 characters"))]
    pub password: String,

    #[validate(length(min = 2, max = 50, message = "First name must be 2-50 characters"))]
    pub first_name: String,

    #[validate(length(min = 2, max = 50, message = "Last name must be 2-50 characters"))]
    pub last_name: String,

    /// Defaults to viewer.
    #[serde(default)]
    pub role: Option<Role>,

    #[validate(length(max = 50, message = "Department must be at most 50 characters"))]
    #[serde(default)]
    pub department: Option<String>,

    /// Optional `+`, then up to 16 digits not starting with 0. Blank means none.
    #[validate(custom(function = "validate_phone"))]
    #[serde(default)]
    pub phone: Option<String>,
}

impl std::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccount")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("role", &self.role)
            .field("department", &self.department)
            .field("phone", &self.phone)
            .finish()
    }
}

fn validate_alphanumeric(value: &str) -> Result<(), ValidationError> {
    if value.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("alphanumeric");
        err.message = Some("Username may only contain letters and digits".into());
        Err(err)
    }
}

fn validate_phone(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(());
    }
    let digits = value.strip_prefix('+').unwrap_or(value);
    let valid = (1..=16).contains(&digits.len())
        && digits.chars().all(|c| c.is_ascii_digit())
        && !digits.starts_with('0');
    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone");
        err.message = Some("Phone must be a valid number".into());
        Err(err)
    }
}

/// Length check applied to every new password.
pub fn validate_password_length(password: &str) -> Result<(), String> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password too short: {len} characters (minimum {MIN_PASSWORD_LENGTH})"
        ));
    }
    if len > MAX_PASSWORD_LENGTH {
        return Err(format!(
            "Password too long: {len} characters (maximum {MAX_PASSWORD_LENGTH})"
        ));
    }
    Ok(())
}
