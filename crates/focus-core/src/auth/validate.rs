//! Presence and consistency checks run before any network activity.

use std::fmt;

use super::types::{Credentials, RegistrationRequest};

/// Why a form was rejected locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Sign-in email or password is empty.
    MissingCredentials,
    /// Registration username, email or password is empty.
    MissingFields,
    /// Registration password and confirmation differ.
    PasswordMismatch,
}

impl ValidationError {
    /// Short machine-friendly reason code.
    pub fn reason(self) -> &'static str {
        match self {
            ValidationError::MissingCredentials => "missing credentials",
            ValidationError::MissingFields => "missing fields",
            ValidationError::PasswordMismatch => "password mismatch",
        }
    }

    /// Message shown to the user.
    pub fn message(self) -> &'static str {
        match self {
            ValidationError::MissingCredentials => "Please enter email and password",
            ValidationError::MissingFields => "Please fill in all fields",
            ValidationError::PasswordMismatch => "Passwords do not match",
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for ValidationError {}

impl Credentials {
    /// Both fields must be non-empty. No format checks.
    ///
    /// # Errors
    /// Returns [`ValidationError::MissingCredentials`] when either field is empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.email.is_empty() || self.password.is_empty() {
            return Err(ValidationError::MissingCredentials);
        }
        Ok(())
    }
}

impl RegistrationRequest {
    /// The confirmation check runs first, so a mismatch is reported even
    /// when other fields are empty.
    ///
    /// # Errors
    /// Returns [`ValidationError::PasswordMismatch`] or
    /// [`ValidationError::MissingFields`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        if self.username.is_empty() || self.email.is_empty() || self.password.is_empty() {
            return Err(ValidationError::MissingFields);
        }
        Ok(())
    }
}
