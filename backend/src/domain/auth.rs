//! Authentication primitives such as login credentials.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use zeroize::Zeroizing;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Login credentials presented to the authentication service.
///
/// ## Invariants
/// - `email` is trimmed and must not be empty after trimming. Its shape is
///   not checked: an unregistered address simply fails to authenticate.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use clinic_users::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" ada@clinic.test ", "secret").unwrap();
/// assert_eq!(creds.email(), "ada@clinic.test");
/// assert_eq!(creds.password(), "secret");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = email.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            email: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email string used for the account lookup.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyEmail)]
    #[case("   ", "pw", LoginValidationError::EmptyEmail)]
    #[case("ada@clinic.test", "", LoginValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case("  ada@clinic.test  ", "secret")]
    #[case("grace@clinic.test", " correct horse battery staple ")]
    fn valid_credentials_trim_email_only(#[case] email: &str, #[case] password: &str) {
        let creds = LoginCredentials::try_from_parts(email, password)
            .expect("valid inputs should succeed");
        assert_eq!(creds.email(), email.trim());
        assert_eq!(creds.password(), password);
    }

    #[rstest]
    fn debug_redacts_password() {
        let creds = LoginCredentials::try_from_parts("ada@clinic.test", "hunter2")
            .expect("valid inputs");
        assert!(!format!("{creds:?}").contains("hunter2"));
    }
}
