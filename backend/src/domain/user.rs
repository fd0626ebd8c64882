//! Directory user model.
//!
//! Value types validate on construction so the directory service and the
//! persistence adapter only ever handle well-formed identifiers, names, and
//! email addresses. The password credential is kept apart from [`User`] in
//! [`UserAccount`] so nothing that serialises a user can leak it.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{PasswordHash, Role};

/// Validation errors raised by the user value types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    NonPositiveId { value: i32 },
    EmptyName,
    NameTooLong { max: usize },
    EmptyEmail,
    EmailTooLong { max: usize },
    MalformedEmail,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveId { value } => {
                write!(f, "user id must be a positive integer, got {value}")
            }
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::NameTooLong { max } => write!(f, "name must be at most {max} characters"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmailTooLong { max } => write!(f, "email must be at most {max} characters"),
            Self::MalformedEmail => write!(f, "email must look like local@domain"),
        }
    }
}

impl std::error::Error for UserValidationError {}

impl UserValidationError {
    /// Request field the error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::NonPositiveId { .. } => "id",
            Self::EmptyName | Self::NameTooLong { .. } => "name",
            Self::EmptyEmail | Self::EmailTooLong { .. } | Self::MalformedEmail => "email",
        }
    }
}

/// Surrogate user identifier assigned by the store.
///
/// Always strictly positive; zero is reserved as the "no identity" sentinel
/// of [`crate::domain::CallerToken`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct UserId(i32);

impl UserId {
    /// Validate and wrap a raw identifier.
    pub fn new(raw: i32) -> Result<Self, UserValidationError> {
        if raw <= 0 {
            return Err(UserValidationError::NonPositiveId { value: raw });
        }
        Ok(Self(raw))
    }

    /// Underlying integer value.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for i32 {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<i32> for UserId {
    type Error = UserValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Maximum number of characters in a display name.
pub const NAME_MAX: usize = 120;

/// Human readable display name, trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a display name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if trimmed.chars().count() > NAME_MAX {
            return Err(UserValidationError::NameTooLong { max: NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Wrap a name read back from storage without re-validating it.
    #[must_use]
    pub fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Maximum length of an email address (RFC 5321 path limit).
pub const EMAIL_MAX: usize = 254;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Shape check only; deliverability is not our concern.
        Regex::new(r"^[^@\s]+@[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Email address, trimmed and stored with its original case.
///
/// Uniqueness is case-sensitive: `Ada@x.org` and `ada@x.org` are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an email address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if trimmed.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        if !email_regex().is_match(trimmed) {
            return Err(UserValidationError::MalformedEmail);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Wrap an address read back from storage.
    ///
    /// Rows written before the shape check existed may hold addresses that
    /// [`EmailAddress::new`] rejects; they are kept verbatim.
    #[must_use]
    pub fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Directory user as returned to callers.
///
/// Never carries the password credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    name: DisplayName,
    email: EmailAddress,
    role: Role,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Assemble a user from validated parts.
    #[must_use]
    pub fn new(
        id: UserId,
        name: DisplayName,
        email: EmailAddress,
        role: Role,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            email,
            role,
            created_at,
            updated_at,
        }
    }

    /// Store-assigned identifier.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &DisplayName {
        &self.name
    }

    /// Email address.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Role parsed from the stored value.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last modification timestamp.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Stored user together with its password credential.
///
/// Only the directory service and persistence adapters see this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub user: User,
    pub password_hash: PasswordHash,
}

impl UserAccount {
    /// Drop the credential and keep the caller-visible record.
    #[must_use]
    pub fn into_user(self) -> User {
        self.user
    }
}

/// Validated values for a user insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: DisplayName,
    pub email: EmailAddress,
    pub password_hash: PasswordHash,
    pub role: Role,
}

/// Complete replacement values for a user update, already merged over the
/// current record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserChanges {
    pub name: DisplayName,
    pub email: EmailAddress,
    pub password_hash: PasswordHash,
}

#[cfg(test)]
mod tests;
