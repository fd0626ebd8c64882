//! Password credentials and the hashing seam.
//!
//! Plaintext passwords live in [`Password`], which zeroes its buffer on drop.
//! Stored credentials are opaque [`PasswordHash`] strings in PHC format; only
//! a [`CredentialHasher`] interprets them.

use std::fmt;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash as PhcString, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use zeroize::Zeroizing;

/// Maximum accepted plaintext password length in bytes.
pub const MAX_PASSWORD_BYTES: usize = 1024;

/// Errors raised while validating or hashing a password.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("password must not be empty")]
    Empty,
    #[error("password must be at most {max} bytes")]
    TooLong { max: usize },
    #[error("password hashing failed: {message}")]
    Hashing { message: String },
}

impl CredentialError {
    /// Whether the error stems from caller input rather than the hasher.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(self, Self::Empty | Self::TooLong { .. })
    }
}

/// Plaintext password supplied by a caller.
///
/// ## Invariants
/// - Non-empty and at most [`MAX_PASSWORD_BYTES`] bytes.
/// - Whitespace is preserved verbatim.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Validate a raw password.
    pub fn new(raw: impl Into<String>) -> Result<Self, CredentialError> {
        let raw = Zeroizing::new(raw.into());
        if raw.is_empty() {
            return Err(CredentialError::Empty);
        }
        if raw.len() > MAX_PASSWORD_BYTES {
            return Err(CredentialError::TooLong {
                max: MAX_PASSWORD_BYTES,
            });
        }
        Ok(Self(raw))
    }

    /// Expose the plaintext to a hasher.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Stored, salted password hash.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a hash read back from storage.
    #[must_use]
    pub fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Encoded hash for persistence.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

impl From<PasswordHash> for String {
    fn from(value: PasswordHash) -> Self {
        value.0
    }
}

/// One-way password hashing.
///
/// Implementations are CPU bound; callers run them on a blocking thread.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialHasher: Send + Sync {
    /// Produce a salted hash of `password`.
    fn hash(&self, password: &Password) -> Result<PasswordHash, CredentialError>;

    /// Check `password` against `stored`. Malformed hashes never match.
    fn verify(&self, password: &Password, stored: &PasswordHash) -> bool;
}

/// Argon2id hasher with PHC encoded output.
#[derive(Debug, Clone, Default)]
pub struct Argon2CredentialHasher {
    params: Params,
}

impl Argon2CredentialHasher {
    /// Hasher with deliberately weak parameters for fast tests.
    #[cfg(any(test, feature = "test-support"))]
    #[must_use]
    pub fn low_cost() -> Self {
        Self {
            params: Params::new(8, 1, 1, None).unwrap_or_default(),
        }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl CredentialHasher for Argon2CredentialHasher {
    fn hash(&self, password: &Password) -> Result<PasswordHash, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(password.expose().as_bytes(), &salt)
            .map(|hash| PasswordHash(hash.to_string()))
            .map_err(|error| CredentialError::Hashing {
                message: error.to_string(),
            })
    }

    fn verify(&self, password: &Password, stored: &PasswordHash) -> bool {
        match PhcString::new(stored.as_str()) {
            // Parameters come from the encoded hash, not from `self`.
            Ok(parsed) => self
                .argon2()
                .verify_password(password.expose().as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}
