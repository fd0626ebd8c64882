//! Driving port for login/authentication use-cases.
//!
//! Inbound adapters call it to exchange credentials for a caller token
//! without knowing the backing infrastructure, so HTTP handler tests can
//! substitute a test double instead of wiring persistence.

use async_trait::async_trait;

use crate::domain::{CallerToken, Error, LoginCredentials, User};

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Token to present with subsequent directory calls.
    pub token: CallerToken,
    /// The authenticated user, without credential.
    pub user: User,
}

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user.
    ///
    /// Unknown emails and wrong passwords are indistinguishable: both fail
    /// with [`crate::domain::ErrorCode::Unauthenticated`].
    async fn authenticate(&self, credentials: &LoginCredentials)
    -> Result<AuthenticatedUser, Error>;
}
