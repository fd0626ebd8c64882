//! Caller identity resolution.
//!
//! Every directory call carries an opaque [`CallerToken`]. The token is
//! resolved to an [`Identity`] at the start of each operation; nothing about
//! the requester is cached between calls, so role changes take effect on the
//! very next request.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::ports::UserRepository;
use super::{Error, Role, UserId};

/// Opaque credential naming the requester.
///
/// The token wraps the requester's user id. Zero or negative values carry no
/// identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallerToken(i32);

impl CallerToken {
    /// Token for the given raw subject value.
    #[must_use]
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Token carrying no identity.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self(0)
    }

    /// Token issued for an authenticated user.
    #[must_use]
    pub fn for_user(id: UserId) -> Self {
        Self(id.get())
    }

    /// Subject named by the token, if any.
    #[must_use]
    pub fn subject(self) -> Option<UserId> {
        UserId::new(self.0).ok()
    }
}

impl fmt::Display for CallerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolved requester: who is calling, and with which role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub subject: UserId,
    pub role: Role,
}

impl Identity {
    /// Whether `target` names the requester.
    #[must_use]
    pub fn is_self(&self, target: UserId) -> bool {
        self.subject == target
    }
}

/// Resolves caller tokens against the user store.
///
/// Performs one role lookup per call and keeps no state between calls.
pub struct IdentityResolver<R> {
    repo: Arc<R>,
}

impl<R> Clone for IdentityResolver<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<R> IdentityResolver<R> {
    /// Create a resolver backed by `repo`.
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

impl<R: UserRepository> IdentityResolver<R> {
    /// Resolve `token` to the requester's identity.
    ///
    /// Fails with `unauthenticated` for the no-identity sentinel and with
    /// `subject_not_found` when the named user no longer exists. An
    /// unparseable stored role resolves to [`Role::Unknown`].
    pub async fn resolve(&self, token: CallerToken) -> Result<Identity, Error> {
        let Some(subject) = token.subject() else {
            debug!("rejecting call without caller identity");
            return Err(Error::unauthenticated("caller identity is required"));
        };

        let stored = self.repo.find_role_by_id(subject).await.map_err(|err| {
            error!(error = %err, subject = %subject, "caller lookup failed");
            Error::internal("failed to resolve caller identity")
        })?;

        match stored {
            Some(raw) => Ok(Identity {
                subject,
                role: Role::parse_stored(&raw),
            }),
            None => {
                debug!(subject = %subject, "caller refers to a missing user");
                Err(Error::subject_not_found("caller no longer exists"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockUserRepository, UserPersistenceError};
    use rstest::rstest;

    fn resolver(repo: MockUserRepository) -> IdentityResolver<MockUserRepository> {
        IdentityResolver::new(Arc::new(repo))
    }

    #[rstest]
    #[case(CallerToken::anonymous())]
    #[case(CallerToken::new(-9))]
    #[tokio::test]
    async fn sentinel_tokens_are_unauthenticated_without_lookup(#[case] token: CallerToken) {
        let mut repo = MockUserRepository::new();
        repo.expect_find_role_by_id().never();

        let err = resolver(repo).resolve(token).await.expect_err("no identity");
        assert_eq!(err.code(), ErrorCode::Unauthenticated);
    }

    #[rstest]
    #[case("RECEPCIONISTA", Role::Receptionist)]
    #[case("PACIENTE", Role::Patient)]
    #[case("ZELADOR", Role::Unknown)]
    #[tokio::test]
    async fn resolves_stored_role(#[case] stored: &'static str, #[case] expected: Role) {
        let mut repo = MockUserRepository::new();
        repo.expect_find_role_by_id()
            .withf(|id| id.get() == 5)
            .times(1)
            .return_once(move |_| Ok(Some(stored.to_owned())));

        let identity = resolver(repo)
            .resolve(CallerToken::new(5))
            .await
            .expect("identity resolves");
        assert_eq!(identity.subject.get(), 5);
        assert_eq!(identity.role, expected);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_subject_is_reported() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_role_by_id().return_once(|_| Ok(None));

        let err = resolver(repo)
            .resolve(CallerToken::new(77))
            .await
            .expect_err("deleted subject");
        assert_eq!(err.code(), ErrorCode::SubjectNotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn lookup_failures_flatten_to_internal() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_role_by_id()
            .return_once(|_| Err(UserPersistenceError::connection("refused")));

        let err = resolver(repo)
            .resolve(CallerToken::new(1))
            .await
            .expect_err("store down");
        assert_eq!(err.code(), ErrorCode::Internal);
        assert!(!err.message().contains("refused"));
    }

    #[rstest]
    #[case(0)]
    #[case(-5)]
    fn non_positive_tokens_carry_no_subject(#[case] raw: i32) {
        assert_eq!(CallerToken::new(raw).subject(), None);
    }

    #[rstest]
    fn anonymous_token_has_no_subject() {
        assert_eq!(CallerToken::anonymous().subject(), None);
    }

    #[rstest]
    fn user_token_round_trips_subject() {
        let id = UserId::new(12).expect("positive id");
        assert_eq!(CallerToken::for_user(id).subject(), Some(id));
    }

    #[rstest]
    fn identity_detects_self_access() {
        let me = UserId::new(3).expect("positive id");
        let other = UserId::new(4).expect("positive id");
        let identity = Identity {
            subject: me,
            role: Role::Patient,
        };
        assert!(identity.is_self(me));
        assert!(!identity.is_self(other));
    }
}
