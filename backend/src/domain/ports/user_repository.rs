//! Driven port for user persistence adapters and their errors.
//!
//! Adapters own the durable uniqueness guarantee on email: an insert or
//! update that collides must fail with
//! [`UserPersistenceError::DuplicateEmail`], whatever pre-checks the caller
//! performed.

use async_trait::async_trait;

use crate::domain::{EmailAddress, NewUser, User, UserAccount, UserChanges, UserId, UserListQuery};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The store's uniqueness constraint on email rejected a write.
        DuplicateEmail => "email address is already registered",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch an account, credential included, by exact email.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserAccount>, UserPersistenceError>;

    /// Fetch an account, credential included, by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserAccount>, UserPersistenceError>;

    /// Fetch only the stored role string for an identifier.
    async fn find_role_by_id(&self, id: UserId) -> Result<Option<String>, UserPersistenceError>;

    /// Insert a user and return the stored record.
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError>;

    /// Overwrite name, email, and credential. `None` when no row matched.
    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Remove a user. `false` when no row matched.
    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError>;

    /// List users matching the query, ordered by id.
    async fn list(&self, query: &UserListQuery) -> Result<Vec<User>, UserPersistenceError>;
}
