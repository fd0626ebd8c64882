//! Driving port for the directory operations.
//!
//! Requests carry raw caller input. Validation happens inside the service,
//! after identity resolution and authorisation, so an unauthorised caller
//! learns nothing about which fields would have been rejected.

use std::fmt;

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::{CallerToken, Error, Role, User};

/// Input for creating a user.
#[derive(Clone)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: Zeroizing<String>,
    pub role: Role,
}

impl fmt::Debug for CreateUserRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateUserRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

/// Partial update. Absent or empty fields keep their current value.
#[derive(Clone, Default)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<Zeroizing<String>>,
}

impl fmt::Debug for UpdateUserRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateUserRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Listing parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListUsersRequest {
    /// Restrict the listing to a single role the caller may see.
    pub role: Option<Role>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Domain use-case port for managing the user directory.
///
/// Every call resolves `caller` afresh; target identifiers are raw so a
/// non-positive id is reported as an invalid argument only once the caller
/// is known.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Create a user holding `request.role`.
    async fn create_user(
        &self,
        caller: CallerToken,
        request: CreateUserRequest,
    ) -> Result<User, Error>;

    /// Fetch a single user.
    async fn get_user(&self, caller: CallerToken, target: i32) -> Result<User, Error>;

    /// List the users visible to the caller.
    async fn list_users(
        &self,
        caller: CallerToken,
        request: ListUsersRequest,
    ) -> Result<Vec<User>, Error>;

    /// Apply a partial update and return the stored record.
    async fn update_user(
        &self,
        caller: CallerToken,
        target: i32,
        request: UpdateUserRequest,
    ) -> Result<User, Error>;

    /// Remove a user.
    async fn delete_user(&self, caller: CallerToken, target: i32) -> Result<(), Error>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn request_debug_output_redacts_passwords() {
        let create = CreateUserRequest {
            name: "Ada".into(),
            email: "ada@clinic.test".into(),
            password: Zeroizing::new("hunter2".into()),
            role: Role::Doctor,
        };
        let update = UpdateUserRequest {
            password: Some(Zeroizing::new("hunter3".into())),
            ..UpdateUserRequest::default()
        };
        assert!(!format!("{create:?}").contains("hunter2"));
        assert!(!format!("{update:?}").contains("hunter3"));
        assert!(format!("{update:?}").contains("<redacted>"));
    }
}
