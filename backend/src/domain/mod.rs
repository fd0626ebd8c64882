//! Domain primitives, policies, and services.
//!
//! Purpose: define the user directory's typed model, the permission matrix,
//! and the services that drive directory operations. Adapters reach the
//! domain only through the traits in [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: error payload and stable error identifier.
//! - Role: closed role set and its stored representation.
//! - User, UserId, DisplayName, EmailAddress: the directory record.
//! - is_allowed / list_scope: the permission matrix.
//! - UserDirectoryService: directory operations and login.

pub mod auth;
pub mod credentials;
pub mod directory_service;
pub mod error;
pub mod identity;
pub mod listing;
pub mod permissions;
pub mod ports;
pub mod role;
pub mod trace_id;
pub mod user;

pub use self::auth::{LoginCredentials, LoginValidationError};
#[cfg(test)]
pub use self::credentials::MockCredentialHasher;
pub use self::credentials::{
    Argon2CredentialHasher, CredentialError, CredentialHasher, MAX_PASSWORD_BYTES, Password,
    PasswordHash,
};
pub use self::directory_service::UserDirectoryService;
pub use self::error::{Error, ErrorCode};
pub use self::identity::{CallerToken, Identity, IdentityResolver};
pub use self::listing::{DEFAULT_LIMIT, MAX_LIMIT, Page, PageError, UserListQuery};
pub use self::permissions::{ListDecision, Operation, RoleScope, is_allowed, list_scope};
pub use self::role::Role;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    DisplayName, EMAIL_MAX, EmailAddress, NAME_MAX, NewUser, User, UserAccount, UserChanges,
    UserId, UserValidationError,
};
