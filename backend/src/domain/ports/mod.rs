//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod login_service;
mod user_directory;
mod user_repository;

#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{AuthenticatedUser, LoginService};
#[cfg(test)]
pub use user_directory::MockUserDirectory;
pub use user_directory::{CreateUserRequest, ListUsersRequest, UpdateUserRequest, UserDirectory};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
