//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{LoginService, UserDirectory};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UserDirectory>,
}

impl HttpState {
    /// Construct state from the login and directory ports.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use clinic_users::domain::{Argon2CredentialHasher, UserDirectoryService};
    /// use clinic_users::inbound::http::state::HttpState;
    /// use clinic_users::test_support::InMemoryUserRepository;
    ///
    /// let service = Arc::new(UserDirectoryService::new(
    ///     Arc::new(InMemoryUserRepository::new()),
    ///     Arc::new(Argon2CredentialHasher::default()),
    /// ));
    /// let state = HttpState::new(service.clone(), service);
    /// let _users = state.users.clone();
    /// ```
    pub fn new(login: Arc<dyn LoginService>, users: Arc<dyn UserDirectory>) -> Self {
        Self { login, users }
    }

    /// Construct state where one service implements both ports.
    pub fn from_service<S>(service: Arc<S>) -> Self
    where
        S: LoginService + UserDirectory + 'static,
    {
        Self {
            login: service.clone(),
            users: service,
        }
    }
}
