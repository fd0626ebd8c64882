//! Builders for HTTP state backed by PostgreSQL.

use std::sync::Arc;

use actix_web::web;

use clinic_users::domain::{Argon2CredentialHasher, UserDirectoryService};
use clinic_users::inbound::http::state::HttpState;
use clinic_users::outbound::persistence::{DbPool, DieselUserRepository};

/// Wire the directory service over the Diesel repository.
///
/// One service instance backs both the login and directory ports.
pub(super) fn build_http_state(pool: &DbPool) -> web::Data<HttpState> {
    let repo = Arc::new(DieselUserRepository::new(pool.clone()));
    let hasher = Arc::new(Argon2CredentialHasher::default());
    let service = Arc::new(UserDirectoryService::new(repo, hasher));
    web::Data::new(HttpState::from_service(service))
}
