//! Diesel and pool error mapping for the user repository.

use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::UserPersistenceError;

use super::pool::PoolError;

/// Unique constraint on `usuario.email`.
pub(super) const EMAIL_UNIQUE_CONSTRAINT: &str = "usuario_email_key";

/// Map pool errors to connection failures.
pub(super) fn map_pool_error(error: PoolError) -> UserPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserPersistenceError::connection(message)
        }
    }
}

fn is_email_violation(info: &(dyn DatabaseErrorInformation + Send + Sync)) -> bool {
    // Older servers omit the constraint name; email is the only unique
    // column that callers can collide on.
    info.constraint_name()
        .is_none_or(|name| name == EMAIL_UNIQUE_CONSTRAINT)
}

/// Map Diesel errors to user persistence errors.
///
/// Driver messages are logged at debug and never forwarded, so storage
/// details cannot leak through the domain error.
pub(super) fn map_diesel_error(error: DieselError) -> UserPersistenceError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info)
            if is_email_violation(info.as_ref()) =>
        {
            UserPersistenceError::duplicate_email()
        }
        DieselError::NotFound => UserPersistenceError::query("record not found"),
        DieselError::QueryBuilderError(_) => UserPersistenceError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserPersistenceError::connection("database connection error")
        }
        _ => UserPersistenceError::query("database error"),
    }
}
