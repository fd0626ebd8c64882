//! Embedded schema migrations.
//!
//! The SQL under `backend/migrations` is compiled into the binary and applied
//! at startup over a synchronous connection, so callers run
//! [`run_pending_migrations`] on a blocking thread.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

/// Migrations from the backend/migrations directory.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while applying migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("failed to connect for migrations: {message}")]
    Connect { message: String },
    #[error("failed to apply migrations: {message}")]
    Apply { message: String },
}

/// Apply every pending migration against `database_url`.
///
/// Returns the number of migrations applied.
pub fn run_pending_migrations(database_url: &str) -> Result<usize, MigrationError> {
    let mut conn = PgConnection::establish(database_url).map_err(|err| MigrationError::Connect {
        message: err.to_string(),
    })?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| MigrationError::Apply {
            message: err.to_string(),
        })?;
    for version in &applied {
        info!(%version, "applied migration");
    }
    Ok(applied.len())
}

#[cfg(test)]
mod tests {
    //! Guards on the shape of the `usuario` table.
    use rstest::rstest;

    const CREATE_USUARIO: &str =
        include_str!("../../../migrations/2024-05-01-120000_create_usuario/up.sql");

    fn column(name: &str) -> &'static str {
        CREATE_USUARIO
            .lines()
            .map(str::trim)
            .find(|line| line.split_whitespace().next() == Some(name))
            .unwrap_or_else(|| panic!("column {name} is declared"))
    }

    #[rstest]
    #[case("nome")]
    #[case("email")]
    #[case("senha")]
    #[case("tipo")]
    fn text_columns_are_unbounded(#[case] name: &str) {
        let declaration = column(name);
        assert!(declaration.contains("VARCHAR NOT NULL"), "{declaration}");
    }

    #[rstest]
    fn email_is_unique() {
        assert!(CREATE_USUARIO.contains("UNIQUE (email)"));
    }
}
