//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Listing queries are composed from a base select plus an optional role
//! predicate and a limit/offset window. Every value reaches the server as a
//! bound parameter.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    DisplayName, EmailAddress, NewUser, PasswordHash, Role, RoleScope, User, UserAccount,
    UserChanges, UserId, UserListQuery,
};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewUsuarioRow, UsuarioRow, UsuarioUpdate};
use super::pool::DbPool;
use super::schema::usuario;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn corrupt_row(id: i32, err: impl std::fmt::Display) -> UserPersistenceError {
    warn!(user_id = id, error = %err, "stored user row failed validation");
    UserPersistenceError::query(format!("stored user {id} is invalid"))
}

/// Convert a database row into a domain account.
///
/// Stored names and emails are trusted as written; only the write paths
/// validate them.
fn row_to_account(row: UsuarioRow) -> Result<UserAccount, UserPersistenceError> {
    let id = UserId::new(row.id).map_err(|err| corrupt_row(row.id, err))?;
    let name = DisplayName::from_stored(row.nome);
    let email = EmailAddress::from_stored(row.email);
    let role = Role::parse_stored(&row.tipo);
    if role == Role::Unknown {
        warn!(user_id = row.id, "stored role is not recognised");
    }

    Ok(UserAccount {
        user: User::new(id, name, email, role, row.criado_em, row.atualizado_em),
        password_hash: PasswordHash::from_stored(row.senha),
    })
}

fn row_to_user(row: UsuarioRow) -> Result<User, UserPersistenceError> {
    row_to_account(row).map(UserAccount::into_user)
}

fn stored_names(roles: &[Role]) -> Vec<&'static str> {
    roles.iter().map(|role| role.stored_name()).collect()
}

/// Compose the listing statement for `query`.
fn list_statement(query: &UserListQuery) -> usuario::BoxedQuery<'static, Pg> {
    let mut statement = usuario::table.order_by(usuario::id.asc()).into_boxed();

    statement = match &query.scope {
        RoleScope::All => statement,
        RoleScope::Only(roles) => statement.filter(usuario::tipo.eq_any(stored_names(roles))),
        RoleScope::AllExcept(roles) => statement.filter(usuario::tipo.ne_all(stored_names(roles))),
    };

    statement
        .limit(query.page.limit())
        .offset(query.page.offset())
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UsuarioRow> = usuario::table
            .filter(usuario::email.eq(email.as_ref()))
            .select(UsuarioRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_account).transpose()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<UserAccount>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UsuarioRow> = usuario::table
            .find(id.get())
            .select(UsuarioRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_account).transpose()
    }

    async fn find_role_by_id(&self, id: UserId) -> Result<Option<String>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        usuario::table
            .find(id.get())
            .select(usuario::tipo)
            .first::<String>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)
    }

    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewUsuarioRow {
            nome: user.name.as_ref(),
            email: user.email.as_ref(),
            senha: user.password_hash.as_str(),
            tipo: user.role.stored_name(),
        };

        let row: UsuarioRow = diesel::insert_into(usuario::table)
            .values(&new_row)
            .returning(UsuarioRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_user(row)
    }

    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let update = UsuarioUpdate {
            nome: changes.name.as_ref(),
            email: changes.email.as_ref(),
            senha: changes.password_hash.as_str(),
        };

        let row: Option<UsuarioRow> = diesel::update(usuario::table.find(id.get()))
            .set(&update)
            .returning(UsuarioRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = diesel::delete(usuario::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(removed > 0)
    }

    async fn list(&self, query: &UserListQuery) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UsuarioRow> = list_statement(query)
            .select(UsuarioRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_user).collect()
    }
}
