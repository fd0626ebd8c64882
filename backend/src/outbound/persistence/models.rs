//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::usuario;

/// Row struct for reading from the `usuario` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = usuario)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UsuarioRow {
    pub id: i32,
    pub nome: String,
    pub email: String,
    pub senha: String,
    pub tipo: String,
    pub criado_em: DateTime<Utc>,
    pub atualizado_em: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = usuario)]
pub(crate) struct NewUsuarioRow<'a> {
    pub nome: &'a str,
    pub email: &'a str,
    pub senha: &'a str,
    pub tipo: &'a str,
}

/// Changeset struct for updating existing user records.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = usuario)]
pub(crate) struct UsuarioUpdate<'a> {
    pub nome: &'a str,
    pub email: &'a str,
    pub senha: &'a str,
}
