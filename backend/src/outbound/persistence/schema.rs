//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `backend/migrations`.
//! Regenerate with `diesel print-schema` after a schema change.

diesel::table! {
    /// Directory users.
    ///
    /// `email` carries the `usuario_email_key` unique constraint, and
    /// `atualizado_em` is maintained by the `set_updated_at` trigger.
    usuario (id) {
        /// Surrogate key assigned by the `SERIAL` sequence.
        id -> Int4,
        /// Display name.
        nome -> Varchar,
        /// Login email, unique and case-sensitive.
        email -> Varchar,
        /// PHC-encoded password hash.
        senha -> Varchar,
        /// Stored role string (`ADMINISTRADOR`, `MEDICO`, ...).
        tipo -> Varchar,
        /// Record creation timestamp.
        criado_em -> Timestamptz,
        /// Last modification timestamp.
        atualizado_em -> Timestamptz,
    }
}
