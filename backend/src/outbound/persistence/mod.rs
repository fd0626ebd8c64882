//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementation of the user repository port backed by PostgreSQL
//! via Diesel, with async support through `diesel-async` and `bb8` pooling.
//!
//! # Architecture
//!
//! - **Thin adapter**: the repository only translates between Diesel rows and
//!   domain types. Authorisation and validation live in the domain.
//! - **Internal models**: row structs (`models.rs`) and the schema
//!   (`schema.rs`) never leave this module.
//! - **Strongly typed errors**: Diesel and pool failures are mapped to
//!   `UserPersistenceError`, with the email unique constraint surfaced as
//!   `DuplicateEmail`.
//!
//! # Example
//!
//! ```ignore
//! use clinic_users::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/clinica-app")).await?;
//! let repo = DieselUserRepository::new(pool);
//! ```

mod diesel_error_mapping;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
