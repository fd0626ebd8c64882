//! Test utilities for the backend crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`, via
//! the `test-support` feature).

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    DisplayName, EmailAddress, NewUser, PasswordHash, Role, User, UserAccount, UserChanges,
    UserId, UserListQuery,
};

#[derive(Debug, Clone)]
struct StoredRow {
    name: DisplayName,
    email: EmailAddress,
    password_hash: PasswordHash,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct State {
    last_id: i32,
    rows: BTreeMap<i32, StoredRow>,
}

/// In-memory [`UserRepository`] mirroring the relational adapter.
///
/// Ids are assigned sequentially from 1, email uniqueness is enforced on
/// every write, and listings are ordered by id.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    state: Mutex<State>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a row directly, bypassing the directory rules.
    ///
    /// Every value is written verbatim so tests can plant unparseable roles
    /// and legacy emails.
    pub fn seed(
        &self,
        name: &str,
        email: &str,
        stored_role: &str,
        password_hash: PasswordHash,
    ) -> UserId {
        let name = DisplayName::from_stored(name);
        let email = EmailAddress::from_stored(email);
        let mut state = self.lock();
        state.last_id += 1;
        let id = state.last_id;
        let now = Utc::now();
        state.rows.insert(
            id,
            StoredRow {
                name,
                email,
                password_hash,
                role: stored_role.to_owned(),
                created_at: now,
                updated_at: now,
            },
        );
        UserId::new(id).expect("sequential ids are positive")
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.lock().rows.len()
    }

    /// Whether no rows are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a row with `id` exists.
    pub fn contains(&self, id: UserId) -> bool {
        self.lock().rows.contains_key(&id.get())
    }

    /// Stored credential for `id`, if the row exists.
    pub fn password_hash(&self, id: UserId) -> Option<PasswordHash> {
        self.lock()
            .rows
            .get(&id.get())
            .map(|row| row.password_hash.clone())
    }
}

fn to_user(id: i32, row: &StoredRow) -> Result<User, UserPersistenceError> {
    let id = UserId::new(id).map_err(|err| UserPersistenceError::query(err.to_string()))?;
    Ok(User::new(
        id,
        row.name.clone(),
        row.email.clone(),
        Role::parse_stored(&row.role),
        row.created_at,
        row.updated_at,
    ))
}

fn email_taken(state: &State, email: &EmailAddress, except: Option<i32>) -> bool {
    state
        .rows
        .iter()
        .any(|(id, row)| &row.email == email && Some(*id) != except)
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let state = self.lock();
        state
            .rows
            .iter()
            .find(|(_, row)| &row.email == email)
            .map(|(id, row)| {
                Ok(UserAccount {
                    user: to_user(*id, row)?,
                    password_hash: row.password_hash.clone(),
                })
            })
            .transpose()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<UserAccount>, UserPersistenceError> {
        let state = self.lock();
        state
            .rows
            .get(&id.get())
            .map(|row| {
                Ok(UserAccount {
                    user: to_user(id.get(), row)?,
                    password_hash: row.password_hash.clone(),
                })
            })
            .transpose()
    }

    async fn find_role_by_id(&self, id: UserId) -> Result<Option<String>, UserPersistenceError> {
        Ok(self.lock().rows.get(&id.get()).map(|row| row.role.clone()))
    }

    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut state = self.lock();
        if email_taken(&state, &user.email, None) {
            return Err(UserPersistenceError::duplicate_email());
        }
        state.last_id += 1;
        let id = state.last_id;
        let now = Utc::now();
        let row = StoredRow {
            name: user.name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role.stored_name().to_owned(),
            created_at: now,
            updated_at: now,
        };
        let created = to_user(id, &row)?;
        state.rows.insert(id, row);
        Ok(created)
    }

    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut state = self.lock();
        if email_taken(&state, &changes.email, Some(id.get())) {
            return Err(UserPersistenceError::duplicate_email());
        }
        let Some(row) = state.rows.get_mut(&id.get()) else {
            return Ok(None);
        };
        row.name = changes.name.clone();
        row.email = changes.email.clone();
        row.password_hash = changes.password_hash.clone();
        row.updated_at = Utc::now();
        to_user(id.get(), row).map(Some)
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError> {
        Ok(self.lock().rows.remove(&id.get()).is_some())
    }

    async fn list(&self, query: &UserListQuery) -> Result<Vec<User>, UserPersistenceError> {
        let state = self.lock();
        let offset = usize::try_from(query.page.offset())
            .map_err(|err| UserPersistenceError::query(err.to_string()))?;
        let limit = usize::try_from(query.page.limit())
            .map_err(|err| UserPersistenceError::query(err.to_string()))?;
        state
            .rows
            .iter()
            .filter(|(_, row)| query.scope.admits(Role::parse_stored(&row.role)))
            .skip(offset)
            .take(limit)
            .map(|(id, row)| to_user(*id, row))
            .collect()
    }
}
