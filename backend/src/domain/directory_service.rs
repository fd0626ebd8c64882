//! Directory operations and login.
//!
//! [`UserDirectoryService`] implements the [`UserDirectory`] and
//! [`LoginService`] driving ports. Each directory operation runs the same
//! pipeline: resolve the caller, consult the permission matrix, validate the
//! input, then issue the store call. Nothing is cached between calls.
//!
//! Dropping an operation's future before a store call has started means that
//! call is never issued. Password hashing and verification run on the
//! blocking pool.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, error, info};
use zeroize::Zeroizing;

use crate::domain::ports::{
    AuthenticatedUser, CreateUserRequest, ListUsersRequest, LoginService, UpdateUserRequest,
    UserDirectory, UserPersistenceError, UserRepository,
};
use crate::domain::{
    CallerToken, CredentialError, CredentialHasher, DisplayName, EmailAddress, Error, Identity,
    IdentityResolver, ListDecision, LoginCredentials, NewUser, Operation, Page, PageError, Password,
    PasswordHash, Role, User, UserChanges, UserId, UserListQuery, UserValidationError,
    is_allowed, list_scope,
};

const INVALID_LOGIN: &str = "invalid email or password";

/// Directory service implementing the driving ports.
pub struct UserDirectoryService<R, H> {
    repo: Arc<R>,
    hasher: Arc<H>,
    identities: IdentityResolver<R>,
}

impl<R, H> Clone for UserDirectoryService<R, H> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            hasher: Arc::clone(&self.hasher),
            identities: self.identities.clone(),
        }
    }
}

impl<R, H> UserDirectoryService<R, H> {
    /// Create a new service over the given repository and hasher.
    pub fn new(repo: Arc<R>, hasher: Arc<H>) -> Self {
        Self {
            identities: IdentityResolver::new(Arc::clone(&repo)),
            repo,
            hasher,
        }
    }
}

fn map_persistence_error(operation: &'static str, err: UserPersistenceError) -> Error {
    match err {
        UserPersistenceError::DuplicateEmail => {
            Error::already_exists("email address is already registered")
        }
        other => {
            error!(error = %other, operation, "user repository call failed");
            Error::internal("user repository failure")
        }
    }
}

fn invalid_field(err: UserValidationError) -> Error {
    Error::invalid_argument(err.to_string()).with_details(json!({ "field": err.field() }))
}

fn map_credential_error(err: CredentialError) -> Error {
    if err.is_input_error() {
        return Error::invalid_argument(err.to_string())
            .with_details(json!({ "field": "password" }));
    }
    error!(error = %err, "password hashing failed");
    Error::internal("password hashing failed")
}

fn parse_target(raw: i32) -> Result<UserId, Error> {
    UserId::new(raw).map_err(invalid_field)
}

fn authorize(
    op: Operation,
    requester: &Identity,
    target: Role,
    is_self: bool,
) -> Result<(), Error> {
    if is_allowed(op, requester.role, target, is_self) {
        return Ok(());
    }
    debug!(
        operation = op.as_str(),
        subject = %requester.subject,
        requester_role = %requester.role,
        target_role = %target,
        is_self,
        "permission denied"
    );
    Err(Error::permission_denied(format!(
        "{} may not {} {} users",
        requester.role,
        op.as_str(),
        target
    )))
}

/// Treat empty and whitespace-only optional fields as absent.
fn provided(value: Option<String>) -> Option<String> {
    value.filter(|raw| !raw.trim().is_empty())
}

impl<R, H> UserDirectoryService<R, H>
where
    R: UserRepository,
    H: CredentialHasher + 'static,
{
    async fn hash_password(&self, password: Password) -> Result<PasswordHash, Error> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|err| {
                error!(error = %err, "password hashing task failed");
                Error::internal("password hashing failed")
            })?
            .map_err(map_credential_error)
    }

    async fn verify_password(&self, password: Password, stored: PasswordHash) -> bool {
        let hasher = Arc::clone(&self.hasher);
        match tokio::task::spawn_blocking(move || hasher.verify(&password, &stored)).await {
            Ok(matched) => matched,
            Err(err) => {
                error!(error = %err, "password verification task failed");
                false
            }
        }
    }

    async fn ensure_email_available(
        &self,
        email: &EmailAddress,
        owner: Option<UserId>,
    ) -> Result<(), Error> {
        let existing = self
            .repo
            .find_by_email(email)
            .await
            .map_err(|err| map_persistence_error("find_by_email", err))?;
        match existing {
            Some(account) if Some(account.user.id()) != owner => {
                Err(Error::already_exists("email address is already registered"))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl<R, H> UserDirectory for UserDirectoryService<R, H>
where
    R: UserRepository,
    H: CredentialHasher + 'static,
{
    async fn create_user(
        &self,
        caller: CallerToken,
        request: CreateUserRequest,
    ) -> Result<User, Error> {
        let requester = self.identities.resolve(caller).await?;
        authorize(Operation::Create, &requester, request.role, false)?;

        let name = DisplayName::new(&request.name).map_err(invalid_field)?;
        let email = EmailAddress::new(&request.email).map_err(invalid_field)?;
        let password = Password::new(request.password.as_str()).map_err(map_credential_error)?;

        self.ensure_email_available(&email, None).await?;
        let password_hash = self.hash_password(password).await?;

        let user = self
            .repo
            .insert(&NewUser {
                name,
                email,
                password_hash,
                role: request.role,
            })
            .await
            .map_err(|err| map_persistence_error("insert", err))?;

        info!(
            subject = %requester.subject,
            target = %user.id(),
            role = %user.role(),
            "user created"
        );
        Ok(user)
    }

    async fn get_user(&self, caller: CallerToken, target: i32) -> Result<User, Error> {
        let requester = self.identities.resolve(caller).await?;
        let target = parse_target(target)?;

        let account = self
            .repo
            .find_by_id(target)
            .await
            .map_err(|err| map_persistence_error("find_by_id", err))?
            .ok_or_else(|| Error::not_found(format!("user {target} not found")))?;

        authorize(
            Operation::Get,
            &requester,
            account.user.role(),
            requester.is_self(target),
        )?;
        Ok(account.into_user())
    }

    async fn list_users(
        &self,
        caller: CallerToken,
        request: ListUsersRequest,
    ) -> Result<Vec<User>, Error> {
        let requester = self.identities.resolve(caller).await?;

        let scope = match list_scope(requester.role, request.role) {
            ListDecision::Scope(scope) => scope,
            ListDecision::Denied => {
                debug!(subject = %requester.subject, "listing denied");
                return Err(Error::permission_denied(format!(
                    "{} may not list users",
                    requester.role
                )));
            }
            ListDecision::FilterNotVisible(role) => {
                debug!(
                    subject = %requester.subject,
                    requester_role = %requester.role,
                    filter = %role,
                    "listing filter rejected"
                );
                return Err(Error::invalid_argument(format!(
                    "{} may not list {role} users",
                    requester.role
                ))
                .with_details(json!({ "field": "role" })));
            }
        };

        let page = Page::new(request.limit, request.offset).map_err(|err| {
            let field = match err {
                PageError::LimitOutOfRange { .. } => "limit",
                PageError::NegativeOffset { .. } => "offset",
            };
            Error::invalid_argument(err.to_string()).with_details(json!({ "field": field }))
        })?;

        self.repo
            .list(&UserListQuery::new(scope, page))
            .await
            .map_err(|err| map_persistence_error("list", err))
    }

    async fn update_user(
        &self,
        caller: CallerToken,
        target: i32,
        request: UpdateUserRequest,
    ) -> Result<User, Error> {
        let requester = self.identities.resolve(caller).await?;
        let target = parse_target(target)?;

        let current = self
            .repo
            .find_by_id(target)
            .await
            .map_err(|err| map_persistence_error("find_by_id", err))?
            .ok_or_else(|| Error::not_found(format!("user {target} not found")))?;

        authorize(
            Operation::Update,
            &requester,
            current.user.role(),
            requester.is_self(target),
        )?;

        let name = match provided(request.name) {
            Some(raw) => DisplayName::new(raw).map_err(invalid_field)?,
            None => current.user.name().clone(),
        };
        let email = match provided(request.email) {
            Some(raw) => EmailAddress::new(raw).map_err(invalid_field)?,
            None => current.user.email().clone(),
        };
        let password = request
            .password
            .filter(|raw: &Zeroizing<String>| !raw.is_empty())
            .map(|raw| Password::new(raw.as_str()))
            .transpose()
            .map_err(map_credential_error)?;

        if &email != current.user.email() {
            self.ensure_email_available(&email, Some(target)).await?;
        }
        let password_hash = match password {
            Some(password) => self.hash_password(password).await?,
            None => current.password_hash,
        };

        let updated = self
            .repo
            .update(
                target,
                &UserChanges {
                    name,
                    email,
                    password_hash,
                },
            )
            .await
            .map_err(|err| map_persistence_error("update", err))?
            .ok_or_else(|| Error::not_found(format!("user {target} not found")))?;

        info!(subject = %requester.subject, target = %target, "user updated");
        Ok(updated)
    }

    async fn delete_user(&self, caller: CallerToken, target: i32) -> Result<(), Error> {
        let requester = self.identities.resolve(caller).await?;
        let target = parse_target(target)?;

        let stored_role = self
            .repo
            .find_role_by_id(target)
            .await
            .map_err(|err| map_persistence_error("find_role_by_id", err))?
            .ok_or_else(|| Error::not_found(format!("user {target} not found")))?;

        authorize(
            Operation::Delete,
            &requester,
            Role::parse_stored(&stored_role),
            requester.is_self(target),
        )?;

        let removed = self
            .repo
            .delete(target)
            .await
            .map_err(|err| map_persistence_error("delete", err))?;
        if !removed {
            return Err(Error::not_found(format!("user {target} not found")));
        }

        info!(subject = %requester.subject, target = %target, "user deleted");
        Ok(())
    }
}

#[async_trait]
impl<R, H> LoginService for UserDirectoryService<R, H>
where
    R: UserRepository,
    H: CredentialHasher + 'static,
{
    async fn authenticate(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedUser, Error> {
        let Ok(password) = Password::new(credentials.password()) else {
            debug!("login rejected before lookup");
            return Err(Error::unauthenticated(INVALID_LOGIN));
        };
        // Looked up verbatim; stored addresses are not shape-checked.
        let email = EmailAddress::from_stored(credentials.email());

        let Some(account) = self
            .repo
            .find_by_email(&email)
            .await
            .map_err(|err| map_persistence_error("find_by_email", err))?
        else {
            debug!("login for unknown email");
            return Err(Error::unauthenticated(INVALID_LOGIN));
        };

        if !self
            .verify_password(password, account.password_hash.clone())
            .await
        {
            debug!(user = %account.user.id(), "login with wrong password");
            return Err(Error::unauthenticated(INVALID_LOGIN));
        }

        let user = account.into_user();
        info!(user = %user.id(), "user authenticated");
        Ok(AuthenticatedUser {
            token: CallerToken::for_user(user.id()),
            user,
        })
    }
}

#[cfg(test)]
#[path = "directory_service_tests.rs"]
mod tests;
