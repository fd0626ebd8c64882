//! Permission matrix for directory operations.
//!
//! The matrix is deliberately asymmetric and must not be collapsed into a
//! role hierarchy: administrators manage staff, receptionists manage
//! patients, and patient records may only be removed by a receptionist or by
//! the patient themselves.
//!
//! Every function here is pure. [`Role::Unknown`] as a requester is denied
//! before any other rule is consulted, self-access included.

use super::Role;

/// Directory operation being authorised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Get,
    List,
    Update,
    Delete,
}

impl Operation {
    /// Every operation.
    pub const ALL: [Self; 5] = [
        Self::Create,
        Self::Get,
        Self::List,
        Self::Update,
        Self::Delete,
    ];

    /// Lowercase name for log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Get => "get",
            Self::List => "list",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Decide whether `requester` may perform `op` against a record holding
/// `target`.
///
/// `is_self` is true when the requester and the target record are the same
/// user. It is ignored for [`Operation::Create`] and [`Operation::List`].
///
/// # Examples
/// ```
/// use clinic_users::domain::{is_allowed, Operation, Role};
///
/// assert!(is_allowed(Operation::Create, Role::Administrator, Role::Doctor, false));
/// assert!(!is_allowed(Operation::Delete, Role::Administrator, Role::Patient, false));
/// assert!(is_allowed(Operation::Delete, Role::Patient, Role::Patient, true));
/// ```
#[must_use]
pub fn is_allowed(op: Operation, requester: Role, target: Role, is_self: bool) -> bool {
    if requester == Role::Unknown {
        return false;
    }

    match op {
        Operation::Create => can_create(requester, target),
        Operation::Get => is_self || can_view(requester, target),
        Operation::List => can_view(requester, target),
        Operation::Update => is_self || can_update(requester, target),
        Operation::Delete if is_self => requester == Role::Patient,
        Operation::Delete => can_delete(requester, target),
    }
}

fn can_create(requester: Role, target: Role) -> bool {
    matches!(
        (requester, target),
        (Role::Administrator, Role::Doctor | Role::Receptionist)
            | (Role::Receptionist, Role::Patient)
    )
}

fn can_view(requester: Role, target: Role) -> bool {
    match requester {
        Role::Administrator => true,
        Role::Receptionist => target != Role::Administrator,
        Role::Doctor => target == Role::Patient,
        Role::Patient => target == Role::Doctor,
        Role::Unknown => false,
    }
}

fn can_update(requester: Role, target: Role) -> bool {
    match requester {
        Role::Administrator => target != Role::Patient,
        Role::Receptionist => target == Role::Patient,
        Role::Doctor | Role::Patient | Role::Unknown => false,
    }
}

fn can_delete(requester: Role, target: Role) -> bool {
    match requester {
        Role::Administrator => matches!(target, Role::Doctor | Role::Receptionist),
        Role::Receptionist => target == Role::Patient,
        Role::Doctor | Role::Patient | Role::Unknown => false,
    }
}

/// Row filter applied to a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleScope {
    /// Every row.
    All,
    /// Rows whose role is one of the given roles.
    Only(Vec<Role>),
    /// Rows whose role is none of the given roles.
    AllExcept(Vec<Role>),
}

impl RoleScope {
    /// Whether a row holding `role` falls inside the scope.
    #[must_use]
    pub fn admits(&self, role: Role) -> bool {
        match self {
            Self::All => true,
            Self::Only(roles) => roles.contains(&role),
            Self::AllExcept(roles) => !roles.contains(&role),
        }
    }
}

/// Outcome of authorising a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListDecision {
    /// Listing allowed; rows are restricted to the scope.
    Scope(RoleScope),
    /// The requester may not list anything.
    Denied,
    /// The requested role filter names rows the requester cannot see.
    FilterNotVisible(Role),
}

/// Translate the listing rules into a row scope for `requester`, optionally
/// narrowed by an explicit role `filter`.
///
/// A filter naming rows the requester cannot see is rejected rather than
/// silently narrowed.
#[must_use]
pub fn list_scope(requester: Role, filter: Option<Role>) -> ListDecision {
    if requester == Role::Unknown {
        return ListDecision::Denied;
    }

    match filter {
        Some(Role::Unknown) => ListDecision::FilterNotVisible(Role::Unknown),
        Some(role) if can_view(requester, role) => ListDecision::Scope(RoleScope::Only(vec![role])),
        Some(role) => ListDecision::FilterNotVisible(role),
        None => ListDecision::Scope(default_scope(requester)),
    }
}

fn default_scope(requester: Role) -> RoleScope {
    match requester {
        Role::Administrator => RoleScope::All,
        Role::Receptionist => RoleScope::AllExcept(vec![Role::Administrator]),
        Role::Doctor => RoleScope::Only(vec![Role::Patient]),
        Role::Patient => RoleScope::Only(vec![Role::Doctor]),
        Role::Unknown => RoleScope::Only(Vec::new()),
    }
}
