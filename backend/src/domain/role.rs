//! Directory roles and their stored representation.
//!
//! Roles form a closed set with no ordering between them; every relationship
//! between roles lives in [`crate::domain::permissions`]. Parsing a stored
//! value never fails: anything unrecognised degrades to [`Role::Unknown`],
//! which carries no privileges.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Role held by a directory user.
///
/// Serialised on the wire in snake_case (`"administrator"`, `"doctor"`, ...).
/// Persisted using [`Role::stored_name`].
///
/// # Examples
/// ```
/// use clinic_users::domain::Role;
///
/// assert_eq!(Role::parse_stored("MEDICO"), Role::Doctor);
/// assert_eq!(Role::parse_stored("janitor"), Role::Unknown);
/// assert_eq!(Role::Doctor.stored_name(), "MEDICO");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Back-office administrator managing staff accounts.
    Administrator,
    /// Clinician.
    Doctor,
    /// Front-desk staff managing patient accounts.
    Receptionist,
    /// Patient.
    Patient,
    /// Unparseable stored value, or no authenticated identity.
    Unknown,
}

const ADMINISTRATOR: &str = "ADMINISTRADOR";
const DOCTOR: &str = "MEDICO";
const RECEPTIONIST: &str = "RECEPCIONISTA";
const PATIENT: &str = "PACIENTE";
const UNKNOWN: &str = "UNKNOWN_ROLE";

impl Role {
    /// Every role, including [`Role::Unknown`].
    pub const ALL: [Self; 5] = [
        Self::Administrator,
        Self::Doctor,
        Self::Receptionist,
        Self::Patient,
        Self::Unknown,
    ];

    /// Map a stored role string onto the enumeration.
    ///
    /// Matching is exact; unrecognised values map to [`Role::Unknown`].
    #[must_use]
    pub fn parse_stored(raw: &str) -> Self {
        match raw {
            ADMINISTRATOR => Self::Administrator,
            DOCTOR => Self::Doctor,
            RECEPTIONIST => Self::Receptionist,
            PATIENT => Self::Patient,
            _ => Self::Unknown,
        }
    }

    /// Canonical stored form, the inverse of [`Role::parse_stored`].
    #[must_use]
    pub const fn stored_name(self) -> &'static str {
        match self {
            Self::Administrator => ADMINISTRATOR,
            Self::Doctor => DOCTOR,
            Self::Receptionist => RECEPTIONIST,
            Self::Patient => PATIENT,
            Self::Unknown => UNKNOWN,
        }
    }

    /// Wire name used in JSON payloads and log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Administrator => "administrator",
            Self::Doctor => "doctor",
            Self::Receptionist => "receptionist",
            Self::Patient => "patient",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ADMINISTRADOR", Role::Administrator)]
    #[case("MEDICO", Role::Doctor)]
    #[case("RECEPCIONISTA", Role::Receptionist)]
    #[case("PACIENTE", Role::Patient)]
    fn parses_known_stored_values(#[case] raw: &str, #[case] expected: Role) {
        assert_eq!(Role::parse_stored(raw), expected);
    }

    #[rstest]
    #[case("")]
    #[case("medico")]
    #[case(" MEDICO")]
    #[case("ADMIN")]
    #[case("UNKNOWN_ROLE")]
    fn unrecognised_values_degrade_to_unknown(#[case] raw: &str) {
        assert_eq!(Role::parse_stored(raw), Role::Unknown);
    }

    #[rstest]
    fn stored_name_is_inverse_of_parse() {
        for role in Role::ALL {
            assert_eq!(Role::parse_stored(role.stored_name()), role);
        }
    }

    #[rstest]
    #[case(Role::Administrator, "\"administrator\"")]
    #[case(Role::Receptionist, "\"receptionist\"")]
    #[case(Role::Unknown, "\"unknown\"")]
    fn serialises_snake_case(#[case] role: Role, #[case] expected: &str) {
        let json = serde_json::to_string(&role).expect("role serialises");
        assert_eq!(json, expected);
        let back: Role = serde_json::from_str(expected).expect("role deserialises");
        assert_eq!(back, role);
    }
}
