//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// No caller identity was presented.
    #[schema(rename = "unauthenticated")]
    Unauthenticated,
    /// The caller's identity references a user that no longer exists.
    #[schema(rename = "subject_not_found")]
    SubjectNotFound,
    /// The caller's role may not perform this action on the target.
    #[schema(rename = "permission_denied")]
    PermissionDenied,
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_argument")]
    InvalidArgument,
    /// The email address is already registered.
    #[schema(rename = "already_exists")]
    AlreadyExists,
    /// The requested user does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal")]
    Internal,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "permission_denied")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "doctor may not delete patient users")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details, such as the offending `field`.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::Role`] as it appears on the wire.
#[derive(ToSchema)]
#[schema(as = crate::domain::Role)]
pub enum RoleSchema {
    #[schema(rename = "administrator")]
    Administrator,
    #[schema(rename = "doctor")]
    Doctor,
    #[schema(rename = "receptionist")]
    Receptionist,
    #[schema(rename = "patient")]
    Patient,
    /// Stored value the service does not recognise.
    #[schema(rename = "unknown")]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::PartialSchema;

    fn schema_to_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[test]
    fn error_code_schema_lists_every_code() {
        let schema_json = schema_to_json::<ErrorCodeSchema>();
        // utoipa replaces :: with . in schema names
        assert_eq!(ErrorCodeSchema::name(), "crate.domain.ErrorCode");
        for code in [
            "unauthenticated",
            "subject_not_found",
            "permission_denied",
            "invalid_argument",
            "already_exists",
            "not_found",
            "internal",
        ] {
            assert!(schema_json.contains(code), "missing {code}");
        }
    }

    #[test]
    fn error_schema_uses_camel_case_trace_id() {
        let schema_json = schema_to_json::<ErrorSchema>();
        assert_eq!(ErrorSchema::name(), "crate.domain.Error");
        assert!(schema_json.contains("traceId"));
        assert!(!schema_json.contains("trace_id"));
    }

    #[test]
    fn role_schema_matches_wire_names() {
        let schema_json = schema_to_json::<RoleSchema>();
        for role in crate::domain::Role::ALL {
            assert!(schema_json.contains(role.as_str()), "missing {role}");
        }
    }
}
