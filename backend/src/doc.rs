//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every endpoint of the inbound HTTP layer, the schema
//! wrappers for domain types ([`ErrorSchema`], [`ErrorCodeSchema`],
//! [`RoleSchema`]) and the session cookie security scheme.
//!
//! The generated document is served by Swagger UI in debug builds and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema, RoleSchema};
use crate::inbound::http::users::{
    CreateUserBody, LoginRequest, UpdateUserBody, UserResponse,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Private session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Clinic user directory API",
        description = "Role-governed user management for a clinic: administrators, \
            receptionists, doctors and patients."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RoleSchema,
        LoginRequest,
        CreateUserBody,
        UpdateUserBody,
        UserResponse
    )),
    tags(
        (name = "auth", description = "Session login and logout"),
        (name = "users", description = "User directory operations"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
