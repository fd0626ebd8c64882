//! User directory HTTP handlers.
//!
//! ```text
//! POST   /api/v1/login        {"email":"ada@clinic.test","password":"..."}
//! POST   /api/v1/logout
//! POST   /api/v1/users        {"name":"...","email":"...","password":"...","role":"doctor"}
//! GET    /api/v1/users?role=doctor&limit=20&offset=0
//! GET    /api/v1/users/{id}
//! PATCH  /api/v1/users/{id}   {"name":"..."}
//! DELETE /api/v1/users/{id}
//! ```
//!
//! Handlers only translate between JSON and the domain ports; every
//! authorisation and validation decision is made by the directory service.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use zeroize::Zeroizing;

use crate::domain::ports::{CreateUserRequest, ListUsersRequest, UpdateUserRequest};
use crate::domain::{Error, LoginCredentials, LoginValidationError, Role, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, RoleSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /api/v1/login`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request body for `POST /api/v1/users`.
///
/// Missing fields deserialise as empty strings so the directory service can
/// report them after authorising the caller.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserBody {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    #[schema(value_type = RoleSchema)]
    pub role: String,
}

/// Request body for `PATCH /api/v1/users/{id}`. Absent or blank fields are
/// left unchanged.
#[derive(Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserBody {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Query string for `GET /api/v1/users`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    /// Restrict the listing to one role.
    pub role: Option<String>,
    /// Page size, 1 to 200. Defaults to 50.
    pub limit: Option<i64>,
    /// Rows to skip. Defaults to 0.
    pub offset: Option<i64>,
}

/// User as returned by the API. Never carries the credential.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = 7)]
    pub id: i32,
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(example = "ada@clinic.test")]
    pub email: String,
    #[schema(value_type = RoleSchema)]
    pub role: String,
    #[schema(example = "2024-05-01T12:00:00+00:00")]
    pub created_at: String,
    #[schema(example = "2024-05-01T12:00:00+00:00")]
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id().get(),
            name: user.name().as_ref().to_owned(),
            email: user.email().as_ref().to_owned(),
            role: user.role().as_str().to_owned(),
            created_at: user.created_at().to_rfc3339(),
            updated_at: user.updated_at().to_rfc3339(),
        }
    }
}

/// Map a wire role name onto [`Role`]. Unrecognised names become
/// [`Role::Unknown`], which the permission matrix refuses.
fn parse_wire_role(raw: &str) -> Role {
    let raw = raw.trim();
    Role::ALL
        .into_iter()
        .find(|role| role.as_str().eq_ignore_ascii_case(raw))
        .unwrap_or(Role::Unknown)
}

/// Path id as handed to the directory. Anything that is not an integer
/// becomes `0`, which the directory rejects once the caller is resolved.
fn parse_user_id(raw: &str) -> i32 {
    raw.trim().parse::<i32>().unwrap_or(0)
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    let field = match err {
        LoginValidationError::EmptyEmail => "email",
        LoginValidationError::EmptyPassword => "password",
    };
    Error::invalid_argument(err.to_string()).with_details(json!({ "field": field }))
}

/// Authenticate with email and password and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = UserResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let LoginRequest { email, password } = payload.into_inner();
    let password = Zeroizing::new(password);
    let credentials = LoginCredentials::try_from_parts(&email, &password)
        .map_err(map_login_validation_error)?;
    let authenticated = state.login.authenticate(&credentials).await?;
    let subject = authenticated
        .token
        .subject()
        .ok_or_else(|| Error::internal("login produced an anonymous token"))?;
    session.persist_user(subject)?;
    Ok(web::Json(UserResponse::from(authenticated.user)))
}

/// Drop the caller's session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// Create a user with the requested role.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserBody,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthenticated", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateUserBody>,
) -> ApiResult<HttpResponse> {
    let CreateUserBody {
        name,
        email,
        password,
        role,
    } = payload.into_inner();
    let request = CreateUserRequest {
        name,
        email,
        password: Zeroizing::new(password),
        role: parse_wire_role(&role),
    };
    let user = state
        .users
        .create_user(session.caller_token(), request)
        .await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Fetch one user.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = i32, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthenticated", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserResponse>> {
    let target = parse_user_id(&path.into_inner());
    let user = state.users.get_user(session.caller_token(), target).await?;
    Ok(web::Json(UserResponse::from(user)))
}

/// List the users visible to the caller, ordered by id.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Users", body = [UserResponse]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthenticated", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ListUsersQuery>,
) -> ApiResult<web::Json<Vec<UserResponse>>> {
    let ListUsersQuery {
        role,
        limit,
        offset,
    } = query.into_inner();
    let request = ListUsersRequest {
        role: role.as_deref().map(parse_wire_role),
        limit,
        offset,
    };
    let users = state
        .users
        .list_users(session.caller_token(), request)
        .await?;
    Ok(web::Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Apply a partial update to a user.
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}",
    params(("id" = i32, Path, description = "User identifier")),
    request_body = UpdateUserBody,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthenticated", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[patch("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateUserBody>,
) -> ApiResult<web::Json<UserResponse>> {
    let target = parse_user_id(&path.into_inner());
    let UpdateUserBody {
        name,
        email,
        password,
    } = payload.into_inner();
    let request = UpdateUserRequest {
        name,
        email,
        password: password.map(Zeroizing::new),
    };
    let user = state
        .users
        .update_user(session.caller_token(), target, request)
        .await?;
    Ok(web::Json(UserResponse::from(user)))
}

/// Remove a user.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = i32, Path, description = "User identifier")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthenticated", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let target = parse_user_id(&path.into_inner());
    state
        .users
        .delete_user(session.caller_token(), target)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
