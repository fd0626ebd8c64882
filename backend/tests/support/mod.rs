//! HTTP harness for directory integration tests.
//!
//! The harness owns a single-threaded Tokio runtime plus a `LocalSet` because
//! Actix uses `spawn_local` internally. The server runs over the in-memory
//! repository seeded with one account per role; dropping the
//! [`DirectoryHarness`] stops it.

use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::Arc;

use actix_session::SessionMiddleware;
use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::{Key, SameSite, time::Duration as CookieDuration};
use actix_web::dev::ServerHandle;
use actix_web::http::{Method, header};
use actix_web::{App, HttpServer, web};
use awc::Client;
use clinic_users::Trace;
use clinic_users::domain::{
    Argon2CredentialHasher, CredentialHasher, Password, Role, TRACE_ID_HEADER,
    UserDirectoryService, UserId,
};
use clinic_users::inbound::http::state::HttpState;
use clinic_users::inbound::http::users::{
    create_user, delete_user, get_user, list_users, login, logout, update_user,
};
use clinic_users::test_support::InMemoryUserRepository;
use serde_json::Value;
use tokio::runtime::Runtime;
use tokio::task::LocalSet;

/// Password shared by every seeded account.
pub const PASSWORD: &str = "s3cret-passphrase";

/// Seeded accounts: role, display name, email.
const SEED: [(Role, &str, &str); 4] = [
    (Role::Administrator, "Alice Admin", "admin@clinic.test"),
    (Role::Receptionist, "Rita Front", "rita@clinic.test"),
    (Role::Doctor, "Dr House", "house@clinic.test"),
    (Role::Patient, "Pat Smith", "pat@clinic.test"),
];

/// Response captured from the server.
#[derive(Debug, Clone)]
pub struct Captured {
    pub status: u16,
    pub trace_id: Option<String>,
    pub session_cookie: Option<String>,
    pub body: Option<Value>,
}

/// Running server plus the runtime that drives it.
pub struct DirectoryHarness {
    runtime: Runtime,
    local: LocalSet,
    base_url: String,
    server: ServerHandle,
    accounts: HashMap<Role, (UserId, &'static str)>,
}

impl DirectoryHarness {
    /// Seed the directory and start a server on an ephemeral port.
    pub fn start() -> Self {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("tokio runtime");
        let local = LocalSet::new();

        let repo = Arc::new(InMemoryUserRepository::new());
        let hasher = Arc::new(Argon2CredentialHasher::low_cost());
        let accounts = SEED
            .into_iter()
            .map(|(role, name, email)| {
                let hash = hasher
                    .hash(&Password::new(PASSWORD).expect("password"))
                    .expect("hash");
                let id = repo.seed(name, email, role.stored_name(), hash);
                (role, (id, email))
            })
            .collect();
        let service = Arc::new(UserDirectoryService::new(repo, hasher));
        let state = HttpState::from_service(service);

        let (base_url, server) = local
            .block_on(&runtime, async { spawn_server(state) })
            .expect("server should start");

        Self {
            runtime,
            local,
            base_url,
            server,
            accounts,
        }
    }

    /// Identifier of the seeded account holding `role`.
    pub fn account_id(&self, role: Role) -> UserId {
        self.accounts.get(&role).expect("seeded role").0
    }

    /// Email of the seeded account holding `role`.
    pub fn account_email(&self, role: Role) -> &'static str {
        self.accounts.get(&role).expect("seeded role").1
    }

    /// Send a request and capture status, trace id, cookie and JSON body.
    pub fn send(
        &self,
        method: Method,
        path: &str,
        cookie: Option<&str>,
        payload: Option<Value>,
    ) -> Captured {
        let url = format!("{}{path}", self.base_url);
        let cookie = cookie.map(str::to_owned);
        self.local.block_on(&self.runtime, async move {
            let mut request = Client::default().request(method, url);
            if let Some(cookie) = cookie {
                request = request.insert_header((header::COOKIE, cookie));
            }
            let mut response = match payload {
                Some(payload) => request.send_json(&payload).await.expect("request"),
                None => request.send().await.expect("request"),
            };
            let status = response.status().as_u16();
            let header_value = |name| {
                response
                    .headers()
                    .get(name)
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_owned)
            };
            let trace_id = header_value(header::HeaderName::from_static(TRACE_ID_HEADER));
            let session_cookie = header_value(header::SET_COOKIE)
                .and_then(|value| value.split(';').next().map(str::to_owned))
                .filter(|pair| pair.starts_with("session=") && pair.len() > "session=".len());
            let body = response.body().await.expect("response body");
            let body = serde_json::from_slice(&body).ok();
            Captured {
                status,
                trace_id,
                session_cookie,
                body,
            }
        })
    }

    /// Log in as the seeded account holding `role` with `password`.
    pub fn login(&self, role: Role, password: &str) -> Captured {
        let payload = serde_json::json!({
            "email": self.account_email(role),
            "password": password,
        });
        self.send(Method::POST, "/api/v1/login", None, Some(payload))
    }
}

impl Drop for DirectoryHarness {
    fn drop(&mut self) {
        let server = self.server.clone();
        self.local.block_on(&self.runtime, async move {
            server.stop(true).await;
        });
    }
}

fn test_session_middleware(key: Key) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".to_owned())
        .cookie_path("/".to_owned())
        .cookie_secure(false)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(SameSite::Lax)
        .session_lifecycle(PersistentSession::default().session_ttl(CookieDuration::hours(2)))
        .build()
}

fn spawn_server(state: HttpState) -> Result<(String, ServerHandle), String> {
    let key = Key::generate();
    let listener = TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;
    let http_data = web::Data::new(state);

    let server = HttpServer::new(move || {
        let api = web::scope("/api/v1")
            .wrap(test_session_middleware(key.clone()))
            .service(login)
            .service(logout)
            .service(create_user)
            .service(list_users)
            .service(get_user)
            .service(update_user)
            .service(delete_user);

        App::new()
            .app_data(http_data.clone())
            .wrap(Trace)
            .service(api)
    })
    .disable_signals()
    .workers(1)
    .listen(listener)
    .map_err(|err| err.to_string())?
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);

    Ok((format!("http://{addr}"), handle))
}

/// Parse a wire role name used in feature files.
pub fn role_named(name: &str) -> Role {
    Role::ALL
        .into_iter()
        .find(|role| role.as_str() == name)
        .unwrap_or_else(|| panic!("unknown role in scenario: {name}"))
}
