//! Process settings loaded via OrthoConfig.
//!
//! Database variables keep the names and defaults the clinic deployment has
//! always used (`DB_HOST`, `DB_PORT`, ...). Every value is optional and falls
//! back to a development default.

use std::ffi::OsString;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

const DEFAULT_DB_HOST: &str = "localhost";
const DEFAULT_DB_PORT: u16 = 5432;
const DEFAULT_DB_USER: &str = "user";
const DEFAULT_DB_PASSWORD: &str = "password";
const DEFAULT_DB_NAME: &str = "clinica-app";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_HTTP_HOST: &str = "0.0.0.0";
const DEFAULT_HTTP_PORT: u16 = 8080;

/// Errors raised while turning settings into runtime values.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to load {section} settings: {message}")]
    Load {
        section: &'static str,
        message: String,
    },
    #[error("invalid database {component}")]
    DatabaseUrl { component: &'static str },
    #[error("invalid HTTP_HOST '{host}': {source}")]
    HttpHost {
        host: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

/// PostgreSQL connection settings.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DB")]
pub struct DatabaseSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub max_connections: Option<u32>,
}

impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("host", &self.host())
            .field("port", &self.port())
            .field("user", &self.user())
            .field("password", &"<redacted>")
            .field("name", &self.name())
            .field("max_connections", &self.max_connections())
            .finish()
    }
}

impl DatabaseSettings {
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_DB_HOST)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_DB_PORT)
    }

    pub fn user(&self) -> &str {
        self.user.as_deref().unwrap_or(DEFAULT_DB_USER)
    }

    fn password(&self) -> &str {
        self.password.as_deref().unwrap_or(DEFAULT_DB_PASSWORD)
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_DB_NAME)
    }

    pub fn max_connections(&self) -> u32 {
        self.max_connections.unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    /// Assemble a `postgres://` URL, percent-encoding the credentials.
    pub fn database_url(&self) -> Result<String, SettingsError> {
        let invalid = |component| move |_| SettingsError::DatabaseUrl { component };
        let mut url = Url::parse("postgres://localhost")
            .map_err(|_| SettingsError::DatabaseUrl { component: "url" })?;
        url.set_host(Some(self.host()))
            .map_err(|_| SettingsError::DatabaseUrl { component: "host" })?;
        url.set_port(Some(self.port())).map_err(invalid("port"))?;
        url.set_username(self.user()).map_err(invalid("user"))?;
        url.set_password(Some(self.password()))
            .map_err(invalid("password"))?;
        url.set_path(self.name());
        Ok(url.into())
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "HTTP")]
pub struct HttpSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl HttpSettings {
    /// Socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let host = self.host.as_deref().unwrap_or(DEFAULT_HTTP_HOST);
        let ip: IpAddr = host.parse().map_err(|source| SettingsError::HttpHost {
            host: host.to_owned(),
            source,
        })?;
        Ok(SocketAddr::new(ip, self.port.unwrap_or(DEFAULT_HTTP_PORT)))
    }
}

/// Every setting the binary needs at startup.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub database: DatabaseSettings,
    pub http: HttpSettings,
}

impl AppSettings {
    /// Load settings from the environment, ignoring command-line arguments.
    pub fn load() -> Result<Self, SettingsError> {
        let argv = || [OsString::from(env!("CARGO_PKG_NAME"))];
        let database =
            DatabaseSettings::load_from_iter(argv()).map_err(|err| SettingsError::Load {
                section: "database",
                message: err.to_string(),
            })?;
        let http = HttpSettings::load_from_iter(argv()).map_err(|err| SettingsError::Load {
            section: "http",
            message: err.to_string(),
        })?;
        Ok(Self { database, http })
    }
}
