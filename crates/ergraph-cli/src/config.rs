//! Connection profiles and credential redaction.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgConnectOptions;
use thiserror::Error;

use ergraph_core::SchemaEntry;

/// Dialect used when neither the profile nor the flags name one.
pub const DEFAULT_DIALECT: &str = "postgres";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read profile {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid profile: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("connection url is required (use --url or a profile)")]
    MissingUrl,
    #[error("unsupported connection url scheme: {0}")]
    UnsupportedEngine(String),
    #[error("invalid connection url: {0}")]
    InvalidUrl(String),
}

/// Connection profile as stored in TOML. Every field is optional so that
/// command-line flags can fill in or override any of them.
///
/// ```toml
/// dialect = "postgres"
/// url = "postgres://localhost:5432/shop"
/// user = "reader"
///
/// [[schemas]]
/// schema = "public"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionProfile {
    pub dialect: Option<String>,
    pub url: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub schemas: Vec<SchemaEntry>,
}

impl ConnectionProfile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Values set in `flags` win; schema lists are replaced, not merged.
    pub fn overridden_by(self, flags: ConnectionProfile) -> Self {
        Self {
            dialect: flags.dialect.or(self.dialect),
            url: flags.url.or(self.url),
            user: flags.user.or(self.user),
            password: flags.password.or(self.password),
            schemas: if flags.schemas.is_empty() {
                self.schemas
            } else {
                flags.schemas
            },
        }
    }

    pub fn into_settings(self) -> Result<ConnectionSettings, ConfigError> {
        let url = self.url.ok_or(ConfigError::MissingUrl)?;
        Ok(ConnectionSettings {
            dialect: self.dialect.unwrap_or_else(|| DEFAULT_DIALECT.to_string()),
            url,
            user: self.user,
            password: self.password,
            schemas: self.schemas,
        })
    }
}

/// Fully resolved connection settings.
#[derive(Clone)]
pub struct ConnectionSettings {
    pub dialect: String,
    pub url: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub schemas: Vec<SchemaEntry>,
}

impl std::fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("dialect", &self.dialect)
            .field("connection", &self.redacted().redacted)
            .field("schemas", &self.schemas)
            .finish()
    }
}

impl ConnectionSettings {
    /// Metadata source engine implied by the URL scheme.
    pub fn engine(&self) -> Result<&'static str, ConfigError> {
        detect_engine(&self.url)
    }

    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        let mut options: PgConnectOptions = self
            .url
            .parse()
            .map_err(|err: sqlx::Error| ConfigError::InvalidUrl(err.to_string()))?;
        if let Some(user) = &self.user {
            options = options.username(user);
        }
        if let Some(password) = &self.password {
            options = options.password(password);
        }
        Ok(options)
    }

    pub fn redacted(&self) -> RedactedConnection {
        let mut redacted = redact_url(&self.url);
        if self.user.is_some() {
            redacted.user = self.user.clone();
        }
        redacted.password_supplied |= self.password.is_some();
        redacted
    }
}

pub fn detect_engine(url: &str) -> Result<&'static str, ConfigError> {
    if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        Ok("postgres")
    } else {
        let scheme = url.split_once("://").map_or(url, |(scheme, _)| scheme);
        Err(ConfigError::UnsupportedEngine(scheme.to_string()))
    }
}

/// Connection metadata safe to write into run artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedactedConnection {
    pub engine: Option<String>,
    pub user: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub password_supplied: bool,
    pub redacted: String,
}

/// Strip secrets from a connection URL, keeping host and database details.
pub fn redact_url(url: &str) -> RedactedConnection {
    let (engine, rest) = match url.split_once("://") {
        Some((scheme, rest)) => (Some(scheme.to_string()), rest),
        None => (None, url),
    };
    let (location, query) = match rest.split_once('?') {
        Some((location, query)) => (location, Some(query)),
        None => (rest, None),
    };
    let (authority, database) = match location.split_once('/') {
        Some((authority, database)) => (authority, Some(database)),
        None => (location, None),
    };
    let (credentials, host_port) = match authority.rsplit_once('@') {
        Some((credentials, host_port)) => (Some(credentials), host_port),
        None => (None, authority),
    };

    let (user, url_password) = match credentials.map(|value| value.split_once(':')) {
        Some(Some((user, _))) => (Some(user), true),
        Some(None) => (credentials, false),
        None => (None, false),
    };
    let (host, port) = match host_port.rsplit_once(':') {
        Some((host, port)) => (host, port.parse::<u16>().ok()),
        None => (host_port, None),
    };

    let mut redacted = String::new();
    if let Some(engine) = &engine {
        redacted.push_str(engine);
        redacted.push_str("://");
    }
    if let Some(user) = user {
        redacted.push_str(user);
        if url_password {
            redacted.push_str(":***");
        }
        redacted.push('@');
    }
    redacted.push_str(host_port);
    if let Some(database) = database {
        redacted.push('/');
        redacted.push_str(database);
    }

    let mut query_password = false;
    if let Some(query) = query {
        let params: Vec<String> = query
            .split('&')
            .map(|pair| match pair.split_once('=') {
                Some((key, _)) if is_sensitive_key(key) => {
                    query_password = true;
                    format!("{key}=***")
                }
                _ => pair.to_string(),
            })
            .collect();
        redacted.push('?');
        redacted.push_str(&params.join("&"));
    }

    RedactedConnection {
        engine,
        user: user.filter(|value| !value.is_empty()).map(str::to_string),
        host: Some(host).filter(|value| !value.is_empty()).map(str::to_string),
        port,
        database: database.filter(|value| !value.is_empty()).map(str::to_string),
        password_supplied: url_password || query_password,
        redacted,
    }
}

fn is_sensitive_key(key: &str) -> bool {
    matches!(
        key.to_ascii_lowercase().as_str(),
        "password" | "pass" | "passwd" | "token" | "sslpassword"
    )
}
