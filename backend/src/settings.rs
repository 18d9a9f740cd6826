//! Service configuration loaded via OrthoConfig.
//!
//! Values come from CLI flags, `CONTACTS_*` environment variables or a
//! configuration file. Tunables carry defaults declared on the fields;
//! `database_url` and `jwt_secret` are required.

use std::net::SocketAddr;

use chrono::TimeDelta;
use jsonwebtoken::Algorithm;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::domain::TokenTtls;
use crate::inbound::http::rate_limit::{DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW_SECS};
use crate::inbound::http::state::DEFAULT_PUBLIC_BASE_URL;
use crate::outbound::mail::SmtpConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_JWT_ALGORITHM: &str = "HS256";
const DEFAULT_ACCESS_TTL_SECS: u64 = 15 * 60;
const DEFAULT_REFRESH_TTL_SECS: u64 = 7 * 24 * 60 * 60;
const DEFAULT_EMAIL_TTL_SECS: u64 = 7 * 24 * 60 * 60;
const DEFAULT_MAIL_PORT: u16 = 465;
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Problems detected after loading.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("bind_addr {0:?} is not a socket address")]
    BindAddr(String),
    #[error("jwt_algorithm {0:?} is not one of HS256, HS384, HS512")]
    Algorithm(String),
    #[error("{name} {value} is out of range")]
    OutOfRange { name: &'static str, value: u64 },
    #[error("public_base_url {0:?} must be an absolute http(s) URL")]
    PublicBaseUrl(String),
}

/// Configuration values for the contact service.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CONTACTS")]
pub struct Settings {
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// HMAC secret used to sign tokens.
    pub jwt_secret: Option<String>,
    /// Token signing algorithm.
    #[ortho_config(default = String::from(DEFAULT_JWT_ALGORITHM))]
    pub jwt_algorithm: String,
    #[ortho_config(default = String::from(DEFAULT_BIND_ADDR))]
    pub bind_addr: String,
    /// Origin placed in emailed links, e.g. `https://contacts.example/`.
    #[ortho_config(default = String::from(DEFAULT_PUBLIC_BASE_URL))]
    pub public_base_url: String,
    #[ortho_config(default = DEFAULT_ACCESS_TTL_SECS)]
    pub access_token_ttl_secs: u64,
    #[ortho_config(default = DEFAULT_REFRESH_TTL_SECS)]
    pub refresh_token_ttl_secs: u64,
    #[ortho_config(default = DEFAULT_EMAIL_TTL_SECS)]
    pub email_token_ttl_secs: u64,
    /// SMTP relay host. Mail is only logged when unset.
    pub mail_server: Option<String>,
    #[ortho_config(default = DEFAULT_MAIL_PORT)]
    pub mail_port: u16,
    pub mail_username: Option<String>,
    pub mail_password: Option<String>,
    pub mail_from: Option<String>,
    pub mail_from_name: Option<String>,
    #[ortho_config(default = DEFAULT_POOL_MAX_SIZE)]
    pub pool_max_size: u32,
    #[ortho_config(default = DEFAULT_MAX_REQUESTS)]
    pub rate_limit_requests: u32,
    #[ortho_config(default = DEFAULT_WINDOW_SECS)]
    pub rate_limit_window_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: None,
            jwt_secret: None,
            jwt_algorithm: DEFAULT_JWT_ALGORITHM.to_owned(),
            bind_addr: DEFAULT_BIND_ADDR.to_owned(),
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_owned(),
            access_token_ttl_secs: DEFAULT_ACCESS_TTL_SECS,
            refresh_token_ttl_secs: DEFAULT_REFRESH_TTL_SECS,
            email_token_ttl_secs: DEFAULT_EMAIL_TTL_SECS,
            mail_server: None,
            mail_port: DEFAULT_MAIL_PORT,
            mail_username: None,
            mail_password: None,
            mail_from: None,
            mail_from_name: None,
            pool_max_size: DEFAULT_POOL_MAX_SIZE,
            rate_limit_requests: DEFAULT_MAX_REQUESTS,
            rate_limit_window_secs: DEFAULT_WINDOW_SECS,
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("bind_addr", &self.bind_addr)
            .field("public_base_url", &self.public_base_url)
            .field("mail_server", &self.mail_server)
            .field("mail_port", &self.mail_port)
            .field("mail_from", &self.mail_from)
            .field("pool_max_size", &self.pool_max_size)
            .finish_non_exhaustive()
    }
}

impl Settings {
    pub fn database_url(&self) -> Result<Zeroizing<String>, SettingsError> {
        required(&self.database_url, "database_url")
    }

    pub fn jwt_secret(&self) -> Result<Zeroizing<String>, SettingsError> {
        required(&self.jwt_secret, "jwt_secret")
    }

    pub fn jwt_algorithm(&self) -> Result<Algorithm, SettingsError> {
        let raw = self.jwt_algorithm.trim();
        match raw.to_ascii_uppercase().as_str() {
            "HS256" => Ok(Algorithm::HS256),
            "HS384" => Ok(Algorithm::HS384),
            "HS512" => Ok(Algorithm::HS512),
            _ => Err(SettingsError::Algorithm(raw.to_owned())),
        }
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.trim();
        raw.parse()
            .map_err(|_| SettingsError::BindAddr(raw.to_owned()))
    }

    /// Public origin for emailed links, always ending in `/`.
    pub fn public_base_url(&self) -> Result<String, SettingsError> {
        let raw = self.public_base_url.trim();
        let invalid = || SettingsError::PublicBaseUrl(raw.to_owned());
        let url = url::Url::parse(raw).map_err(|_| invalid())?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(invalid());
        }
        let mut origin = url.to_string();
        if !origin.ends_with('/') {
            origin.push('/');
        }
        Ok(origin)
    }

    pub fn token_ttls(&self) -> Result<TokenTtls, SettingsError> {
        Ok(TokenTtls {
            access: ttl(self.access_token_ttl_secs, "access_token_ttl_secs")?,
            refresh: ttl(self.refresh_token_ttl_secs, "refresh_token_ttl_secs")?,
            email: ttl(self.email_token_ttl_secs, "email_token_ttl_secs")?,
        })
    }

    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size
    }

    /// `(max requests, window seconds)` for rate-limited routes.
    pub fn rate_limit(&self) -> (u32, u64) {
        (self.rate_limit_requests, self.rate_limit_window_secs)
    }

    /// SMTP settings, present only when server, credentials and sender are set.
    pub fn smtp(&self) -> Option<SmtpConfig> {
        let server = self.mail_server.clone()?;
        let username = self.mail_username.clone()?;
        let password = self.mail_password.clone()?;
        let from = self.mail_from.clone().unwrap_or_else(|| username.clone());
        Some(SmtpConfig {
            server,
            port: self.mail_port,
            username,
            password: Zeroizing::new(password),
            from,
            from_name: self.mail_from_name.clone(),
        })
    }
}

fn ttl(secs: u64, name: &'static str) -> Result<TimeDelta, SettingsError> {
    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .filter(|ttl| *ttl > TimeDelta::zero())
        .ok_or(SettingsError::OutOfRange { name, value: secs })
}

fn required(
    value: &Option<String>,
    name: &'static str,
) -> Result<Zeroizing<String>, SettingsError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| Zeroizing::new(v.to_owned()))
        .ok_or(SettingsError::Missing(name))
}
