// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the contact relay.
//!
//! Every setting comes from the process environment and is read once at
//! startup. Required settings that are missing or malformed abort startup.

use email_address::EmailAddress;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors raised while reading the environment.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Configuration for the contact relay service.
#[derive(Debug, Clone)]
pub struct Config {
    /// Listening address (default: 0.0.0.0:3000)
    pub bind_addr: SocketAddr,

    /// Outbound mail settings
    pub smtp: SmtpConfig,

    /// Contact message addressing
    pub mail: MailSettings,

    /// Rate limiting on `/contact`
    pub rate_limit: RateLimitConfig,

    /// Cross-origin allow-list
    pub cors: CorsConfig,
}

/// SMTP transport settings.
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    /// Implicit TLS port (default: 465)
    pub port: u16,
    pub username: String,
    pub password: String,
}

/// Addressing used when composing a contact email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSettings {
    /// Display name paired with the sender mailbox (default: "Contact Form")
    pub from_name: String,
    /// Authenticated sender mailbox
    pub from: EmailAddress,
    /// Destination mailbox
    pub to: EmailAddress,
}

/// Fixed-window rate limiting configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests admitted per window and client (default: 5)
    pub max_requests: u32,

    /// Window length in seconds (default: 60)
    pub window_secs: u64,

    /// Key clients on the first `X-Forwarded-For` entry (default: false)
    pub trust_proxy: bool,
}

/// Allowed browser origins. An empty list admits every origin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

// Default value functions
fn default_port() -> u16 {
    3000
}

fn default_smtp_port() -> u16 {
    465
}

fn default_from_name() -> String {
    "Contact Form".to_string()
}

fn default_max_requests() -> u32 {
    5
}

fn default_window_secs() -> u64 {
    60
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
            trust_proxy: false,
        }
    }
}

impl RateLimitConfig {
    /// Get the window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl CorsConfig {
    /// Parse a comma-separated list of origins.
    ///
    /// Entries are trimmed and empty entries dropped. Each entry must be an
    /// `http` or `https` origin; it is stored in its serialized form so that
    /// `https://Example.com/` matches the browser's `https://example.com`.
    pub fn parse(list: &str) -> Result<Self, ConfigError> {
        let allowed_origins = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(normalize_origin)
            .collect::<Result<_, _>>()?;

        Ok(Self { allowed_origins })
    }

    pub fn allows_any(&self) -> bool {
        self.allowed_origins.is_empty()
    }

    pub fn is_allowed(&self, origin: &str) -> bool {
        self.allows_any() || self.allowed_origins.iter().any(|o| o == origin)
    }
}

fn normalize_origin(origin: &str) -> Result<String, ConfigError> {
    let invalid = || ConfigError::Invalid {
        key: "CORS_ORIGIN",
        value: origin.to_string(),
    };

    let url = Url::parse(origin).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid());
    }
    Ok(url.origin().ascii_serialization())
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let host = env
            .optional::<IpAddr>("BIND_HOST")?
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        let port = env.optional("PORT")?.unwrap_or_else(default_port);

        let smtp = SmtpConfig {
            host: env.required("SMTP_HOST")?,
            port: env.optional("SMTP_PORT")?.unwrap_or_else(default_smtp_port),
            username: env.required("SMTP_USER")?,
            password: env.required("SMTP_PASS")?,
        };

        let mail = MailSettings {
            from_name: env
                .optional("MAIL_FROM_NAME")?
                .unwrap_or_else(default_from_name),
            from: parse_mailbox("SMTP_USER", &smtp.username)?,
            to: parse_mailbox("CONTACT_TO", &env.required::<String>("CONTACT_TO")?)?,
        };

        let rate_limit = RateLimitConfig {
            max_requests: env
                .optional("RATE_LIMIT_MAX")?
                .unwrap_or_else(default_max_requests),
            window_secs: env
                .optional("RATE_LIMIT_WINDOW_SECS")?
                .unwrap_or_else(default_window_secs),
            trust_proxy: env.optional("TRUST_PROXY")?.unwrap_or(false),
        };
        if rate_limit.max_requests == 0 || rate_limit.window_secs == 0 {
            return Err(ConfigError::Invalid {
                key: if rate_limit.max_requests == 0 {
                    "RATE_LIMIT_MAX"
                } else {
                    "RATE_LIMIT_WINDOW_SECS"
                },
                value: "0".to_string(),
            });
        }

        let cors = match env.raw("CORS_ORIGIN") {
            Some(list) => CorsConfig::parse(&list)?,
            None => CorsConfig::default(),
        };

        Ok(Self {
            bind_addr: SocketAddr::new(host, port),
            smtp,
            mail,
            rate_limit,
            cors,
        })
    }
}

fn parse_mailbox(key: &'static str, value: &str) -> Result<EmailAddress, ConfigError> {
    EmailAddress::from_str(value.trim()).map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Non-blank value of a variable.
    fn raw(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn optional<T: FromStr>(&self, key: &'static str) -> Result<Option<T>, ConfigError> {
        self.raw(key)
            .map(|value| {
                value.trim().parse().map_err(|_| ConfigError::Invalid {
                    key,
                    value: value.clone(),
                })
            })
            .transpose()
    }

    fn required<T: FromStr>(&self, key: &'static str) -> Result<T, ConfigError> {
        self.optional(key)?.ok_or(ConfigError::Missing(key))
    }
}
