// ============================
// worksphere-backend-lib/src/config.rs
// ============================
//! Configuration management.
use std::fmt;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use figment::{Figment, providers::{Env, Format, Serialized, Toml}};
use anyhow::{bail, Result};

/// Default config file looked up by [`Settings::load`]
pub const DEFAULT_CONFIG_FILE: &str = "worksphere.toml";

/// Prefix of environment variables that override file settings
pub const ENV_PREFIX: &str = "WORKSPHERE_";

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const MIN_SECRET_LEN: usize = 32;

/// Longest accepted token lifetime: one year
pub const MAX_TOKEN_TTL_SECS: u64 = 60 * 60 * 24 * 365;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// sqlx connection URL of the relational store
    pub database_url: String,
    /// Log level
    pub log_level: String,
    /// Log output format
    pub log_format: LogFormat,
    /// Upper bound on the time a single request may take
    pub request_timeout_secs: u64,
    /// Token and credential settings
    pub auth: AuthSettings,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Token signing and password hashing settings
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// HMAC secret for bearer tokens. Every issued token depends on it.
    pub jwt_secret: String,
    /// Token lifetime in seconds
    pub token_ttl_secs: u64,
    /// Minimum password length accepted at registration
    pub password_min_length: usize,
    /// scrypt cost parameter (log2 of N)
    pub scrypt_log_n: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            database_url: "sqlite://worksphere.db".to_string(),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            request_timeout_secs: 30,
            auth: AuthSettings::default(),
        }
    }
}

// The secret never reaches logs
impl fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSettings")
            .field("jwt_secret", &"[redacted]")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("password_min_length", &self.password_min_length)
            .field("scrypt_log_n", &self.scrypt_log_n)
            .finish()
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_secs: 60 * 60 * 24, // 1 day
            password_min_length: 8,
            scrypt_log_n: 15,
        }
    }
}

impl Settings {
    /// Load settings from `worksphere.toml` and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load settings from the given TOML file and the environment.
    /// A missing file is not an error; defaults and env vars still apply.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings: Settings = Self::figment(path.as_ref()).extract()?;
        settings.validate()?;
        Ok(settings)
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Check values that would otherwise fail later at runtime
    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            bail!("unknown log level `{}`", self.log_level);
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be greater than zero");
        }
        self.auth.validate()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl AuthSettings {
    fn validate(&self) -> Result<()> {
        if self.jwt_secret.len() < MIN_SECRET_LEN {
            bail!("auth.jwt_secret must be at least {MIN_SECRET_LEN} bytes");
        }
        if self.token_ttl_secs == 0 {
            bail!("auth.token_ttl_secs must be greater than zero");
        }
        if self.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            bail!("auth.token_ttl_secs must be at most {MAX_TOKEN_TTL_SECS}");
        }
        if self.password_min_length == 0 {
            bail!("auth.password_min_length must be at least 1");
        }
        if !(1..=20).contains(&self.scrypt_log_n) {
            bail!("auth.scrypt_log_n must be between 1 and 20");
        }
        Ok(())
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }
}
