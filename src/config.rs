//! Server configuration from environment variables

use crate::runtime::SessionConfig;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_REPLY_DELAY_MS: u64 = 1000;
pub const DEFAULT_MAX_SESSIONS: usize = 1024;
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 30 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub reply_delay: Duration,
    pub max_sessions: usize,
    pub session_idle: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            reply_delay: Duration::from_millis(DEFAULT_REPLY_DELAY_MS),
            max_sessions: DEFAULT_MAX_SESSIONS,
            session_idle: Duration::from_secs(DEFAULT_SESSION_IDLE_SECS),
        }
    }
}

impl ServerConfig {
    /// Read `TECHCRAFT_PORT`, `TECHCRAFT_REPLY_DELAY_MS`,
    /// `TECHCRAFT_MAX_SESSIONS` and `TECHCRAFT_SESSION_IDLE_SECS`. Unset or
    /// unparseable values keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = parse_or("TECHCRAFT_PORT", lookup("TECHCRAFT_PORT"), DEFAULT_PORT);
        let reply_delay_ms = parse_or(
            "TECHCRAFT_REPLY_DELAY_MS",
            lookup("TECHCRAFT_REPLY_DELAY_MS"),
            DEFAULT_REPLY_DELAY_MS,
        );
        let max_sessions = match parse_or(
            "TECHCRAFT_MAX_SESSIONS",
            lookup("TECHCRAFT_MAX_SESSIONS"),
            DEFAULT_MAX_SESSIONS,
        ) {
            0 => {
                tracing::warn!("TECHCRAFT_MAX_SESSIONS must be positive, using default");
                DEFAULT_MAX_SESSIONS
            }
            n => n,
        };
        let session_idle_secs = match parse_or(
            "TECHCRAFT_SESSION_IDLE_SECS",
            lookup("TECHCRAFT_SESSION_IDLE_SECS"),
            DEFAULT_SESSION_IDLE_SECS,
        ) {
            0 => {
                tracing::warn!("TECHCRAFT_SESSION_IDLE_SECS must be positive, using default");
                DEFAULT_SESSION_IDLE_SECS
            }
            n => n,
        };

        Self {
            port,
            reply_delay: Duration::from_millis(reply_delay_ms),
            max_sessions,
            session_idle: Duration::from_secs(session_idle_secs),
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            reply_delay: self.reply_delay,
            max_sessions: self.max_sessions,
            idle_timeout: self.session_idle,
        }
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    let Some(raw) = raw else {
        return default;
    };
    raw.trim().parse().unwrap_or_else(|_| {
        tracing::warn!(key, value = %raw, default = %default, "Invalid config value, using default");
        default
    })
}
