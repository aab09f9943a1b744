//! Client configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::net::api::PhaseLookup;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_AUTH_FILE: &str = ".nftstake-session.json";
pub const DEFAULT_COUNTDOWN_TICK_SECS: u64 = 60;

/// Errors produced while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse failed: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub timeouts: Timeouts,
    pub auth_file: PathBuf,
    pub countdown_tick: Duration,
    pub phase_lookup: PhaseLookup,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            timeouts: Timeouts::default(),
            auth_file: PathBuf::from(DEFAULT_AUTH_FILE),
            countdown_tick: Duration::from_secs(DEFAULT_COUNTDOWN_TICK_SECS),
            phase_lookup: PhaseLookup::default(),
        }
    }
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `NFTSTAKE_API_URL`: default `http://127.0.0.1:8080/api`
    /// - `NFTSTAKE_REQUEST_TIMEOUT_SECS`: default 30
    /// - `NFTSTAKE_CONNECT_TIMEOUT_SECS`: default 10
    /// - `NFTSTAKE_AUTH_FILE`: default `.nftstake-session.json`
    /// - `NFTSTAKE_COUNTDOWN_TICK_SECS`: default 60, must be non-zero
    /// - `NFTSTAKE_PHASE_LOOKUP`: `direct` (default) or `scan`
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown lookup mode or a zero tick period.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = std::env::var("NFTSTAKE_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        let timeouts = Timeouts {
            request_secs: env_parse("NFTSTAKE_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse("NFTSTAKE_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let auth_file = std::env::var_os("NFTSTAKE_AUTH_FILE").map_or_else(|| PathBuf::from(DEFAULT_AUTH_FILE), PathBuf::from);

        let tick_secs = env_parse("NFTSTAKE_COUNTDOWN_TICK_SECS", DEFAULT_COUNTDOWN_TICK_SECS);
        if tick_secs == 0 {
            return Err(ConfigError::Parse("NFTSTAKE_COUNTDOWN_TICK_SECS must be greater than 0".into()));
        }
        let phase_lookup = parse_phase_lookup(std::env::var("NFTSTAKE_PHASE_LOOKUP").ok().as_deref())?;

        Ok(Self { api_url, timeouts, auth_file, countdown_tick: Duration::from_secs(tick_secs), phase_lookup })
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

/// Parse a phase lookup mode, defaulting to `direct` when unset.
///
/// # Errors
///
/// Returns an error for anything other than `direct` or `scan`.
pub fn parse_phase_lookup(raw: Option<&str>) -> Result<PhaseLookup, ConfigError> {
    match raw.map(str::trim).unwrap_or("direct") {
        "direct" => Ok(PhaseLookup::Direct),
        "scan" => Ok(PhaseLookup::Scan),
        other => Err(ConfigError::Parse(format!(
            "unsupported phase lookup '{other}' (expected 'direct' or 'scan')"
        ))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
