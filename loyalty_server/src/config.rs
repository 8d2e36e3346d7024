//! Server configuration.
//!
//! The three core knobs (listen address, database, accrual authority) come from the command line, with environment
//! fallbacks handled by [`crate::cli::Arguments`]. The log level is consumed by the logger in `main` before this
//! configuration is built. Everything else is read from the environment:
//!
//! | Variable                 | Default | Meaning                                         |
//! |--------------------------|---------|-------------------------------------------------|
//! | `LPG_ACCRUAL_TIMEOUT_MS` | 3000    | Upper bound on a single accrual authority query |
//! | `LPG_SESSION_TTL_HOURS`  | 24      | Session lifetime                                |
//! | `LPG_DB_MAX_CONNECTIONS` | 25      | SQLite pool size                                |
//! | `LPG_SECURE_COOKIES`     | false   | Mark session cookies as `Secure`                |
use std::{env, str::FromStr, time::Duration as StdDuration};

use accrual_client::AccrualConfig;
use chrono::Duration;
use log::*;
use lpg_common::{helpers::parse_boolean_flag, Secret};

use crate::cli::Arguments;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_ACCRUAL_TIMEOUT_MS: u64 = 3_000;
const DEFAULT_SESSION_TTL_HOURS: i64 = 24;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 25;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: Secret<String>,
    pub accrual: AccrualConfig,
    pub db_max_connections: u32,
    pub sessions: SessionConfig,
}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// How long a session stays valid after login.
    pub ttl: Duration,
    /// If true, session cookies are only sent over HTTPS.
    pub secure_cookies: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS), secure_cookies: false }
    }
}

impl ServerConfig {
    pub fn from_args(args: Arguments) -> Self {
        let (host, port) = parse_run_address(&args.run_address).unwrap_or_else(|| {
            error!(
                "🪛️ {} is not a valid listen address. Expected host:port. Using the default, \
                 {DEFAULT_HOST}:{DEFAULT_PORT}, instead.",
                args.run_address
            );
            (DEFAULT_HOST.to_string(), DEFAULT_PORT)
        });
        let accrual_timeout = StdDuration::from_millis(env_or_default("LPG_ACCRUAL_TIMEOUT_MS", DEFAULT_ACCRUAL_TIMEOUT_MS));
        let accrual = AccrualConfig::new(&args.accrual_address, accrual_timeout);
        let ttl_hours = env_or_default("LPG_SESSION_TTL_HOURS", DEFAULT_SESSION_TTL_HOURS);
        let ttl = if ttl_hours > 0 {
            Duration::hours(ttl_hours)
        } else {
            warn!("🪛️ LPG_SESSION_TTL_HOURS must be positive. Using the default, {DEFAULT_SESSION_TTL_HOURS}.");
            Duration::hours(DEFAULT_SESSION_TTL_HOURS)
        };
        let secure_cookies = parse_boolean_flag(env::var("LPG_SECURE_COOKIES").ok(), false);
        let db_max_connections = env_or_default("LPG_DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS);
        info!("🪛️ Accrual authority at {} (timeout {accrual_timeout:?})", accrual.base_url);
        Self {
            host,
            port,
            database_url: Secret::new(args.database_uri),
            accrual,
            db_max_connections,
            sessions: SessionConfig { ttl, secure_cookies },
        }
    }
}

/// Splits `host:port`. The port is taken after the last colon, so bracketed IPv6 hosts work too.
pub fn parse_run_address(address: &str) -> Option<(String, u16)> {
    let (host, port) = address.rsplit_once(':')?;
    let port = port.parse::<u16>().ok()?;
    let host = host.trim_start_matches('[').trim_end_matches(']');
    let host = if host.is_empty() { "0.0.0.0" } else { host };
    Some((host.to_string(), port))
}

fn env_or_default<T: FromStr + Copy>(name: &str, default: T) -> T
where T::Err: std::fmt::Display {
    match env::var(name) {
        Ok(s) => s.parse::<T>().unwrap_or_else(|e| {
            warn!("🪛️ Invalid configuration value for {name} ({s}). {e}. Using the default instead.");
            default
        }),
        Err(_) => default,
    }
}
