use std::str::FromStr;

use chrono::Duration;

use crate::{errors::ServerError, store::ExpiryPolicy};

/// Longest expiry window accepted from the environment (100 years).
pub const MAX_TTL_SECS: i64 = 100 * 365 * 24 * 60 * 60;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub pool_size: u32,
    /// Largest urlencoded note submission accepted, in bytes.
    pub max_note_bytes: usize,
    pub expiry: ExpiryPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ServerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ExpiryPolicy::default();
        let opened_ttl = parse_or(
            &lookup,
            "NOTE_OPENED_TTL_SECS",
            defaults.opened_ttl.num_seconds(),
        )?;
        let unopened_ttl = parse_or(
            &lookup,
            "NOTE_UNOPENED_TTL_SECS",
            defaults.unopened_ttl.num_seconds(),
        )?;
        if !(0..=MAX_TTL_SECS).contains(&opened_ttl) {
            return Err(ServerError::EnvironmentError("NOTE_OPENED_TTL_SECS"));
        }
        if !(0..=MAX_TTL_SECS).contains(&unopened_ttl) {
            return Err(ServerError::EnvironmentError("NOTE_UNOPENED_TTL_SECS"));
        }

        let max_note_bytes = parse_or(&lookup, "MAX_NOTE_BYTES", 100 * 1024)?;
        if max_note_bytes == 0 {
            return Err(ServerError::EnvironmentError("MAX_NOTE_BYTES"));
        }

        let pool_size = parse_or(&lookup, "POOL_SIZE", 8)?;
        if pool_size == 0 {
            return Err(ServerError::EnvironmentError("POOL_SIZE"));
        }

        Ok(Config {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 3000)?,
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| "notes.db".to_string()),
            pool_size,
            max_note_bytes,
            expiry: ExpiryPolicy {
                opened_ttl: Duration::seconds(opened_ttl),
                unopened_ttl: Duration::seconds(unopened_ttl),
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ServerError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ServerError::EnvironmentError(key)),
        None => Ok(default),
    }
}
