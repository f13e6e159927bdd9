use std::env;

use thiserror::Error;

const DEFAULT_SERVER_HOST: &str = "127.0.0.1";
const DEFAULT_SERVER_PORT: u16 = 8080;
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} must be a number, got {value:?}")]
    NotANumber { name: &'static str, value: String },
}

/// Runtime settings, read from the process environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub db_max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    ///
    /// `DATABASE_URL` wins when present; otherwise the URL is assembled from
    /// `DB_USERNAME`, `DB_PASSWORD`, `DB_NAME` and the optional `DB_HOST`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None => {
                let user = lookup("DB_USERNAME").ok_or(ConfigError::Missing("DATABASE_URL"))?;
                let password = lookup("DB_PASSWORD").unwrap_or_default();
                let name = lookup("DB_NAME").ok_or(ConfigError::Missing("DB_NAME"))?;
                let host = lookup("DB_HOST").unwrap_or_else(|| "localhost".to_string());
                format!("postgres://{}:{}@{}/{}?sslmode=disable", user, password, host, name)
            }
        };

        let jwt_secret = lookup("JWT_SECRET")
            .or_else(|| lookup("SECRET_KEY"))
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        Ok(Self {
            database_url,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
            server_port: parse_or(&lookup, "SERVER_PORT", DEFAULT_SERVER_PORT)?,
            jwt_secret,
            token_ttl_hours: parse_or(&lookup, "TOKEN_TTL_HOURS", DEFAULT_TOKEN_TTL_HOURS)?,
            bcrypt_cost: parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::NotANumber { name, value }),
        None => Ok(default),
    }
}
