use anyhow::Context;
use serde::Deserialize;

/// Upper bound for `JWT_TTL_MINUTES`: one year.
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    /// Tokens never expire when unset.
    pub ttl_minutes: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store: StoreBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub jwt: JwtConfig,
    pub reply_seed: Option<u64>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let store = match std::env::var("STORE_BACKEND") {
            Ok(v) => parse_backend(&v)?,
            Err(_) => StoreBackend::Postgres,
        };
        let database_url = std::env::var("DATABASE_URL").ok();
        if store == StoreBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL must be set when STORE_BACKEND=postgres");
        }

        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "chatterbox".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "chatterbox-users".into()),
            ttl_minutes: token_ttl(parsed_var("JWT_TTL_MINUTES")?)?,
        };
        if jwt.secret.is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }

        Ok(Self {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parsed_var("APP_PORT")?.unwrap_or(4000),
            store,
            database_url,
            max_connections: parsed_var("DATABASE_MAX_CONNECTIONS")?.unwrap_or(10),
            jwt,
            reply_seed: parsed_var("REPLY_SEED")?,
        })
    }

    /// Memory-backed configuration with the given signing secret.
    pub fn in_memory(secret: &str) -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            store: StoreBackend::Memory,
            database_url: None,
            max_connections: 1,
            jwt: JwtConfig {
                secret: secret.into(),
                issuer: "chatterbox".into(),
                audience: "chatterbox-users".into(),
                ttl_minutes: None,
            },
            reply_seed: None,
        }
    }
}

fn parse_backend(value: &str) -> anyhow::Result<StoreBackend> {
    match value.trim().to_ascii_lowercase().as_str() {
        "postgres" | "pg" => Ok(StoreBackend::Postgres),
        "memory" | "mem" => Ok(StoreBackend::Memory),
        other => anyhow::bail!("unknown STORE_BACKEND {other:?}"),
    }
}

fn token_ttl(minutes: Option<i64>) -> anyhow::Result<Option<i64>> {
    match minutes {
        Some(m) if !(1..=MAX_TTL_MINUTES).contains(&m) => {
            anyhow::bail!("JWT_TTL_MINUTES must be between 1 and {MAX_TTL_MINUTES}, got {m}")
        }
        other => Ok(other),
    }
}

fn parsed_var<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => v
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("invalid value for {name}")),
        _ => Ok(None),
    }
}
