use std::str::FromStr;

use anyhow::{bail, Context};
use jsonwebtoken::Algorithm;

/// One year. Longer lifetimes are refused at startup.
pub const MAX_EXPIRE_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub expire_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);

        let algorithm = std::env::var("JWT_ALGORITHM").unwrap_or_else(|_| "HS256".into());
        let expire_minutes = std::env::var("JWT_EXPIRE_MINUTES")
            .context("JWT_EXPIRE_MINUTES is not set")?;
        let jwt = JwtConfig::new(
            std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            &algorithm,
            expire_minutes
                .parse::<i64>()
                .with_context(|| format!("JWT_EXPIRE_MINUTES is not a number: {expire_minutes}"))?,
        )?;

        Ok(Self {
            database_url,
            max_connections,
            jwt,
        })
    }
}

impl JwtConfig {
    /// Only the HMAC family is accepted: the key is a shared secret.
    pub fn new(secret: String, algorithm: &str, expire_minutes: i64) -> anyhow::Result<Self> {
        let algorithm = Algorithm::from_str(algorithm)
            .with_context(|| format!("unknown JWT algorithm: {algorithm}"))?;
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            bail!("JWT algorithm {algorithm:?} needs a key pair, only HS256/HS384/HS512 are supported");
        }
        if secret.is_empty() {
            bail!("JWT secret must not be empty");
        }
        if expire_minutes <= 0 {
            bail!("JWT expiration must be positive, got {expire_minutes}");
        }
        if expire_minutes > MAX_EXPIRE_MINUTES {
            bail!("JWT expiration must be at most {MAX_EXPIRE_MINUTES} minutes, got {expire_minutes}");
        }
        Ok(Self {
            secret,
            algorithm,
            expire_minutes,
        })
    }
}
