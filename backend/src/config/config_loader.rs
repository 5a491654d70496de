use std::str::FromStr;

use anyhow::{Context, Result, anyhow};

use super::config_model::{BackendServer, Database, DotEnvyConfig, Jwt, Media, Subscriptions};

const DEFAULT_JWT_TTL_DAYS: i64 = 7;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const MIN_JWT_SECRET_LEN: usize = 16;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();
    load_from(|key| std::env::var(key).ok())
}

pub(crate) fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Result<DotEnvyConfig> {
    let backend_server = BackendServer {
        port: parsed(&lookup, "SERVER_PORT")?,
        body_limit: parsed(&lookup, "SERVER_BODY_LIMIT")?,
        timeout: parsed(&lookup, "SERVER_TIMEOUT")?,
    };

    let database = Database {
        url: required(&lookup, "DATABASE_URL")?,
        max_connections: parsed_or(&lookup, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
        disable_prepared_statements: parsed_or(
            &lookup,
            "DATABASE_DISABLE_PREPARED_STATEMENTS",
            false,
        )?,
    };

    let jwt = Jwt {
        secret: required(&lookup, "JWT_SECRET")?,
        ttl_days: parsed_or(&lookup, "JWT_TTL_DAYS", DEFAULT_JWT_TTL_DAYS)?,
    };
    if jwt.secret.len() < MIN_JWT_SECRET_LEN {
        return Err(anyhow!(
            "JWT_SECRET must be at least {} characters",
            MIN_JWT_SECRET_LEN
        ));
    }
    if jwt.ttl_days <= 0 {
        return Err(anyhow!("JWT_TTL_DAYS must be positive"));
    }

    let subscriptions = Subscriptions {
        sweep_interval_secs: parsed_or(
            &lookup,
            "SUBSCRIPTION_SWEEP_INTERVAL_SECS",
            DEFAULT_SWEEP_INTERVAL_SECS,
        )?,
    };

    let media = Media {
        endpoint: required(&lookup, "MEDIA_S3_ENDPOINT")?,
        region: required(&lookup, "MEDIA_S3_REGION")?,
        bucket: required(&lookup, "MEDIA_S3_BUCKET")?,
        access_key: required(&lookup, "MEDIA_S3_ACCESS_KEY_ID")?,
        secret_key: required(&lookup, "MEDIA_S3_SECRET_ACCESS_KEY")?,
        public_base_url: required(&lookup, "MEDIA_PUBLIC_BASE_URL")?,
        prefix: lookup("MEDIA_PREFIX").unwrap_or_else(|| "posts".to_string()),
    };

    Ok(DotEnvyConfig {
        backend_server,
        database,
        jwt,
        subscriptions,
        media,
    })
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| anyhow!("{} is invalid", key))
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    required(lookup, key)?
        .trim()
        .parse::<T>()
        .with_context(|| format!("{} is invalid", key))
}

fn parsed_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key).filter(|value| !value.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} is invalid", key)),
        None => Ok(default),
    }
}
