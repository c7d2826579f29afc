use anyhow::{Context, Result};
use url::Url;

use super::config_model::{BackendServer, BillingBackend, Database, DotEnvyConfig, StatusSettings};
use crates::domain::value_objects::status_catalog::DEFAULT_STATUS_DOMAIN;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = BackendServer {
        port: env_or("SERVER_PORT_BACKEND", "3333")
            .parse()
            .context("SERVER_PORT_BACKEND is invalid")?,
        body_limit: env_or("SERVER_BODY_LIMIT", "10")
            .parse()
            .context("SERVER_BODY_LIMIT is invalid")?,
        timeout: env_or("SERVER_TIMEOUT", "60")
            .parse()
            .context("SERVER_TIMEOUT is invalid")?,
    };

    let url = match optional("DATABASE_URL") {
        Some(url) => url,
        None => database_dsn_from_parts(&PgParts {
            host: env_or("PGHOST", "127.0.0.1"),
            port: env_or("PGPORT", "5432"),
            user: required("PGUSER")?,
            password: optional("PGPASSWORD").unwrap_or_default(),
            dbname: required("PGDATABASE")?,
        }),
    };

    let database = Database {
        url,
        max_connections: env_or("DATABASE_MAX_CONNECTIONS", "10")
            .parse()
            .context("DATABASE_MAX_CONNECTIONS is invalid")?,
        statement_timeout_secs: env_or("DATABASE_STATEMENT_TIMEOUT", "600")
            .parse()
            .context("DATABASE_STATEMENT_TIMEOUT is invalid")?,
    };

    let billing = BillingBackend {
        base_url: Url::parse(&required("BILLING_BASE_URL")?)
            .context("BILLING_BASE_URL is invalid")?,
        api_key: required("BILLING_API_KEY")?,
        secret_key: required("BILLING_SECRET_KEY")?,
        hmac_key: required("BILLING_HMAC_KEY")?,
        timeout_secs: env_or("BILLING_TIMEOUT_SECS", "30")
            .parse()
            .context("BILLING_TIMEOUT_SECS is invalid")?,
    };

    let status = StatusSettings {
        domain: env_or("STATUS_DOMAIN", DEFAULT_STATUS_DOMAIN),
    };

    Ok(DotEnvyConfig {
        backend_server,
        database,
        billing,
        status,
    })
}

pub struct PgParts {
    pub host: String,
    pub port: String,
    pub user: String,
    pub password: String,
    pub dbname: String,
}

/// libpq keyword/value connection string for when `DATABASE_URL` is not set.
pub fn database_dsn_from_parts(parts: &PgParts) -> String {
    format!(
        "host='{}' port={} user='{}' password='{}' dbname='{}' sslmode=disable",
        quote(&parts.host),
        parts.port,
        quote(&parts.user),
        quote(&parts.password),
        quote(&parts.dbname),
    )
}

fn quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn required(key: &str) -> Result<String> {
    optional(key).with_context(|| format!("{key} is invalid"))
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional(key).unwrap_or_else(|| default.to_string())
}
