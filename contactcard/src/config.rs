use anyhow::{anyhow, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use card_core::config::parse_bool;
use card_core::CardApp;
use card_sqlx::SchemaName;
use rand::RngCore;

use crate::services::{Contact, ContactParams};

pub const MEMORY_URL_PREFIX: &str = "memory://";

/// Environment lookup: blank values count as unset.
pub fn from_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Populate `app` from `lookup` (usually [`from_env`]).
pub fn config<F>(app: &CardApp<Contact, ContactParams>, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    configure_http(app, &lookup)?;
    configure_database(app, &lookup)?;
    configure_security(app, &lookup);
    Ok(())
}

fn configure_http<F>(app: &CardApp<Contact, ContactParams>, lookup: &F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let host = lookup("HOST")
        .or_else(|| lookup("HTTP_HOST"))
        .unwrap_or_else(|| "0.0.0.0".to_string());

    let port = lookup("PORT")
        .or_else(|| lookup("HTTP_PORT"))
        .unwrap_or_else(|| "5000".to_string());
    port.parse::<u16>()
        .with_context(|| format!("invalid PORT {port:?}"))?;

    let force_https = match lookup("FORCE_HTTPS") {
        Some(raw) => parse_bool(&raw).ok_or_else(|| anyhow!("invalid FORCE_HTTPS {raw:?}"))?,
        None => true,
    };

    app.set("http.host", host);
    app.set("http.port", port);
    app.set("http.force_https", force_https.to_string());
    Ok(())
}

fn configure_database<F>(app: &CardApp<Contact, ContactParams>, lookup: &F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let url = lookup("DATABASE_URL").ok_or_else(|| anyhow!("Missing DATABASE_URL"))?;

    let schema = lookup("DATABASE_SCHEMA").unwrap_or_else(|| "salesforce".to_string());
    let schema = SchemaName::parse(&schema).context("invalid DATABASE_SCHEMA")?;

    let max_connections = lookup("DATABASE_MAX_CONNECTIONS").unwrap_or_else(|| "5".to_string());
    let parsed = max_connections
        .parse::<u32>()
        .with_context(|| format!("invalid DATABASE_MAX_CONNECTIONS {max_connections:?}"))?;
    if parsed == 0 {
        return Err(anyhow!("DATABASE_MAX_CONNECTIONS must be at least 1"));
    }

    app.set("database.url", url);
    app.set("database.schema", schema.as_str());
    app.set("database.max_connections", parsed.to_string());
    Ok(())
}

fn configure_security<F>(app: &CardApp<Contact, ContactParams>, lookup: &F)
where
    F: Fn(&str) -> Option<String>,
{
    let secret = lookup("SECRET_KEY").unwrap_or_else(|| {
        tracing::warn!("SECRET_KEY not set, using a random key; forms break across restarts");
        random_secret()
    });
    app.set("security.secret_key", secret);
}

/// 48 random bytes, base64: 64 characters.
fn random_secret() -> String {
    let mut bytes = [0u8; 48];
    rand::thread_rng().fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}
