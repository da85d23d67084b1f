//! Inserts demo users into the configured database.
//!
//! Usage: `seed [name:api_key ...]`. Without arguments the two fixture users
//! `Anton:test` and `Ivan:test_key` are created. Existing keys are left as
//! they are.

use anyhow::{bail, Context};
use configs::Settings;
use domains::ports::Store;
use secrecy::ExposeSecret;
use storage_adapters::SqliteStore;
use tracing::info;

const DEFAULT_USERS: &[&str] = &["Anton:test", "Ivan:test_key"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = Settings::load().context("loading settings")?;
    let args: Vec<String> = std::env::args().skip(1).collect();
    let specs: Vec<&str> = if args.is_empty() {
        DEFAULT_USERS.to_vec()
    } else {
        args.iter().map(String::as_str).collect()
    };

    let mut users = Vec::with_capacity(specs.len());
    for spec in specs {
        users.push(parse_user(spec)?);
    }

    let store = SqliteStore::connect(settings.database.url.expose_secret(), 1)
        .await
        .context("connecting to the database")?;

    let mut tx = store.begin_write().await?;
    for (name, api_key) in users {
        let user = tx.insert_user(name, api_key).await?;
        info!(id = user.id, name = %user.name, "user ready");
    }
    tx.commit().await?;

    Ok(())
}

fn parse_user(spec: &str) -> anyhow::Result<(&str, &str)> {
    match spec.split_once(':') {
        Some((name, key)) if !name.is_empty() && !key.is_empty() => Ok((name, key)),
        _ => bail!("expected `name:api_key`, got `{spec}`"),
    }
}
