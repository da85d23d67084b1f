//! # configs
//!
//! Layered application settings: built-in defaults, then an optional
//! `config/microblog.toml`, then `MICROBLOG__*` environment variables
//! (a `.env` file is read into the environment first).
//!
//! e.g. `MICROBLOG__SERVER__PORT=9000`, `MICROBLOG__DATABASE__URL=sqlite://blog.db`

use std::path::PathBuf;

use config::{Config, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

const ENV_PREFIX: &str = "MICROBLOG";
const CONFIG_FILE: &str = "config/microblog";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),

    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid setting `{0}`: {1}")]
    Invalid(&'static str, String),
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub media: MediaSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Directory with the browser frontend, served at `/` when set.
    pub static_dir: Option<PathBuf>,
    pub cors_allow_any_origin: bool,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite connection string. May embed credentials for other backends,
    /// so it is kept out of `Debug` output.
    pub url: SecretString,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaSettings {
    /// Where uploaded files are written.
    pub root: PathBuf,
    /// Public URL prefix under which uploads are served.
    pub url_prefix: String,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// Default filter directive; `RUST_LOG` wins when set.
    pub level: String,
    pub json: bool,
}

impl Settings {
    /// Loads `.env`, the optional config file and the process environment.
    pub fn load() -> Result<Self, SettingsError> {
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e.into()),
        }
        Self::from_sources(
            Some(CONFIG_FILE),
            Environment::with_prefix(ENV_PREFIX).separator("__"),
        )
    }

    /// Builds settings from explicit sources on top of the defaults.
    pub fn from_sources(file: Option<&str>, env: Environment) -> Result<Self, SettingsError> {
        let mut builder = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("server.cors_allow_any_origin", true)?
            .set_default("database.url", "sqlite://microblog.db")?
            .set_default("database.max_connections", 5)?
            .set_default("media.root", "./data/images")?
            .set_default("media.url_prefix", "/api/app/images")?
            .set_default("media.max_upload_bytes", 10 * 1024 * 1024)?
            .set_default("log.level", "info")?
            .set_default("log.json", false)?;

        if let Some(file) = file {
            builder = builder.add_source(File::with_name(file).required(false));
        }

        let settings: Settings = builder.add_source(env).build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.database.max_connections == 0 {
            return Err(SettingsError::Invalid(
                "database.max_connections",
                "must be at least 1".into(),
            ));
        }
        if self.media.max_upload_bytes == 0 {
            return Err(SettingsError::Invalid(
                "media.max_upload_bytes",
                "must be positive".into(),
            ));
        }
        if !self.media.url_prefix.starts_with('/') {
            return Err(SettingsError::Invalid(
                "media.url_prefix",
                format!("`{}` must start with '/'", self.media.url_prefix),
            ));
        }
        Ok(())
    }

    /// Address the HTTP listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Logs the effective settings, secrets excluded.
    pub fn log_summary(&self) {
        info!(
            bind = %self.bind_address(),
            static_dir = ?self.server.static_dir,
            media_root = %self.media.root.display(),
            media_url_prefix = %self.media.url_prefix,
            max_upload_bytes = self.media.max_upload_bytes,
            "configuration loaded"
        );
    }
}
