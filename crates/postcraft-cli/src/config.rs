//! Configuration file management for postcraft.
//!
//! Provides a TOML-based config file at `~/.config/postcraft/config.toml` and
//! a resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use postcraft_core::provider::config::{API_KEY_ENV, BASE_URL_ENV, MODEL_ENV};
use postcraft_core::provider::{ConfigError, GeminiConfig};
use postcraft_db::config::DbConfig;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub database: DatabaseSection,
    #[serde(default)]
    pub gemini: GeminiSection,
    #[serde(default)]
    pub server: ServerSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GeminiSection {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ServerSection {
    pub bind: Option<String>,
    pub port: Option<u16>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the postcraft config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/postcraft` or
/// `~/.config/postcraft`, also on macOS.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("postcraft");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("postcraft")
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Load the config file, or an empty one when no file exists.
///
/// A file that exists but cannot be read or parsed is an error.
pub fn load_config_or_default() -> Result<ConfigFile> {
    if !config_path().exists() {
        return Ok(ConfigFile::default());
    }
    load_config()
}

/// Serialize and write the config file, creating parent dirs as needed.
/// The file holds the API key, so it is written with mode 0600 on Unix.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Values given on the command line, which win over everything else.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub database_url: Option<String>,
    pub bind: Option<String>,
    pub port: Option<u16>,
}

/// Where the HTTP server listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl ServerConfig {
    pub const DEFAULT_BIND: &str = "127.0.0.1";
    pub const DEFAULT_PORT: u16 = 5000;
}

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct PostcraftConfig {
    pub db_config: DbConfig,
    pub server: ServerConfig,
    file: ConfigFile,
}

fn non_blank_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl PostcraftConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - DB URL: `--database-url` > `POSTCRAFT_DATABASE_URL` > `database.url` > `DbConfig::DEFAULT_URL`
    /// - Port: `--port` > `POSTCRAFT_PORT` > `PORT` > `server.port` > 5000
    /// - Bind: `--bind` > `server.bind` > 127.0.0.1
    pub fn resolve(cli: &CliOverrides) -> Result<Self> {
        let file = load_config_or_default()?;

        let db_url = if let Some(url) = &cli.database_url {
            url.clone()
        } else if let Some(url) = non_blank_env(DbConfig::ENV_VAR) {
            url
        } else if let Some(url) = &file.database.url {
            url.clone()
        } else {
            DbConfig::DEFAULT_URL.to_string()
        };

        let port = if let Some(port) = cli.port {
            port
        } else if let Some(raw) = non_blank_env("POSTCRAFT_PORT").or_else(|| non_blank_env("PORT"))
        {
            match raw.trim().parse::<u16>() {
                Ok(port) => port,
                Err(_) => bail!("invalid port {raw:?} in environment"),
            }
        } else {
            file.server.port.unwrap_or(ServerConfig::DEFAULT_PORT)
        };

        let bind = cli
            .bind
            .clone()
            .or_else(|| file.server.bind.clone())
            .unwrap_or_else(|| ServerConfig::DEFAULT_BIND.to_string());

        Ok(Self {
            db_config: DbConfig::new(db_url),
            server: ServerConfig { bind, port },
            file,
        })
    }

    /// Resolve provider settings: env var > config file > default.
    ///
    /// Fails when no non-blank API key is available from either source.
    pub fn gemini(&self) -> Result<GeminiConfig, ConfigError> {
        let api_key = non_blank_env(API_KEY_ENV).or_else(|| self.file.gemini.api_key.clone());
        let model = non_blank_env(MODEL_ENV).or_else(|| self.file.gemini.model.clone());
        let base_url = non_blank_env(BASE_URL_ENV).or_else(|| self.file.gemini.base_url.clone());
        GeminiConfig::new(api_key.as_deref(), model.as_deref(), base_url.as_deref())
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
