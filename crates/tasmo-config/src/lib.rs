//! Configuration for tasmoctl.
//!
//! A small TOML file plus `TASMO_`-prefixed environment overrides.
//! Everything has a default, so a fresh machine with no config file
//! works out of the box.

use std::path::PathBuf;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Config struct ───────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Registry document path. `None` means the platform default
    /// (`registry_path()`).
    pub registry: Option<PathBuf>,

    /// Background poll cadence in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,

    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry: None,
            poll_interval: default_poll_interval(),
            timeout: default_timeout(),
        }
    }
}

fn default_poll_interval() -> u64 {
    8
}
fn default_timeout() -> u64 {
    30
}

impl Config {
    /// The registry document path, explicit or platform default.
    pub fn registry_path(&self) -> PathBuf {
        self.registry.clone().unwrap_or_else(registry_path)
    }
}

// ── Paths ───────────────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "tasmoctl", "tasmoctl").map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default location of the registry document (platform data dir).
pub fn registry_path() -> PathBuf {
    ProjectDirs::from("com", "tasmoctl", "tasmoctl").map_or_else(
        || dirs_fallback(".local/share").join("devices.json"),
        |dirs| dirs.data_dir().join("devices.json"),
    )
}

fn dirs_fallback(base: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(base);
    p.push("tasmoctl");
    p
}

// ── Loading / saving ────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(config_path()))
        .merge(Env::prefixed("TASMO_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning the defaults if anything goes wrong.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}
