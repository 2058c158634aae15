//! User configuration: `~/.config/keactl/config.toml`.
//!
//! Precedence is CLI flag > environment variable > config file > default.

use anyhow::{Context, Result, bail};
use keakit::Client;
use keakit::config::{ENV_PASSWORD, ENV_USERNAME};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("keactl"))
}

/// Contents of the config file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Default control agent host
    pub hostname: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
    /// HTTP proxy URL
    pub proxy: Option<String>,
    /// Configuration backend type
    pub remote: Option<String>,
    /// One of error, warn, info, debug, trace
    pub log_level: Option<String>,
}

impl FileConfig {
    /// Load the config file.
    ///
    /// An explicit path must exist; the default path is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref()),
            None => {
                let path = config_dir()?.join("config.toml");
                if !path.exists() {
                    log::debug!("No config file at {}", path.display());
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }
}

/// Effective settings after merging flags, environment and file.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub hostname: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Option<Duration>,
    pub proxy: Option<String>,
    pub remote: Option<String>,
    pub log_level: Option<log::LevelFilter>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Settings {
    /// Merge sources. `host_flag` already carries the environment fallback
    /// (clap reads `KEA_HOSTNAME`); credentials come from `env` before the file.
    pub fn resolve(
        host_flag: Option<String>,
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let log_level = match file.log_level.as_deref() {
            Some(level) => Some(
                log::LevelFilter::from_str(level)
                    .map_err(|_| anyhow::anyhow!("Invalid log_level `{level}` in config"))?,
            ),
            None => None,
        };

        Ok(Self {
            hostname: non_empty(host_flag).or(non_empty(file.hostname)),
            username: non_empty(env(ENV_USERNAME)).or(non_empty(file.username)),
            password: non_empty(env(ENV_PASSWORD)).or(non_empty(file.password)),
            timeout: file.timeout_secs.map(Duration::from_secs),
            proxy: non_empty(file.proxy),
            remote: non_empty(file.remote),
            log_level,
        })
    }

    /// Default target host
    pub fn host(&self) -> Result<&str> {
        match self.hostname.as_deref() {
            Some(host) => Ok(host),
            None => bail!("No Kea host configured: pass --host, set KEA_HOSTNAME, or set hostname in the config file"),
        }
    }

    /// Build a client from these settings
    pub fn client(&self) -> Result<Client> {
        let mut builder = Client::builder();
        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            builder = builder.auth(username, password);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(proxy) = &self.proxy {
            builder = builder.proxy(proxy);
        }
        if let Some(remote) = &self.remote {
            builder = builder.remote(remote);
        }
        builder.build().context("Could not create Kea client")
    }
}
