//! Declarative manifest (`keactl.toml`).
//!
//! ```toml
//! [[option_defs]]
//! name = "boot-config"
//! code = 222
//! type = "string"
//!
//! [[subnets]]
//! server = "kea2.example.com"   # optional, defaults to the configured host
//! subnet = "192.168.225.0/24"
//! pools = ["192.168.225.50-192.168.225.150"]
//!
//! [[reservations]]
//! subnet_id = 1921682250
//! hostname = "printer"
//! ip_address = "192.168.225.20"
//! hw_address = "b8:27:eb:9c:ae:b7"
//! ```
//!
//! The target host key is `server` because reservations already use
//! `hostname` for the name handed to the client.

use anyhow::{Context, Result, bail};
use keakit::reconcile::{OptionDefState, ReservationState, SubnetState};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// A declared entity plus the host it lives on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry<T> {
    /// Control agent host; falls back to the configured default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(flatten)]
    pub state: T,
}

impl<T> Entry<T> {
    pub fn new(state: T) -> Self {
        Self {
            server: None,
            state,
        }
    }

    /// Target host for this entry
    pub fn host<'a>(&'a self, default: Option<&'a str>) -> Result<&'a str> {
        match self.server.as_deref().or(default) {
            Some(host) if !host.trim().is_empty() => Ok(host),
            _ => bail!("No server for entry and no default Kea host configured"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub option_defs: Vec<Entry<OptionDefState>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subnets: Vec<Entry<SubnetState>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reservations: Vec<Entry<ReservationState>>,
}

impl Manifest {
    /// Load and validate a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        let path = shellexpand::tilde(&path.to_string_lossy()).into_owned();
        let content =
            fs::read_to_string(&path).with_context(|| format!("Could not read manifest {path}"))?;
        let manifest = Self::parse(&content).with_context(|| format!("Invalid manifest {path}"))?;
        Ok(manifest)
    }

    /// Parse and validate manifest text
    pub fn parse(content: &str) -> Result<Self> {
        let manifest: Self = toml::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Check every entry and reject duplicate keys on the same host
    pub fn validate(&self) -> Result<()> {
        for (i, entry) in self.option_defs.iter().enumerate() {
            entry
                .state
                .validate()
                .with_context(|| format!("option_defs[{i}] ({})", entry.state.name))?;
        }
        for (i, entry) in self.subnets.iter().enumerate() {
            entry
                .state
                .validate()
                .with_context(|| format!("subnets[{i}] ({})", entry.state.subnet))?;
        }
        for (i, entry) in self.reservations.iter().enumerate() {
            entry
                .state
                .validate()
                .with_context(|| format!("reservations[{i}] ({})", entry.state.ip_address))?;
        }

        self.check_duplicates(None)
    }

    /// Reject two entries that resolve to the same entity on the same host.
    ///
    /// Entries without a `server` resolve to `default_host`, so a duplicate
    /// may only show up once the default is known.
    pub fn check_duplicates(&self, default_host: Option<&str>) -> Result<()> {
        let mut seen = HashSet::new();
        let host_of = |server: &Option<String>| {
            server
                .as_deref()
                .or(default_host)
                .map(|host| host.trim().to_string())
        };

        for (i, entry) in self.option_defs.iter().enumerate() {
            let key = entry.state.key();
            if !seen.insert(("option_def", host_of(&entry.server), format!("{}/{}", key.space, key.code))) {
                bail!("option_defs[{i}]: duplicate definition {}/{}", key.space, key.code);
            }
        }

        for (i, entry) in self.subnets.iter().enumerate() {
            let id = keakit::subnet_id_from_prefix(&entry.state.subnet)
                .with_context(|| format!("subnets[{i}] ({})", entry.state.subnet))?;
            if !seen.insert(("subnet", host_of(&entry.server), id.to_string())) {
                bail!(
                    "subnets[{i}]: {} maps to subnet ID {id}, which is already declared",
                    entry.state.subnet.trim()
                );
            }
        }

        for (i, entry) in self.reservations.iter().enumerate() {
            let key = entry.state.key();
            if !seen.insert((
                "reservation",
                host_of(&entry.server),
                format!("{}/{}", key.subnet_id, key.ip_address),
            )) {
                bail!("reservations[{i}]: duplicate reservation {}", key.ip_address);
            }
        }

        Ok(())
    }

    /// Total number of declared entities
    pub fn len(&self) -> usize {
        self.option_defs.len() + self.subnets.len() + self.reservations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Could not render manifest")
    }
}
