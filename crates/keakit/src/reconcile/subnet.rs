//! Subnet reconciliation.

use super::{
    Lifecycle, OptionValue, options_converged, require, require_host, same_trimmed,
    same_trimmed_all, trimmed_all,
};
use crate::Client;
use crate::error::{Error, OptionalExt, Result};
use crate::normalize::{parse_ipv4, parse_prefix, subnet_id_from_prefix};
use crate::types::{Pool, Relay, Subnet4, Subnet4Spec, UserContext};
use serde::{Deserialize, Serialize};

/// Declared or observed subnet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubnetState {
    /// Subnet ID; computed on create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    /// CIDR prefix.
    pub subnet: String,
    /// Pool ranges.
    #[serde(default)]
    pub pools: Vec<String>,
    /// Relay agent addresses.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relay: Vec<String>,
    /// Option values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub option_data: Vec<OptionValue>,
    /// User metadata.
    #[serde(default, skip_serializing_if = "UserContext::is_empty")]
    pub user_context: UserContext,
}

impl SubnetState {
    /// Check required fields and address syntax.
    pub fn validate(&self) -> Result<()> {
        require("subnet", &self.subnet)?;
        parse_prefix(&self.subnet)?;
        if self.pools.iter().all(|p| p.trim().is_empty()) {
            return Err(Error::validation("pools", "at least one pool is required"));
        }
        for address in &self.relay {
            parse_ipv4("relay", address)?;
        }
        for option in &self.option_data {
            option.validate()?;
        }
        Ok(())
    }

    /// Whether the observed subnet matches this declaration.
    ///
    /// The ID is ignored since it is derived.
    #[must_use]
    pub fn converged_with(&self, observed: &Self) -> bool {
        same_trimmed(&self.subnet, &observed.subnet)
            && same_trimmed_all(&self.pools, &observed.pools)
            && same_trimmed_all(&self.relay, &observed.relay)
            && options_converged(&self.option_data, &observed.option_data)
            && self.user_context == observed.user_context
    }

    fn to_spec(&self) -> Result<Subnet4Spec> {
        Ok(Subnet4Spec {
            id: subnet_id_from_prefix(&self.subnet)?,
            subnet: self.subnet.trim().to_string(),
            shared_network_name: None,
            pools: trimmed_all(&self.pools).into_iter().map(Pool::new).collect(),
            option_data: self.option_data.iter().map(Into::into).collect(),
            relay: Relay {
                ip_addresses: trimmed_all(&self.relay),
            },
            user_context: self.user_context.clone(),
        })
    }
}

impl From<Subnet4> for SubnetState {
    fn from(subnet: Subnet4) -> Self {
        Self {
            id: Some(subnet.id),
            subnet: subnet.subnet,
            pools: subnet.pools.into_iter().map(|p| p.pool).collect(),
            relay: subnet.relay.ip_addresses,
            option_data: subnet.option_data.into_iter().map(Into::into).collect(),
            user_context: subnet.user_context,
        }
    }
}

/// Drives subnets on one host. Keyed by CIDR prefix.
#[derive(Debug)]
pub struct SubnetLifecycle<'a> {
    client: &'a Client,
    host: String,
}

impl<'a> SubnetLifecycle<'a> {
    /// Bind to a client and target host.
    pub fn new(client: &'a Client, host: &str) -> Result<Self> {
        Ok(Self {
            client,
            host: require_host(host)?,
        })
    }

    fn set(&self, desired: &SubnetState) -> Result<SubnetState> {
        desired.validate()?;
        let spec = desired.to_spec()?;
        log::debug!("setting subnet {} (id {}) on {}", spec.subnet, spec.id, self.host);

        let mut summaries = self.client.remote_subnet4_set(&self.host, vec![spec])?;
        if summaries.len() != 1 {
            return Err(Error::decode(
                "remote-subnet4-set result",
                format!("expected 1 subnet, server returned {}", summaries.len()),
            ));
        }
        let summary = summaries.remove(0);

        let mut observed = desired.clone();
        observed.id = Some(summary.id);
        if !summary.subnet.is_empty() {
            observed.subnet = summary.subnet;
        }
        Ok(observed)
    }
}

impl Lifecycle for SubnetLifecycle<'_> {
    type Desired = SubnetState;
    type Key = String;
    type Observed = SubnetState;

    fn create(&self, desired: &SubnetState) -> Result<SubnetState> {
        self.set(desired)
    }

    fn read(&self, prefix: &String) -> Result<Option<SubnetState>> {
        require("subnet", prefix)?;
        let subnet = self
            .client
            .remote_subnet4_get_by_prefix(&self.host, prefix.trim())
            .found()?;
        Ok(subnet.map(SubnetState::from))
    }

    fn update(&self, desired: &SubnetState) -> Result<SubnetState> {
        self.set(desired)
    }

    fn delete(&self, prefix: &String) -> Result<()> {
        require("subnet", prefix)?;
        match self
            .client
            .remote_subnet4_del_by_prefix(&self.host, prefix.trim())
            .found()?
        {
            Some(count) => log::debug!("deleted {count} subnet(s) {prefix} on {}", self.host),
            None => log::debug!("subnet {prefix} already absent on {}", self.host),
        }
        Ok(())
    }

    fn import(&self, id: &str) -> Result<Option<SubnetState>> {
        let net = parse_prefix(id)?;
        self.read(&net.to_string())
    }
}
