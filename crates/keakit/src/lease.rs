//! IPv4 lease commands. Leases are read and deleted, never created.

use crate::Client;
use crate::command::{Command, HostnameArg, HwAddressArg, IpAddressArg, LeaseSubnets};
use crate::error::Result;
use crate::normalize::{normalize_mac, parse_ipv4};
use crate::types::{Lease4, null_as_default};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct Leases {
    #[serde(default, deserialize_with = "null_as_default")]
    leases: Vec<Lease4>,
}

fn ip_arg(ip_address: &str) -> Result<IpAddressArg> {
    Ok(IpAddressArg {
        ip_address: parse_ipv4("ip-address", ip_address)?.to_string(),
    })
}

impl Client {
    /// List leases, optionally restricted to some subnets.
    pub fn lease4_get_all(&self, host: &str, subnet_ids: Option<&[u32]>) -> Result<Vec<Lease4>> {
        let filter = subnet_ids.map(|ids| LeaseSubnets {
            subnets: ids.to_vec(),
        });
        let payload: Leases = self.call(host, Command::Lease4GetAll(filter))?;
        Ok(payload.leases)
    }

    /// Fetch the lease for an address.
    pub fn lease4_get(&self, host: &str, ip_address: &str) -> Result<Lease4> {
        self.call(host, Command::Lease4Get(ip_arg(ip_address)?))
    }

    /// Leases held by a client hostname.
    pub fn lease4_get_by_hostname(&self, host: &str, hostname: &str) -> Result<Vec<Lease4>> {
        let command = Command::Lease4GetByHostname(HostnameArg {
            hostname: hostname.to_string(),
        });
        let payload: Leases = self.call(host, command)?;
        Ok(payload.leases)
    }

    /// Leases held by a hardware address.
    pub fn lease4_get_by_hw_address(&self, host: &str, hw_address: &str) -> Result<Vec<Lease4>> {
        let command = Command::Lease4GetByHwAddress(HwAddressArg {
            hw_address: normalize_mac("hw-address", hw_address)?,
        });
        let payload: Leases = self.call(host, command)?;
        Ok(payload.leases)
    }

    /// Delete the lease for an address, returning the server's message.
    pub fn lease4_del(&self, host: &str, ip_address: &str) -> Result<String> {
        let response = self.execute(host, Command::Lease4Del(ip_arg(ip_address)?))?;
        Ok(response.text)
    }
}
