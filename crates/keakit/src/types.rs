//! Entity types exchanged with the control agent.
//!
//! Field names follow the wire format (kebab-case). Read types default every
//! field so that partial server answers decode; write types skip empty
//! optional fields so the server applies its own defaults.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Free-form user metadata attached to subnets and reservations.
pub type UserContext = serde_json::Map<String, Value>;

/// Treat an explicit JSON `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// An address pool, e.g. `192.168.1.50-192.168.1.150`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    /// Range or prefix of the pool.
    pub pool: String,
}

impl Pool {
    /// Create a pool from its range string.
    pub fn new(pool: impl Into<String>) -> Self {
        Self { pool: pool.into() }
    }
}

/// Relay agents forwarding into a subnet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relay {
    /// Relay agent addresses.
    #[serde(
        rename = "ip-addresses",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub ip_addresses: Vec<String>,
}

impl Relay {
    /// Whether no relay address is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ip_addresses.is_empty()
    }
}

/// A DHCP option value scoped to a subnet or reservation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OptionData {
    /// Option code; either this or `name` identifies the option.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    /// Option value as text.
    #[serde(default)]
    pub data: String,
    /// Option name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Option space, `dhcp4` when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space: Option<String>,
    /// Send the option even when the client did not request it.
    #[serde(default)]
    pub always_send: bool,
}

/// Server metadata attached to configuration-backend entities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Metadata {
    /// Server tags the entity applies to.
    #[serde(default, deserialize_with = "null_as_default")]
    pub server_tags: Vec<String>,
}

/// Full subnet as returned by the get commands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Subnet4 {
    /// Subnet identifier.
    pub id: u32,
    /// CIDR prefix.
    pub subnet: String,
    /// Shared network the subnet belongs to, if any.
    pub shared_network_name: Option<String>,
    /// Server metadata.
    pub metadata: Metadata,
    /// Dynamic address pools.
    #[serde(deserialize_with = "null_as_default")]
    pub pools: Vec<Pool>,
    /// Relay agents.
    #[serde(deserialize_with = "null_as_default")]
    pub relay: Relay,
    /// Subnet-level options.
    #[serde(deserialize_with = "null_as_default")]
    pub option_data: Vec<OptionData>,
    /// User metadata.
    #[serde(deserialize_with = "null_as_default")]
    pub user_context: UserContext,
    /// DHCPv4-over-DHCPv6 interface.
    #[serde(rename = "4o6-interface")]
    pub four_o6_interface: Option<String>,
    /// DHCPv4-over-DHCPv6 interface id.
    #[serde(rename = "4o6-interface-id")]
    pub four_o6_interface_id: Option<String>,
    /// DHCPv4-over-DHCPv6 subnet.
    #[serde(rename = "4o6-subnet")]
    pub four_o6_subnet: Option<String>,
}

/// Subnet summary returned by list and set commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Subnet4Summary {
    /// Subnet identifier.
    pub id: u32,
    /// CIDR prefix.
    pub subnet: String,
    /// Shared network the subnet belongs to, if any.
    pub shared_network_name: Option<String>,
    /// Server metadata.
    pub metadata: Metadata,
}

/// Subnet sent with `remote-subnet4-set`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Subnet4Spec {
    /// Subnet identifier; recomputed from `subnet` before sending.
    pub id: u32,
    /// CIDR prefix.
    pub subnet: String,
    /// Shared network; sent as `null` when unset.
    pub shared_network_name: Option<String>,
    /// Dynamic address pools.
    pub pools: Vec<Pool>,
    /// Subnet-level options.
    pub option_data: Vec<OptionData>,
    /// Relay agents.
    #[serde(skip_serializing_if = "Relay::is_empty")]
    pub relay: Relay,
    /// User metadata.
    #[serde(skip_serializing_if = "UserContext::is_empty")]
    pub user_context: UserContext,
}

/// Custom option definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct OptionDef4 {
    /// Option name.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Option code.
    pub code: u16,
    /// Value type, e.g. `uint8`, `string`, `record`.
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,
    /// Whether the option carries an array of `kind`.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub array: bool,
    /// Comma-separated field types when `kind` is `record`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub record_types: String,
    /// Option space.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub space: String,
    /// Sub-option space this option encapsulates.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub encapsulate: String,
}

/// Option reference used by the subnet option sub-commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionRef {
    /// Option code.
    #[serde(default)]
    pub code: u16,
    /// Option value; omitted for deletion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// Static host reservation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Reservation {
    /// Reserved hostname.
    pub hostname: String,
    /// Reserved address.
    pub ip_address: String,
    /// Client hardware address.
    pub hw_address: String,
    /// Subnet the reservation belongs to.
    pub subnet_id: u32,
    /// Boot file name.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub boot_file_name: String,
    /// Next server (siaddr).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_server: Option<String>,
    /// Client identifier.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub client_id: String,
    /// Relay circuit identifier.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub circuit_id: String,
    /// DUID.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub duid: String,
    /// Flexible identifier.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub flex_id: String,
    /// Reservation-scoped options.
    #[serde(
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub option_data: Vec<OptionData>,
    /// User metadata.
    #[serde(
        deserialize_with = "null_as_default",
        skip_serializing_if = "UserContext::is_empty"
    )]
    pub user_context: UserContext,
}

/// IPv4 lease reported by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Lease4 {
    /// Leased address.
    pub ip_address: String,
    /// Client hardware address.
    pub hw_address: String,
    /// Client identifier.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub client_id: String,
    /// Client hostname.
    pub hostname: String,
    /// Subnet the lease belongs to.
    pub subnet_id: u32,
    /// Client last transmission time (unix seconds).
    pub cltt: i64,
    /// Valid lifetime in seconds.
    pub valid_lft: u64,
    /// Lease state (0 default, 1 declined, 2 expired-reclaimed).
    pub state: i64,
    /// Forward DNS update performed.
    pub fqdn_fwd: bool,
    /// Reverse DNS update performed.
    pub fqdn_rev: bool,
}

/// High-availability heartbeat snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Heartbeat {
    /// Server time of the snapshot.
    pub date_time: String,
    /// Scopes served by this server.
    #[serde(deserialize_with = "null_as_default")]
    pub scopes: Vec<String>,
    /// HA state, e.g. `load-balancing`.
    pub state: String,
    /// Lease updates not yet sent to the partner.
    pub unsent_update_count: u64,
}
