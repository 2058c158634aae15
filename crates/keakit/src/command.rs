//! Typed control-agent commands.
//!
//! Each [`Command`] variant carries the argument payload of one command, so
//! the shape of every request is checked at compile time. Free-form JSON is
//! only used for user-context maps.

use crate::envelope::{Request, SERVICE_DHCP4};
use crate::error::{Error, Result};
use crate::types::{OptionDef4, OptionRef, Reservation, Subnet4Spec};
use serde::Serialize;

/// Server tag selecting every server sharing the configuration backend.
pub const ALL_SERVERS: &str = "all";

/// Configuration-backend selector (`"remote": {"type": "postgresql"}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Remote {
    /// Backend type.
    #[serde(rename = "type")]
    pub kind: String,
}

impl Remote {
    /// Select a backend by type.
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into() }
    }
}

fn all_servers() -> Vec<String> {
    vec![ALL_SERVERS.to_string()]
}

/// Arguments of list-style commands.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ListArgs {
    /// Backend selector.
    pub remote: Remote,
    /// Server tags.
    pub server_tags: Vec<String>,
}

impl ListArgs {
    /// List across all servers.
    pub fn new(remote: Remote) -> Self {
        Self {
            remote,
            server_tags: all_servers(),
        }
    }
}

/// Subnet addressed by prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubnetPrefix {
    /// CIDR prefix.
    pub subnet: String,
}

/// Subnet addressed by ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubnetId {
    /// Subnet identifier.
    pub id: u32,
}

/// Arguments of the subnet get and delete commands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubnetLookup<K> {
    /// Backend selector.
    pub remote: Remote,
    /// Exactly one key.
    pub subnets: Vec<K>,
}

impl<K> SubnetLookup<K> {
    /// Look up a single subnet.
    pub fn new(remote: Remote, key: K) -> Self {
        Self {
            remote,
            subnets: vec![key],
        }
    }
}

/// Arguments of `remote-subnet4-set`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SubnetSetArgs {
    /// Backend selector.
    pub remote: Remote,
    /// Server tags.
    pub server_tags: Vec<String>,
    /// Subnets to upsert.
    pub subnets: Vec<Subnet4Spec>,
}

impl SubnetSetArgs {
    /// Upsert subnets on all servers.
    pub fn new(remote: Remote, subnets: Vec<Subnet4Spec>) -> Self {
        Self {
            remote,
            server_tags: all_servers(),
            subnets,
        }
    }
}

/// Arguments of the subnet option sub-commands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubnetOptionArgs {
    /// Backend selector.
    pub remote: Remote,
    /// Target subnet.
    pub subnets: Vec<SubnetId>,
    /// Options to set or delete.
    pub options: Vec<OptionRef>,
}

/// Arguments of the option definition commands.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct OptionDefArgs {
    /// Backend selector.
    pub remote: Remote,
    /// Server tags.
    pub server_tags: Vec<String>,
    /// Definitions (full for set, space and code only otherwise).
    pub option_defs: Vec<OptionDef4>,
}

impl OptionDefArgs {
    /// Address one definition on all servers.
    pub fn new(remote: Remote, def: OptionDef4) -> Self {
        Self {
            remote,
            server_tags: all_servers(),
            option_defs: vec![def],
        }
    }
}

/// Arguments of `reservation-add` and `reservation-update`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReservationArgs {
    /// The reservation.
    pub reservation: Reservation,
}

/// Reservation addressed by subnet and address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReservationKey {
    /// Subnet identifier.
    pub subnet_id: u32,
    /// Reserved address.
    pub ip_address: String,
}

/// Arguments carrying only a subnet ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SubnetIdArg {
    /// Subnet identifier.
    pub subnet_id: u32,
}

/// Subnet filter of `lease4-get-all`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaseSubnets {
    /// Subnet identifiers.
    pub subnets: Vec<u32>,
}

/// Arguments carrying an IP address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct IpAddressArg {
    /// IPv4 address.
    pub ip_address: String,
}

/// Arguments carrying a client hostname.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostnameArg {
    /// Client hostname.
    pub hostname: String,
}

/// Arguments carrying a hardware address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct HwAddressArg {
    /// Normalized MAC address.
    pub hw_address: String,
}

/// A control-agent command with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `remote-subnet4-list`
    RemoteSubnet4List(ListArgs),
    /// `remote-subnet4-get-by-prefix`
    RemoteSubnet4GetByPrefix(SubnetLookup<SubnetPrefix>),
    /// `remote-subnet4-get-by-id`
    RemoteSubnet4GetById(SubnetLookup<SubnetId>),
    /// `remote-subnet4-set`
    RemoteSubnet4Set(SubnetSetArgs),
    /// `remote-subnet4-del-by-prefix`
    RemoteSubnet4DelByPrefix(SubnetLookup<SubnetPrefix>),
    /// `remote-subnet4-del-by-id`
    RemoteSubnet4DelById(SubnetLookup<SubnetId>),
    /// `remote-option4-subnet-set`
    RemoteOption4SubnetSet(SubnetOptionArgs),
    /// `remote-option4-subnet-del`
    RemoteOption4SubnetDel(SubnetOptionArgs),
    /// `remote-option-def4-set`
    RemoteOptionDef4Set(OptionDefArgs),
    /// `remote-option-def4-get`
    RemoteOptionDef4Get(OptionDefArgs),
    /// `remote-option-def4-del`
    RemoteOptionDef4Del(OptionDefArgs),
    /// `reservation-add`
    ReservationAdd(ReservationArgs),
    /// `reservation-update`
    ReservationUpdate(ReservationArgs),
    /// `reservation-get`
    ReservationGet(ReservationKey),
    /// `reservation-get-all`
    ReservationGetAll(SubnetIdArg),
    /// `reservation-del`
    ReservationDel(ReservationKey),
    /// `lease4-get-all`; `None` lists every subnet.
    Lease4GetAll(Option<LeaseSubnets>),
    /// `lease4-get`
    Lease4Get(IpAddressArg),
    /// `lease4-get-by-hostname`
    Lease4GetByHostname(HostnameArg),
    /// `lease4-get-by-hw-address`
    Lease4GetByHwAddress(HwAddressArg),
    /// `lease4-del`
    Lease4Del(IpAddressArg),
    /// `ha-heartbeat`
    HaHeartbeat,
}

impl Command {
    /// Wire name of the command.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::RemoteSubnet4List(_) => "remote-subnet4-list",
            Self::RemoteSubnet4GetByPrefix(_) => "remote-subnet4-get-by-prefix",
            Self::RemoteSubnet4GetById(_) => "remote-subnet4-get-by-id",
            Self::RemoteSubnet4Set(_) => "remote-subnet4-set",
            Self::RemoteSubnet4DelByPrefix(_) => "remote-subnet4-del-by-prefix",
            Self::RemoteSubnet4DelById(_) => "remote-subnet4-del-by-id",
            Self::RemoteOption4SubnetSet(_) => "remote-option4-subnet-set",
            Self::RemoteOption4SubnetDel(_) => "remote-option4-subnet-del",
            Self::RemoteOptionDef4Set(_) => "remote-option-def4-set",
            Self::RemoteOptionDef4Get(_) => "remote-option-def4-get",
            Self::RemoteOptionDef4Del(_) => "remote-option-def4-del",
            Self::ReservationAdd(_) => "reservation-add",
            Self::ReservationUpdate(_) => "reservation-update",
            Self::ReservationGet(_) => "reservation-get",
            Self::ReservationGetAll(_) => "reservation-get-all",
            Self::ReservationDel(_) => "reservation-del",
            Self::Lease4GetAll(_) => "lease4-get-all",
            Self::Lease4Get(_) => "lease4-get",
            Self::Lease4GetByHostname(_) => "lease4-get-by-hostname",
            Self::Lease4GetByHwAddress(_) => "lease4-get-by-hw-address",
            Self::Lease4Del(_) => "lease4-del",
            Self::HaHeartbeat => "ha-heartbeat",
        }
    }

    /// Build the request envelope for this command.
    pub fn into_request(self) -> Result<Request> {
        let name = self.name();
        let arguments = match &self {
            Self::RemoteSubnet4List(args) => encode(name, args)?,
            Self::RemoteSubnet4GetByPrefix(args) | Self::RemoteSubnet4DelByPrefix(args) => {
                encode(name, args)?
            }
            Self::RemoteSubnet4GetById(args) | Self::RemoteSubnet4DelById(args) => {
                encode(name, args)?
            }
            Self::RemoteSubnet4Set(args) => encode(name, args)?,
            Self::RemoteOption4SubnetSet(args) | Self::RemoteOption4SubnetDel(args) => {
                encode(name, args)?
            }
            Self::RemoteOptionDef4Set(args)
            | Self::RemoteOptionDef4Get(args)
            | Self::RemoteOptionDef4Del(args) => encode(name, args)?,
            Self::ReservationAdd(args) | Self::ReservationUpdate(args) => encode(name, args)?,
            Self::ReservationGet(args) | Self::ReservationDel(args) => encode(name, args)?,
            Self::ReservationGetAll(args) => encode(name, args)?,
            Self::Lease4GetAll(Some(args)) => encode(name, args)?,
            Self::Lease4GetAll(None) | Self::HaHeartbeat => None,
            Self::Lease4Get(args) | Self::Lease4Del(args) => encode(name, args)?,
            Self::Lease4GetByHostname(args) => encode(name, args)?,
            Self::Lease4GetByHwAddress(args) => encode(name, args)?,
        };

        Ok(Request {
            command: name.to_string(),
            service: vec![SERVICE_DHCP4.to_string()],
            arguments,
        })
    }
}

fn encode<T: Serialize>(command: &str, args: &T) -> Result<Option<serde_json::Value>> {
    serde_json::to_value(args)
        .map(Some)
        .map_err(|e| Error::Encode {
            command: command.to_string(),
            message: e.to_string(),
        })
}
