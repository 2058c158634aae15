//! Host reservation reconciliation.

use super::{
    Lifecycle, OptionValue, options_converged, require, require_host, same_trimmed,
};
use crate::Client;
use crate::error::{Error, OptionalExt, Result};
use crate::normalize::{normalize_mac, parse_ipv4, parse_prefix};
use crate::types::{Reservation, UserContext};
use serde::{Deserialize, Serialize};

/// `next-server` value the server reports when none is set.
const UNSET_NEXT_SERVER: &str = "0.0.0.0";

/// Declared or observed reservation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReservationState {
    /// Subnet the reservation belongs to.
    pub subnet_id: u32,
    /// Reserved hostname handed to the client.
    pub hostname: String,
    /// Reserved address.
    pub ip_address: String,
    /// Client hardware address.
    pub hw_address: String,
    /// Boot file name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub boot_file_name: String,
    /// Next server (siaddr).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_server: Option<String>,
    /// Client identifier.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub client_id: String,
    /// Relay circuit identifier.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub circuit_id: String,
    /// DUID.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub duid: String,
    /// Flexible identifier.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub flex_id: String,
    /// Option values scoped to this host.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub option_data: Vec<OptionValue>,
    /// User metadata.
    #[serde(default, skip_serializing_if = "UserContext::is_empty")]
    pub user_context: UserContext,
}

/// Natural key of a reservation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReservationRef {
    /// Subnet identifier.
    pub subnet_id: u32,
    /// Reserved address.
    pub ip_address: String,
}

impl ReservationState {
    /// Key of this reservation.
    #[must_use]
    pub fn key(&self) -> ReservationRef {
        ReservationRef {
            subnet_id: self.subnet_id,
            ip_address: self.ip_address.trim().to_string(),
        }
    }

    /// Check required fields and address syntax.
    pub fn validate(&self) -> Result<()> {
        if self.subnet_id == 0 {
            return Err(Error::validation("subnet_id", "is required"));
        }
        require("hostname", &self.hostname)?;
        require("ip_address", &self.ip_address)?;
        require("hw_address", &self.hw_address)?;
        parse_ipv4("ip_address", &self.ip_address)?;
        normalize_mac("hw_address", &self.hw_address)?;
        if let Some(next) = &self.next_server {
            parse_ipv4("next_server", next)?;
        }
        for option in &self.option_data {
            option.validate()?;
        }
        Ok(())
    }

    /// Whether the observed reservation matches this declaration.
    #[must_use]
    pub fn converged_with(&self, observed: &Self) -> bool {
        let same_mac = normalize_mac("hw_address", &self.hw_address).ok()
            == normalize_mac("hw_address", &observed.hw_address).ok();
        self.subnet_id == observed.subnet_id
            && same_trimmed(&self.hostname, &observed.hostname)
            && same_trimmed(&self.ip_address, &observed.ip_address)
            && same_mac
            && self.boot_file_name == observed.boot_file_name
            && self.next_server == observed.next_server
            && self.client_id == observed.client_id
            && self.circuit_id == observed.circuit_id
            && self.duid == observed.duid
            && self.flex_id == observed.flex_id
            && options_converged(&self.option_data, &observed.option_data)
            && self.user_context == observed.user_context
    }

    fn to_reservation(&self) -> Reservation {
        Reservation {
            hostname: self.hostname.trim().to_string(),
            ip_address: self.ip_address.trim().to_string(),
            hw_address: self.hw_address.trim().to_string(),
            subnet_id: self.subnet_id,
            boot_file_name: self.boot_file_name.clone(),
            next_server: self.next_server.clone(),
            client_id: self.client_id.clone(),
            circuit_id: self.circuit_id.clone(),
            duid: self.duid.clone(),
            flex_id: self.flex_id.clone(),
            option_data: self.option_data.iter().map(Into::into).collect(),
            user_context: self.user_context.clone(),
        }
    }
}

impl From<Reservation> for ReservationState {
    fn from(r: Reservation) -> Self {
        Self {
            subnet_id: r.subnet_id,
            hostname: r.hostname,
            ip_address: r.ip_address,
            hw_address: r.hw_address,
            boot_file_name: r.boot_file_name,
            next_server: r
                .next_server
                .filter(|n| !n.is_empty() && n != UNSET_NEXT_SERVER),
            client_id: r.client_id,
            circuit_id: r.circuit_id,
            duid: r.duid,
            flex_id: r.flex_id,
            option_data: r.option_data.into_iter().map(Into::into).collect(),
            user_context: r.user_context,
        }
    }
}

/// Drives reservations on one host. Keyed by subnet ID and address.
#[derive(Debug)]
pub struct ReservationLifecycle<'a> {
    client: &'a Client,
    host: String,
}

impl<'a> ReservationLifecycle<'a> {
    /// Bind to a client and target host.
    pub fn new(client: &'a Client, host: &str) -> Result<Self> {
        Ok(Self {
            client,
            host: require_host(host)?,
        })
    }

    /// Find the most specific subnet whose prefix contains `ip`.
    fn subnet_for(&self, ip: &str) -> Result<Option<u32>> {
        let ip = parse_ipv4("ip_address", ip)?;
        let subnets = self.client.remote_subnet4_list(&self.host).found()?;
        Ok(subnets
            .unwrap_or_default()
            .into_iter()
            .filter_map(|s| {
                parse_prefix(&s.subnet)
                    .ok()
                    .filter(|net| net.contains(&ip))
                    .map(|net| (net.prefix_len(), s.id))
            })
            .max_by_key(|(len, _)| *len)
            .map(|(_, id)| id))
    }

    fn observed(&self, desired: &ReservationState) -> ReservationState {
        let mut observed = desired.clone();
        if let Ok(mac) = normalize_mac("hw_address", &desired.hw_address) {
            observed.hw_address = mac;
        }
        observed
    }
}

impl Lifecycle for ReservationLifecycle<'_> {
    type Desired = ReservationState;
    type Key = ReservationRef;
    type Observed = ReservationState;

    fn create(&self, desired: &ReservationState) -> Result<ReservationState> {
        desired.validate()?;
        self.client
            .reservation_add(&self.host, desired.to_reservation())?;
        Ok(self.observed(desired))
    }

    fn read(&self, key: &ReservationRef) -> Result<Option<ReservationState>> {
        require("ip_address", &key.ip_address)?;
        let reservation = self
            .client
            .reservation_get(&self.host, key.subnet_id, &key.ip_address)
            .found()?;
        Ok(reservation.map(ReservationState::from))
    }

    fn update(&self, desired: &ReservationState) -> Result<ReservationState> {
        desired.validate()?;
        self.client
            .reservation_update(&self.host, desired.to_reservation())?;
        Ok(self.observed(desired))
    }

    fn delete(&self, key: &ReservationRef) -> Result<()> {
        require("ip_address", &key.ip_address)?;
        self.client
            .reservation_del(&self.host, key.subnet_id, &key.ip_address)
            .found()?;
        Ok(())
    }

    /// Import by IP address; the owning subnet is looked up by prefix.
    fn import(&self, id: &str) -> Result<Option<ReservationState>> {
        let Some(subnet_id) = self.subnet_for(id)? else {
            log::debug!("no subnet on {} contains {id}", self.host);
            return Ok(None);
        };
        self.read(&ReservationRef {
            subnet_id,
            ip_address: id.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::mock_client;
    use serde_json::json;

    fn printer() -> ReservationState {
        ReservationState {
            subnet_id: 1_921_682_250,
            hostname: "printer".to_string(),
            ip_address: "192.168.225.20".to_string(),
            hw_address: "B8:27:EB:9C:AE:B7".to_string(),
            ..ReservationState::default()
        }
    }

    fn printer_json() -> serde_json::Value {
        json!({
            "subnet-id": 1921682250,
            "hostname": "printer",
            "ip-address": "192.168.225.20",
            "hw-address": "b8:27:eb:9c:ae:b7",
            "next-server": "0.0.0.0",
            "boot-file-name": "",
            "option-data": []
        })
    }

    #[test]
    fn test_validate_required_fields() {
        assert!(printer().validate().is_ok());
        for (state, field) in [
            (ReservationState { subnet_id: 0, ..printer() }, "subnet_id"),
            (ReservationState { hostname: String::new(), ..printer() }, "hostname"),
            (ReservationState { ip_address: "999.1.1.1".into(), ..printer() }, "ip_address"),
            (ReservationState { hw_address: "not-a-mac".into(), ..printer() }, "hw_address"),
        ] {
            match state.validate().unwrap_err() {
                Error::Validation { field: got, .. } => assert_eq!(got, field),
                other => panic!("expected validation error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_create_normalizes_mac() {
        let (client, mock) = mock_client();
        mock.respond(0, "Host added.", json!(null));

        let lifecycle = ReservationLifecycle::new(&client, "kea").unwrap();
        let observed = lifecycle.create(&printer()).unwrap();
        assert_eq!(observed.hw_address, "b8:27:eb:9c:ae:b7");
        assert_eq!(
            mock.sent_bodies()[0]["arguments"]["reservation"]["hw-address"],
            "b8:27:eb:9c:ae:b7"
        );
    }

    #[test]
    fn test_read_normalizes_unset_next_server() {
        let (client, mock) = mock_client();
        mock.respond(0, "Host found.", printer_json());

        let lifecycle = ReservationLifecycle::new(&client, "kea").unwrap();
        let observed = lifecycle.read(&printer().key()).unwrap().unwrap();
        assert_eq!(observed.next_server, None);
        assert!(printer().converged_with(&observed));
    }

    #[test]
    fn test_padded_declaration_converges() {
        let padded = ReservationState {
            hostname: "printer ".to_string(),
            ip_address: " 192.168.225.20".to_string(),
            ..printer()
        };
        padded.validate().unwrap();
        assert!(padded.converged_with(&printer()));
        assert_eq!(padded.key(), printer().key());
    }

    #[test]
    fn test_update_uses_update_command() {
        let (client, mock) = mock_client();
        mock.respond(0, "Host updated.", json!(null));
        let lifecycle = ReservationLifecycle::new(&client, "kea").unwrap();
        lifecycle.update(&printer()).unwrap();
        assert_eq!(mock.sent_commands(), vec!["reservation-update"]);
    }

    #[test]
    fn test_delete_absent_reservation_is_ok() {
        let (client, mock) = mock_client();
        mock.respond(3, "Host not deleted (not found).", json!(null));

        let lifecycle = ReservationLifecycle::new(&client, "kea").unwrap();
        lifecycle.delete(&printer().key()).unwrap();
        assert_eq!(mock.sent_commands(), vec!["reservation-del"]);
    }

    #[test]
    fn test_delete_propagates_conflict() {
        let (client, mock) = mock_client();
        mock.respond(4, "conflict", json!(null));
        let lifecycle = ReservationLifecycle::new(&client, "kea").unwrap();
        assert!(lifecycle.delete(&printer().key()).is_err());
    }

    #[test]
    fn test_import_finds_subnet_by_prefix() {
        let (client, mock) = mock_client();
        mock.respond(
            0,
            "2 IPv4 subnet(s) found.",
            json!({ "subnets": [
                { "id": 10000, "subnet": "10.0.0.0/8" },
                { "id": 1921682250, "subnet": "192.168.225.0/24" }
            ]}),
        );
        mock.respond(0, "Host found.", printer_json());

        let lifecycle = ReservationLifecycle::new(&client, "kea").unwrap();
        let imported = lifecycle.import("192.168.225.20").unwrap().unwrap();
        assert_eq!(imported.subnet_id, 1_921_682_250);
        assert_eq!(
            mock.sent_bodies()[1]["arguments"],
            json!({ "subnet-id": 1921682250, "ip-address": "192.168.225.20" })
        );
    }

    #[test]
    fn test_import_prefers_most_specific_subnet() {
        let (client, mock) = mock_client();
        mock.respond(
            0,
            "3 IPv4 subnet(s) found.",
            json!({ "subnets": [
                { "id": 1921680, "subnet": "192.168.0.0/16" },
                { "id": 1921682250, "subnet": "192.168.225.0/24" },
                { "id": 10000, "subnet": "10.0.0.0/8" }
            ]}),
        );
        mock.respond(0, "Host found.", printer_json());

        let lifecycle = ReservationLifecycle::new(&client, "kea").unwrap();
        lifecycle.import("192.168.225.20").unwrap().unwrap();
        assert_eq!(mock.sent_bodies()[1]["arguments"]["subnet-id"], json!(1921682250));
    }

    #[test]
    fn test_import_without_matching_subnet() {
        let (client, mock) = mock_client();
        mock.respond(0, "", json!({ "subnets": [{ "id": 10000, "subnet": "10.0.0.0/8" }] }));
        let lifecycle = ReservationLifecycle::new(&client, "kea").unwrap();
        assert!(lifecycle.import("172.16.0.5").unwrap().is_none());
        assert_eq!(mock.requests().len(), 1);
    }
}
