//! Host reservation commands.

use crate::Client;
use crate::command::{Command, ReservationArgs, ReservationKey, SubnetIdArg};
use crate::error::{Error, Result};
use crate::normalize::{normalize_mac, parse_ipv4};
use crate::types::{Reservation, null_as_default};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct Hosts {
    #[serde(default, deserialize_with = "null_as_default")]
    hosts: Vec<Reservation>,
}

/// Validate the address and canonicalize the hardware address in place.
fn prepare(mut reservation: Reservation) -> Result<Reservation> {
    parse_ipv4("ip-address", &reservation.ip_address)?;
    reservation.hw_address = normalize_mac("hw-address", &reservation.hw_address)?;
    Ok(reservation)
}

fn key(subnet_id: u32, ip_address: &str) -> Result<ReservationKey> {
    let ip = parse_ipv4("ip-address", ip_address)?;
    Ok(ReservationKey {
        subnet_id,
        ip_address: ip.to_string(),
    })
}

impl Client {
    /// Add a reservation.
    ///
    /// The IP and MAC are validated and the MAC normalized before sending.
    pub fn reservation_add(&self, host: &str, reservation: Reservation) -> Result<()> {
        let reservation = prepare(reservation)?;
        self.execute(host, Command::ReservationAdd(ReservationArgs { reservation }))?;
        Ok(())
    }

    /// Replace an existing reservation.
    pub fn reservation_update(&self, host: &str, reservation: Reservation) -> Result<()> {
        let reservation = prepare(reservation)?;
        self.execute(
            host,
            Command::ReservationUpdate(ReservationArgs { reservation }),
        )?;
        Ok(())
    }

    /// Fetch a reservation by subnet and address.
    pub fn reservation_get(&self, host: &str, subnet_id: u32, ip_address: &str) -> Result<Reservation> {
        let command = Command::ReservationGet(key(subnet_id, ip_address)?);
        let reservation: Reservation = self.call(host, command)?;
        if reservation.ip_address.is_empty() && reservation.hw_address.is_empty() {
            return Err(Error::not_found(
                "reservation-get",
                format!("reservation {ip_address} in subnet {subnet_id} not found"),
            ));
        }
        Ok(reservation)
    }

    /// List reservations in a subnet.
    pub fn reservation_get_all(&self, host: &str, subnet_id: u32) -> Result<Vec<Reservation>> {
        let command = Command::ReservationGetAll(SubnetIdArg { subnet_id });
        let payload: Hosts = self.call(host, command)?;
        Ok(payload.hosts)
    }

    /// Delete a reservation by subnet and address.
    pub fn reservation_del(&self, host: &str, subnet_id: u32, ip_address: &str) -> Result<()> {
        let command = Command::ReservationDel(key(subnet_id, ip_address)?);
        self.execute(host, command)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OptionalExt;
    use crate::testing::mock_client;
    use serde_json::json;

    fn printer() -> Reservation {
        Reservation {
            hostname: "printer".to_string(),
            ip_address: "192.168.1.5".to_string(),
            hw_address: "B8:27:EB:9C:AE:B7".to_string(),
            subnet_id: 19_216_810,
            ..Reservation::default()
        }
    }

    #[test]
    fn test_add_normalizes_mac() {
        let (client, mock) = mock_client();
        mock.respond(0, "Host added.", serde_json::Value::Null);

        client.reservation_add("kea", printer()).unwrap();

        let body = &mock.sent_bodies()[0];
        assert_eq!(body["command"], "reservation-add");
        assert_eq!(
            body["arguments"]["reservation"],
            json!({
                "hostname": "printer",
                "ip-address": "192.168.1.5",
                "hw-address": "b8:27:eb:9c:ae:b7",
                "subnet-id": 19216810
            })
        );
    }

    #[test]
    fn test_add_rejects_bad_input_without_sending() {
        let (client, mock) = mock_client();

        let bad_ip = Reservation {
            ip_address: "999.1.1.1".to_string(),
            ..printer()
        };
        let err = client.reservation_add("kea", bad_ip).unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "ip-address"));

        let bad_mac = Reservation {
            hw_address: "not-a-mac".to_string(),
            ..printer()
        };
        let err = client.reservation_add("kea", bad_mac).unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "hw-address"));

        assert!(mock.requests().is_empty());
    }

    #[test]
    fn test_update_uses_update_command() {
        let (client, mock) = mock_client();
        mock.respond(0, "Host updated.", serde_json::Value::Null);
        client.reservation_update("kea", printer()).unwrap();
        assert_eq!(mock.sent_commands(), vec!["reservation-update"]);
    }

    #[test]
    fn test_get_and_absent() {
        let (client, mock) = mock_client();
        mock.respond(
            0,
            "Host found.",
            json!({
                "hostname": "printer",
                "ip-address": "192.168.1.5",
                "hw-address": "b8:27:eb:9c:ae:b7",
                "subnet-id": 19216810,
                "next-server": "0.0.0.0"
            }),
        );
        mock.respond(3, "Host not found.", serde_json::Value::Null);

        let found = client.reservation_get("kea", 19_216_810, "192.168.1.5").unwrap();
        assert_eq!(found.hostname, "printer");
        assert_eq!(
            mock.sent_bodies()[0]["arguments"],
            json!({ "subnet-id": 19216810, "ip-address": "192.168.1.5" })
        );

        let absent = client
            .reservation_get("kea", 19_216_810, "192.168.1.6")
            .found()
            .unwrap();
        assert!(absent.is_none());
    }

    #[test]
    fn test_get_all() {
        let (client, mock) = mock_client();
        mock.respond(
            0,
            "1 IPv4 host(s) found.",
            json!({ "hosts": [{ "hostname": "printer", "ip-address": "192.168.1.5", "hw-address": "b8:27:eb:9c:ae:b7", "subnet-id": 19216810 }] }),
        );
        let hosts = client.reservation_get_all("kea", 19_216_810).unwrap();
        assert_eq!(hosts.len(), 1);
        assert_eq!(mock.sent_bodies()[0]["arguments"], json!({ "subnet-id": 19216810 }));
    }

    #[test]
    fn test_delete_validates_ip_only() {
        let (client, mock) = mock_client();
        assert!(client.reservation_del("kea", 1, "").unwrap_err().is_validation());
        assert!(mock.requests().is_empty());

        mock.respond(0, "Host deleted.", serde_json::Value::Null);
        client.reservation_del("kea", 1, "10.0.0.5").unwrap();
        assert_eq!(mock.sent_commands(), vec!["reservation-del"]);
    }

    #[test]
    fn test_delete_absent_is_tagged() {
        let (client, mock) = mock_client();
        mock.respond(3, "Host not deleted (not found).", serde_json::Value::Null);
        let err = client.reservation_del("kea", 1, "10.0.0.5").unwrap_err();
        assert!(err.is_not_found());
    }
}
