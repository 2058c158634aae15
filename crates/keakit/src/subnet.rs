//! Subnet commands of the configuration backend.

use crate::command::{Command, ListArgs, SubnetId, SubnetLookup, SubnetPrefix, SubnetSetArgs};
use crate::error::{Error, Result};
use crate::normalize::subnet_id_from_prefix;
use crate::types::{Subnet4, Subnet4Spec, Subnet4Summary, null_as_default};
use crate::Client;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Subnets<T> {
    #[serde(default, deserialize_with = "null_as_default")]
    subnets: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
struct Count {
    #[serde(default)]
    count: u64,
}

impl Client {
    /// List subnet summaries on all servers.
    pub fn remote_subnet4_list(&self, host: &str) -> Result<Vec<Subnet4Summary>> {
        let command = Command::RemoteSubnet4List(ListArgs::new(self.remote()));
        let payload: Subnets<Subnet4Summary> = self.call(host, command)?;
        Ok(payload.subnets)
    }

    /// Fetch one subnet by CIDR prefix.
    ///
    /// Fails with a not-found error when nothing matches.
    pub fn remote_subnet4_get_by_prefix(&self, host: &str, prefix: &str) -> Result<Subnet4> {
        let command = Command::RemoteSubnet4GetByPrefix(SubnetLookup::new(
            self.remote(),
            SubnetPrefix {
                subnet: prefix.to_string(),
            },
        ));
        first_subnet(self.call(host, command)?, "remote-subnet4-get-by-prefix", prefix)
    }

    /// Fetch one subnet by ID.
    pub fn remote_subnet4_get_by_id(&self, host: &str, id: u32) -> Result<Subnet4> {
        let command =
            Command::RemoteSubnet4GetById(SubnetLookup::new(self.remote(), SubnetId { id }));
        first_subnet(
            self.call(host, command)?,
            "remote-subnet4-get-by-id",
            &id.to_string(),
        )
    }

    /// Create or replace subnets.
    ///
    /// Every ID is derived from its prefix before sending; caller-supplied
    /// IDs are overwritten.
    pub fn remote_subnet4_set(
        &self,
        host: &str,
        subnets: Vec<Subnet4Spec>,
    ) -> Result<Vec<Subnet4Summary>> {
        let subnets = subnets
            .into_iter()
            .map(|mut spec| {
                spec.id = subnet_id_from_prefix(&spec.subnet)?;
                Ok(spec)
            })
            .collect::<Result<Vec<_>>>()?;

        let command = Command::RemoteSubnet4Set(SubnetSetArgs::new(self.remote(), subnets));
        let payload: Subnets<Subnet4Summary> = self.call(host, command)?;
        Ok(payload.subnets)
    }

    /// Delete a subnet by prefix, returning the number deleted.
    pub fn remote_subnet4_del_by_prefix(&self, host: &str, prefix: &str) -> Result<u64> {
        let command = Command::RemoteSubnet4DelByPrefix(SubnetLookup::new(
            self.remote(),
            SubnetPrefix {
                subnet: prefix.to_string(),
            },
        ));
        let payload: Count = self.call(host, command)?;
        Ok(payload.count)
    }

    /// Delete a subnet by ID, returning the number deleted.
    pub fn remote_subnet4_del_by_id(&self, host: &str, id: u32) -> Result<u64> {
        let command =
            Command::RemoteSubnet4DelById(SubnetLookup::new(self.remote(), SubnetId { id }));
        let payload: Count = self.call(host, command)?;
        Ok(payload.count)
    }
}

fn first_subnet(payload: Subnets<Subnet4>, command: &str, key: &str) -> Result<Subnet4> {
    payload
        .subnets
        .into_iter()
        .next()
        .ok_or_else(|| Error::not_found(command, format!("subnet {key} not found")))
}

#[cfg(test)]
mod tests {
    use crate::testing::mock_client;
    use crate::types::Pool;
    use crate::{OptionalExt, ResultCode};
    use serde_json::json;

    #[test]
    fn test_list() {
        let (client, mock) = mock_client();
        mock.respond(
            0,
            "2 IPv4 subnet(s) found.",
            json!({ "count": 2, "subnets": [
                { "id": 10000, "subnet": "10.0.0.0/8", "metadata": { "server-tags": ["all"] } },
                { "id": 1921682250, "subnet": "192.168.225.0/24", "shared-network-name": "lab" }
            ]}),
        );

        let subnets = client.remote_subnet4_list("kea").unwrap();
        assert_eq!(subnets.len(), 2);
        assert_eq!(subnets[1].shared_network_name.as_deref(), Some("lab"));
        assert_eq!(
            mock.sent_bodies()[0]["arguments"],
            json!({ "remote": { "type": "postgresql" }, "server-tags": ["all"] })
        );
    }

    #[test]
    fn test_list_not_found_is_tagged() {
        let (client, mock) = mock_client();
        mock.respond(3, "0 IPv4 subnet(s) found.", json!({ "count": 0, "subnets": [] }));
        let err = client.remote_subnet4_list("kea").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_get_by_id() {
        let (client, mock) = mock_client();
        mock.respond(
            0,
            "IPv4 subnet 10000 found.",
            json!({ "count": 1, "subnets": [{ "id": 10000, "subnet": "10.0.0.0/8" }] }),
        );
        let subnet = client.remote_subnet4_get_by_id("kea", 10000).unwrap();
        assert_eq!(subnet.subnet, "10.0.0.0/8");
        assert_eq!(
            mock.sent_bodies()[0]["arguments"]["subnets"],
            json!([{ "id": 10000 }])
        );
    }

    #[test]
    fn test_get_by_prefix_absent() {
        let (client, mock) = mock_client();
        mock.respond(3, "IPv4 subnet 10.1.0.0/16 not found.", json!({ "count": 0 }));

        let subnet = client
            .remote_subnet4_get_by_prefix("kea", "10.1.0.0/16")
            .found()
            .unwrap();
        assert!(subnet.is_none());
    }

    #[test]
    fn test_get_by_prefix_empty_success_is_not_found() {
        let (client, mock) = mock_client();
        mock.respond(0, "", json!({ "subnets": [] }));
        let err = client
            .remote_subnet4_get_by_prefix("kea", "10.1.0.0/16")
            .unwrap_err();
        assert_eq!(err.result_code(), Some(ResultCode::NotFound));
    }

    #[test]
    fn test_set_recomputes_id() {
        let (client, mock) = mock_client();
        mock.respond(
            0,
            "IPv4 subnet successfully set.",
            json!({ "subnets": [{ "id": 10000, "subnet": "10.0.0.0/8" }] }),
        );

        let spec = crate::Subnet4Spec {
            id: 42,
            subnet: "10.0.0.0/8".to_string(),
            pools: vec![Pool::new("10.0.0.10-10.0.0.20")],
            ..Default::default()
        };
        let result = client.remote_subnet4_set("kea", vec![spec]).unwrap();
        assert_eq!(result[0].id, 10000);
        assert_eq!(mock.sent_bodies()[0]["arguments"]["subnets"][0]["id"], 10000);
    }

    #[test]
    fn test_set_rejects_bad_prefix_without_sending() {
        let (client, mock) = mock_client();
        let spec = crate::Subnet4Spec {
            subnet: "lab-network".to_string(),
            ..Default::default()
        };
        assert!(client.remote_subnet4_set("kea", vec![spec]).unwrap_err().is_validation());
        assert!(mock.requests().is_empty());
    }

    #[test]
    fn test_delete_returns_count() {
        let (client, mock) = mock_client();
        mock.respond(0, "1 IPv4 subnet(s) deleted.", json!({ "count": 1 }));
        mock.respond(0, "1 IPv4 subnet(s) deleted.", json!({ "count": 1 }));

        assert_eq!(client.remote_subnet4_del_by_prefix("kea", "10.0.0.0/8").unwrap(), 1);
        assert_eq!(client.remote_subnet4_del_by_id("kea", 10000).unwrap(), 1);
        assert_eq!(
            mock.sent_commands(),
            vec!["remote-subnet4-del-by-prefix", "remote-subnet4-del-by-id"]
        );
    }
}
