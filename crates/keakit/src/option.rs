//! Subnet-scoped option commands.

use crate::Client;
use crate::command::{Command, SubnetId, SubnetOptionArgs};
use crate::error::Result;
use crate::types::{OptionRef, null_as_default};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct Options {
    #[serde(default, deserialize_with = "null_as_default")]
    options: Vec<OptionRef>,
}

impl Client {
    /// Set options on a subnet, returning the options echoed by the server.
    pub fn remote_option4_subnet_set(
        &self,
        host: &str,
        subnet_id: u32,
        options: Vec<OptionRef>,
    ) -> Result<Vec<OptionRef>> {
        let command = Command::RemoteOption4SubnetSet(self.subnet_option_args(subnet_id, options));
        let payload: Options = self.call(host, command)?;
        Ok(payload.options)
    }

    /// Delete options from a subnet by code.
    pub fn remote_option4_subnet_del(
        &self,
        host: &str,
        subnet_id: u32,
        codes: &[u16],
    ) -> Result<Vec<OptionRef>> {
        let options = codes
            .iter()
            .map(|&code| OptionRef { code, data: None })
            .collect();
        let command = Command::RemoteOption4SubnetDel(self.subnet_option_args(subnet_id, options));
        let payload: Options = self.call(host, command)?;
        Ok(payload.options)
    }

    fn subnet_option_args(&self, subnet_id: u32, options: Vec<OptionRef>) -> SubnetOptionArgs {
        SubnetOptionArgs {
            remote: self.remote(),
            subnets: vec![SubnetId { id: subnet_id }],
            options,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::OptionRef;
    use crate::testing::mock_client;
    use serde_json::json;

    #[test]
    fn test_set_options() {
        let (client, mock) = mock_client();
        mock.respond(
            0,
            "DHCPv4 option successfully set.",
            json!({ "options": [{ "code": 6, "data": "1.1.1.1" }] }),
        );

        let echoed = client
            .remote_option4_subnet_set(
                "kea",
                10000,
                vec![OptionRef {
                    code: 6,
                    data: Some("1.1.1.1".to_string()),
                }],
            )
            .unwrap();
        assert_eq!(echoed[0].code, 6);
        assert_eq!(
            mock.sent_bodies()[0]["arguments"],
            json!({
                "remote": { "type": "postgresql" },
                "subnets": [{ "id": 10000 }],
                "options": [{ "code": 6, "data": "1.1.1.1" }]
            })
        );
    }

    #[test]
    fn test_delete_options_omits_data() {
        let (client, mock) = mock_client();
        mock.respond(0, "1 DHCPv4 option(s) deleted.", json!({ "count": 1 }));

        let echoed = client.remote_option4_subnet_del("kea", 10000, &[6, 3]).unwrap();
        assert!(echoed.is_empty());
        assert_eq!(
            mock.sent_bodies()[0]["arguments"]["options"],
            json!([{ "code": 6 }, { "code": 3 }])
        );
        assert_eq!(mock.sent_commands(), vec!["remote-option4-subnet-del"]);
    }
}
