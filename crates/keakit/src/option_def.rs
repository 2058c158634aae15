//! Option definition commands of the configuration backend.

use crate::Client;
use crate::command::{Command, OptionDefArgs};
use crate::error::{Error, Result};
use crate::types::{OptionDef4, null_as_default};
use serde::Deserialize;

/// Option space used when none is given.
pub const DEFAULT_SPACE: &str = "dhcp4";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct OptionDefs {
    #[serde(default, deserialize_with = "null_as_default")]
    option_defs: Vec<OptionDef4>,
}

#[derive(Debug, Default, Deserialize)]
struct Count {
    #[serde(default)]
    count: u64,
}

fn key(space: &str, code: u16) -> OptionDef4 {
    OptionDef4 {
        code,
        space: space.to_string(),
        ..OptionDef4::default()
    }
}

impl Client {
    /// Create or replace an option definition on all servers.
    pub fn remote_option_def4_set(&self, host: &str, def: OptionDef4) -> Result<()> {
        let command = Command::RemoteOptionDef4Set(OptionDefArgs::new(self.remote(), def));
        self.execute(host, command)?;
        Ok(())
    }

    /// Fetch an option definition by space and code.
    ///
    /// Fails with a not-found error when nothing matches.
    pub fn remote_option_def4_get(&self, host: &str, space: &str, code: u16) -> Result<OptionDef4> {
        let command =
            Command::RemoteOptionDef4Get(OptionDefArgs::new(self.remote(), key(space, code)));
        let payload: OptionDefs = self.call(host, command)?;
        payload.option_defs.into_iter().next().ok_or_else(|| {
            Error::not_found(
                "remote-option-def4-get",
                format!("option definition {space}/{code} not found"),
            )
        })
    }

    /// Delete an option definition, returning the number deleted.
    pub fn remote_option_def4_del(&self, host: &str, space: &str, code: u16) -> Result<u64> {
        let command =
            Command::RemoteOptionDef4Del(OptionDefArgs::new(self.remote(), key(space, code)));
        let payload: Count = self.call(host, command)?;
        Ok(payload.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OptionalExt;
    use crate::testing::mock_client;
    use serde_json::json;

    #[test]
    fn test_set_sends_full_definition() {
        let (client, mock) = mock_client();
        mock.respond(0, "DHCPv4 option definition successfully set.", json!({}));

        let def = OptionDef4 {
            name: "boot-config".to_string(),
            code: 222,
            kind: "string".to_string(),
            space: DEFAULT_SPACE.to_string(),
            ..OptionDef4::default()
        };
        client.remote_option_def4_set("kea", def).unwrap();

        assert_eq!(
            mock.sent_bodies()[0]["arguments"],
            json!({
                "remote": { "type": "postgresql" },
                "server-tags": ["all"],
                "option-defs": [{ "name": "boot-config", "code": 222, "type": "string", "space": "dhcp4" }]
            })
        );
    }

    #[test]
    fn test_get_found() {
        let (client, mock) = mock_client();
        mock.respond(
            0,
            "DHCPv4 option definition 222 in 'dhcp4' found.",
            json!({ "count": 1, "option-defs": [
                { "name": "boot-config", "code": 222, "type": "string", "array": false, "record-types": "", "space": "dhcp4", "encapsulate": "" }
            ]}),
        );
        let def = client.remote_option_def4_get("kea", "dhcp4", 222).unwrap();
        assert_eq!(def.name, "boot-config");
        assert_eq!(def.kind, "string");
        assert_eq!(
            mock.sent_bodies()[0]["arguments"]["option-defs"],
            json!([{ "code": 222, "space": "dhcp4" }])
        );
    }

    #[test]
    fn test_get_absent() {
        let (client, mock) = mock_client();
        mock.respond(3, "DHCPv4 option definition 222 in 'dhcp4' not found.", json!({ "count": 0 }));
        mock.respond(0, "", json!({ "count": 0, "option-defs": [] }));

        for _ in 0..2 {
            let def = client.remote_option_def4_get("kea", "dhcp4", 222).found().unwrap();
            assert!(def.is_none());
        }
    }

    #[test]
    fn test_delete_count() {
        let (client, mock) = mock_client();
        mock.respond(0, "1 DHCPv4 option definition(s) deleted.", json!({ "count": 1 }));
        assert_eq!(client.remote_option_def4_del("kea", "dhcp4", 222).unwrap(), 1);
    }
}
