//! Option definition reconciliation.

use super::{Lifecycle, require, require_host};
use crate::Client;
use crate::error::{Error, OptionalExt, Result};
use crate::option_def::DEFAULT_SPACE;
use crate::types::OptionDef4;
use serde::{Deserialize, Serialize};

fn default_space() -> String {
    DEFAULT_SPACE.to_string()
}

/// Declared or observed option definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDefState {
    /// Option name.
    pub name: String,
    /// Option code.
    pub code: u16,
    /// Value type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Array of `kind` values.
    #[serde(default)]
    pub array: bool,
    /// Field types for `record` options.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub record_types: String,
    /// Option space.
    #[serde(default = "default_space")]
    pub space: String,
    /// Encapsulated sub-option space.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub encapsulate: String,
}

impl Default for OptionDefState {
    fn default() -> Self {
        Self {
            name: String::new(),
            code: 0,
            kind: String::new(),
            array: false,
            record_types: String::new(),
            space: default_space(),
            encapsulate: String::new(),
        }
    }
}

/// Natural key of an option definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OptionDefKey {
    /// Option space.
    pub space: String,
    /// Option code.
    pub code: u16,
}

impl OptionDefKey {
    /// Parse `CODE` or `SPACE/CODE`.
    pub fn parse(id: &str) -> Result<Self> {
        let (space, code) = match id.trim().split_once('/') {
            Some((space, code)) => (space.trim(), code.trim()),
            None => (DEFAULT_SPACE, id.trim()),
        };
        require("space", space)?;
        let code = code
            .parse::<u16>()
            .map_err(|_| Error::validation("code", format!("`{code}` is not an option code")))?;
        Ok(Self {
            space: space.to_string(),
            code,
        })
    }
}

impl OptionDefState {
    /// Key of this definition.
    #[must_use]
    pub fn key(&self) -> OptionDefKey {
        OptionDefKey {
            space: self.space.clone(),
            code: self.code,
        }
    }

    /// Check required fields.
    pub fn validate(&self) -> Result<()> {
        require("name", &self.name)?;
        require("type", &self.kind)?;
        require("space", &self.space)?;
        if !(1..=254).contains(&self.code) {
            return Err(Error::validation("code", "must be between 1 and 254"));
        }
        if !self.record_types.is_empty() && self.kind != "record" {
            return Err(Error::validation(
                "record_types",
                "only allowed when type is `record`",
            ));
        }
        Ok(())
    }
}

impl From<&OptionDefState> for OptionDef4 {
    fn from(state: &OptionDefState) -> Self {
        Self {
            name: state.name.trim().to_string(),
            code: state.code,
            kind: state.kind.trim().to_string(),
            array: state.array,
            record_types: state.record_types.clone(),
            space: state.space.trim().to_string(),
            encapsulate: state.encapsulate.clone(),
        }
    }
}

impl From<OptionDef4> for OptionDefState {
    fn from(def: OptionDef4) -> Self {
        Self {
            name: def.name,
            code: def.code,
            kind: def.kind,
            array: def.array,
            record_types: def.record_types,
            space: if def.space.is_empty() {
                default_space()
            } else {
                def.space
            },
            encapsulate: def.encapsulate,
        }
    }
}

/// Drives option definitions on one host. Keyed by space and code.
#[derive(Debug)]
pub struct OptionDefLifecycle<'a> {
    client: &'a Client,
    host: String,
}

impl<'a> OptionDefLifecycle<'a> {
    /// Bind to a client and target host.
    pub fn new(client: &'a Client, host: &str) -> Result<Self> {
        Ok(Self {
            client,
            host: require_host(host)?,
        })
    }

    fn set(&self, desired: &OptionDefState) -> Result<OptionDefState> {
        desired.validate()?;
        let def = OptionDef4::from(desired);
        self.client.remote_option_def4_set(&self.host, def.clone())?;
        Ok(OptionDefState::from(def))
    }
}

impl Lifecycle for OptionDefLifecycle<'_> {
    type Desired = OptionDefState;
    type Key = OptionDefKey;
    type Observed = OptionDefState;

    fn create(&self, desired: &OptionDefState) -> Result<OptionDefState> {
        self.set(desired)
    }

    fn read(&self, key: &OptionDefKey) -> Result<Option<OptionDefState>> {
        require("space", &key.space)?;
        let def = self
            .client
            .remote_option_def4_get(&self.host, &key.space, key.code)
            .found()?;
        Ok(def.map(OptionDefState::from))
    }

    fn update(&self, desired: &OptionDefState) -> Result<OptionDefState> {
        self.set(desired)
    }

    fn delete(&self, key: &OptionDefKey) -> Result<()> {
        require("space", &key.space)?;
        self.client
            .remote_option_def4_del(&self.host, &key.space, key.code)
            .found()?;
        Ok(())
    }

    fn import(&self, id: &str) -> Result<Option<OptionDefState>> {
        self.read(&OptionDefKey::parse(id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::mock_client;
    use serde_json::json;

    fn boot_config() -> OptionDefState {
        OptionDefState {
            name: "boot-config".to_string(),
            code: 222,
            kind: "string".to_string(),
            ..OptionDefState::default()
        }
    }

    #[test]
    fn test_key_parse() {
        assert_eq!(
            OptionDefKey::parse("222").unwrap(),
            OptionDefKey {
                space: "dhcp4".to_string(),
                code: 222
            }
        );
        assert_eq!(OptionDefKey::parse("vendor/3").unwrap().space, "vendor");
        assert!(OptionDefKey::parse("abc").is_err());
        assert!(OptionDefKey::parse("/3").is_err());
    }

    #[test]
    fn test_validate() {
        assert!(boot_config().validate().is_ok());

        let missing_type = OptionDefState {
            kind: String::new(),
            ..boot_config()
        };
        assert!(matches!(
            missing_type.validate().unwrap_err(),
            Error::Validation { ref field, .. } if field == "type"
        ));

        let bad_code = OptionDefState {
            code: 255,
            ..boot_config()
        };
        assert!(bad_code.validate().is_err());

        let stray_record = OptionDefState {
            record_types: "uint8, string".to_string(),
            ..boot_config()
        };
        assert!(stray_record.validate().is_err());

        let record = OptionDefState {
            kind: "record".to_string(),
            record_types: "uint8, string".to_string(),
            ..boot_config()
        };
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_create_and_read() {
        let (client, mock) = mock_client();
        mock.respond(0, "DHCPv4 option definition successfully set.", json!({}));
        mock.respond(
            0,
            "found",
            json!({ "option-defs": [{ "name": "boot-config", "code": 222, "type": "string", "space": "dhcp4", "array": false }] }),
        );

        let lifecycle = OptionDefLifecycle::new(&client, "kea").unwrap();
        let created = lifecycle.create(&boot_config()).unwrap();
        assert_eq!(created, boot_config());

        let read = lifecycle.read(&boot_config().key()).unwrap();
        assert_eq!(read, Some(boot_config()));
        assert_eq!(
            mock.sent_commands(),
            vec!["remote-option-def4-set", "remote-option-def4-get"]
        );
    }

    #[test]
    fn test_read_and_delete_absent() {
        let (client, mock) = mock_client();
        mock.respond(3, "not found", json!({ "count": 0 }));
        mock.respond(3, "0 option definition(s) deleted.", json!({ "count": 0 }));

        let lifecycle = OptionDefLifecycle::new(&client, "kea").unwrap();
        assert!(lifecycle.read(&boot_config().key()).unwrap().is_none());
        lifecycle.delete(&boot_config().key()).unwrap();
    }

    #[test]
    fn test_create_escalates_not_found() {
        let (client, mock) = mock_client();
        mock.respond(3, "not found", json!(null));
        let lifecycle = OptionDefLifecycle::new(&client, "kea").unwrap();
        assert!(lifecycle.create(&boot_config()).unwrap_err().is_not_found());
    }

    #[test]
    fn test_import_by_code() {
        let (client, mock) = mock_client();
        mock.respond(
            0,
            "found",
            json!({ "option-defs": [{ "name": "boot-config", "code": 222, "type": "string", "space": "dhcp4" }] }),
        );
        let lifecycle = OptionDefLifecycle::new(&client, "kea").unwrap();
        let imported = lifecycle.import("222").unwrap().unwrap();
        assert_eq!(imported.name, "boot-config");
        assert_eq!(
            mock.sent_bodies()[0]["arguments"]["option-defs"],
            json!([{ "code": 222, "space": "dhcp4" }])
        );
    }
}
