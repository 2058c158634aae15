//! High-availability status.

use crate::Client;
use crate::command::Command;
use crate::error::Result;
use crate::types::Heartbeat;

impl Client {
    /// Current HA heartbeat of the server.
    pub fn ha_heartbeat(&self, host: &str) -> Result<Heartbeat> {
        self.call(host, Command::HaHeartbeat)
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::mock_client;
    use serde_json::json;

    #[test]
    fn test_heartbeat() {
        let (client, mock) = mock_client();
        mock.respond(
            0,
            "HA peer status returned.",
            json!({
                "date-time": "Tue, 07 Jan 2025 10:00:00 GMT",
                "scopes": ["server1"],
                "state": "hot-standby",
                "unsent-update-count": 0
            }),
        );

        let hb = client.ha_heartbeat("kea").unwrap();
        assert_eq!(hb.state, "hot-standby");
        assert_eq!(hb.scopes, vec!["server1"]);
        assert_eq!(
            mock.sent_bodies()[0],
            json!({ "command": "ha-heartbeat", "service": ["dhcp4"] })
        );
    }

    #[test]
    fn test_heartbeat_unsupported() {
        let (client, mock) = mock_client();
        mock.respond(2, "'ha-heartbeat' command not supported.", serde_json::Value::Null);
        let err = client.ha_heartbeat("kea").unwrap_err();
        assert_eq!(err.result_code(), Some(crate::ResultCode::Unsupported));
    }
}
