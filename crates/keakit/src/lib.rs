//! # keakit
//!
//! Blocking client for the ISC Kea control agent, focused on the
//! configuration-backend (`cb_cmds`), host (`host_cmds`), lease and HA
//! command sets.
//!
//! This crate provides:
//! - A transport client that POSTs JSON commands to `https://<host>/`
//! - Decoding of the in-body result codes into typed errors
//! - One module per entity: subnets, subnet options, option definitions,
//!   reservations, leases and the HA heartbeat
//! - Subnet ID derivation and address validation
//! - Reconciliation adapters that drive create/read/update/delete/import
//!
//! ## Example
//!
//! ```no_run
//! use keakit::{Client, OptionalExt};
//!
//! // Credentials from KEA_USERNAME / KEA_PASSWORD
//! let client = Client::builder().build()?;
//!
//! for subnet in client.remote_subnet4_list("kea.example.com")? {
//!     println!("{} {}", subnet.id, subnet.subnet);
//! }
//!
//! // A missing subnet is `None`, not an error
//! let subnet = client
//!     .remote_subnet4_get_by_prefix("kea.example.com", "10.0.0.0/8")
//!     .found()?;
//! assert!(subnet.is_none());
//! # Ok::<(), keakit::Error>(())
//! ```
//!
//! ## Result codes
//!
//! | Code | Meaning | Surfaced as |
//! |------|---------|-------------|
//! | 0 | success | `Ok` |
//! | 1 | general failure | [`Error::Command`] |
//! | 2 | unsupported | [`Error::Command`] |
//! | 3 | nothing matched | [`Error::Command`], [`Error::is_not_found`] is true |
//! | 4 | conflict | [`Error::Command`] |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod command;
pub mod config;
pub mod envelope;
pub mod error;
pub mod ha;
pub mod lease;
pub mod normalize;
pub mod option;
pub mod option_def;
pub mod reconcile;
pub mod reservation;
pub mod subnet;
pub mod transport;
pub mod types;

pub use command::{Command, Remote};
pub use config::{ClientBuilder, ClientConfig, Credentials};
pub use envelope::{Request, Response};
pub use error::{Error, ErrorCategory, OptionalExt, Result, ResultCode};
pub use normalize::{normalize_mac, parse_ipv4, parse_prefix, subnet_id_from_prefix};
pub use transport::{HttpTransport, MockTransport, Transport};
pub use types::{
    Heartbeat, Lease4, Metadata, OptionData, OptionDef4, OptionRef, Pool, Relay, Reservation,
    Subnet4, Subnet4Spec, Subnet4Summary, UserContext,
};

use serde::de::DeserializeOwned;
use transport::{HttpRequest, normalize_url};

/// Client for one or more Kea control agents.
///
/// The configuration is fixed at construction; the target host is passed to
/// every call, so one client can manage several servers. `Client` is `Send`
/// and `Sync` and can be shared across threads.
pub struct Client {
    config: ClientConfig,
    transport: Box<dyn Transport>,
}

impl Client {
    /// Start building a client.
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client from a resolved configuration and a transport.
    #[must_use]
    pub fn with_transport(config: ClientConfig, transport: Box<dyn Transport>) -> Self {
        Self { config, transport }
    }

    /// The client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Backend selector for configuration-backend commands.
    pub(crate) fn remote(&self) -> Remote {
        Remote::new(self.config.remote.as_str())
    }

    /// Send a command and return the successful response envelope.
    pub fn execute(&self, host: &str, command: Command) -> Result<Response> {
        self.execute_with_query(host, command, &[])
    }

    /// Send a command with extra query parameters.
    pub fn execute_with_query(
        &self,
        host: &str,
        command: Command,
        query: &[(&str, &str)],
    ) -> Result<Response> {
        let name = command.name();
        let request = command.into_request()?;
        let http = self.build_request(host, &request, query)?;

        log::debug!(
            "{name}: POST {} query={:?}",
            http.url,
            http.query
        );
        let body = self.transport.post(&http)?;
        envelope::parse(name, &body)
    }

    /// Send a command and decode its `arguments` into `T`.
    pub fn call<T: DeserializeOwned + Default>(&self, host: &str, command: Command) -> Result<T> {
        let name = command.name();
        self.execute(host, command)?.decode(name)
    }

    fn build_request(
        &self,
        host: &str,
        request: &Request,
        query: &[(&str, &str)],
    ) -> Result<HttpRequest> {
        if host.trim().is_empty() {
            return Err(Error::validation("hostname", "must not be empty"));
        }
        let body = serde_json::to_string(request).map_err(|e| Error::Encode {
            command: request.command.clone(),
            message: e.to_string(),
        })?;

        Ok(HttpRequest {
            url: normalize_url(host),
            headers: vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Accept".to_string(), "application/json".to_string()),
                (
                    "Authorization".to_string(),
                    self.config.credentials.basic_auth_header(),
                ),
            ],
            query: query
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            body,
        })
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::mock_client;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_headers_and_url() {
        let (client, mock) = mock_client();
        mock.respond(0, "ok", json!({}));

        client.execute("kea.example.com", Command::HaHeartbeat).unwrap();

        let request = &mock.requests()[0];
        assert_eq!(request.url, "https://kea.example.com/");
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.header("accept"), Some("application/json"));
        assert_eq!(
            request.header("authorization"),
            Some("Basic YWRtaW46c2VjcmV0")
        );
        assert!(request.query.is_empty());
    }

    #[test]
    fn test_query_parameters_are_forwarded() {
        let (client, mock) = mock_client();
        mock.respond(0, "ok", json!({}));

        client
            .execute_with_query("kea", Command::HaHeartbeat, &[("trace", "1")])
            .unwrap();
        assert_eq!(
            mock.requests()[0].query,
            vec![("trace".to_string(), "1".to_string())]
        );
    }

    #[test]
    fn test_empty_host_is_rejected_before_sending() {
        let (client, mock) = mock_client();
        let err = client.execute(" ", Command::HaHeartbeat).unwrap_err();
        assert!(err.is_validation());
        assert!(mock.requests().is_empty());
    }

    #[test]
    fn test_transport_error_propagates() {
        let (client, _mock) = mock_client();
        let err = client.execute("kea", Command::HaHeartbeat).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Network);
    }

    #[test]
    fn test_remote_comes_from_config() {
        let client = Client::builder()
            .auth("a", "b")
            .remote("mysql")
            .build_with_transport(Box::new(MockTransport::new()))
            .unwrap();
        assert_eq!(client.remote(), Remote::new("mysql"));
    }

    #[test]
    fn test_client_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Client>();
    }
}
