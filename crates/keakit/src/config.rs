//! Client configuration.
//!
//! A [`ClientConfig`] is resolved once by [`ClientBuilder`] and is immutable
//! afterwards. Credentials come from [`ClientBuilder::auth`] or, when that is
//! not called, from the `KEA_USERNAME` / `KEA_PASSWORD` environment variables.

use crate::error::{Error, Result};
use crate::transport::{HttpTransport, Transport};
use crate::Client;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt;
use std::time::Duration;

/// Environment variable holding the control-agent username.
pub const ENV_USERNAME: &str = "KEA_USERNAME";

/// Environment variable holding the control-agent password.
pub const ENV_PASSWORD: &str = "KEA_PASSWORD";

/// Configuration backend used when none is configured.
pub const DEFAULT_REMOTE: &str = "postgresql";

/// HTTP basic-auth credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Create credentials from a username and password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// The username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn basic_auth_header(&self) -> String {
        let token = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {token}")
    }

    fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Resolved, immutable client settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Basic-auth credentials sent with every request.
    pub credentials: Credentials,
    /// Global request timeout. `None` leaves the transport default.
    pub timeout: Option<Duration>,
    /// Optional HTTP(S) proxy URL.
    pub proxy: Option<String>,
    /// Configuration-backend type sent as `remote.type`.
    pub remote: String,
}

/// Builder for [`Client`].
///
/// # Example
///
/// ```no_run
/// use keakit::Client;
/// use std::time::Duration;
///
/// let client = Client::builder()
///     .auth("admin", "secret")
///     .timeout(Duration::from_secs(10))
///     .remote("mysql")
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    credentials: Option<Credentials>,
    timeout: Option<Duration>,
    proxy: Option<String>,
    remote: Option<String>,
}

impl ClientBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use explicit credentials instead of the environment.
    pub fn auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::new(username, password));
        self
    }

    /// Set the global request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Route requests through a proxy.
    pub fn proxy(mut self, url: impl Into<String>) -> Self {
        self.proxy = Some(url.into());
        self
    }

    /// Set the configuration-backend type (defaults to `postgresql`).
    pub fn remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = Some(remote.into());
        self
    }

    /// Resolve the configuration, looking up missing credentials with `env`.
    pub fn resolve(self, env: impl Fn(&str) -> Option<String>) -> Result<ClientConfig> {
        let credentials = match self.credentials {
            Some(credentials) => credentials,
            None => Credentials::new(
                env(ENV_USERNAME).unwrap_or_default(),
                env(ENV_PASSWORD).unwrap_or_default(),
            ),
        };
        if !credentials.is_complete() {
            return Err(Error::Config(format!(
                "missing credentials: call auth() or set {ENV_USERNAME}/{ENV_PASSWORD}"
            )));
        }

        let remote = self
            .remote
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REMOTE.to_string());

        Ok(ClientConfig {
            credentials,
            timeout: self.timeout,
            proxy: self.proxy.filter(|p| !p.trim().is_empty()),
            remote,
        })
    }

    /// Build a client backed by the HTTP transport.
    pub fn build(self) -> Result<Client> {
        let config = self.resolve(|key| std::env::var(key).ok())?;
        let transport = HttpTransport::new(&config)?;
        Ok(Client::with_transport(config, Box::new(transport)))
    }

    /// Build a client over a caller-supplied transport.
    pub fn build_with_transport(self, transport: Box<dyn Transport>) -> Result<Client> {
        let config = self.resolve(|key| std::env::var(key).ok())?;
        Ok(Client::with_transport(config, transport))
    }
}
