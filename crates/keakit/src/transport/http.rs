//! HTTP transport backed by `ureq`.
//!
//! # TLS
//!
//! Certificate verification is disabled. Control agents are commonly exposed
//! with self-signed or internal certificates, and this client accepts them.
//! Basic-auth credentials therefore travel over a channel that is encrypted
//! but not authenticated; run it only on networks where that is acceptable.

use super::{HttpRequest, Transport};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use ureq::Agent;
use ureq::tls::TlsConfig;

/// Blocking HTTP transport with a pooled agent.
pub struct HttpTransport {
    agent: Agent,
}

impl HttpTransport {
    /// Build the agent from the client configuration.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            agent: Agent::new_with_config(agent_config(config)?),
        })
    }
}

/// Agent settings. Without an explicit proxy the `*_PROXY` environment
/// variables still apply.
fn agent_config(config: &ClientConfig) -> Result<ureq::config::Config> {
    let mut builder = Agent::config_builder()
        .tls_config(TlsConfig::builder().disable_verification(true).build())
        .timeout_global(config.timeout);

    if let Some(url) = &config.proxy {
        let proxy = ureq::Proxy::new(url)
            .map_err(|e| Error::Config(format!("invalid proxy URL `{url}`: {e}")))?;
        builder = builder.proxy(Some(proxy));
    }

    Ok(builder.build())
}

impl Transport for HttpTransport {
    fn post(&self, request: &HttpRequest) -> Result<String> {
        let mut builder = self.agent.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        for (key, value) in &request.query {
            builder = builder.query(key.as_str(), value.as_str());
        }

        let mut response = builder.send(request.body.as_str())?;
        log::debug!("POST {} -> HTTP {}", request.url, response.status());

        Ok(response.body_mut().read_to_string()?)
    }
}
