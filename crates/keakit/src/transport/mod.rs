//! Transport layer for control-agent requests.
//!
//! The [`Transport`] trait sends one prepared POST and returns the raw body.
//! [`HttpTransport`] is the real implementation; [`MockTransport`] replays
//! canned bodies and records requests so protocol and reconciliation code
//! can be tested without a server.
//!
//! # Testing
//!
//! ```
//! use keakit::transport::MockTransport;
//! use keakit::Client;
//! use serde_json::json;
//!
//! let mock = MockTransport::new();
//! mock.respond(0, "1 IPv4 subnet(s) found.", json!({ "subnets": [] }));
//!
//! let client = Client::builder()
//!     .auth("user", "pass")
//!     .build_with_transport(Box::new(mock.clone()))
//!     .unwrap();
//! let subnets = client.remote_subnet4_list("kea.example.com").unwrap();
//!
//! assert!(subnets.is_empty());
//! assert_eq!(mock.sent_commands(), vec!["remote-subnet4-list"]);
//! ```

mod http;

pub use http::HttpTransport;

use crate::error::{Error, Result};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

/// A prepared request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Normalized target URL.
    pub url: String,
    /// Header name/value pairs.
    pub headers: Vec<(String, String)>,
    /// Query parameters.
    pub query: Vec<(String, String)>,
    /// JSON body.
    pub body: String,
}

impl HttpRequest {
    /// Look up a header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Sends prepared requests.
///
/// Implementations hold no per-call state, so a single transport can be
/// shared by concurrent callers.
pub trait Transport: Send + Sync {
    /// POST the request and return the response body.
    fn post(&self, request: &HttpRequest) -> Result<String>;
}

/// Turn a bare hostname into the endpoint URL.
///
/// `kea.example.com` becomes `https://kea.example.com/`. An explicit scheme is
/// kept and a trailing slash is added when missing.
#[must_use]
pub fn normalize_url(host: &str) -> String {
    let host = host.trim();
    let mut url = if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{host}")
    };
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}

#[derive(Debug, Default)]
struct MockState {
    responses: VecDeque<String>,
    requests: Vec<HttpRequest>,
}

/// In-memory transport replaying canned response bodies in order.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Create a mock with no queued responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a raw response body.
    pub fn push_body(&self, body: impl Into<String>) {
        self.state().responses.push_back(body.into());
    }

    /// Queue a single-element response envelope.
    pub fn respond(&self, result: i64, text: &str, arguments: Value) {
        let body = json!([{ "result": result, "text": text, "arguments": arguments }]);
        self.push_body(body.to_string());
    }

    /// Requests sent so far.
    #[must_use]
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state().requests.clone()
    }

    /// Request bodies sent so far, parsed as JSON.
    #[must_use]
    pub fn sent_bodies(&self) -> Vec<Value> {
        self.state()
            .requests
            .iter()
            .filter_map(|r| serde_json::from_str(&r.body).ok())
            .collect()
    }

    /// Command names sent so far.
    #[must_use]
    pub fn sent_commands(&self) -> Vec<String> {
        self.sent_bodies()
            .iter()
            .filter_map(|b| b["command"].as_str().map(ToString::to_string))
            .collect()
    }
}

impl Transport for MockTransport {
    fn post(&self, request: &HttpRequest) -> Result<String> {
        let mut state = self.state();
        state.requests.push(request.clone());
        state.responses.pop_front().ok_or_else(|| Error::Transport {
            message: format!("no mock response queued for {}", request.url),
            status: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("kea.example.com"), "https://kea.example.com/");
        assert_eq!(normalize_url("kea.example.com/"), "https://kea.example.com/");
        assert_eq!(normalize_url("https://kea:8000"), "https://kea:8000/");
        assert_eq!(normalize_url("http://127.0.0.1:8000/"), "http://127.0.0.1:8000/");
    }

    #[test]
    fn test_mock_replays_in_order_and_records() {
        let mock = MockTransport::new();
        mock.push_body("first");
        mock.push_body("second");

        let request = HttpRequest {
            url: "https://kea/".to_string(),
            headers: vec![("Accept".to_string(), "application/json".to_string())],
            query: vec![],
            body: r#"{"command":"ha-heartbeat"}"#.to_string(),
        };
        assert_eq!(mock.post(&request).unwrap(), "first");
        assert_eq!(mock.post(&request).unwrap(), "second");
        assert!(mock.post(&request).is_err());

        assert_eq!(mock.requests().len(), 3);
        assert_eq!(mock.sent_commands(), vec!["ha-heartbeat"; 3]);
        assert_eq!(mock.requests()[0].header("accept"), Some("application/json"));
    }

    #[test]
    fn test_mock_clones_share_state() {
        let mock = MockTransport::new();
        let shared = mock.clone();
        shared.respond(0, "ok", Value::Null);
        assert_eq!(mock.state().responses.len(), 1);
    }
}
