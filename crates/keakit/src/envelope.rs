//! Request and response envelopes of the control-agent protocol.
//!
//! Every response is HTTP 200 with a body like:
//!
//! ```json
//! [ { "result": 0, "text": "1 IPv4 subnet(s) found.", "arguments": { ... } } ]
//! ```
//!
//! [`parse`] unwraps the single element and turns a non-zero `result` into
//! [`Error::Command`]. [`Response::decode`] then maps `arguments` onto the
//! typed payload of the command.

use crate::error::{Error, ResultCode, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Service every command in this crate targets.
pub const SERVICE_DHCP4: &str = "dhcp4";

/// Body of a control-agent request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request {
    /// Command name, e.g. `remote-subnet4-set`.
    pub command: String,
    /// Target services; omitted when empty.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub service: Vec<String>,
    /// Command arguments; omitted when the command takes none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
}

/// One element of a control-agent response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Response {
    /// Raw result code.
    pub result: i64,
    /// Server message.
    #[serde(default)]
    pub text: String,
    /// Command-specific payload.
    #[serde(default)]
    pub arguments: Option<Value>,
}

impl Response {
    /// The result code as a tag.
    #[must_use]
    pub fn code(&self) -> ResultCode {
        ResultCode::from_code(self.result)
    }

    /// Decode `arguments` into `T`.
    ///
    /// A missing or `null` payload yields `T::default()`.
    pub fn decode<T: DeserializeOwned + Default>(&self, command: &str) -> Result<T> {
        match &self.arguments {
            None | Some(Value::Null) => Ok(T::default()),
            Some(value) => T::deserialize(value)
                .map_err(|e| Error::decode(format!("`{command}` arguments"), e)),
        }
    }
}

/// Parse a raw response body for `command`.
///
/// Fails on an empty or malformed array, and on any non-zero result code.
pub fn parse(command: &str, body: &str) -> Result<Response> {
    if body.trim().is_empty() {
        return Err(Error::decode("response envelope", "empty body"));
    }

    let mut responses: Vec<Response> =
        serde_json::from_str(body).map_err(|e| Error::decode("response envelope", e))?;
    if responses.is_empty() {
        return Err(Error::decode(
            "response envelope",
            "response array contains no result",
        ));
    }
    if responses.len() > 1 {
        log::debug!(
            "{command}: {} results in response, using the first",
            responses.len()
        );
    }
    let response = responses.swap_remove(0);

    let code = response.code();
    log::trace!("{command}: result {code}: {}", response.text);
    if code.is_success() {
        Ok(response)
    } else {
        Err(Error::Command {
            command: command.to_string(),
            code,
            text: response.text,
        })
    }
}
