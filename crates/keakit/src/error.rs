//! Error types for Kea control-agent operations.
//!
//! The control agent answers every command with HTTP 200 and reports the
//! outcome as an integer `result` inside the JSON body. That code is carried
//! on [`Error::Command`] as a [`ResultCode`], so callers branch on the tag
//! (see [`Error::is_not_found`]) instead of inspecting message text.

use std::fmt;

/// Result type alias for Kea operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Outcome reported by the control agent in the `result` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    /// 0 - the command has been processed successfully.
    Success,
    /// 1 - a general error or failure occurred while processing the command.
    GeneralFailure,
    /// 2 - the command is not supported by the target service.
    Unsupported,
    /// 3 - the command completed but matched or affected no resources.
    NotFound,
    /// 4 - the command was rejected because it conflicts with server state.
    Conflict,
    /// Any code outside the documented range.
    Other(i64),
}

impl ResultCode {
    /// Map a raw `result` value onto a code.
    #[must_use]
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Success,
            1 => Self::GeneralFailure,
            2 => Self::Unsupported,
            3 => Self::NotFound,
            4 => Self::Conflict,
            other => Self::Other(other),
        }
    }

    /// The raw integer sent on the wire.
    #[must_use]
    pub fn code(&self) -> i64 {
        match self {
            Self::Success => 0,
            Self::GeneralFailure => 1,
            Self::Unsupported => 2,
            Self::NotFound => 3,
            Self::Conflict => 4,
            Self::Other(code) => *code,
        }
    }

    /// Whether this code means the command succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Short human-readable meaning of the code.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::GeneralFailure => "general failure",
            Self::Unsupported => "command unsupported",
            Self::NotFound => "not found",
            Self::Conflict => "conflict with server state",
            Self::Other(_) => "unknown result code",
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.description())
    }
}

/// Categories of errors for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Connection, TLS, timeout or HTTP status failure.
    Network,
    /// The control agent rejected or failed the command.
    Protocol,
    /// The command matched no resources.
    NotFound,
    /// The change conflicts with the server's configuration.
    Conflict,
    /// Input was rejected before any request was sent.
    Validation,
    /// The response did not have the expected shape.
    Decode,
    /// The client could not be constructed.
    Config,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Network connectivity issue",
            Self::Protocol => "Command failed on the server",
            Self::NotFound => "Resource not found",
            Self::Conflict => "Conflicting server configuration",
            Self::Validation => "Invalid input",
            Self::Decode => "Unexpected response format",
            Self::Config => "Client configuration error",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check the hostname, proxy and that the control agent is reachable",
            Self::Protocol => "Check the server logs and that the hook library is loaded",
            Self::NotFound => "Verify the key (prefix, id, code or address) is correct",
            Self::Conflict => "Inspect the existing configuration for overlapping entries",
            Self::Validation => "Fix the offending field and try again",
            Self::Decode => "Check that the control agent version matches this client",
            Self::Config => "Set credentials explicitly or via KEA_USERNAME/KEA_PASSWORD",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur while talking to a Kea control agent.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The HTTP exchange itself failed.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// HTTP status code if the server answered with a non-success status.
        status: Option<u16>,
    },

    /// The request could not be serialized.
    #[error("failed to encode `{command}` request: {message}")]
    Encode {
        /// Command being encoded.
        command: String,
        /// Error message.
        message: String,
    },

    /// The response body did not match the envelope or payload shape.
    #[error("failed to decode {stage}: {message}")]
    Decode {
        /// Which decode step failed (envelope, or the payload of a command).
        stage: String,
        /// Error message.
        message: String,
    },

    /// The control agent returned a non-zero result code.
    #[error("`{command}` returned result {code}: {text}")]
    Command {
        /// Command that was sent.
        command: String,
        /// Result code reported by the server.
        code: ResultCode,
        /// Server-supplied message.
        text: String,
    },

    /// Input failed validation before any request was sent.
    #[error("invalid {field}: {message}")]
    Validation {
        /// Name of the offending field.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// The client could not be configured.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a validation error for a field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a decode error for a stage.
    pub fn decode(stage: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Decode {
            stage: stage.into(),
            message: message.to_string(),
        }
    }

    /// Create a not-found command error, used when a successful response
    /// carries an empty collection where one entity was expected.
    pub fn not_found(command: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Command {
            command: command.into(),
            code: ResultCode::NotFound,
            text: text.into(),
        }
    }

    /// The result code, if this error came from the server.
    #[must_use]
    pub fn result_code(&self) -> Option<ResultCode> {
        match self {
            Self::Command { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether the server reported that nothing matched (result 3).
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.result_code() == Some(ResultCode::NotFound)
    }

    /// Whether this error was raised before any request was sent.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Transport { .. } => ErrorCategory::Network,
            Self::Encode { .. } => ErrorCategory::Validation,
            Self::Decode { .. } => ErrorCategory::Decode,
            Self::Command { code, .. } => match code {
                ResultCode::NotFound => ErrorCategory::NotFound,
                ResultCode::Conflict => ErrorCategory::Conflict,
                _ => ErrorCategory::Protocol,
            },
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Config(_) => ErrorCategory::Config,
        }
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::Transport {
                message: format!("HTTP {code}"),
                status: Some(code),
            },
            other => Self::Transport {
                message: other.to_string(),
                status: None,
            },
        }
    }
}

/// Turns a benign "not found" outcome into absence.
///
/// Read and delete paths use this to treat result code 3 as "no such
/// resource" while every other error still propagates.
pub trait OptionalExt<T> {
    /// Map `Err(not found)` to `Ok(None)` and `Ok(v)` to `Ok(Some(v))`.
    fn found(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for Result<T> {
    fn found(self) -> Result<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }
}
