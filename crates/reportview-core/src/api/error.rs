use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure classes the service reports inside a well-formed reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    General,
    #[serde(rename = "IOERROR")]
    IoError,
    Database,
    AuthDenied,
    Unauthorized,
    /// A code this client does not know about yet.
    #[serde(other)]
    Unknown,
}

impl ErrorCode {
    /// Human readable summary used when logging a failed request.
    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::General => "Request failed",
            ErrorCode::IoError => "Server reported I/O error",
            ErrorCode::Database => "Database error on server",
            ErrorCode::AuthDenied => "Authentication denied",
            ErrorCode::Unauthorized => "Unauthorized to access",
            ErrorCode::Unknown => "API call error",
        }
    }

    fn wire_name(self) -> &'static str {
        match self {
            ErrorCode::General => "GENERAL",
            ErrorCode::IoError => "IOERROR",
            ErrorCode::Database => "DATABASE",
            ErrorCode::AuthDenied => "AUTH_DENIED",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    /// The server understood the call and refused it.
    #[error("{code}: {message}")]
    RequestFailed { code: ErrorCode, message: String },

    /// The server could not be reached or the connection dropped mid-call.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The transport could not be opened or was used while closed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The reply could not be decoded as an RPC response.
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("No response from server for {method}")]
    NoResponse { method: String },

    #[error(
        "Page at offset {offset} of {method} could not be fetched \
         ({fetched} items already received)"
    )]
    IncompletePage {
        method: String,
        offset: usize,
        fetched: usize,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ClientError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// A non-RPC reply, such as the bare HTTP error page a privileged
    /// endpoint sends to a caller without a live session.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        ClientError::Protocol(format!("HTTP {}: {}", status, Self::truncate_body(body)))
    }

    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ClientError::RequestFailed { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_auth_denied(&self) -> bool {
        self.code() == Some(ErrorCode::AuthDenied)
    }

    /// Soft failures are reported and turned into an absent result by the façade.
    pub fn is_connection(&self) -> bool {
        matches!(self, ClientError::Connection(_))
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, ClientError::Protocol(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() || err.is_body() {
            ClientError::Connection(err.to_string())
        } else if err.is_decode() {
            ClientError::Protocol(err.to_string())
        } else if err.is_builder() {
            ClientError::Transport(err.to_string())
        } else {
            ClientError::Connection(err.to_string())
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
