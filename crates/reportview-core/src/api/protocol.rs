//! Request/response envelopes for calls carried over HTTP.
//!
//! A call is a JSON object naming the remote operation, a sequence id and the
//! positional arguments. The reply echoes the sequence id and carries either
//! a `result` or a structured `error`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{ClientError, ErrorCode};

#[derive(Debug, Serialize)]
pub struct RequestEnvelope<'a> {
    pub method: &'a str,
    pub seqid: i32,
    pub args: &'a [Value],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestFailure {
    #[serde(rename = "errorCode")]
    pub error_code: ErrorCode,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct ReplyEnvelope {
    seqid: i32,
    // Distinguishes `"result": null` (void success) from a missing field.
    #[serde(default, deserialize_with = "present")]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RequestFailure>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

pub fn encode_request(method: &str, seqid: i32, args: &[Value]) -> Result<Vec<u8>, ClientError> {
    serde_json::to_vec(&RequestEnvelope { method, seqid, args })
        .map_err(|e| ClientError::Protocol(format!("Failed to encode call to {}: {}", method, e)))
}

/// Decode a reply body for the call with the given sequence id.
///
/// Returns `Ok(None)` when the body is not an envelope at all so the caller
/// can decide how to report it (an HTTP error page, typically).
pub fn decode_reply(
    method: &str,
    seqid: i32,
    body: &[u8],
) -> Option<Result<Value, ClientError>> {
    let reply: ReplyEnvelope = serde_json::from_slice(body).ok()?;

    if reply.seqid != seqid {
        return Some(Err(ClientError::Protocol(format!(
            "{}: sequence id mismatch (sent {}, received {})",
            method, seqid, reply.seqid
        ))));
    }

    Some(match (reply.error, reply.result) {
        (Some(failure), _) => Err(ClientError::RequestFailed {
            code: failure.error_code,
            message: failure.message,
        }),
        (None, Some(result)) => Ok(result),
        (None, None) => Err(ClientError::Protocol(format!(
            "{}: reply carries neither a result nor an error",
            method
        ))),
    })
}

// ============================================================================
// Tests
// ============================================================================
