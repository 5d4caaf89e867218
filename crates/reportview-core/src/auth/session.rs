use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque session credential issued by a successful login.
///
/// The client never looks inside the token. It is attached to calls as a
/// cookie and persisted, if at all, by the caller.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Reply of the unauthenticated handshake call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthHandshake {
    #[serde(rename = "requiresAuthentication")]
    pub requires_authentication: bool,
    #[serde(rename = "sessionStillActive")]
    pub session_still_active: bool,
}

impl AuthHandshake {
    /// Where a token stands according to this handshake.
    pub fn session_state(&self, token_supplied: bool) -> SessionState {
        match (token_supplied, self.session_still_active) {
            (false, _) => SessionState::Anonymous,
            (true, true) => SessionState::Active,
            (true, false) => SessionState::Inactive,
        }
    }

    /// Whether privileged endpoints will accept calls made with the handshake's token.
    pub fn grants_access(&self) -> bool {
        !self.requires_authentication || self.session_still_active
    }
}

/// Client-side view of a session's lifecycle.
///
/// A destroyed and an expired session look the same from here; both are
/// `Inactive` and never become `Active` again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Active,
    Inactive,
}

// ============================================================================
// Tests
// ============================================================================
