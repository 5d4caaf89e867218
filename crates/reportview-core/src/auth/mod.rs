//! Authentication module for establishing and ending server sessions.
//!
//! This module provides:
//! - `Authenticator`: handshake, login, logout and user lookup
//! - `SessionToken`, `AuthHandshake`, `SessionState`: session model
//! - `Credentials`: a scheme + secret pair for one login attempt
//!
//! Tokens are opaque and held by the caller; nothing here writes them to disk.

pub mod authenticator;
pub mod credentials;
pub mod session;

pub use authenticator::{AuthClient, Authenticator};
pub use credentials::{Credentials, USERNAME_PASSWORD_SCHEME};
pub use session::{AuthHandshake, SessionState, SessionToken};
