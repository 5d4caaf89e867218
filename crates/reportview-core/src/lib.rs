//! reportview-core - client library for the analysis results service.
//!
//! The server optionally requires a session. [`Authenticator`] discovers
//! whether it does, logs in and out, and hands out service clients bound to
//! the resulting [`SessionToken`]. Every service client is a thin typed layer
//! over [`api::Client`], which attaches the token, classifies failures and
//! reassembles paged list results.

pub mod api;
pub mod auth;
pub mod config;

pub use api::{Client, ClientError, ErrorCode, PagePlacement};
pub use auth::{AuthHandshake, Authenticator, Credentials, SessionState, SessionToken};
pub use config::Config;
