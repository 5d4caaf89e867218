//! RPC client module for the analysis results service.
//!
//! This module provides the generic [`Client`] façade, the [`Transport`]
//! seam it calls through, an HTTP implementation of that seam and typed
//! wrappers for the results and product endpoints.
//!
//! Calls carry the session token as a cookie. List operations are paged on
//! the server and reassembled by [`Client::fetch_all`].

pub mod client;
pub mod error;
pub mod http;
pub mod paging;
pub mod protocol;
pub mod services;
pub mod transport;

pub use client::{Batch, Client};
pub use error::{ClientError, ErrorCode};
pub use http::{HttpConnector, HttpTransport};
pub use paging::{paged_operation, PagePlacement, DEFAULT_MAX_QUERY_SIZE};
pub use services::{ProductClient, ViewerClient};
pub use transport::{Connector, Transport};
