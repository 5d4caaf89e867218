//! HTTP transport for the results service.
//!
//! Every call is a single POST to the endpoint URL. The `reqwest::Client`
//! exists only while the transport is open.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::error::ClientError;
use super::protocol::{decode_reply, encode_request};
use super::transport::{Connector, Transport};
use crate::config::Config;

pub struct HttpTransport {
    url: String,
    timeout: Duration,
    headers: HeaderMap,
    client: Option<Client>,
    seqid: i32,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
            headers: HeaderMap::new(),
            client: None,
            seqid: 0,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn next_seqid(&mut self) -> i32 {
        let seqid = self.seqid;
        self.seqid = self.seqid.wrapping_add(1);
        seqid
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn open(&mut self) -> Result<(), ClientError> {
        if self.client.is_some() {
            return Ok(());
        }
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ClientError::Transport(format!("Failed to open {}: {}", self.url, e)))?;
        self.client = Some(client);
        Ok(())
    }

    fn close(&mut self) {
        self.client = None;
    }

    fn is_open(&self) -> bool {
        self.client.is_some()
    }

    fn set_header(&mut self, name: &str, value: &str) -> Result<(), ClientError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| {
                ClientError::InvalidArgument(format!("Invalid header name {:?}: {}", name, e))
            })?;
        let mut value = HeaderValue::from_str(value)
            .map_err(|e| {
                ClientError::InvalidArgument(format!("Invalid value for header {}: {}", name, e))
            })?;
        value.set_sensitive(true);
        self.headers.insert(name, value);
        Ok(())
    }

    async fn call(&mut self, method: &str, args: &[Value]) -> Result<Value, ClientError> {
        let seqid = self.next_seqid();
        let body = encode_request(method, seqid, args)?;

        let client = self
            .client
            .as_ref()
            .ok_or_else(|| {
                ClientError::Transport(format!("Transport to {} is not open", self.url))
            })?;

        let response = client
            .post(&self.url)
            .headers(self.headers.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        // Body read failures are lost connections; decoding happens below.
        let bytes = response.bytes().await.map_err(|e| {
            ClientError::Connection(format!("{}: reading reply from {}: {}", method, self.url, e))
        })?;
        debug!(
            url = %self.url,
            method = method,
            status = %status,
            bytes = bytes.len(),
            "Reply received"
        );

        match decode_reply(method, seqid, &bytes) {
            Some(Ok(_)) if !status.is_success() => {
                Err(ClientError::from_status(status, &String::from_utf8_lossy(&bytes)))
            }
            Some(reply) => reply,
            None if status.is_success() => Err(ClientError::Protocol(format!(
                "{}: response from {} is not a valid reply",
                method, self.url
            ))),
            None => Err(ClientError::from_status(status, &String::from_utf8_lossy(&bytes))),
        }
    }
}

/// Creates [`HttpTransport`]s for endpoint paths under one base URL.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    base_url: String,
    timeout: Duration,
}

impl HttpConnector {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.base_url(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Connector for HttpConnector {
    type Transport = HttpTransport;

    fn connect(&self, path: &str) -> Result<HttpTransport, ClientError> {
        if !path.starts_with('/') {
            return Err(ClientError::InvalidArgument(format!(
                "Endpoint path must start with '/': {}",
                path
            )));
        }
        Ok(HttpTransport::new(format!("{}{}", self.base_url, path), self.timeout))
    }
}

// ============================================================================
// Tests
// ============================================================================
