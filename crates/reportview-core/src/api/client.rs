//! The RPC façade shared by every service client.
//!
//! A [`Client`] owns one transport and is bound to at most one session token
//! for its whole life. Every call goes through [`dispatch`], which opens and
//! closes the transport around the call (unless a [`Batch`] holds it open)
//! and sorts failures into the three classes callers act on: application
//! failures are logged and returned, connectivity failures are logged and
//! turned into an absent result, protocol failures are returned untouched.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, error, warn};

use super::error::ClientError;
use super::paging::{paged_operation, PagePlacement, Pager};
use super::transport::Transport;
use crate::auth::SessionToken;
use crate::config::Config;

/// Header carrying the session cookie.
const COOKIE_HEADER: &str = "Cookie";

/// `getAllXxx` operations take limit/offset right before their last two arguments.
const GET_ALL_PLACEMENT: PagePlacement = PagePlacement::FromEnd(2);

pub struct Client<T: Transport> {
    // Open -> call -> close is not reentrant on one handle.
    transport: Mutex<T>,
    page_size: usize,
}

impl<T: Transport> Client<T> {
    /// Wrap a transport, attaching the session cookie when a token is given.
    pub fn new(
        mut transport: T,
        token: Option<&SessionToken>,
        config: &Config,
    ) -> Result<Self, ClientError> {
        if let Some(token) = token {
            let cookie = format!("{}={}", config.session_cookie_name, token.as_str());
            transport.set_header(COOKIE_HEADER, &cookie)?;
        }

        Ok(Self {
            transport: Mutex::new(transport),
            page_size: config.max_query_size,
        })
    }

    /// Override the page size used by [`Client::fetch_all`].
    pub fn with_page_size(mut self, page_size: usize) -> Result<Self, ClientError> {
        if page_size == 0 {
            return Err(ClientError::InvalidArgument("Page size must be at least 1".to_string()));
        }
        self.page_size = page_size;
        Ok(self)
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Call a remote operation by name.
    ///
    /// Returns `Ok(None)` when the server could not be reached.
    pub async fn call(&self, method: &str, args: &[Value]) -> Result<Option<Value>, ClientError> {
        let mut transport = self.transport.lock().await;
        dispatch(&mut *transport, true, method, args).await
    }

    pub async fn call_as<R: DeserializeOwned>(
        &self,
        method: &str,
        args: &[Value],
    ) -> Result<Option<R>, ClientError> {
        self.call(method, args)
            .await?
            .map(|value| decode(method, value))
            .transpose()
    }

    /// Like [`Client::call_as`] but an unreachable server is an error.
    pub async fn request<R: DeserializeOwned>(
        &self,
        method: &str,
        args: &[Value],
    ) -> Result<R, ClientError> {
        self.call_as(method, args)
            .await?
            .ok_or_else(|| ClientError::NoResponse { method: method.to_string() })
    }

    /// Fetch every page of a list operation.
    ///
    /// `limit` and `offset` are inserted into `fixed_args` at `placement`.
    pub async fn fetch_all(
        &self,
        method: &str,
        fixed_args: &[Value],
        placement: PagePlacement,
    ) -> Result<Vec<Value>, ClientError> {
        let mut transport = self.transport.lock().await;
        fetch_pages(&mut *transport, true, method, fixed_args, placement, self.page_size).await
    }

    pub async fn fetch_all_as<R: DeserializeOwned>(
        &self,
        method: &str,
        fixed_args: &[Value],
        placement: PagePlacement,
    ) -> Result<Vec<R>, ClientError> {
        let items = self.fetch_all(method, fixed_args, placement).await?;
        decode_items(method, items)
    }

    /// Resolve `getAllXxx` to the paged `getXxx` and fetch every page.
    pub async fn call_all(
        &self,
        name: &str,
        fixed_args: &[Value],
    ) -> Result<Vec<Value>, ClientError> {
        let method = paged_operation(name).ok_or_else(|| {
            ClientError::InvalidArgument(format!("{} is not a getAll operation", name))
        })?;
        self.fetch_all(&method, fixed_args, GET_ALL_PLACEMENT).await
    }

    /// Hold the transport open across several calls.
    ///
    /// The transport is closed when the returned guard is dropped. Other
    /// calls on this client wait until then.
    pub async fn batch(&self) -> Result<Batch<'_, T>, ClientError> {
        let mut transport = self.transport.lock().await;
        open(&mut *transport)?;
        debug!("Batch connection opened");
        Ok(Batch {
            transport,
            page_size: self.page_size,
        })
    }
}

/// A transport held open for a sequence of calls.
pub struct Batch<'a, T: Transport> {
    transport: MutexGuard<'a, T>,
    page_size: usize,
}

impl<T: Transport> Batch<'_, T> {
    pub async fn call(
        &mut self,
        method: &str,
        args: &[Value],
    ) -> Result<Option<Value>, ClientError> {
        dispatch(&mut *self.transport, false, method, args).await
    }

    pub async fn call_as<R: DeserializeOwned>(
        &mut self,
        method: &str,
        args: &[Value],
    ) -> Result<Option<R>, ClientError> {
        self.call(method, args)
            .await?
            .map(|value| decode(method, value))
            .transpose()
    }

    pub async fn request<R: DeserializeOwned>(
        &mut self,
        method: &str,
        args: &[Value],
    ) -> Result<R, ClientError> {
        self.call_as(method, args)
            .await?
            .ok_or_else(|| ClientError::NoResponse { method: method.to_string() })
    }

    pub async fn fetch_all(
        &mut self,
        method: &str,
        fixed_args: &[Value],
        placement: PagePlacement,
    ) -> Result<Vec<Value>, ClientError> {
        let page_size = self.page_size;
        fetch_pages(&mut *self.transport, false, method, fixed_args, placement, page_size).await
    }

    pub async fn fetch_all_as<R: DeserializeOwned>(
        &mut self,
        method: &str,
        fixed_args: &[Value],
        placement: PagePlacement,
    ) -> Result<Vec<R>, ClientError> {
        let items = self.fetch_all(method, fixed_args, placement).await?;
        decode_items(method, items)
    }
}

impl<T: Transport> Drop for Batch<'_, T> {
    fn drop(&mut self) {
        self.transport.close();
        debug!("Batch connection closed");
    }
}

fn open<T: Transport + ?Sized>(transport: &mut T) -> Result<(), ClientError> {
    transport.open().map_err(|e| {
        error!(error = %e, "Failed to open transport");
        e
    })
}

async fn dispatch<T: Transport + ?Sized>(
    transport: &mut T,
    manage_connection: bool,
    method: &str,
    args: &[Value],
) -> Result<Option<Value>, ClientError> {
    if manage_connection {
        open(transport)?;
    }
    let reply = transport.call(method, args).await;
    if manage_connection {
        transport.close();
    }

    match reply {
        Ok(value) => Ok(Some(value)),
        Err(ClientError::RequestFailed { code, message }) => {
            error!(method = method, code = %code, message = %message, "{}", code.description());
            Err(ClientError::RequestFailed { code, message })
        }
        Err(e) if e.is_connection() => {
            warn!(method = method, cause = %e, "Connection error, call returned no result");
            Ok(None)
        }
        Err(e) => {
            debug!(method = method, error = %e, "Call failed");
            Err(e)
        }
    }
}

async fn fetch_pages<T: Transport + ?Sized>(
    transport: &mut T,
    manage_connection: bool,
    method: &str,
    fixed_args: &[Value],
    placement: PagePlacement,
    page_size: usize,
) -> Result<Vec<Value>, ClientError> {
    let mut pager = Pager::new(method, fixed_args, placement, page_size)?;
    loop {
        let reply = dispatch(transport, manage_connection, pager.method(), pager.args()).await?;
        if !pager.accept(reply)? {
            break;
        }
    }
    Ok(pager.finish())
}

fn decode<R: DeserializeOwned>(method: &str, value: Value) -> Result<R, ClientError> {
    serde_json::from_value(value)
        .map_err(|e| ClientError::Protocol(format!("{}: unexpected result shape: {}", method, e)))
}

fn decode_items<R: DeserializeOwned>(
    method: &str,
    items: Vec<Value>,
) -> Result<Vec<R>, ClientError> {
    items.into_iter().map(|item| decode(method, item)).collect()
}

// ============================================================================
// Tests
// ============================================================================
