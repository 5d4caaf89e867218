use async_trait::async_trait;
use serde_json::Value;

use super::error::ClientError;

/// A request/response channel to one service endpoint.
///
/// `call` surfaces an application failure as [`ClientError::RequestFailed`],
/// an undecodable reply as [`ClientError::Protocol`] and lost connectivity as
/// [`ClientError::Connection`].
#[async_trait]
pub trait Transport: Send {
    /// Acquire the underlying connection resources.
    fn open(&mut self) -> Result<(), ClientError>;

    /// Release the connection resources. Closing a closed transport is a no-op.
    fn close(&mut self);

    fn is_open(&self) -> bool;

    /// Attach a header to every request issued from now on.
    fn set_header(&mut self, name: &str, value: &str) -> Result<(), ClientError>;

    async fn call(&mut self, method: &str, args: &[Value]) -> Result<Value, ClientError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    fn open(&mut self) -> Result<(), ClientError> {
        (**self).open()
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn set_header(&mut self, name: &str, value: &str) -> Result<(), ClientError> {
        (**self).set_header(name, value)
    }

    async fn call(&mut self, method: &str, args: &[Value]) -> Result<Value, ClientError> {
        (**self).call(method, args).await
    }
}

/// Builds transports for endpoint paths on one server.
pub trait Connector: Send + Sync {
    type Transport: Transport;

    fn connect(&self, path: &str) -> Result<Self::Transport, ClientError>;
}
