use std::{error::Error, fmt::Debug};
use thiserror::Error;

use crate::JsonRpcError;
use hypersdk_core::ErrorKind;

/// An `RpcError` is an abstraction over error types returned by a
/// [`crate::JsonRpcClient`].
///
/// All clients can return [`JsonRpcError`] responses, serde deserialization errors and
/// timeouts. However, because client errors are typically type-erased via the
/// [`ProviderError`], the error info can be difficult to access. This trait provides convenient
/// access to the underlying error types.
///
/// This trait deals only with behavior that is common to all clients.
/// Client-specific error variants cannot be accessed via this trait.
pub trait RpcError: Error + Debug + Send + Sync {
    /// Access an underlying JSON-RPC error (if any)
    ///
    /// Attempts to access an underlying [`JsonRpcError`]. If the underlying
    /// error is not a JSON-RPC error response, this function will return
    /// `None`.
    fn as_error_response(&self) -> Option<&JsonRpcError>;

    /// Returns `true` if the underlying error is a JSON-RPC error response
    fn is_error_response(&self) -> bool {
        self.as_error_response().is_some()
    }

    /// Access an underlying `serde_json` error (if any)
    ///
    /// Attempts to access an underlying [`serde_json::Error`]. If the
    /// underlying error is not a serde_json error, this function will return
    /// `None`.
    fn as_serde_error(&self) -> Option<&serde_json::Error>;

    /// Returns `true` if the underlying error is a serde_json (de)serialization
    /// error.
    fn is_serde_error(&self) -> bool {
        self.as_serde_error().is_some()
    }

    /// Returns `true` if the request was abandoned because it exceeded its deadline
    fn is_timeout(&self) -> bool {
        false
    }
}

#[derive(Debug, Error)]
/// An error thrown when making a call to the provider
pub enum ProviderError {
    /// An internal error in the JSON RPC Client
    #[error("{0}")]
    JsonRpcClientError(Box<dyn crate::RpcError + Send + Sync>),

    /// Error in underlying lib `serde_json`
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    /// Error in underlying lib `reqwest`
    #[error(transparent)]
    HTTPError(#[from] reqwest::Error),
}

impl ProviderError {
    /// The category of this failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProviderError::JsonRpcClientError(err) if err.is_timeout() => ErrorKind::Timeout,
            ProviderError::JsonRpcClientError(err) if err.is_error_response() => ErrorKind::Rpc,
            ProviderError::JsonRpcClientError(err) if err.is_serde_error() => ErrorKind::Encoding,
            ProviderError::SerdeJson(_) => ErrorKind::Encoding,
            ProviderError::HTTPError(err) if err.is_timeout() => ErrorKind::Timeout,
            _ => ErrorKind::Transport,
        }
    }
}

impl RpcError for ProviderError {
    fn as_error_response(&self) -> Option<&JsonRpcError> {
        if let ProviderError::JsonRpcClientError(err) = self {
            err.as_error_response()
        } else {
            None
        }
    }

    fn as_serde_error(&self) -> Option<&serde_json::Error> {
        match self {
            ProviderError::JsonRpcClientError(e) => e.as_serde_error(),
            ProviderError::SerdeJson(e) => Some(e),
            _ => None,
        }
    }

    fn is_timeout(&self) -> bool {
        match self {
            ProviderError::JsonRpcClientError(e) => e.is_timeout(),
            ProviderError::HTTPError(e) => e.is_timeout(),
            _ => false,
        }
    }
}
