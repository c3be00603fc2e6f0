use crate::{JsonRpcClient, Namespace, ProviderError};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::{
    borrow::Borrow,
    collections::VecDeque,
    fmt::Debug,
    sync::{Arc, Mutex, MutexGuard},
};
use thiserror::Error;

/// Helper response type for `MockProvider`, allowing custom JSON-RPC errors to be provided.
/// `Value` for successful responses, `Error` for JSON-RPC errors.
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Successful response with a `serde_json::Value`.
    Value(Value),

    /// Error response with a `JsonRpcError`.
    Error(super::JsonRpcError),

    /// The request never completes in time
    Timeout,
}

/// A request recorded by the [`MockProvider`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockRequest {
    /// Path of the namespace the request was sent to
    pub path: String,
    /// The namespace-qualified method
    pub method: String,
    /// The serialized params
    pub params: Value,
}

#[derive(Clone, Debug, Default)]
/// Mock transport used in test environments.
///
/// Responses are handed out in the order they were pushed.
pub struct MockProvider {
    requests: Arc<Mutex<VecDeque<MockRequest>>>,
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[async_trait]
impl JsonRpcClient for MockProvider {
    type Error = MockError;

    /// Pushes the request to the back of the `requests` queue,
    /// pops the responses from the front of the `responses` queue
    async fn request<T: Debug + Serialize + Send + Sync, R: DeserializeOwned + Send>(
        &self,
        namespace: &Namespace,
        method: &str,
        params: T,
    ) -> Result<R, MockError> {
        let request = MockRequest {
            path: namespace.path().to_owned(),
            method: namespace.method(method),
            params: serde_json::to_value(params)?,
        };
        lock(&self.requests).push_back(request);
        let element = lock(&self.responses).pop_front().ok_or(MockError::EmptyResponses)?;
        match element {
            MockResponse::Value(value) => {
                let res: R = serde_json::from_value(value)?;
                Ok(res)
            }
            MockResponse::Error(error) => Err(MockError::JsonRpcError(error)),
            MockResponse::Timeout => Err(MockError::Timeout),
        }
    }
}

impl MockProvider {
    /// Checks that the provided request was submitted by the client
    pub fn assert_request<T: Serialize + Send + Sync>(
        &self,
        method: &str,
        data: T,
    ) -> Result<(), MockError> {
        let request = self.pop_request()?;
        assert_eq!(request.method, method);
        assert_eq!(serde_json::to_value(data)?, request.params);
        Ok(())
    }

    /// Pops the oldest recorded request
    pub fn pop_request(&self) -> Result<MockRequest, MockError> {
        lock(&self.requests).pop_front().ok_or(MockError::EmptyRequests)
    }

    /// The number of recorded requests not yet asserted
    pub fn pending_requests(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Instantiates a mock transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes the data to the responses
    pub fn push<T: Serialize + Send + Sync, K: Borrow<T>>(&self, data: K) -> Result<(), MockError> {
        let value = serde_json::to_value(data.borrow())?;
        lock(&self.responses).push_back(MockResponse::Value(value));
        Ok(())
    }

    /// Pushes the data or error to the responses
    pub fn push_response(&self, response: MockResponse) {
        lock(&self.responses).push_back(response);
    }
}

#[derive(Error, Debug)]
/// Errors for the `MockProvider`
pub enum MockError {
    /// (De)Serialization error
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    /// Empty requests array
    #[error("empty requests array, please push some requests")]
    EmptyRequests,

    /// Empty responses array
    #[error("empty responses array, please push some responses")]
    EmptyResponses,

    /// Custom JsonRpcError
    #[error(transparent)]
    JsonRpcError(super::JsonRpcError),

    /// Simulated deadline expiry
    #[error("Request timed out after 3 seconds")]
    Timeout,
}

impl crate::RpcError for MockError {
    fn as_error_response(&self) -> Option<&super::JsonRpcError> {
        match self {
            MockError::JsonRpcError(e) => Some(e),
            _ => None,
        }
    }

    fn as_serde_error(&self) -> Option<&serde_json::Error> {
        match self {
            MockError::SerdeJson(e) => Some(e),
            _ => None,
        }
    }

    fn is_timeout(&self) -> bool {
        matches!(self, MockError::Timeout)
    }
}

impl From<MockError> for ProviderError {
    fn from(src: MockError) -> Self {
        ProviderError::JsonRpcClientError(Box::new(src))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::JsonRpcError;
    use serde_json::json;

    #[tokio::test]
    async fn pushes_request_and_response() {
        let mock = MockProvider::new();
        mock.push::<u64, _>(12).unwrap();
        let height: u64 = mock.request(&Namespace::core(), "height", json!({})).await.unwrap();
        mock.assert_request("hypersdk.height", json!({})).unwrap();
        assert_eq!(height, 12);
    }

    #[tokio::test]
    async fn responses_are_fifo() {
        let mock = MockProvider::new();
        mock.push::<u64, _>(1).unwrap();
        mock.push::<u64, _>(2).unwrap();
        let ns = Namespace::vm("morpheusvm", "morpheusapi");
        let a: u64 = mock.request(&ns, "a", ()).await.unwrap();
        let b: u64 = mock.request(&ns, "b", ()).await.unwrap();
        assert_eq!((a, b), (1, 2));
        assert_eq!(mock.pop_request().unwrap().path, "morpheusapi");
        mock.assert_request("morpheusvm.b", ()).unwrap();
    }

    #[tokio::test]
    async fn empty_responses() {
        let mock = MockProvider::new();
        // tries to get a response without pushing a response
        let err = mock.request::<_, ()>(&Namespace::core(), "network", ()).await.unwrap_err();
        match err {
            MockError::EmptyResponses => {}
            _ => panic!("expected empty responses"),
        };
    }

    #[tokio::test]
    async fn pushes_error_response() {
        let mock = MockProvider::new();
        let error = JsonRpcError {
            code: -32000,
            data: None,
            message: "invalid auth".to_string(),
        };
        mock.push_response(MockResponse::Error(error.clone()));

        let result: Result<u64, MockError> = mock.request(&Namespace::core(), "submitTx", ()).await;
        match result {
            Err(MockError::JsonRpcError(e)) => {
                assert_eq!(e.code, error.code);
                assert_eq!(e.message, error.message);
            }
            _ => panic!("Expected JsonRpcError"),
        }
    }

    #[tokio::test]
    async fn empty_requests() {
        let mock = MockProvider::new();
        // tries to assert a request without making one
        let err = mock.assert_request("hypersdk.network", ()).unwrap_err();
        match err {
            MockError::EmptyRequests => {}
            _ => panic!("expected empty request"),
        };
    }
}
