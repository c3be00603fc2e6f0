use super::provider::{WalletConnector, WalletProvider, WalletProviderError};
use async_trait::async_trait;
use serde_json::Value;
use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

/// Scripted wallet host used in tests.
///
/// Replies are queued per method and handed out in order; the last reply of a method is
/// repeated once its queue runs dry. Every request is recorded.
#[derive(Clone, Debug, Default)]
pub struct MockWalletProvider {
    replies: Arc<Mutex<HashMap<String, VecDeque<Result<Value, WalletProviderError>>>>>,
    requests: Arc<Mutex<Vec<(String, Option<Value>)>>>,
}

impl MockWalletProvider {
    /// Instantiates a host without any replies
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply for `method`
    pub fn push(&self, method: &str, reply: Value) {
        self.push_result(method, Ok(reply))
    }

    /// Queues an error for `method`
    pub fn push_err(&self, method: &str, message: &str) {
        let err = WalletProviderError::Request { code: None, message: message.into() };
        self.push_result(method, Err(err))
    }

    fn push_result(&self, method: &str, reply: Result<Value, WalletProviderError>) {
        let mut replies = self.replies.lock().unwrap_or_else(|e| e.into_inner());
        replies.entry(method.to_owned()).or_default().push_back(reply);
    }

    /// All requests received so far
    pub fn requests(&self) -> Vec<(String, Option<Value>)> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The requests made to `method`
    pub fn requests_for(&self, method: &str) -> Vec<Option<Value>> {
        self.requests()
            .into_iter()
            .filter(|(m, _)| m == method)
            .map(|(_, params)| params)
            .collect()
    }
}

#[async_trait]
impl WalletProvider for MockWalletProvider {
    async fn request(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<Value, WalletProviderError> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).push((method.to_owned(), params));

        let mut replies = self.replies.lock().unwrap_or_else(|e| e.into_inner());
        let reply = match replies.get_mut(method) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        reply.unwrap_or_else(|| {
            Err(WalletProviderError::Request {
                code: Some(-32601),
                message: format!("no mock reply for {method}"),
            })
        })
    }
}

/// Hands out a [`MockWalletProvider`] and counts the handshakes
#[derive(Clone, Debug, Default)]
pub struct MockConnector {
    provider: MockWalletProvider,
    handshakes: Arc<AtomicUsize>,
}

impl MockConnector {
    /// Connects to `provider`
    pub fn new(provider: MockWalletProvider) -> Self {
        Self { provider, handshakes: Default::default() }
    }

    /// The number of handshakes performed
    pub fn handshakes(&self) -> usize {
        self.handshakes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletConnector for MockConnector {
    async fn connect(&self) -> Result<Arc<dyn WalletProvider>, WalletProviderError> {
        self.handshakes.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(self.provider.clone()))
    }
}
