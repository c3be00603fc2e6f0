use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::{fmt::Debug, sync::Arc};
use thiserror::Error;
use tokio::sync::OnceCell;

#[derive(Error, Debug, Clone)]
/// Error reported by the wallet host
pub enum WalletProviderError {
    /// The host rejected the request
    #[error("{message}")]
    Request {
        /// The host's error code, if any
        code: Option<i64>,
        /// The host's error message
        message: String,
    },
    /// No wallet host could be reached
    #[error("wallet host unavailable: {0}")]
    Unavailable(String),
}

/// An EIP-1193 style request interface exposed by the wallet host
#[async_trait]
pub trait WalletProvider: Debug + Send + Sync {
    /// Sends a request to the host and returns its result
    async fn request(&self, method: &str, params: Option<Value>)
        -> Result<Value, WalletProviderError>;
}

/// Discovers the wallet host and performs the connection handshake.
///
/// This is the expensive step; [`ProviderCache`] makes sure it runs once.
#[async_trait]
pub trait WalletConnector: Debug + Send + Sync {
    /// Returns a connected provider
    async fn connect(&self) -> Result<Arc<dyn WalletProvider>, WalletProviderError>;
}

static GLOBAL: Lazy<Arc<ProviderCache>> = Lazy::new(Default::default);

/// Memoizes the wallet provider handle.
///
/// Concurrent first-time callers share one in-flight handshake and then all observe the same
/// instance. A failed handshake leaves the cache empty so a later call can try again.
#[derive(Debug, Default)]
pub struct ProviderCache {
    provider: OnceCell<Arc<dyn WalletProvider>>,
}

impl ProviderCache {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// The process wide cache
    pub fn global() -> Arc<ProviderCache> {
        GLOBAL.clone()
    }

    /// Returns the cached provider, connecting through `connector` on first use
    pub async fn get_or_connect(
        &self,
        connector: &dyn WalletConnector,
    ) -> Result<Arc<dyn WalletProvider>, WalletProviderError> {
        self.provider.get_or_try_init(|| connector.connect()).await.map(Arc::clone)
    }

    /// Returns the cached provider without connecting
    pub fn get(&self) -> Option<Arc<dyn WalletProvider>> {
        self.provider.get().cloned()
    }
}
