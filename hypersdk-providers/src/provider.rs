use crate::{
    stream::{BlockWatcher, DEFAULT_POLL_INTERVAL},
    Http as HttpProvider, JsonRpcClient, MockProvider, Namespace, ProviderError,
};

use hypersdk_core::{
    abi::Abi,
    types::{serde_helpers, Bytes, LastAccepted, NetworkInfo, U256},
};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures_util::lock::Mutex;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use std::{convert::TryFrom, fmt::Debug, sync::Arc, time::Duration};
use tracing::trace;
use tracing_futures::Instrument;
use url::ParseError;

/// The VM the provider talks to unless configured otherwise
const DEFAULT_VM_NAME: &str = "morpheusvm";
const DEFAULT_VM_RPC_PREFIX: &str = "morpheusapi";

/// An abstract provider for interacting with the JSON-RPC API of a HyperSDK chain. Must be
/// instantiated with a data transport which implements the
/// [`JsonRpcClient`](trait@crate::JsonRpcClient) trait (e.g. [HTTP](crate::Http)).
///
/// Node-level methods go through the core namespace (`hypersdk.*` on `coreapi`); methods of the
/// deployed VM go through the VM namespace set with [`Provider::with_vm`].
///
/// The network metadata and the ABI never change while talking to one endpoint, so both are
/// fetched once and cached. Clones share these caches.
///
/// # Example
///
/// ```no_run
/// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// use hypersdk_providers::{Http, Provider};
///
/// let provider = Provider::new(Http::for_chain("http://localhost:9650", "morpheusvm")?)
///     .with_vm("morpheusvm", "morpheusapi");
///
/// let block = provider.last_accepted().await?;
/// println!("Got block: {}", serde_json::to_string(&block)?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Provider<P> {
    inner: P,
    core: Namespace,
    vm: Namespace,
    interval: Option<Duration>,
    network: Arc<Mutex<Option<NetworkInfo>>>,
    abi: Arc<Mutex<Option<Abi>>>,
}

impl<P> AsRef<P> for Provider<P> {
    fn as_ref(&self) -> &P {
        &self.inner
    }
}

/// Reply of `hypersdk.submitTx`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTxReply {
    /// cb58 encoded id of the accepted transaction
    pub tx_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct AbiReply {
    abi: Abi,
}

#[derive(Debug, Serialize, Deserialize)]
struct BalanceReply {
    #[serde(with = "serde_helpers::string_u256")]
    amount: U256,
}

impl<P: JsonRpcClient> Provider<P> {
    /// Instantiate a new provider with a backend.
    pub fn new(provider: P) -> Self {
        Self {
            inner: provider,
            core: Namespace::core(),
            vm: Namespace::vm(DEFAULT_VM_NAME, DEFAULT_VM_RPC_PREFIX),
            interval: None,
            network: Arc::new(Mutex::new(None)),
            abi: Arc::new(Mutex::new(None)),
        }
    }

    /// Sets the VM whose methods [`Provider::balance`] and [`Provider::vm_request`] call
    #[must_use]
    pub fn with_vm(mut self, vm_name: impl Into<String>, rpc_prefix: impl Into<String>) -> Self {
        self.vm = Namespace::vm(vm_name, rpc_prefix);
        self
    }

    /// The namespace of the deployed VM
    pub fn vm_namespace(&self) -> &Namespace {
        &self.vm
    }

    /// Sends the request via the chosen transport
    pub async fn request<T, R>(
        &self,
        namespace: &Namespace,
        method: &str,
        params: T,
    ) -> Result<R, ProviderError>
    where
        T: Debug + Serialize + Send + Sync,
        R: Serialize + DeserializeOwned + Debug + Send,
    {
        let span = tracing::trace_span!(
            "rpc",
            namespace = namespace.path(),
            method = method,
            params = ?serde_json::to_string(&params)?
        );
        // https://docs.rs/tracing/0.1.22/tracing/span/struct.Span.html#in-asynchronous-code
        let res = async move {
            trace!("tx");
            let res: R = self.inner.request(namespace, method, params).await.map_err(Into::into)?;
            trace!(rx = ?serde_json::to_string(&res)?);
            Ok::<_, ProviderError>(res)
        }
        .instrument(span)
        .await?;
        Ok(res)
    }

    /// Calls a node-level `hypersdk.*` method
    pub async fn core_request<T, R>(&self, method: &str, params: T) -> Result<R, ProviderError>
    where
        T: Debug + Serialize + Send + Sync,
        R: Serialize + DeserializeOwned + Debug + Send,
    {
        self.request(&self.core, method, params).await
    }

    /// Calls a method of the deployed VM
    pub async fn vm_request<T, R>(&self, method: &str, params: T) -> Result<R, ProviderError>
    where
        T: Debug + Serialize + Send + Sync,
        R: Serialize + DeserializeOwned + Debug + Send,
    {
        self.request(&self.vm, method, params).await
    }

    ////// Network metadata
    //
    // Fetched once per provider, failures leave the caches untouched

    /// Returns the network the chain belongs to via `hypersdk.network`
    pub async fn network(&self) -> Result<NetworkInfo, ProviderError> {
        let mut network = self.network.lock().await;

        if let Some(network) = &*network {
            Ok(network.clone())
        } else {
            let info: NetworkInfo = self.core_request("network", json!({})).await?;
            *network = Some(info.clone());
            Ok(info)
        }
    }

    /// Returns the cached network metadata without fetching it
    pub async fn cached_network(&self) -> Option<NetworkInfo> {
        self.network.lock().await.clone()
    }

    /// Returns the VM's ABI via `hypersdk.getABI`
    pub async fn abi(&self) -> Result<Abi, ProviderError> {
        let mut abi = self.abi.lock().await;

        if let Some(abi) = &*abi {
            Ok(abi.clone())
        } else {
            let fetched = self.fetch_abi().await?;
            *abi = Some(fetched.clone());
            Ok(fetched)
        }
    }

    /// Fetches the ABI without consulting or filling the cache
    pub async fn fetch_abi(&self) -> Result<Abi, ProviderError> {
        let reply: AbiReply = self.core_request("getABI", json!({})).await?;
        Ok(reply.abi)
    }

    /// Returns the cached ABI without fetching it
    pub async fn cached_abi(&self) -> Option<Abi> {
        self.abi.lock().await.clone()
    }

    ////// Chain state

    /// Gets the last block accepted by the node
    pub async fn last_accepted(&self) -> Result<LastAccepted, ProviderError> {
        self.core_request("lastAccepted", json!({})).await
    }

    /// Sends the signed transaction to the node. The bytes travel base64 encoded.
    pub async fn submit_tx(
        &self,
        signed: impl AsRef<[u8]>,
    ) -> Result<Option<SubmitTxReply>, ProviderError> {
        let tx = STANDARD.encode(signed);
        self.core_request("submitTx", json!({ "tx": tx })).await
    }

    /// Executes the encoded actions on behalf of `actor` without committing them
    pub async fn simulate_actions(
        &self,
        actions: &[Bytes],
        actor: &str,
    ) -> Result<Value, ProviderError> {
        let actions: Vec<String> = actions.iter().map(|action| STANDARD.encode(action)).collect();
        self.core_request("simulateActions", json!({ "actions": actions, "actor": actor })).await
    }

    /// Returns the balance of `address` via the VM's `balance` method
    pub async fn balance(&self, address: &str) -> Result<U256, ProviderError> {
        let reply: BalanceReply = self.vm_request("balance", json!({ "address": address })).await?;
        Ok(reply.amount)
    }

    /// Polls the balance of `address` until it differs from `initial` or `max_wait` elapses,
    /// returning the last balance seen
    pub async fn wait_for_balance_change(
        &self,
        address: &str,
        initial: U256,
        max_wait: Duration,
    ) -> Result<U256, ProviderError> {
        let deadline = tokio::time::Instant::now() + max_wait;
        loop {
            let balance = self.balance(address).await?;
            if balance != initial || tokio::time::Instant::now() >= deadline {
                return Ok(balance)
            }
            tokio::time::sleep(self.get_interval()).await;
        }
    }

    /// Streams every newly accepted block, polling at the provider's interval
    pub fn watch_blocks(&self) -> BlockWatcher<'_, P> {
        BlockWatcher::new(self).interval(self.get_interval())
    }

    /// Sets the default polling interval for block watchers and balance polling
    #[must_use]
    pub fn interval<T: Into<Duration>>(mut self, interval: T) -> Self {
        self.interval = Some(interval.into());
        self
    }

    /// Sets the default polling interval in place
    pub fn set_interval<T: Into<Duration>>(&mut self, interval: T) -> &mut Self {
        self.interval = Some(interval.into());
        self
    }

    /// Gets the polling interval which the provider currently uses
    pub fn get_interval(&self) -> Duration {
        self.interval.unwrap_or(DEFAULT_POLL_INTERVAL)
    }
}

impl Provider<MockProvider> {
    /// Returns a `Provider` instantiated with an internal "mock" transport.
    ///
    /// # Example
    ///
    /// ```
    /// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
    /// use hypersdk_core::types::U256;
    /// use hypersdk_providers::Provider;
    /// use serde_json::json;
    ///
    /// // Instantiate the provider
    /// let (provider, mock) = Provider::mocked();
    /// // Push the mock response
    /// mock.push(json!({ "amount": 1000 }))?;
    /// // Make the call
    /// let balance = provider.balance("morpheus1qqds").await?;
    /// // The response matches
    /// assert_eq!(balance, U256::from(1000));
    /// // and the request as well!
    /// mock.assert_request("morpheusvm.balance", json!({ "address": "morpheus1qqds" }))?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn mocked() -> (Self, MockProvider) {
        let mock = MockProvider::new();
        let mock_clone = mock.clone();
        (Self::new(mock), mock_clone)
    }
}

impl TryFrom<&str> for Provider<HttpProvider> {
    type Error = ParseError;

    fn try_from(src: &str) -> Result<Self, Self::Error> {
        Ok(Provider::new(src.parse()?))
    }
}

impl TryFrom<String> for Provider<HttpProvider> {
    type Error = ParseError;

    fn try_from(src: String) -> Result<Self, Self::Error> {
        Provider::try_from(src.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MockResponse, RpcError};
    use futures_util::StreamExt;
    use hypersdk_core::ErrorKind;

    fn network_reply() -> Value {
        json!({
            "networkId": 1337,
            "subnetId": "2eNy1mUFdmaxXNj1eQHUe7Np4gju9sJsEtWQ4MX3ToiNKuADed",
            "chainId": "2c7iUW3kCDwRA9ZFd5bjZZc8iDy68uAsFSBahjqSZGttiTDSNH",
        })
    }

    #[tokio::test]
    async fn network_is_fetched_once() {
        let (provider, mock) = Provider::mocked();
        mock.push(network_reply()).unwrap();

        let first = provider.network().await.unwrap();
        let second = provider.clone().network().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.network_id, 1337);

        mock.assert_request("hypersdk.network", json!({})).unwrap();
        assert_eq!(mock.pending_requests(), 0);
    }

    #[tokio::test]
    async fn timed_out_network_leaves_cache_empty() {
        let (provider, mock) = Provider::mocked();
        mock.push_response(MockResponse::Timeout);
        mock.push(network_reply()).unwrap();

        let err = provider.network().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(err.to_string(), "Request timed out after 3 seconds");
        assert!(provider.cached_network().await.is_none());

        // the next call fetches again
        let info = provider.network().await.unwrap();
        assert_eq!(provider.cached_network().await, Some(info));
    }

    #[tokio::test]
    async fn abi_is_cached() {
        let (provider, mock) = Provider::mocked();
        assert!(provider.cached_abi().await.is_none());
        mock.push(json!({ "abi": "{\"actions\":[]}" })).unwrap();

        let abi = provider.abi().await.unwrap();
        assert_eq!(abi.as_str(), "{\"actions\":[]}");
        assert_eq!(provider.abi().await.unwrap(), abi);
        assert_eq!(provider.cached_abi().await, Some(abi));
        mock.assert_request("hypersdk.getABI", json!({})).unwrap();
        assert_eq!(mock.pending_requests(), 0);
    }

    #[tokio::test]
    async fn rpc_errors_surface_the_node_message() {
        let (provider, mock) = Provider::mocked();
        mock.push_response(MockResponse::Error(crate::JsonRpcError::new("insufficient funds")));

        let err = provider.submit_tx([1u8, 2, 3]).await.unwrap_err();
        assert_eq!(err.to_string(), "insufficient funds");
        assert_eq!(err.kind(), ErrorKind::Rpc);
        assert!(err.is_error_response());
    }

    #[tokio::test]
    async fn submits_base64() {
        let (provider, mock) = Provider::mocked();
        mock.push(json!({ "txId": "2Z3mN" })).unwrap();

        let reply = provider.submit_tx([0u8, 1, 2, 255]).await.unwrap();
        assert_eq!(reply, Some(SubmitTxReply { tx_id: "2Z3mN".to_string() }));
        mock.assert_request("hypersdk.submitTx", json!({ "tx": "AAEC/w==" })).unwrap();
    }

    #[tokio::test]
    async fn submit_without_reply() {
        let (provider, mock) = Provider::mocked();
        mock.push(Value::Null).unwrap();
        assert_eq!(provider.submit_tx([7u8]).await.unwrap(), None);
    }

    #[tokio::test]
    async fn simulates_encoded_actions() {
        let (provider, mock) = Provider::mocked();
        mock.push(json!([{ "output": "ok" }])).unwrap();

        let actions = vec![Bytes::from_static(b"hi")];
        let res = provider.simulate_actions(&actions, "morpheus1actor").await.unwrap();
        assert_eq!(res, json!([{ "output": "ok" }]));
        mock.assert_request(
            "hypersdk.simulateActions",
            json!({ "actions": ["aGk="], "actor": "morpheus1actor" }),
        )
        .unwrap();
    }

    #[tokio::test]
    async fn balance_uses_vm_namespace() {
        let (provider, mock) = Provider::mocked();
        let provider = provider.with_vm("tokenvm", "/tokenapi");
        mock.push(json!({ "amount": "1000000000000000000000" })).unwrap();

        let balance = provider.balance("token1xyz").await.unwrap();
        assert_eq!(balance, U256::from_dec_str("1000000000000000000000").unwrap());

        let request = mock.pop_request().unwrap();
        assert_eq!(request.path, "tokenapi");
        assert_eq!(request.method, "tokenvm.balance");
        assert_eq!(request.params, json!({ "address": "token1xyz" }));
    }

    #[tokio::test]
    async fn waits_for_balance_change() {
        let (provider, mock) = Provider::mocked();
        let provider = provider.interval(Duration::from_millis(1));
        mock.push(json!({ "amount": 5 })).unwrap();
        mock.push(json!({ "amount": 5 })).unwrap();
        mock.push(json!({ "amount": 8 })).unwrap();

        let balance = provider
            .wait_for_balance_change("addr", U256::from(5), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(balance, U256::from(8));
        assert_eq!(mock.pending_requests(), 3);
    }

    #[tokio::test]
    async fn gives_up_waiting_for_balance() {
        let (provider, mock) = Provider::mocked();
        let provider = provider.interval(Duration::from_millis(1));
        mock.push(json!({ "amount": 5 })).unwrap();

        let balance =
            provider.wait_for_balance_change("addr", U256::from(5), Duration::ZERO).await.unwrap();
        assert_eq!(balance, U256::from(5));
        assert_eq!(mock.pending_requests(), 1);
    }

    #[tokio::test]
    async fn watches_new_blocks() {
        let (provider, mock) = Provider::mocked();
        let provider = provider.interval(Duration::from_millis(1));
        mock.push(json!({ "height": 1, "blockId": "a", "timestamp": 10 })).unwrap();
        // repeated height is skipped
        mock.push(json!({ "height": 1, "blockId": "a", "timestamp": 10 })).unwrap();
        // failed polls are skipped as well
        mock.push_response(MockResponse::Timeout);
        mock.push(json!({ "height": "2", "blockId": "b", "timestamp": 20 })).unwrap();

        let blocks: Vec<LastAccepted> = provider.watch_blocks().stream().take(2).collect().await;
        assert_eq!(blocks.iter().map(|b| b.height).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(blocks[1].block_id, "b");
    }

    #[test]
    fn parses_http_provider() {
        let provider = Provider::<HttpProvider>::try_from("http://localhost:9650/ext/bc/morpheusvm")
            .unwrap();
        assert_eq!(provider.get_interval(), DEFAULT_POLL_INTERVAL);
        assert_eq!(provider.vm_namespace().method("balance"), "morpheusvm.balance");
        assert!(Provider::<HttpProvider>::try_from("not a url").is_err());
    }
}
