use crate::{ActiveSigner, ClientConfig, ClientError, SignerParams, TransactionBuilder};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hypersdk_core::{
    abi::{Abi, JsonEncoder, TxEncoder},
    types::{Action, NetworkInfo, U256},
    utils::{format_balance, parse_balance, parse_balance_exact},
};
use hypersdk_providers::{
    BlockWatcher, Faucet, Http, JsonRpcClient, Provider, SubmitTxReply, DEFAULT_FAUCET_ATTEMPTS,
};
use hypersdk_signers::{
    EphemeralSigner, ExternalWalletSigner, PrivateKeySigner, ProviderCache, Signer,
    WalletConnector,
};
use serde_json::{json, Value};
use std::{fmt, sync::Arc};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

/// How many connectivity events a slow subscriber may fall behind
const EVENT_CAPACITY: usize = 16;

/// Published whenever the active signer changes
#[derive(Clone, Debug)]
pub enum ConnectivityEvent {
    /// A signer was connected and is now active
    Connected(Arc<ActiveSigner>),
    /// The active signer was dropped
    Disconnected,
}

impl ConnectivityEvent {
    /// The new signer, `None` on disconnect
    pub fn signer(&self) -> Option<&Arc<ActiveSigner>> {
        match self {
            ConnectivityEvent::Connected(signer) => Some(signer),
            ConnectivityEvent::Disconnected => None,
        }
    }
}

/// Where the client stands with its signer
#[derive(Clone, Debug, Default)]
pub enum ConnectionState {
    /// No signer
    #[default]
    Disconnected,
    /// A signer is being opened
    Connecting,
    /// The signer is active
    Connected(Arc<ActiveSigner>),
    /// The last attempt failed with this message
    Failed(String),
}

impl ConnectionState {
    /// Whether a signer is active
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected(_))
    }
}

/// A client for a HyperSDK chain, holding at most one active signer.
///
/// ```no_run
/// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// use hypersdk_client::{ClientConfig, HyperClient, SignerParams};
///
/// let client = HyperClient::new(ClientConfig::development())?;
/// let mut events = client.subscribe();
///
/// client.connect(SignerParams::Ephemeral).await?;
/// assert!(events.recv().await?.signer().is_some());
///
/// let action = client.transfer_action("morpheus1qqds", "1.5", "thanks")?;
/// let reply = client.send_transaction(vec![action]).await?;
/// # Ok(())
/// # }
/// ```
pub struct HyperClient<P = Http> {
    config: ClientConfig,
    provider: Provider<P>,
    builder: TransactionBuilder<P>,
    encoder: Arc<dyn TxEncoder>,
    wallet_connector: Option<Arc<dyn WalletConnector>>,
    wallet_cache: Arc<ProviderCache>,
    faucet: Option<Faucet>,
    state: RwLock<ConnectionState>,
    events: broadcast::Sender<ConnectivityEvent>,
}

impl HyperClient<Http> {
    /// Creates a client talking HTTP to the node named in `config`
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let http = Http::for_chain(&config.api_host, &config.vm_name)?
            .timeout(config.request_timeout);
        Ok(Self::new_with_provider(Provider::new(http), config))
    }
}

impl<P: JsonRpcClient + Clone> HyperClient<P> {
    /// Creates a client on top of an existing provider. The VM namespace of the provider is
    /// taken from `config`.
    pub fn new_with_provider(provider: Provider<P>, config: ClientConfig) -> Self {
        let provider = provider.with_vm(config.vm_name.clone(), config.vm_rpc_prefix.clone());
        let builder = TransactionBuilder::new(provider.clone()).max_fee(config.max_fee);
        let faucet =
            config.faucet_host.as_deref().map(|host| Faucet::new(host).timeout(config.request_timeout));
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            config,
            provider,
            builder,
            encoder: Arc::new(JsonEncoder),
            wallet_connector: None,
            wallet_cache: ProviderCache::global(),
            faucet,
            state: RwLock::new(ConnectionState::Disconnected),
            events,
        }
    }
}

impl<P: JsonRpcClient> HyperClient<P> {
    /// Sets the encoder local signers and simulations turn payloads into bytes with
    #[must_use]
    pub fn with_encoder<E: TxEncoder + 'static>(mut self, encoder: E) -> Self {
        self.encoder = Arc::new(encoder);
        self
    }

    /// Sets how `metamask-snap` signers reach the wallet host
    #[must_use]
    pub fn with_wallet_connector(mut self, connector: Arc<dyn WalletConnector>) -> Self {
        self.wallet_connector = Some(connector);
        self
    }

    /// Replaces the process wide wallet provider cache
    #[must_use]
    pub fn with_provider_cache(mut self, cache: Arc<ProviderCache>) -> Self {
        self.wallet_cache = cache;
        self
    }

    /// The client's settings
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The provider used for every node call
    pub fn provider(&self) -> &Provider<P> {
        &self.provider
    }

    /// The payload builder
    pub fn transaction_builder(&self) -> &TransactionBuilder<P> {
        &self.builder
    }

    ////// Signer lifecycle

    /// Subscribes to connectivity changes. Subscribers see every event sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ConnectivityEvent> {
        self.events.subscribe()
    }

    /// The current state of the signer
    pub async fn connection_state(&self) -> ConnectionState {
        self.state.read().await.clone()
    }

    /// The active signer, if any
    pub async fn active_signer(&self) -> Option<Arc<ActiveSigner>> {
        match &*self.state.read().await {
            ConnectionState::Connected(signer) => Some(signer.clone()),
            _ => None,
        }
    }

    /// Parses `params` and connects the signer they select
    pub async fn connect_json(&self, params: Value) -> Result<Arc<ActiveSigner>, ClientError> {
        self.connect(SignerParams::try_from(params)?).await
    }

    /// Opens and connects the signer selected by `params`, making it the active signer.
    ///
    /// The previous signer is dropped, even if the new one fails to connect.
    pub async fn connect(&self, params: SignerParams) -> Result<Arc<ActiveSigner>, ClientError> {
        let signer_type = params.signer_type();
        let previous = std::mem::replace(&mut *self.state.write().await, ConnectionState::Connecting);

        match self.open_signer(params).await {
            Ok(signer) => {
                let signer = Arc::new(signer);
                *self.state.write().await = ConnectionState::Connected(signer.clone());
                info!(signer = signer_type, "signer connected");
                self.events.send(ConnectivityEvent::Connected(signer.clone())).ok();
                Ok(signer)
            }
            Err(err) => {
                *self.state.write().await = ConnectionState::Failed(err.to_string());
                warn!(signer = signer_type, %err, "failed to connect signer");
                if previous.is_connected() {
                    self.events.send(ConnectivityEvent::Disconnected).ok();
                }
                Err(err)
            }
        }
    }

    async fn open_signer(&self, params: SignerParams) -> Result<ActiveSigner, ClientError> {
        let signer: ActiveSigner = match params {
            SignerParams::Ephemeral => EphemeralSigner::new().with_encoder(self.encoder.clone()).into(),
            SignerParams::PrivateKey { private_key } => {
                PrivateKeySigner::new(private_key)?.with_encoder(self.encoder.clone()).into()
            }
            SignerParams::MetamaskSnap { snap_id, use_local_snap, .. } => {
                let connector = self.wallet_connector.clone().ok_or(ClientError::NoWalletHost)?;
                ExternalWalletSigner::new(connector)
                    .snap_id(snap_id.unwrap_or_else(|| self.config.snap_id.clone()))
                    .force_install(use_local_snap)
                    .provider_cache(self.wallet_cache.clone())
                    .into()
            }
        };
        signer.connect().await?;
        Ok(signer)
    }

    /// Drops the active signer
    pub async fn disconnect(&self) {
        let previous =
            std::mem::replace(&mut *self.state.write().await, ConnectionState::Disconnected);
        if previous.is_connected() {
            info!("signer disconnected");
            self.events.send(ConnectivityEvent::Disconnected).ok();
        }
    }

    ////// Transactions

    /// Builds, signs and submits a transaction executing `actions`
    pub async fn send_transaction(
        &self,
        actions: Vec<Action>,
    ) -> Result<Option<SubmitTxReply>, ClientError> {
        let signer = self.active_signer().await.ok_or(ClientError::NotConnected)?;

        let payload = self.builder.build(actions).await?;
        let abi = self.provider.abi().await?;
        let signed = signer.sign_transaction(&payload, &abi).await?;

        debug!(
            signer = signer.signer_type(),
            actions = payload.actions.len(),
            bytes = signed.len(),
            "submitting transaction"
        );
        Ok(self.provider.submit_tx(signed).await?)
    }

    /// Evaluates `action` as `actor` without signing or submitting anything.
    ///
    /// Uses the cached ABI when there is one, but never fills the cache.
    pub async fn simulate(&self, action: &Action, actor: &str) -> Result<Value, ClientError> {
        let abi = match self.provider.cached_abi().await {
            Some(abi) => abi,
            None => self.provider.fetch_abi().await?,
        };
        let encoded = self.encoder.encode_action(action, &abi)?;
        Ok(self.provider.simulate_actions(&[encoded], actor).await?)
    }

    ////// Chain data

    /// The network the chain belongs to
    pub async fn network(&self) -> Result<NetworkInfo, ClientError> {
        Ok(self.provider.network().await?)
    }

    /// The VM's ABI
    pub async fn abi(&self) -> Result<Abi, ClientError> {
        Ok(self.provider.abi().await?)
    }

    /// The balance of `address` in base units
    pub async fn balance(&self, address: &str) -> Result<U256, ClientError> {
        Ok(self.provider.balance(address).await?)
    }

    /// Streams newly accepted blocks
    pub fn watch_blocks(&self) -> BlockWatcher<'_, P> {
        self.provider.watch_blocks()
    }

    ////// Balances

    /// Formats base units with the configured decimals, e.g. `1.500000000`
    pub fn format_balance(&self, amount: U256) -> Result<String, ClientError> {
        Ok(format_balance(amount, self.config.decimals)?)
    }

    /// Converts a display string into base units, with the float-mediated precision of
    /// [`parse_balance`]
    pub fn parse_balance(&self, balance: &str) -> Result<U256, ClientError> {
        Ok(parse_balance(balance, self.config.decimals)?)
    }

    /// Converts a display string into base units exactly
    pub fn parse_balance_exact(&self, balance: &str) -> Result<U256, ClientError> {
        Ok(parse_balance_exact(balance, self.config.decimals)?)
    }

    /// A `Transfer` of `amount` (a display string) to `to`, the memo travels base64 encoded
    pub fn transfer_action(&self, to: &str, amount: &str, memo: &str) -> Result<Action, ClientError> {
        let value = self.parse_balance(amount)?;
        let data = json!({ "to": to, "value": value.to_string(), "memo": STANDARD.encode(memo) });
        Ok(Action::new("Transfer", data)?)
    }

    /// Asks the configured faucet to fund `address`, retrying on failure
    pub async fn request_faucet_transfer(&self, address: &str) -> Result<(), ClientError> {
        let faucet = self.faucet.as_ref().ok_or(ClientError::NoFaucet)?;
        Ok(faucet.request_transfer_with_retry(address, DEFAULT_FAUCET_ATTEMPTS).await?)
    }
}

impl<P: fmt::Debug> fmt::Debug for HyperClient<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HyperClient")
            .field("config", &self.config)
            .field("provider", &self.provider)
            .field("encoder", &self.encoder)
            .field("wallet_connector", &self.wallet_connector.is_some())
            .field("faucet", &self.faucet)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hypersdk_core::ErrorKind;
    use hypersdk_providers::MockProvider;

    fn client() -> (HyperClient<MockProvider>, MockProvider) {
        let (provider, mock) = Provider::mocked();
        (HyperClient::new_with_provider(provider, ClientConfig::default()), mock)
    }

    #[tokio::test]
    async fn send_requires_a_signer() {
        let (client, mock) = client();
        let err = client.send_transaction(vec![]).await.unwrap_err();
        assert_eq!(err.to_string(), "Signer not connected");
        assert_eq!(err.kind(), ErrorKind::State);
        assert_eq!(mock.pending_requests(), 0);
    }

    #[tokio::test]
    async fn bogus_signer_type() {
        let (client, _) = client();
        let err = client.connect_json(json!({ "type": "bogus" })).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("\"bogus\""));
        assert!(!client.connection_state().await.is_connected());
    }

    #[tokio::test]
    async fn short_secret_fails_validation() {
        let (client, _) = client();
        let err = client.connect(SignerParams::private_key([1u8; 31])).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(matches!(client.connection_state().await, ConnectionState::Failed(_)));
    }

    #[tokio::test]
    async fn snap_signer_needs_a_wallet_host() {
        let (client, _) = client();
        let err = client.connect(SignerParams::metamask_snap()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connection);
    }

    #[tokio::test]
    async fn balances_use_configured_decimals() {
        let (provider, _) = Provider::mocked();
        let client = HyperClient::new_with_provider(provider, ClientConfig::default().decimals(6));
        let amount = client.parse_balance("1.5").unwrap();
        assert_eq!(amount, U256::from(1_500_000));
        assert_eq!(client.format_balance(amount).unwrap(), "1.500000");
        assert!(client.parse_balance_exact("1.0000001").is_err());
    }

    #[tokio::test]
    async fn out_of_range_decimals_fail_instead_of_panicking() {
        let config = ClientConfig::default().decimals(80);
        let err = HyperClient::new(config.clone()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let (provider, _) = Provider::mocked();
        let client = HyperClient::new_with_provider(provider, config);
        assert_eq!(client.format_balance(U256::one()).unwrap_err().kind(), ErrorKind::Validation);
        assert!(client.transfer_action("morpheus1abc", "1", "").is_err());
    }

    #[tokio::test]
    async fn transfer_action() {
        let (client, _) = client();
        let action = client.transfer_action("morpheus1abc", "2", "hi").unwrap();
        assert_eq!(action.name, "Transfer");
        assert_eq!(action.get("value"), Some(&json!("2000000000")));
        assert_eq!(action.get("memo"), Some(&json!("aGk=")));
        assert_eq!(action.get("to"), Some(&json!("morpheus1abc")));
    }

    #[tokio::test]
    async fn faucet_must_be_configured() {
        let (client, _) = client();
        let err = client.request_faucet_transfer("morpheus1abc").await.unwrap_err();
        assert!(matches!(err, ClientError::NoFaucet));
    }
}
