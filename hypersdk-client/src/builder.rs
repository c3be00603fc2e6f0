use crate::ClientError;
use hypersdk_core::{
    types::{Action, TransactionPayload, U256},
    utils::{cb58, now_millis},
};
use hypersdk_providers::{JsonRpcClient, Provider};

/// Fee ceiling used when none is configured.
///
/// There is no fee estimation yet, so every transaction offers this much.
pub const DEFAULT_MAX_FEE: u64 = 10_000_000;

/// Assembles signable payloads.
///
/// The chain id comes from the provider's cached network metadata, the expiry is set
/// [`TX_LOOKAHEAD`](hypersdk_core::types::TX_LOOKAHEAD) into the future and the fee is the
/// configured ceiling.
///
/// ```
/// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// use hypersdk_client::TransactionBuilder;
/// use hypersdk_core::types::Action;
/// use hypersdk_providers::Provider;
/// use serde_json::json;
///
/// let (provider, mock) = Provider::mocked();
/// mock.push(json!({
///     "networkId": 1337,
///     "subnetId": "2eNy1mUFdmaxXNj1eQHUe7Np4gju9sJsEtWQ4MX3ToiNKuADed",
///     "chainId": "2c7iUW3kCDwRA9ZFd5bjZZc8iDy68uAsFSBahjqSZGttiTDSNH",
/// }))?;
///
/// let builder = TransactionBuilder::new(provider);
/// let payload = builder.build(vec![Action::new("Transfer", json!({ "value": "1" }))?]).await?;
/// assert_eq!(payload.max_fee, 10_000_000);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct TransactionBuilder<P> {
    provider: Provider<P>,
    max_fee: u64,
}

impl<P: JsonRpcClient> TransactionBuilder<P> {
    /// Creates a builder reading the network metadata through `provider`
    pub fn new(provider: Provider<P>) -> Self {
        Self { provider, max_fee: DEFAULT_MAX_FEE }
    }

    /// Sets the fee ceiling
    #[must_use]
    pub fn max_fee(mut self, max_fee: u64) -> Self {
        self.max_fee = max_fee;
        self
    }

    /// The fee ceiling of built payloads
    pub fn get_max_fee(&self) -> u64 {
        self.max_fee
    }

    /// The chain id as an integer, decoded from the cb58 id reported by the node
    pub async fn chain_id(&self) -> Result<U256, ClientError> {
        let network = self.provider.network().await?;
        Ok(cb58::id_to_u256(&network.chain_id)?)
    }

    /// Builds a payload expiring shortly after now
    pub async fn build(&self, actions: Vec<Action>) -> Result<TransactionPayload, ClientError> {
        self.build_at(now_millis(), actions).await
    }

    /// Builds a payload as if the current time were `now_ms`
    pub async fn build_at(
        &self,
        now_ms: u64,
        actions: Vec<Action>,
    ) -> Result<TransactionPayload, ClientError> {
        let chain_id = self.chain_id().await?;
        Ok(TransactionPayload::expiring_after(now_ms, chain_id, self.max_fee, actions))
    }
}
