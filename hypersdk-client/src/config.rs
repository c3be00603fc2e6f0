use crate::{ClientError, DEFAULT_MAX_FEE};
use hypersdk_core::utils::MAX_DECIMALS;
use hypersdk_providers::DEFAULT_REQUEST_TIMEOUT;
use hypersdk_signers::DEFAULT_SNAP_ID;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where a local node serves its API
pub const DEFAULT_API_HOST: &str = "http://localhost:9650";
/// Where the development faucet listens
pub const DEFAULT_FAUCET_HOST: &str = "http://localhost:8765";
/// The VM deployed on development networks
pub const DEFAULT_VM_NAME: &str = "morpheusvm";
/// The path the default VM serves its API on
pub const DEFAULT_VM_RPC_PREFIX: &str = "morpheusapi";
/// The decimals of the default VM's native coin
pub const DEFAULT_DECIMALS: u32 = 9;

/// Settings of a [`HyperClient`](crate::HyperClient).
///
/// ```
/// use hypersdk_client::ClientConfig;
///
/// let config = ClientConfig::default()
///     .api_host("http://10.0.0.2:9650")
///     .vm("tokenvm", "/tokenapi")
///     .decimals(6);
/// assert_eq!(config.vm_rpc_prefix, "tokenapi");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    /// Base url of the node, e.g. `http://localhost:9650`
    pub api_host: String,
    /// Name of the deployed VM, used as the prefix of its methods
    pub vm_name: String,
    /// Path the VM serves its API on
    pub vm_rpc_prefix: String,
    /// Decimals of the chain's balances, at most [`MAX_DECIMALS`]
    #[serde(deserialize_with = "deserialize_decimals")]
    pub decimals: u32,
    /// Fee ceiling of every transaction.
    ///
    /// No fee estimation is available, so this is a conservative constant rather than a
    /// prediction.
    pub max_fee: u64,
    /// Deadline of a single request
    #[serde(rename = "requestTimeoutMs", with = "millis")]
    pub request_timeout: Duration,
    /// Base url of the faucet, if any
    pub faucet_host: Option<String>,
    /// The snap used by `metamask-snap` signers which do not name one
    pub snap_id: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_host: DEFAULT_API_HOST.to_owned(),
            vm_name: DEFAULT_VM_NAME.to_owned(),
            vm_rpc_prefix: DEFAULT_VM_RPC_PREFIX.to_owned(),
            decimals: DEFAULT_DECIMALS,
            max_fee: DEFAULT_MAX_FEE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            faucet_host: None,
            snap_id: DEFAULT_SNAP_ID.to_owned(),
        }
    }
}

impl ClientConfig {
    /// The defaults, plus the faucet of a local development network
    pub fn development() -> Self {
        Self::default().faucet_host(DEFAULT_FAUCET_HOST)
    }

    /// Overlays the `HYPERSDK_*` environment variables on the defaults.
    ///
    /// Reads `HYPERSDK_API_HOST`, `HYPERSDK_VM_NAME`, `HYPERSDK_VM_RPC_PREFIX`,
    /// `HYPERSDK_DECIMALS` and `HYPERSDK_FAUCET_HOST`.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Like [`ClientConfig::from_env`], reading the variables through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(host) = lookup("HYPERSDK_API_HOST") {
            config = config.api_host(host);
        }
        let vm_name = lookup("HYPERSDK_VM_NAME");
        let rpc_prefix = lookup("HYPERSDK_VM_RPC_PREFIX");
        if vm_name.is_some() || rpc_prefix.is_some() {
            let vm_name = vm_name.unwrap_or(config.vm_name.clone());
            let rpc_prefix = rpc_prefix.unwrap_or(config.vm_rpc_prefix.clone());
            config = config.vm(vm_name, rpc_prefix);
        }
        if let Some(decimals) = lookup("HYPERSDK_DECIMALS") {
            match decimals.trim().parse() {
                Ok(parsed) if parsed <= MAX_DECIMALS => config = config.decimals(parsed),
                _ => {
                    return Err(ClientError::InvalidConfig { var: "HYPERSDK_DECIMALS", value: decimals })
                }
            }
        }
        if let Some(host) = lookup("HYPERSDK_FAUCET_HOST") {
            config = config.faucet_host(host);
        }
        Ok(config)
    }

    /// Checks the settings no builder method can reject
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.decimals > MAX_DECIMALS {
            return Err(ClientError::InvalidConfig { var: "decimals", value: self.decimals.to_string() })
        }
        Ok(())
    }

    /// Sets the node's base url
    #[must_use]
    pub fn api_host(mut self, api_host: impl Into<String>) -> Self {
        self.api_host = api_host.into();
        self
    }

    /// Sets the VM name and the path of its API. A leading `/` of the path is ignored.
    #[must_use]
    pub fn vm(mut self, vm_name: impl Into<String>, rpc_prefix: impl Into<String>) -> Self {
        let rpc_prefix = rpc_prefix.into();
        self.vm_name = vm_name.into();
        self.vm_rpc_prefix = rpc_prefix.strip_prefix('/').unwrap_or(&rpc_prefix).to_owned();
        self
    }

    /// Sets the balance decimals
    #[must_use]
    pub fn decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals;
        self
    }

    /// Sets the fee ceiling of every transaction
    #[must_use]
    pub fn max_fee(mut self, max_fee: u64) -> Self {
        self.max_fee = max_fee;
        self
    }

    /// Sets the deadline of a single request
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the faucet's base url
    #[must_use]
    pub fn faucet_host(mut self, faucet_host: impl Into<String>) -> Self {
        self.faucet_host = Some(faucet_host.into());
        self
    }

    /// Sets the default snap of `metamask-snap` signers
    #[must_use]
    pub fn snap_id(mut self, snap_id: impl Into<String>) -> Self {
        self.snap_id = snap_id.into();
        self
    }
}

fn deserialize_decimals<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let decimals = u32::deserialize(deserializer)?;
    if decimals > MAX_DECIMALS {
        return Err(serde::de::Error::custom(format!(
            "decimals must be at most {MAX_DECIMALS}, got {decimals}"
        )))
    }
    Ok(decimals)
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub(super) fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
