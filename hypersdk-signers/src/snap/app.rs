use super::{
    provider::{ProviderCache, WalletConnector, WalletProvider},
    types::*,
};
use crate::{Signer, SignerError};
use async_trait::async_trait;
use hypersdk_core::{
    abi::Abi,
    types::{Bytes, PublicKey, TransactionPayload},
};
use once_cell::sync::OnceCell;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
};
use tracing::{debug, error, info};

/// Delegates signing to a HyperSDK snap running inside the user's wallet.
///
/// `connect()` walks the [`SnapState`] flow: it checks that the host runs development snaps,
/// installs the snap if needed and caches its public key. Signing is an invoke call into the
/// snap; the secret never leaves the wallet.
///
/// ```no_run
/// # use hypersdk_signers::{ExternalWalletSigner, Signer, WalletConnector};
/// # async fn foo(connector: std::sync::Arc<dyn WalletConnector>) -> Result<(), Box<dyn std::error::Error>> {
/// let signer = ExternalWalletSigner::new(connector);
/// signer.connect().await?;
/// let public_key = signer.public_key()?;
/// # Ok(())
/// # }
/// ```
pub struct ExternalWalletSigner {
    snap_id: String,
    force_install: bool,
    connector: Arc<dyn WalletConnector>,
    cache: Arc<ProviderCache>,
    state: Mutex<SnapState>,
    // serializes connection attempts
    connecting: tokio::sync::Mutex<()>,
    public_key: OnceCell<PublicKey>,
}

impl ExternalWalletSigner {
    /// Creates a signer for the default snap, sharing the process wide provider cache
    pub fn new(connector: Arc<dyn WalletConnector>) -> Self {
        Self {
            snap_id: DEFAULT_SNAP_ID.to_owned(),
            force_install: false,
            connector,
            cache: ProviderCache::global(),
            state: Mutex::new(SnapState::Disconnected),
            connecting: tokio::sync::Mutex::new(()),
            public_key: OnceCell::new(),
        }
    }

    /// Sets the snap to connect to
    #[must_use]
    pub fn snap_id(mut self, snap_id: impl Into<String>) -> Self {
        self.snap_id = snap_id.into();
        self
    }

    /// Always run the install round-trip, as is needed for snaps served by a local dev server
    #[must_use]
    pub fn force_install(mut self, force: bool) -> Self {
        self.force_install = force;
        self
    }

    /// Uses `cache` instead of the process wide provider cache
    #[must_use]
    pub fn provider_cache(mut self, cache: Arc<ProviderCache>) -> Self {
        self.cache = cache;
        self
    }

    /// The configured snap id
    pub fn id(&self) -> &str {
        &self.snap_id
    }

    /// The current state of the connection flow
    pub fn state(&self) -> SnapState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: SnapState) {
        let mut current = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let from = *current;
        if from != state {
            debug!(snap_id = %self.snap_id, %from, to = %state, "snap state");
            *current = state;
        }
    }

    fn needs_install(&self) -> bool {
        self.force_install || self.snap_id.starts_with(LOCAL_SNAP_PREFIX)
    }

    /// Runs one transition of the connection flow
    async fn step(
        &self,
        provider: &dyn WalletProvider,
        state: SnapState,
    ) -> Result<SnapState, SignerError> {
        let next = match state {
            SnapState::Disconnected | SnapState::InstallFailed | SnapState::NoPublicKey => {
                SnapState::CheckingHost
            }
            SnapState::CheckingHost => {
                let version = provider.request(methods::CLIENT_VERSION, None).await?;
                let version = version.as_str().unwrap_or_default().to_owned();
                if version.to_lowercase().contains(FLASK_MARKER) {
                    SnapState::HostOk
                } else {
                    self.set_state(SnapState::Incompatible);
                    return Err(SignerError::IncompatibleHost { version })
                }
            }
            SnapState::Incompatible => {
                return Err(SignerError::IncompatibleHost { version: String::new() })
            }
            SnapState::HostOk => SnapState::CheckingSandboxPresence,
            SnapState::CheckingSandboxPresence => {
                if self.needs_install() || !self.is_installed(provider).await? {
                    SnapState::Installing
                } else {
                    SnapState::AlreadyInstalled
                }
            }
            SnapState::Installing => {
                info!(snap_id = %self.snap_id, "installing snap");
                let mut request = Map::new();
                request.insert(self.snap_id.clone(), json!({}));
                provider.request(methods::REQUEST_SNAPS, Some(Value::Object(request))).await?;

                if self.is_installed(provider).await? {
                    SnapState::Installed
                } else {
                    error!(snap_id = %self.snap_id, "snap missing after install");
                    self.set_state(SnapState::InstallFailed);
                    return Err(SignerError::InstallFailed(self.snap_id.clone()))
                }
            }
            SnapState::Installed | SnapState::AlreadyInstalled => SnapState::FetchingPublicKey,
            SnapState::FetchingPublicKey => {
                let reply = self.invoke(provider, snap_methods::GET_PUBLIC_KEY, &json!({})).await?;
                match reply.as_str().filter(|key| !key.is_empty()) {
                    Some(encoded) => {
                        let raw = bs58::decode(encoded).into_vec()?;
                        let key = PublicKey::try_from(raw.as_slice())
                            .map_err(|_| SignerError::InvalidPublicKey(raw.len()))?;
                        // a concurrent attempt cannot have won, `connecting` is held
                        let _ = self.public_key.set(key);
                        SnapState::Connected
                    }
                    None => {
                        self.set_state(SnapState::NoPublicKey);
                        return Err(SignerError::NoPublicKey)
                    }
                }
            }
            SnapState::Connected => SnapState::Connected,
        };
        Ok(next)
    }

    async fn is_installed(&self, provider: &dyn WalletProvider) -> Result<bool, SignerError> {
        let snaps = provider.request(methods::GET_SNAPS, None).await?;
        Ok(snaps.get(&self.snap_id).is_some())
    }

    /// Invokes a snap method.
    ///
    /// The parameters are serialized before anything is sent, so that data the snap would fail
    /// to deserialize is rejected here with a precise error.
    async fn invoke<P: Serialize + ?Sized>(
        &self,
        provider: &dyn WalletProvider,
        method: &str,
        params: &P,
    ) -> Result<Value, SignerError> {
        let params = serde_json::to_value(params).map_err(SignerError::Unserializable)?;
        let request = json!({
            "snapId": self.snap_id,
            "request": { "method": method, "params": params },
        });
        Ok(provider.request(methods::INVOKE_SNAP, Some(request)).await?)
    }

    async fn provider(&self) -> Result<Arc<dyn WalletProvider>, SignerError> {
        Ok(self.cache.get_or_connect(self.connector.as_ref()).await?)
    }
}

#[async_trait]
impl Signer for ExternalWalletSigner {
    type Error = SignerError;

    async fn connect(&self) -> Result<(), Self::Error> {
        if self.public_key.get().is_some() {
            return Ok(())
        }
        let _guard = self.connecting.lock().await;
        if self.public_key.get().is_some() {
            return Ok(())
        }

        // an incompatible host stays incompatible
        if self.state() == SnapState::Incompatible {
            return Err(SignerError::IncompatibleHost { version: String::new() })
        }

        let provider = self.provider().await?;
        let mut state = SnapState::Disconnected;
        while state != SnapState::Connected {
            match self.step(provider.as_ref(), state).await {
                Ok(next) => {
                    self.set_state(next);
                    state = next;
                }
                Err(err) => {
                    // host errors interrupt the flow without reaching a terminal state
                    if !self.state().is_failure() {
                        self.set_state(SnapState::Disconnected);
                    }
                    return Err(err)
                }
            }
        }
        Ok(())
    }

    fn public_key(&self) -> Result<PublicKey, Self::Error> {
        self.public_key.get().copied().ok_or(SignerError::NotConnected)
    }

    async fn sign_transaction(
        &self,
        payload: &TransactionPayload,
        abi: &Abi,
    ) -> Result<Bytes, Self::Error> {
        if self.public_key.get().is_none() {
            return Err(SignerError::NotConnected)
        }
        let provider = self.provider().await?;

        #[derive(Serialize)]
        struct SignRequest<'a> {
            abi: &'a Abi,
            tx: &'a TransactionPayload,
        }
        let reply = self
            .invoke(
                provider.as_ref(),
                snap_methods::SIGN_TRANSACTION,
                &SignRequest { abi, tx: payload },
            )
            .await?;

        let encoded = reply.as_str().filter(|s| !s.is_empty()).ok_or(SignerError::NoSignature)?;
        Ok(bs58::decode(encoded).into_vec()?.into())
    }
}

impl fmt::Debug for ExternalWalletSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalWalletSigner")
            .field("snap_id", &self.snap_id)
            .field("force_install", &self.force_install)
            .field("state", &self.state())
            .field("public_key", &self.public_key.get().map(hex::encode))
            .finish()
    }
}
