//! Signing through a snap sandbox hosted by the user's wallet
pub mod app;
pub mod mock;
pub mod provider;
pub mod types;

pub use app::ExternalWalletSigner;
pub use provider::{ProviderCache, WalletConnector, WalletProvider, WalletProviderError};
pub use types::{SnapState, DEFAULT_SNAP_ID};

#[cfg(test)]
mod tests {
    use super::{mock::*, *};
    use crate::{Signer, SignerError};
    use hypersdk_core::{
        abi::Abi,
        types::{Action, TransactionPayload, U256},
        ErrorKind,
    };
    use serde_json::json;
    use std::sync::Arc;
    use tracing_test::traced_test;

    const KEY: [u8; 32] = [9u8; 32];

    fn flask() -> MockWalletProvider {
        let host = MockWalletProvider::new();
        host.push("web3_clientVersion", json!("MetaMask/v11.3.0-flask.0"));
        host
    }

    fn signer(host: &MockWalletProvider) -> (ExternalWalletSigner, MockConnector) {
        let connector = MockConnector::new(host.clone());
        let signer = ExternalWalletSigner::new(Arc::new(connector.clone()))
            .provider_cache(Arc::new(ProviderCache::new()));
        (signer, connector)
    }

    fn installed() -> serde_json::Value {
        json!({ DEFAULT_SNAP_ID: { "id": DEFAULT_SNAP_ID, "enabled": true } })
    }

    #[tokio::test]
    async fn public_key_requires_connect() {
        let (signer, _) = signer(&flask());
        let err = signer.public_key().unwrap_err();
        assert!(matches!(err, SignerError::NotConnected));
        assert_eq!(err.kind(), ErrorKind::State);

        let payload = TransactionPayload::new(0, U256::one(), 0, vec![]);
        let err = signer.sign_transaction(&payload, &Abi::default()).await.unwrap_err();
        assert!(matches!(err, SignerError::NotConnected));
    }

    #[tokio::test]
    async fn connects_to_installed_snap() {
        let host = flask();
        host.push("wallet_getSnaps", installed());
        host.push("wallet_invokeSnap", json!(bs58::encode(KEY).into_string()));

        let (signer, connector) = signer(&host);
        signer.connect().await.unwrap();
        assert_eq!(signer.state(), SnapState::Connected);
        assert_eq!(signer.public_key().unwrap(), KEY);
        assert!(host.requests_for("wallet_requestSnaps").is_empty());

        let invoke = host.requests_for("wallet_invokeSnap");
        assert_eq!(
            invoke[0],
            Some(json!({
                "snapId": DEFAULT_SNAP_ID,
                "request": { "method": "getPublicKey", "params": {} },
            }))
        );

        // connected signers do not talk to the host again
        signer.connect().await.unwrap();
        assert_eq!(host.requests_for("web3_clientVersion").len(), 1);
        assert_eq!(connector.handshakes(), 1);
    }

    #[tokio::test]
    #[traced_test]
    async fn installs_missing_snap() {
        let host = flask();
        host.push("wallet_getSnaps", json!({}));
        host.push("wallet_getSnaps", installed());
        host.push("wallet_requestSnaps", json!({}));
        host.push("wallet_invokeSnap", json!(bs58::encode(KEY).into_string()));

        let (signer, _) = signer(&host);
        signer.connect().await.unwrap();
        assert_eq!(
            host.requests_for("wallet_requestSnaps"),
            vec![Some(json!({ DEFAULT_SNAP_ID: {} }))]
        );
        assert!(logs_contain("installing snap"));
    }

    #[tokio::test]
    async fn local_snaps_are_always_reinstalled() {
        let id = "local:http://localhost:8080";
        let host = flask();
        host.push("wallet_getSnaps", json!({ id: {} }));
        host.push("wallet_requestSnaps", json!({}));
        host.push("wallet_invokeSnap", json!(bs58::encode(KEY).into_string()));

        let (signer, _) = signer(&host);
        let signer = signer.snap_id(id);
        signer.connect().await.unwrap();
        assert_eq!(host.requests_for("wallet_requestSnaps").len(), 1);
    }

    #[tokio::test]
    #[traced_test]
    async fn install_failure_is_reported() {
        let host = flask();
        host.push("wallet_getSnaps", json!({}));
        host.push("wallet_requestSnaps", json!({}));

        let (signer, _) = signer(&host);
        let err = signer.connect().await.unwrap_err();
        assert_eq!(err.to_string(), format!("Failed to install snap {DEFAULT_SNAP_ID}"));
        assert_eq!(err.kind(), ErrorKind::Connection);
        assert_eq!(signer.state(), SnapState::InstallFailed);
        assert!(logs_contain("snap missing after install"));
    }

    #[tokio::test]
    async fn incompatible_host_is_permanent() {
        let host = MockWalletProvider::new();
        host.push("web3_clientVersion", json!("MetaMask/v11.3.0"));

        let (signer, _) = signer(&host);
        let err = signer.connect().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Your client is not compatible with development snaps. Please install MetaMask Flask!"
        );
        assert_eq!(signer.state(), SnapState::Incompatible);

        // no second round-trip
        assert!(signer.connect().await.is_err());
        assert_eq!(host.requests_for("web3_clientVersion").len(), 1);
    }

    #[tokio::test]
    async fn missing_public_key() {
        let host = flask();
        host.push("wallet_getSnaps", installed());
        host.push("wallet_invokeSnap", json!(null));

        let (signer, _) = signer(&host);
        let err = signer.connect().await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to get public key");
        assert_eq!(signer.state(), SnapState::NoPublicKey);
        assert!(signer.public_key().is_err());
    }

    #[tokio::test]
    async fn host_errors_reset_the_flow() {
        let host = MockWalletProvider::new();
        host.push_err("web3_clientVersion", "User rejected the request.");

        let (signer, _) = signer(&host);
        let err = signer.connect().await.unwrap_err();
        assert_eq!(err.to_string(), "User rejected the request.");
        assert_eq!(signer.state(), SnapState::Disconnected);
    }

    #[tokio::test]
    async fn signs_through_the_snap() {
        let host = flask();
        host.push("wallet_getSnaps", installed());
        host.push("wallet_invokeSnap", json!(bs58::encode(KEY).into_string()));
        host.push("wallet_invokeSnap", json!(bs58::encode([1u8, 2, 3]).into_string()));

        let (signer, _) = signer(&host);
        signer.connect().await.unwrap();

        let action = Action::new("Transfer", json!({ "to": "abc", "value": "5" })).unwrap();
        let payload = TransactionPayload::new(1000, U256::from(7), 10, vec![action]);
        let signed = signer.sign_transaction(&payload, &Abi::new("{\"actions\":[]}")).await.unwrap();
        assert_eq!(signed.as_ref(), &[1u8, 2, 3]);

        let invoke = host.requests_for("wallet_invokeSnap");
        let request = invoke[1].as_ref().unwrap();
        assert_eq!(request["request"]["method"], "signTransaction");
        assert_eq!(request["request"]["params"]["abi"], "{\"actions\":[]}");
        assert_eq!(request["request"]["params"]["tx"]["chainId"], "7");
        assert_eq!(request["request"]["params"]["tx"]["actions"][0]["actionName"], "Transfer");
    }

    #[tokio::test]
    async fn empty_signature_is_a_signing_error() {
        let host = flask();
        host.push("wallet_getSnaps", installed());
        host.push("wallet_invokeSnap", json!(bs58::encode(KEY).into_string()));
        host.push("wallet_invokeSnap", json!(""));

        let (signer, _) = signer(&host);
        signer.connect().await.unwrap();
        let payload = TransactionPayload::new(0, U256::one(), 0, vec![]);
        let err = signer.sign_transaction(&payload, &Abi::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to sign transaction");
        assert_eq!(err.kind(), ErrorKind::Signing);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn signers_share_one_handshake() {
        let host = flask();
        host.push("wallet_getSnaps", installed());
        host.push("wallet_invokeSnap", json!(bs58::encode(KEY).into_string()));

        let cache = Arc::new(ProviderCache::new());
        let connector = MockConnector::new(host.clone());
        let tasks = (0..8)
            .map(|_| {
                let signer = ExternalWalletSigner::new(Arc::new(connector.clone()))
                    .provider_cache(cache.clone());
                tokio::spawn(async move { signer.connect().await })
            })
            .collect::<Vec<_>>();
        for task in tasks {
            task.await.unwrap().unwrap();
        }
        assert_eq!(connector.handshakes(), 1);
    }
}
