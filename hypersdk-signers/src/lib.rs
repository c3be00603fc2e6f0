#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_debug_implementations, rust_2018_idioms, unreachable_pub)]
//! Provides a unified interface for signing HyperSDK transactions.
//!
//! You can implement the `Signer` trait to extend functionality to other signers
//! such as hardware wallets or remote key services.
//!
//! Signers return the submittable signed transaction: the encoded payload followed by the
//! signer's auth section. Submitting those bytes is the job of the provider.
//!
//! Supported signers:
//! - Ephemeral in-memory key
//! - Private key
//! - External wallet (a MetaMask snap sandbox)
//!
//! ```no_run
//! use hypersdk_core::{abi::Abi, types::{Action, TransactionPayload, U256}};
//! use hypersdk_signers::{PrivateKeySigner, Signer};
//! use serde_json::json;
//!
//! # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! // instantiate the signer
//! let signer = "323b1d8f4eed5f0da9da93071b034f2dce9d2d22692c172f3cb252a64ddfafd0"
//!     .parse::<PrivateKeySigner>()?;
//!
//! // create a payload
//! let action = Action::new("Transfer", json!({ "to": "morpheus1...", "value": "1000" }))?;
//! let payload = TransactionPayload::new(1717111222000, U256::one(), 10_000_000, vec![action]);
//!
//! // sign it
//! let signed = signer.sign_transaction(&payload, &Abi::new("{}")).await?;
//! # Ok(())
//! # }
//! ```
mod wallet;
pub use wallet::{EphemeralSigner, PrivateKeySigner, Wallet, ED25519_AUTH_ID, SIGNATURE_LEN};

pub mod snap;
pub use snap::{
    ExternalWalletSigner, ProviderCache, SnapState, WalletConnector, WalletProvider,
    WalletProviderError, DEFAULT_SNAP_ID,
};

mod error;
pub use error::SignerError;

use async_trait::async_trait;
use hypersdk_core::{
    abi::Abi,
    types::{Bytes, PublicKey, TransactionPayload},
};
use std::error::Error;

/// Trait for signing transaction payloads
///
/// Implement this trait to support different signing modes, e.g. hardware wallets, hosted etc.
#[async_trait]
pub trait Signer: std::fmt::Debug + Send + Sync {
    type Error: Error + Send + Sync;

    /// Makes the signer ready to sign.
    ///
    /// Local signers are ready from construction and return immediately. Calling this on an
    /// already connected signer is a no-op.
    async fn connect(&self) -> Result<(), Self::Error>;

    /// Returns the signer's ed25519 public key.
    ///
    /// Fails until [`Signer::connect`] has succeeded. Once known the key never changes.
    fn public_key(&self) -> Result<PublicKey, Self::Error>;

    /// Signs the payload, returning the signed transaction bytes
    async fn sign_transaction(
        &self,
        payload: &TransactionPayload,
        abi: &Abi,
    ) -> Result<Bytes, Self::Error>;
}
