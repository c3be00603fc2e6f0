//! A signer backed by a caller supplied ed25519 secret
use super::Wallet;
use crate::{Signer, SignerError};
use async_trait::async_trait;
use hypersdk_core::{
    abi::{Abi, TxEncoder},
    types::{Bytes, PublicKey, TransactionPayload},
};
use std::str::FromStr;

/// Signs with a raw 32 byte secret.
///
/// The public key is derived from the secret on construction, so the signer is connected from
/// the start and [`Signer::connect`] does nothing.
///
/// ```
/// use hypersdk_signers::{PrivateKeySigner, Signer};
///
/// let signer = PrivateKeySigner::new([7u8; 32]).unwrap();
/// assert_eq!(signer.public_key().unwrap(), signer.public_key().unwrap());
///
/// assert!(PrivateKeySigner::new([7u8; 31]).is_err());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PrivateKeySigner {
    wallet: Wallet,
}

impl PrivateKeySigner {
    /// Creates the signer, failing unless `secret` is exactly 32 bytes
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, SignerError> {
        Ok(Self { wallet: Wallet::from_secret(secret.as_ref())? })
    }

    /// Sets the encoder used to turn payloads into signing bytes
    pub fn with_encoder<E: TxEncoder + 'static>(self, encoder: E) -> Self {
        Self { wallet: self.wallet.with_encoder(encoder) }
    }

    /// Gets the underlying wallet
    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }
}

impl From<Wallet> for PrivateKeySigner {
    fn from(wallet: Wallet) -> Self {
        Self { wallet }
    }
}

impl FromStr for PrivateKeySigner {
    type Err = SignerError;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let src = src.strip_prefix("0x").unwrap_or(src);
        let secret = hex::decode(src)?;
        Self::new(secret)
    }
}

#[async_trait]
impl Signer for PrivateKeySigner {
    type Error = SignerError;

    async fn connect(&self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn public_key(&self) -> Result<PublicKey, Self::Error> {
        Ok(self.wallet.public_key())
    }

    async fn sign_transaction(
        &self,
        payload: &TransactionPayload,
        abi: &Abi,
    ) -> Result<Bytes, Self::Error> {
        self.wallet.sign_payload(payload, abi)
    }
}
