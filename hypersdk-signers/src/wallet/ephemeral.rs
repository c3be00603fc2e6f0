use super::Wallet;
use crate::{Signer, SignerError};
use async_trait::async_trait;
use hypersdk_core::{
    abi::{Abi, TxEncoder},
    types::{Bytes, PublicKey, TransactionPayload},
};
use rand::{rngs::OsRng, CryptoRng, RngCore};

/// A throwaway key pair that lives only in memory.
///
/// Meant for demos and tests: the secret is generated on construction and cannot be exported.
#[derive(Clone, Debug)]
pub struct EphemeralSigner {
    wallet: Wallet,
}

impl EphemeralSigner {
    /// Generates a fresh key pair from the operating system's RNG
    pub fn new() -> Self {
        Self::from_rng(&mut OsRng)
    }

    /// Generates a fresh key pair from the provided RNG
    pub fn from_rng<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self { wallet: Wallet::new(rng) }
    }

    /// Sets the encoder used to turn payloads into signing bytes
    pub fn with_encoder<E: TxEncoder + 'static>(self, encoder: E) -> Self {
        Self { wallet: self.wallet.with_encoder(encoder) }
    }
}

impl Default for EphemeralSigner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Signer for EphemeralSigner {
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

#[cfg(test)]
mod tests {
    use super::*;
    use hypersdk_core::types::U256;

    #[tokio::test]
    async fn every_instance_has_its_own_key() {
        let a = EphemeralSigner::new();
        let b = EphemeralSigner::new();
        assert_ne!(a.public_key().unwrap(), b.public_key().unwrap());

        a.connect().await.unwrap();
        let payload = TransactionPayload::new(1, U256::one(), 1, vec![]);
        let signed = a.sign_transaction(&payload, &Abi::default()).await.unwrap();
        assert!(a.wallet.verify(&signed));
        assert!(!b.wallet.verify(&signed));
    }
}
