mod ephemeral;
pub use ephemeral::EphemeralSigner;

mod private_key;
pub use private_key::PrivateKeySigner;

use crate::SignerError;
use ed25519_dalek::{Signer as _, SigningKey};
use hypersdk_core::{
    abi::{Abi, JsonEncoder, TxEncoder},
    types::{Bytes, PublicKey, TransactionPayload},
};
use rand::{CryptoRng, RngCore};
use std::{fmt, sync::Arc};

/// Auth type id of a single ed25519 signer, written between the payload and the auth section
pub const ED25519_AUTH_ID: u8 = 0x00;

/// Length of an ed25519 signature
pub const SIGNATURE_LEN: usize = 64;

/// An ed25519 key pair which signs payloads locally.
///
/// The wallet encodes the payload with its [`TxEncoder`], signs the encoded bytes and appends the
/// auth section:
///
/// `encoded || ED25519_AUTH_ID || public key (32) || signature (64)`
///
/// ```
/// use hypersdk_core::{abi::Abi, types::{TransactionPayload, U256}};
/// use hypersdk_signers::Wallet;
///
/// let wallet = Wallet::new(&mut rand::thread_rng());
/// let payload = TransactionPayload::new(0, U256::one(), 1, vec![]);
/// let signed = wallet.sign_payload(&payload, &Abi::default()).unwrap();
/// assert!(wallet.verify(&signed));
/// ```
#[derive(Clone)]
pub struct Wallet {
    /// The wallet's private key
    pub(crate) signer: SigningKey,
    /// The wallet's public key
    pub(crate) public_key: PublicKey,
    pub(crate) encoder: Arc<dyn TxEncoder>,
}

impl Wallet {
    /// Creates a new random key pair seeded with the provided RNG
    pub fn new<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        SigningKey::generate(rng).into()
    }

    /// Creates a wallet from a raw 32 byte ed25519 secret
    pub fn from_secret(secret: &[u8]) -> Result<Self, SignerError> {
        let secret: [u8; 32] =
            secret.try_into().map_err(|_| SignerError::InvalidKeyLength(secret.len()))?;
        Ok(SigningKey::from_bytes(&secret).into())
    }

    /// Sets the encoder used to turn payloads into signing bytes
    pub fn with_encoder<E: TxEncoder + 'static>(mut self, encoder: E) -> Self {
        self.encoder = Arc::new(encoder);
        self
    }

    /// Returns the wallet's public key
    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    /// Gets the wallet's encoder
    pub fn encoder(&self) -> &Arc<dyn TxEncoder> {
        &self.encoder
    }

    /// Signs already encoded payload bytes and returns the signed transaction
    pub fn sign_encoded(&self, encoded: &[u8]) -> Bytes {
        let signature = self.signer.sign(encoded);

        let mut signed = Vec::with_capacity(encoded.len() + 1 + 32 + SIGNATURE_LEN);
        signed.extend_from_slice(encoded);
        signed.push(ED25519_AUTH_ID);
        signed.extend_from_slice(&self.public_key);
        signed.extend_from_slice(&signature.to_bytes());
        signed.into()
    }

    /// Encodes and signs the payload
    pub fn sign_payload(
        &self,
        payload: &TransactionPayload,
        abi: &Abi,
    ) -> Result<Bytes, SignerError> {
        let encoded = self.encoder.encode_transaction(payload, abi)?;
        Ok(self.sign_encoded(&encoded))
    }

    /// Checks that `signed` carries this wallet's key and a valid signature over its payload
    pub fn verify(&self, signed: &[u8]) -> bool {
        let auth_len = 1 + 32 + SIGNATURE_LEN;
        if signed.len() < auth_len {
            return false
        }
        let (encoded, auth) = signed.split_at(signed.len() - auth_len);
        if auth[0] != ED25519_AUTH_ID || auth[1..33] != self.public_key {
            return false
        }
        let Ok(signature) = <[u8; SIGNATURE_LEN]>::try_from(&auth[33..]) else { return false };
        let signature = ed25519_dalek::Signature::from_bytes(&signature);
        self.signer.verifying_key().verify_strict(encoded, &signature).is_ok()
    }
}

impl From<SigningKey> for Wallet {
    fn from(signer: SigningKey) -> Self {
        let public_key = signer.verifying_key().to_bytes();
        Self { signer, public_key, encoder: Arc::new(JsonEncoder) }
    }
}

impl PartialEq for Wallet {
    fn eq(&self, other: &Self) -> bool {
        self.signer.to_bytes().eq(&other.signer.to_bytes())
    }
}

// do not log the signer
impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("public_key", &hex::encode(self.public_key))
            .field("encoder", &self.encoder)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use hypersdk_core::{abi::EncodeError, types::Action};

    const SECRET: [u8; 32] =
        hex!("323b1d8f4eed5f0da9da93071b034f2dce9d2d22692c172f3cb252a64ddfafd0");

    const DIGEST: [u8; 97] = hex!(
        "
        0000018fcbcdeef0d36e467c73e2840140cc41b3d72f8a5a7446b2399c39b9c74d4cf077d25090240000
        0002540be40001000102030405060708090a0b0c0d0e0f1011121314000000000000000000000000000000
        0000000003e8000000026869
        "
    );

    // returns a fixed digest regardless of the payload
    #[derive(Debug)]
    struct FixedEncoder;

    impl TxEncoder for FixedEncoder {
        fn encode_transaction(
            &self,
            _payload: &TransactionPayload,
            _abi: &Abi,
        ) -> Result<Bytes, EncodeError> {
            Ok(Bytes::from_static(&DIGEST))
        }

        fn encode_action(&self, _action: &Action, _abi: &Abi) -> Result<Bytes, EncodeError> {
            Ok(Bytes::new())
        }
    }

    #[test]
    fn derives_public_key() {
        let wallet = Wallet::from_secret(&SECRET).unwrap();
        assert_eq!(
            wallet.public_key(),
            hex!("1b057de320297c29ad0c1f589ea216869cf1938d88c9fbd70d6748323dbf2fa7")
        );
    }

    #[test]
    fn signs_known_vector() {
        let wallet = Wallet::from_secret(&SECRET).unwrap().with_encoder(FixedEncoder);
        let payload = TransactionPayload::new(0, Default::default(), 0, vec![]);
        let signed = wallet.sign_payload(&payload, &Abi::default()).unwrap();

        let mut expected = DIGEST.to_vec();
        expected.extend_from_slice(&hex!(
            "
            001b057de320297c29ad0c1f589ea216869cf1938d88c9fbd70d6748323dbf2fa7
            b86baec5fe89f2bb585cb781f694a398107fe760577c750da3e9b381c5f5a367
            3c4a85c65a0db8d5ed03b4c4fd7f818d99270504e65c0ebf4d73884e0bfce60a
            "
        ));
        assert_eq!(signed.as_ref(), expected.as_slice());
        assert!(wallet.verify(&signed));
    }

    #[test]
    fn verify_rejects_tampering() {
        let wallet = Wallet::new(&mut rand::thread_rng());
        let mut signed = wallet.sign_encoded(b"hello").to_vec();
        assert!(wallet.verify(&signed));
        signed[0] ^= 1;
        assert!(!wallet.verify(&signed));
        assert!(!wallet.verify(b"short"));

        let other = Wallet::new(&mut rand::thread_rng());
        assert!(!other.verify(&wallet.sign_encoded(b"hello")));
    }

    #[test]
    fn rejects_bad_secret_length() {
        for len in [0usize, 31, 33, 64] {
            let err = Wallet::from_secret(&vec![1u8; len]).unwrap_err();
            assert!(matches!(err, SignerError::InvalidKeyLength(n) if n == len));
            assert_eq!(err.to_string(), format!("Private key must be 32 bytes, got {len}"));
        }
    }

    #[test]
    fn debug_hides_secret() {
        let wallet = Wallet::from_secret(&SECRET).unwrap();
        let debug = format!("{wallet:?}");
        assert!(!debug.contains(&hex::encode(SECRET)));
        assert!(debug.contains("1b057de3"));
    }
}
