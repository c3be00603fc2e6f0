use crate::snap::WalletProviderError;
use hypersdk_core::{abi::EncodeError, ErrorKind};
use thiserror::Error;

#[derive(Error, Debug)]
/// Error thrown by the signers of this crate
pub enum SignerError {
    /// The secret handed to a local signer has the wrong length
    #[error("Private key must be 32 bytes, got {0}")]
    InvalidKeyLength(usize),
    /// Error propagated from the hex crate.
    #[error(transparent)]
    HexError(#[from] hex::FromHexError),
    /// The payload could not be encoded
    #[error(transparent)]
    EncodeError(#[from] EncodeError),
    /// The public key was requested before `connect()` succeeded
    #[error("Public key not cached. Please call connect() first.")]
    NotConnected,
    /// The wallet host does not support development snaps
    #[error("Your client is not compatible with development snaps. Please install MetaMask Flask!")]
    IncompatibleHost {
        /// The client version string reported by the host
        version: String,
    },
    /// The snap is still missing after the install round-trip
    #[error("Failed to install snap {0}")]
    InstallFailed(String),
    /// The snap did not return a public key
    #[error("Failed to get public key")]
    NoPublicKey,
    /// The snap returned something that is not an ed25519 public key
    #[error("snap returned a {0} byte public key, expected 32")]
    InvalidPublicKey(usize),
    /// The snap did not return a signed transaction
    #[error("Failed to sign transaction")]
    NoSignature,
    /// The snap returned malformed base58
    #[error(transparent)]
    Base58Error(#[from] bs58::decode::Error),
    /// Invoke parameters which do not survive serialization
    #[error("snap request parameters are not serializable: {0}")]
    Unserializable(#[source] serde_json::Error),
    /// Error talking to the wallet host
    #[error(transparent)]
    ProviderError(#[from] WalletProviderError),
}

impl SignerError {
    /// The category of this failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            SignerError::InvalidKeyLength(_) |
            SignerError::HexError(_) |
            SignerError::Unserializable(_) => ErrorKind::Validation,
            SignerError::EncodeError(_) => ErrorKind::Encoding,
            SignerError::NotConnected => ErrorKind::State,
            SignerError::IncompatibleHost { .. } |
            SignerError::InstallFailed(_) |
            SignerError::NoPublicKey |
            SignerError::InvalidPublicKey(_) |
            SignerError::ProviderError(_) => ErrorKind::Connection,
            SignerError::NoSignature | SignerError::Base58Error(_) => ErrorKind::Signing,
        }
    }
}
