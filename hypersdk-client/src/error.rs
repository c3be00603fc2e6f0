use hypersdk_core::{
    abi::EncodeError,
    types::ValidationError,
    utils::{cb58::Cb58Error, ConversionError},
    ErrorKind,
};
use hypersdk_providers::{FaucetError, ProviderError};
use hypersdk_signers::SignerError;
use thiserror::Error;

#[derive(Error, Debug)]
/// Error thrown by the [`HyperClient`](crate::HyperClient)
pub enum ClientError {
    /// A transaction was sent before any signer was connected
    #[error("Signer not connected")]
    NotConnected,

    /// The signer params name no known signer
    #[error("Invalid signer type: \"{0}\"")]
    InvalidSignerType(String),

    /// The signer params carry the right tag but malformed fields
    #[error("invalid signer params: {0}")]
    InvalidSignerParams(#[source] serde_json::Error),

    /// An environment variable holds a malformed value
    #[error("invalid value `{value}` for {var}")]
    InvalidConfig {
        /// The variable name
        var: &'static str,
        /// The rejected value
        value: String,
    },

    /// A snap signer was requested but the client has no way to reach a wallet host
    #[error("no wallet host configured")]
    NoWalletHost,

    /// A faucet transfer was requested but no faucet is configured
    #[error("no faucet configured")]
    NoFaucet,

    /// Thrown when the signer fails to connect or sign
    #[error(transparent)]
    SignerError(#[from] SignerError),

    /// Thrown when a call to the node fails
    #[error(transparent)]
    ProviderError(#[from] ProviderError),

    /// Thrown when the faucet refuses to fund an address
    #[error(transparent)]
    FaucetError(#[from] FaucetError),

    /// A balance string could not be converted
    #[error(transparent)]
    ConversionError(#[from] ConversionError),

    /// Action data is not serializable
    #[error(transparent)]
    ValidationError(#[from] ValidationError),

    /// The action or payload could not be encoded
    #[error(transparent)]
    EncodeError(#[from] EncodeError),

    /// The node reported a chain id which is not a cb58 id
    #[error("invalid chain id: {0}")]
    ChainId(#[from] Cb58Error),

    /// The configured api host is not a url
    #[error(transparent)]
    UrlError(#[from] url::ParseError),
}

impl ClientError {
    /// The category of this failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::NotConnected => ErrorKind::State,
            ClientError::InvalidSignerType(_) |
            ClientError::InvalidSignerParams(_) |
            ClientError::InvalidConfig { .. } |
            ClientError::NoFaucet |
            ClientError::UrlError(_) => ErrorKind::Validation,
            ClientError::NoWalletHost => ErrorKind::Connection,
            ClientError::SignerError(err) => err.kind(),
            ClientError::ProviderError(err) => err.kind(),
            ClientError::FaucetError(err) => err.kind(),
            ClientError::ConversionError(err) => err.kind(),
            ClientError::ValidationError(err) => err.kind(),
            ClientError::EncodeError(err) => err.kind(),
            ClientError::ChainId(err) => err.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_messages() {
        assert_eq!(ClientError::NotConnected.to_string(), "Signer not connected");
        assert_eq!(ClientError::NotConnected.kind(), ErrorKind::State);

        let err = ClientError::InvalidSignerType("bogus".to_string());
        assert_eq!(err.to_string(), "Invalid signer type: \"bogus\"");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn inner_kinds_are_kept() {
        let err: ClientError = SignerError::InvalidKeyLength(31).into();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "Private key must be 32 bytes, got 31");

        let err: ClientError = SignerError::NoSignature.into();
        assert_eq!(err.kind(), ErrorKind::Signing);
    }
}
