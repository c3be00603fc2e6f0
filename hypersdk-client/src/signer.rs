use crate::ClientError;
use async_trait::async_trait;
use hypersdk_core::{
    abi::Abi,
    types::{Bytes, PublicKey, TransactionPayload},
};
use hypersdk_signers::{
    EphemeralSigner, ExternalWalletSigner, PrivateKeySigner, Signer, SignerError,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{convert::TryFrom, str::FromStr};

/// Selects the signer [`HyperClient::connect`](crate::HyperClient::connect) opens.
///
/// Serialized with a `type` tag:
///
/// ```
/// use hypersdk_client::SignerParams;
///
/// let params: SignerParams = r#"{ "type": "metamask-snap", "useLocalSnap": true }"#.parse().unwrap();
/// assert_eq!(
///     params,
///     SignerParams::MetamaskSnap { snap_id: None, last_derivation_section: None, use_local_snap: true }
/// );
///
/// let err = r#"{ "type": "bogus" }"#.parse::<SignerParams>().unwrap_err();
/// assert_eq!(err.to_string(), "Invalid signer type: \"bogus\"");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SignerParams {
    /// A fresh in-memory key pair
    Ephemeral,
    /// A caller supplied secret
    #[serde(rename_all = "camelCase")]
    PrivateKey {
        /// The 32 byte secret, hex encoded on the wire
        #[serde(with = "hex_bytes")]
        private_key: Vec<u8>,
    },
    /// The key held by a snap in the user's wallet
    #[serde(rename_all = "camelCase")]
    MetamaskSnap {
        /// The snap to use, defaults to the configured snap
        #[serde(default, skip_serializing_if = "Option::is_none")]
        snap_id: Option<String>,
        /// Accepted for compatibility, the snap derives a single key
        #[serde(default, skip_serializing_if = "Option::is_none")]
        last_derivation_section: Option<u32>,
        /// Reinstall the snap on every connect, as local development builds require
        #[serde(default)]
        use_local_snap: bool,
    },
}

impl SignerParams {
    /// The tags of the known signer types
    pub const TYPES: [&'static str; 3] = ["ephemeral", "private-key", "metamask-snap"];

    /// A private key signer for `secret`.
    ///
    /// The length is checked when the signer is opened.
    pub fn private_key(secret: impl Into<Vec<u8>>) -> Self {
        SignerParams::PrivateKey { private_key: secret.into() }
    }

    /// A snap signer with the default settings
    pub fn metamask_snap() -> Self {
        SignerParams::MetamaskSnap { snap_id: None, last_derivation_section: None, use_local_snap: false }
    }

    /// The `type` tag of these params
    pub fn signer_type(&self) -> &'static str {
        match self {
            SignerParams::Ephemeral => "ephemeral",
            SignerParams::PrivateKey { .. } => "private-key",
            SignerParams::MetamaskSnap { .. } => "metamask-snap",
        }
    }
}

impl TryFrom<Value> for SignerParams {
    type Error = ClientError;

    /// Checks the tag before the fields, so an unknown type is reported by name
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let tag = match value.get("type") {
            Some(Value::String(tag)) => tag.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };
        if !Self::TYPES.contains(&tag.as_str()) {
            return Err(ClientError::InvalidSignerType(tag))
        }
        serde_json::from_value(value).map_err(ClientError::InvalidSignerParams)
    }
}

impl FromStr for SignerParams {
    type Err = ClientError;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let value: Value = serde_json::from_str(src).map_err(ClientError::InvalidSignerParams)?;
        Self::try_from(value)
    }
}

mod hex_bytes {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(value))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s.strip_prefix("0x").unwrap_or(&s)).map_err(D::Error::custom)
    }
}

/// The signer currently held by a [`HyperClient`](crate::HyperClient)
#[derive(Debug)]
pub enum ActiveSigner {
    /// An in-memory key pair
    Ephemeral(EphemeralSigner),
    /// A caller supplied secret
    PrivateKey(PrivateKeySigner),
    /// A snap in the user's wallet
    ExternalWallet(ExternalWalletSigner),
}

impl ActiveSigner {
    /// The `type` tag of the params this signer was opened from
    pub fn signer_type(&self) -> &'static str {
        match self {
            ActiveSigner::Ephemeral(_) => "ephemeral",
            ActiveSigner::PrivateKey(_) => "private-key",
            ActiveSigner::ExternalWallet(_) => "metamask-snap",
        }
    }
}

#[async_trait]
impl Signer for ActiveSigner {
    type Error = SignerError;

    async fn connect(&self) -> Result<(), Self::Error> {
        match self {
            ActiveSigner::Ephemeral(signer) => signer.connect().await,
            ActiveSigner::PrivateKey(signer) => signer.connect().await,
            ActiveSigner::ExternalWallet(signer) => signer.connect().await,
        }
    }

    fn public_key(&self) -> Result<PublicKey, Self::Error> {
        match self {
            ActiveSigner::Ephemeral(signer) => signer.public_key(),
            ActiveSigner::PrivateKey(signer) => signer.public_key(),
            ActiveSigner::ExternalWallet(signer) => signer.public_key(),
        }
    }

    async fn sign_transaction(
        &self,
        payload: &TransactionPayload,
        abi: &Abi,
    ) -> Result<Bytes, Self::Error> {
        match self {
            ActiveSigner::Ephemeral(signer) => signer.sign_transaction(payload, abi).await,
            ActiveSigner::PrivateKey(signer) => signer.sign_transaction(payload, abi).await,
            ActiveSigner::ExternalWallet(signer) => signer.sign_transaction(payload, abi).await,
        }
    }
}

impl From<EphemeralSigner> for ActiveSigner {
    fn from(signer: EphemeralSigner) -> Self {
        ActiveSigner::Ephemeral(signer)
    }
}

impl From<PrivateKeySigner> for ActiveSigner {
    fn from(signer: PrivateKeySigner) -> Self {
        ActiveSigner::PrivateKey(signer)
    }
}

impl From<ExternalWalletSigner> for ActiveSigner {
    fn from(signer: ExternalWalletSigner) -> Self {
        ActiveSigner::ExternalWallet(signer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hypersdk_core::ErrorKind;
    use serde_json::json;

    #[test]
    fn parses_tagged_params() {
        let params = SignerParams::try_from(json!({ "type": "ephemeral" })).unwrap();
        assert_eq!(params, SignerParams::Ephemeral);

        let params = SignerParams::try_from(json!({
            "type": "private-key",
            "privateKey": "0x0505050505050505050505050505050505050505050505050505050505050505",
        }))
        .unwrap();
        assert_eq!(params, SignerParams::private_key([5u8; 32]));

        let params = SignerParams::try_from(json!({
            "type": "metamask-snap",
            "snapId": "local:http://localhost:8080",
            "lastDerivationSection": 2,
        }))
        .unwrap();
        assert_eq!(
            params,
            SignerParams::MetamaskSnap {
                snap_id: Some("local:http://localhost:8080".to_owned()),
                last_derivation_section: Some(2),
                use_local_snap: false,
            }
        );
        assert_eq!(params.signer_type(), "metamask-snap");
    }

    #[test]
    fn unknown_type_is_named() {
        for (value, tag) in [
            (json!({ "type": "bogus" }), "\"bogus\""),
            (json!({ "type": 7 }), "\"7\""),
            (json!({}), "\"\""),
        ] {
            let err = SignerParams::try_from(value).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
            assert!(err.to_string().contains(tag), "{err}");
        }
    }

    #[test]
    fn malformed_fields() {
        let err = SignerParams::try_from(json!({ "type": "private-key", "privateKey": "zz" }))
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidSignerParams(_)));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn serializes_with_tag() {
        let value = serde_json::to_value(SignerParams::private_key([1u8; 2])).unwrap();
        assert_eq!(value, json!({ "type": "private-key", "privateKey": "0101" }));
    }

    #[tokio::test]
    async fn delegates_to_the_wrapped_signer() {
        let inner = PrivateKeySigner::new([3u8; 32]).unwrap();
        let expected = inner.public_key().unwrap();
        let signer = ActiveSigner::from(inner);
        signer.connect().await.unwrap();
        assert_eq!(signer.public_key().unwrap(), expected);
        assert_eq!(signer.signer_type(), "private-key");
    }
}
