//! The boundary between a [`TransactionPayload`] and its canonical bytes.
//!
//! The byte-level marshaler is VM specific and lives outside of this crate. Signers and
//! clients only need something implementing [`TxEncoder`], which receives the payload together
//! with the ABI fetched from the node.

use crate::types::{Action, Bytes, TransactionPayload};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

mod error;
pub use error::EncodeError;

/// The VM's ABI as returned by `hypersdk.getABI`.
///
/// Kept as the raw JSON string; encoders parse it the way they need to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Abi(String);

impl Abi {
    /// Wraps a raw ABI string
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw ABI string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the ABI as JSON
    pub fn to_json(&self) -> Result<serde_json::Value, EncodeError> {
        serde_json::from_str(&self.0).map_err(EncodeError::InvalidAbi)
    }
}

impl From<String> for Abi {
    fn from(src: String) -> Self {
        Self(src)
    }
}

impl From<&str> for Abi {
    fn from(src: &str) -> Self {
        Self(src.to_owned())
    }
}

impl fmt::Display for Abi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Turns payloads and actions into the bytes the node signs and executes.
///
/// Implement this trait to plug in the marshaler of a particular VM.
pub trait TxEncoder: fmt::Debug + Send + Sync {
    /// Encodes the unsigned transaction; these are the bytes covered by the signature
    fn encode_transaction(
        &self,
        payload: &TransactionPayload,
        abi: &Abi,
    ) -> Result<Bytes, EncodeError>;

    /// Encodes a single action, as used by `hypersdk.simulateActions`
    fn encode_action(&self, action: &Action, abi: &Abi) -> Result<Bytes, EncodeError>;
}

impl<T: TxEncoder + ?Sized> TxEncoder for Arc<T> {
    fn encode_transaction(
        &self,
        payload: &TransactionPayload,
        abi: &Abi,
    ) -> Result<Bytes, EncodeError> {
        (**self).encode_transaction(payload, abi)
    }

    fn encode_action(&self, action: &Action, abi: &Abi) -> Result<Bytes, EncodeError> {
        (**self).encode_action(action, abi)
    }
}

impl<T: TxEncoder + ?Sized> TxEncoder for Box<T> {
    fn encode_transaction(
        &self,
        payload: &TransactionPayload,
        abi: &Abi,
    ) -> Result<Bytes, EncodeError> {
        (**self).encode_transaction(payload, abi)
    }

    fn encode_action(&self, action: &Action, abi: &Abi) -> Result<Bytes, EncodeError> {
        (**self).encode_action(action, abi)
    }
}

/// An encoder which serializes the payload as canonical JSON.
///
/// Useful for tests and for VMs which accept JSON encoded transactions. Keys are emitted in a
/// stable order, so equal payloads always produce equal bytes.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonEncoder;

impl TxEncoder for JsonEncoder {
    fn encode_transaction(
        &self,
        payload: &TransactionPayload,
        _abi: &Abi,
    ) -> Result<Bytes, EncodeError> {
        Ok(serde_json::to_vec(payload)?.into())
    }

    fn encode_action(&self, action: &Action, _abi: &Abi) -> Result<Bytes, EncodeError> {
        Ok(serde_json::to_vec(action)?.into())
    }
}
