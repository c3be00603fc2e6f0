use super::serde_helpers;
use serde::{Deserialize, Serialize};

/// Reply of `hypersdk.network`.
///
/// It does not change while connected to one endpoint, so providers cache it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    /// Avalanche network id
    pub network_id: u32,
    /// cb58 encoded subnet id
    pub subnet_id: String,
    /// cb58 encoded chain id
    pub chain_id: String,
}

/// Reply of `hypersdk.lastAccepted`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastAccepted {
    /// Block height
    #[serde(deserialize_with = "serde_helpers::deserialize_stringified_u64")]
    pub height: u64,
    /// cb58 encoded block id
    #[serde(rename = "blockId", alias = "blockID")]
    pub block_id: String,
    /// Block timestamp in milliseconds
    #[serde(default)]
    pub timestamp: i64,
}
