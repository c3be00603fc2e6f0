use super::{serde_helpers, Action, U256};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How far in the future a payload's timestamp is placed.
///
/// The node treats the timestamp as the transaction's expiry, so it must leave room for clock
/// skew and propagation delay.
pub const TX_LOOKAHEAD: Duration = Duration::from_secs(59);

/// A signable HyperSDK transaction.
///
/// Numeric fields are serialized as decimal strings, which is the form expected by the ABI
/// marshaler and by wallet sandboxes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPayload {
    /// Expiry in milliseconds since the unix epoch
    #[serde(with = "serde_helpers::string_u64")]
    pub timestamp: u64,
    /// The chain id decoded to an integer
    #[serde(with = "serde_helpers::string_u256")]
    pub chain_id: U256,
    /// The most the sender is willing to pay
    #[serde(with = "serde_helpers::string_u64")]
    pub max_fee: u64,
    /// The actions executed in order
    pub actions: Vec<Action>,
}

impl TransactionPayload {
    /// Creates a payload from its parts
    pub fn new(timestamp: u64, chain_id: U256, max_fee: u64, actions: Vec<Action>) -> Self {
        Self { timestamp, chain_id, max_fee, actions }
    }

    /// Creates a payload expiring [`TX_LOOKAHEAD`] after `now_ms`
    pub fn expiring_after(now_ms: u64, chain_id: U256, max_fee: u64, actions: Vec<Action>) -> Self {
        let timestamp = now_ms.saturating_add(TX_LOOKAHEAD.as_millis() as u64);
        Self::new(timestamp, chain_id, max_fee, actions)
    }

    /// Appends an action
    #[must_use]
    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_numbers_as_strings() {
        let payload = TransactionPayload::new(1717111222000, U256::from(7u64), 10_000_000, vec![]);
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({
                "timestamp": "1717111222000",
                "chainId": "7",
                "maxFee": "10000000",
                "actions": []
            })
        );
        let back: TransactionPayload = serde_json::from_value(value).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn lookahead_is_59_seconds() {
        let payload = TransactionPayload::expiring_after(1_000, U256::zero(), 1, vec![]);
        assert_eq!(payload.timestamp, 60_000);
    }
}
