//! HyperSDK datatypes

pub use primitive_types::U256;

/// The public half of an ed25519 key pair
pub type PublicKey = [u8; 32];

/// Raw byte buffers (encoded transactions, signatures)
pub use bytes::Bytes;

mod action;
pub use action::{Action, ValidationError};

mod transaction;
pub use transaction::{TransactionPayload, TX_LOOKAHEAD};

mod network;
pub use network::{LastAccepted, NetworkInfo};

pub mod serde_helpers;
