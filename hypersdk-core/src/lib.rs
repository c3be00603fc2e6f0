#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_debug_implementations, rust_2018_idioms, unreachable_pub)]
//! HyperSDK types and utilities.
//! _It is recommended to use the `utils`, `types` and `abi` re-exports of the `hypersdk` crate
//! instead of depending on this crate directly._
//!
//! This library provides the data types exchanged with a HyperSDK node (actions, transaction
//! payloads, network metadata), the encoding seam used to turn a payload into its canonical
//! signing bytes, and fixed-decimal balance conversion.
//!
//! ## Building a payload
//!
//! ```rust
//! use hypersdk_core::types::{Action, TransactionPayload, U256};
//! use serde_json::json;
//!
//! # fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! let action = Action::new("Transfer", json!({ "to": "morpheus1...", "value": "1000" }))?;
//! let payload = TransactionPayload::new(1717111222000, U256::from(1), 10_000_000, vec![action]);
//! assert_eq!(payload.actions.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Balances
//!
//! ```rust
//! use hypersdk_core::utils::{format_balance, parse_balance};
//!
//! let amount = parse_balance("1.5", 9).unwrap();
//! assert_eq!(format_balance(amount, 9).unwrap(), "1.500000000");
//! ```
pub mod types;

/// The encoding seam between a payload and its canonical signing bytes
pub mod abi;

/// Various utilities
pub mod utils;

mod error;
pub use error::ErrorKind;
