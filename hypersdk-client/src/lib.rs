#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]
//! # HyperSDK Client
//!
//! A [`HyperClient`] composes the pieces of the other crates into what an application calls:
//! pick a signer with [`SignerParams`], read chain data, then simulate or submit transactions.
//!
//! ```no_run
//! use hypersdk_client::{ClientConfig, HyperClient, SignerParams};
//!
//! # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HyperClient::new(ClientConfig::from_env()?)?;
//!
//! // a fresh key funded by the development faucet
//! client.connect(SignerParams::Ephemeral).await?;
//! let address = "morpheus1qqds";
//! client.request_faucet_transfer(address).await?;
//!
//! let balance = client.balance(address).await?;
//! println!("balance: {}", client.format_balance(balance)?);
//! # Ok(())
//! # }
//! ```

/// The [`TransactionBuilder`] turns actions into signable payloads
pub mod builder;
pub use builder::{TransactionBuilder, DEFAULT_MAX_FEE};

/// [`ClientConfig`] and its defaults
pub mod config;
pub use config::ClientConfig;

/// Signer selection
pub mod signer;
pub use signer::{ActiveSigner, SignerParams};

mod client;
pub use client::{ConnectionState, ConnectivityEvent, HyperClient};

mod error;
pub use error::ClientError;
