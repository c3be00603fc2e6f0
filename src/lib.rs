#![warn(missing_debug_implementations, missing_docs, rust_2018_idioms, unreachable_pub)]
#![deny(rustdoc::broken_intra_doc_links)]
#![doc(test(no_crate_inject, attr(deny(rust_2018_idioms), allow(dead_code, unused_variables))))]
#![cfg_attr(docsrs, feature(doc_cfg))]
//! # hypersdk
//!
//! A client library for virtual machines built with HyperSDK.
//!
//! The crate is split into independently usable pieces, all re-exported here:
//!
//! - [`core`]: payload types, the ABI handle and transaction encoders, balance and cb58 codecs
//! - [`signers`]: the [`Signer`](signers::Signer) trait with in-memory, private key and wallet
//!   snap signers
//! - [`providers`]: the JSON-RPC [`Provider`](providers::Provider) over HTTP, block watching and
//!   the development faucet
//! - [`client`]: [`HyperClient`](client::HyperClient), which ties them together
//!
//! ```no_run
//! use hypersdk::prelude::*;
//!
//! # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::default().api_host("http://localhost:9650").vm("morpheusvm", "/morpheusapi");
//! let client = HyperClient::new(config)?;
//! client.connect(SignerParams::private_key([7u8; 32])).await?;
//!
//! let transfer = client.transfer_action("morpheus1qqds", "0.5", "hello")?;
//! if let Some(reply) = client.send_transaction(vec![transfer]).await? {
//!     println!("submitted {}", reply.tx_id);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - `rustls` (default): HTTPS through rustls
//! - `openssl`: HTTPS through the system's native TLS

/// Payload types, encoders and codecs
pub mod core {
    pub use hypersdk_core::*;
}

#[doc(inline)]
pub use hypersdk_core::{abi, types, utils};

/// Signers for HyperSDK transactions
pub mod signers {
    pub use hypersdk_signers::*;
}

/// Clients for HyperSDK nodes
pub mod providers {
    pub use hypersdk_providers::*;
}

/// The ready-made application client
pub mod client {
    pub use hypersdk_client::*;
}

/// Easy imports of frequently used type definitions and traits
#[doc(hidden)]
pub mod prelude {
    pub use super::core::{abi::*, types::*, utils::*, ErrorKind};

    pub use super::signers::*;

    pub use super::providers::*;

    pub use super::client::*;
}
