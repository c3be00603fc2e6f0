#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]
#![allow(clippy::type_complexity)]
//! # Clients for interacting with HyperSDK nodes
//!
//! This crate provides asynchronous clients for the JSON-RPC API a HyperSDK node serves under
//! `<api host>/ext/bc/<vm name>/<namespace>`.
//!
//! For more documentation on the available calls, refer to the [`Provider`](crate::Provider)
//! struct.
//!
//! # Examples
//!
//! ```no_run
//! use hypersdk_providers::{Http, Provider};
//!
//! # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = Provider::new(Http::for_chain("http://localhost:9650", "morpheusvm")?);
//!
//! let network = provider.network().await?;
//! println!("Got network: {}", serde_json::to_string(&network)?);
//!
//! let abi = provider.abi().await?;
//! println!("Got abi: {abi}");
//! # Ok(())
//! # }
//! ```
mod transports;
pub use transports::*;

mod provider;
pub use provider::{Provider, SubmitTxReply};

mod errors;
pub use errors::{ProviderError, RpcError};

mod stream;
mod utils;
pub use futures_util::StreamExt;
pub use stream::{interval, BlockWatcher, DEFAULT_POLL_INTERVAL};

mod faucet;
pub use faucet::{Faucet, FaucetError, DEFAULT_FAUCET_ATTEMPTS};

use async_trait::async_trait;
use auto_impl::auto_impl;
use serde::{de::DeserializeOwned, Serialize};
use std::{error::Error, fmt::Debug};

#[async_trait]
#[auto_impl(&, Box, Arc)]
/// Trait which must be implemented by data transports to be used with the HyperSDK
/// JSON-RPC provider.
pub trait JsonRpcClient: Debug + Send + Sync {
    /// A JSON-RPC Error
    type Error: Error + Into<ProviderError>;

    /// Sends a request to `method` of `namespace`, with the params serialized as JSON
    async fn request<T, R>(
        &self,
        namespace: &Namespace,
        method: &str,
        params: T,
    ) -> Result<R, Self::Error>
    where
        T: Debug + Serialize + Send + Sync,
        R: DeserializeOwned + Send;
}

/// An API namespace of a chain.
///
/// A namespace is served on its own path and prefixes its method names:
/// `hypersdk.network` lives on `coreapi`, `morpheusvm.balance` on `morpheusapi`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Namespace {
    path: String,
    prefix: String,
}

impl Namespace {
    /// Path of the node-level API
    pub const CORE_PATH: &'static str = "coreapi";
    /// Method prefix of the node-level API
    pub const CORE_PREFIX: &'static str = "hypersdk";

    /// Creates a namespace served on `path`. A leading `/` is ignored.
    pub fn new(path: impl Into<String>, prefix: impl Into<String>) -> Self {
        let path = path.into();
        let path = path.strip_prefix('/').map(str::to_owned).unwrap_or(path);
        Self { path, prefix: prefix.into() }
    }

    /// The node-level API shared by every HyperSDK chain
    pub fn core() -> Self {
        Self::new(Self::CORE_PATH, Self::CORE_PREFIX)
    }

    /// The API of the deployed VM, e.g. `Namespace::vm("morpheusvm", "morpheusapi")`
    pub fn vm(vm_name: impl Into<String>, rpc_prefix: impl Into<String>) -> Self {
        Self::new(rpc_prefix, vm_name)
    }

    /// The path segment this namespace is served on
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The method prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Qualifies `method` with the namespace prefix
    pub fn method(&self, method: &str) -> String {
        format!("{}.{method}", self.prefix)
    }
}
