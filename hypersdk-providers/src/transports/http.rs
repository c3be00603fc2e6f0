use super::common::{JsonRpcError, Request, Response};
use crate::{errors::ProviderError, JsonRpcClient, Namespace};
use async_trait::async_trait;
use reqwest::{Client, Error as ReqwestError};
use serde::{de::DeserializeOwned, Serialize};
use std::{fmt::Debug, str::FromStr, time::Duration};
use thiserror::Error;
use url::Url;

/// The deadline of a single request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(3000);

/// A low-level JSON-RPC Client over HTTP.
///
/// Requests are POSTed to `<chain url>/<namespace path>`, where the chain url is
/// `<api host>/ext/bc/<vm name>`. Each request must complete within the configured timeout
/// (default 3 seconds); an expired request is dropped, which cancels its I/O.
///
/// # Example
///
/// ```no_run
/// use hypersdk_core::types::NetworkInfo;
/// use hypersdk_providers::{Http, JsonRpcClient, Namespace};
///
/// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = Http::for_chain("http://localhost:9650", "morpheusvm")?;
/// let network: NetworkInfo =
///     provider.request(&Namespace::core(), "network", serde_json::json!({})).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Provider {
    client: Client,
    url: Url,
    timeout: Duration,
}

#[derive(Error, Debug)]
/// Error thrown when sending an HTTP request
pub enum ClientError {
    /// Thrown if the request failed
    #[error(transparent)]
    ReqwestError(#[from] ReqwestError),
    #[error(transparent)]
    /// Thrown if the node reported an error
    JsonRpcError(#[from] JsonRpcError),

    #[error("Deserialization Error: {err}. Response: {text}")]
    /// Serde JSON Error
    SerdeJson {
        /// Underlying error
        err: serde_json::Error,
        /// The contents of the HTTP response that could not be deserialized
        text: String,
    },

    /// The request did not complete in time
    #[error("Request timed out after {}", display_timeout(.0))]
    Timeout(Duration),
}

fn display_timeout(timeout: &Duration) -> String {
    let millis = timeout.as_millis();
    match millis {
        1000 => "1 second".to_owned(),
        m if m % 1000 == 0 => format!("{} seconds", m / 1000),
        m => format!("{m} ms"),
    }
}

impl From<ClientError> for ProviderError {
    fn from(src: ClientError) -> Self {
        match src {
            ClientError::ReqwestError(err) => ProviderError::HTTPError(err),
            _ => ProviderError::JsonRpcClientError(Box::new(src)),
        }
    }
}

impl crate::RpcError for ClientError {
    fn as_error_response(&self) -> Option<&JsonRpcError> {
        if let ClientError::JsonRpcError(err) = self {
            Some(err)
        } else {
            None
        }
    }

    fn as_serde_error(&self) -> Option<&serde_json::Error> {
        match self {
            ClientError::SerdeJson { err, .. } => Some(err),
            _ => None,
        }
    }

    fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Timeout(_))
    }
}

#[async_trait]
impl JsonRpcClient for Provider {
    type Error = ClientError;

    async fn request<T: Debug + Serialize + Send + Sync, R: DeserializeOwned + Send>(
        &self,
        namespace: &Namespace,
        method: &str,
        params: T,
    ) -> Result<R, ClientError> {
        let method = namespace.method(method);
        let payload = Request::new(u64::from(rand::random::<u32>()), &method, params);
        let url = self.endpoint(namespace);

        // dropping the future on expiry aborts the connection
        let body = tokio::time::timeout(self.timeout, async {
            let res = self.client.post(url).json(&payload).send().await?;
            res.bytes().await
        })
        .await
        .map_err(|_| ClientError::Timeout(self.timeout))??;

        let raw = match serde_json::from_slice::<Response<'_>>(&body) {
            Ok(response) => response.into_result()?,
            Err(err) => {
                return Err(ClientError::SerdeJson {
                    err,
                    text: String::from_utf8_lossy(&body).to_string(),
                })
            }
        };

        let res = serde_json::from_str(raw)
            .map_err(|err| ClientError::SerdeJson { err, text: raw.to_string() })?;

        Ok(res)
    }
}

impl Provider {
    /// Initializes a new HTTP Client for the chain served at `url`
    ///
    /// # Example
    ///
    /// ```
    /// use hypersdk_providers::Http;
    /// use url::Url;
    ///
    /// let url = Url::parse("http://localhost:9650/ext/bc/morpheusvm").unwrap();
    /// let provider = Http::new(url);
    /// ```
    pub fn new(url: impl Into<Url>) -> Self {
        Self::new_with_client(url, Client::new())
    }

    /// Initializes a new HTTP Client for the VM `vm_name` served by `api_host`
    ///
    /// ```
    /// use hypersdk_providers::Http;
    ///
    /// let provider = Http::for_chain("http://localhost:9650/", "morpheusvm").unwrap();
    /// assert_eq!(provider.url().as_str(), "http://localhost:9650/ext/bc/morpheusvm");
    /// ```
    pub fn for_chain(api_host: &str, vm_name: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(&format!("{}/ext/bc/{vm_name}", api_host.trim_end_matches('/')))?;
        Ok(Self::new(url))
    }

    /// Allows to customize the provider by providing your own http client
    ///
    /// # Example
    ///
    /// ```
    /// use hypersdk_providers::Http;
    /// use url::Url;
    ///
    /// let url = Url::parse("http://localhost:9650/ext/bc/morpheusvm").unwrap();
    /// let client = reqwest::Client::builder().build().unwrap();
    /// let provider = Http::new_with_client(url, client);
    /// ```
    pub fn new_with_client(url: impl Into<Url>, client: reqwest::Client) -> Self {
        Self { client, url: url.into(), timeout: DEFAULT_REQUEST_TIMEOUT }
    }

    /// Sets the deadline of each request (default: 3 seconds)
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The deadline of each request
    pub fn get_timeout(&self) -> Duration {
        self.timeout
    }

    /// The chain Url to which requests are made
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Mutable access to the chain Url to which requests are made
    pub fn url_mut(&mut self) -> &mut Url {
        &mut self.url
    }

    /// The Url serving `namespace`
    pub fn endpoint(&self, namespace: &Namespace) -> String {
        format!("{}/{}", self.url.as_str().trim_end_matches('/'), namespace.path())
    }
}

impl FromStr for Provider {
    type Err = url::ParseError;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(src)?;
        Ok(Provider::new(url))
    }
}
