pub(crate) mod common;
pub use common::JsonRpcError;

mod http;
pub use self::http::{ClientError as HttpClientError, Provider as Http, DEFAULT_REQUEST_TIMEOUT};

mod mock;
pub use mock::{MockError, MockProvider, MockRequest, MockResponse};
