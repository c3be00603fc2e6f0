use serde::{Deserialize, Serialize};
use serde_json::{value::RawValue, Value};
use thiserror::Error;

#[derive(Serialize, Deserialize, Debug, Clone, Error)]
#[error("{message}")]
/// A JSON-RPC 2.0 error, as reported by the node
pub struct JsonRpcError {
    /// The error code
    #[serde(default)]
    pub code: i64,
    /// The error message
    pub message: String,
    /// Additional data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// An error carrying only a message
    pub fn new(message: impl Into<String>) -> Self {
        Self { code: 0, message: message.into(), data: None }
    }
}

#[derive(Serialize, Deserialize, Debug)]
/// A JSON-RPC request
pub struct Request<'a, T> {
    id: u64,
    jsonrpc: &'a str,
    method: &'a str,
    params: T,
}

impl<'a, T> Request<'a, T> {
    /// Creates a new JSON RPC request
    pub fn new(id: u64, method: &'a str, params: T) -> Self {
        Self { id, jsonrpc: "2.0", method, params }
    }
}

/// A JSON-RPC response.
///
/// HyperSDK nodes may send `result` and `error` side by side; an error only counts when it
/// carries a non-empty message.
#[derive(Deserialize, Debug)]
pub struct Response<'a> {
    #[serde(default)]
    #[allow(dead_code)]
    id: Option<Value>,
    #[serde(borrow, default)]
    result: Option<&'a RawValue>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

impl<'a> Response<'a> {
    /// Returns the raw result, or the reported error. A missing result reads as `null`.
    pub fn into_result(self) -> Result<&'a str, JsonRpcError> {
        match self.error {
            Some(error) if !error.message.is_empty() => Err(error),
            _ => Ok(self.result.map(RawValue::get).unwrap_or("null")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response() {
        let response: Response<'_> =
            serde_json::from_str(r#"{"jsonrpc": "2.0", "result": 19, "id": 1}"#).unwrap();
        assert_eq!(response.into_result().unwrap(), "19");
    }

    #[test]
    fn error_wins_over_result() {
        let response: Response<'_> = serde_json::from_str(
            r#"{"jsonrpc": "2.0", "result": null, "error": {"code": -32000, "message": "tx expired"}, "id": 1}"#,
        )
        .unwrap();
        let err = response.into_result().unwrap_err();
        assert_eq!(err.to_string(), "tx expired");
        assert_eq!(err.code, -32000);
    }

    #[test]
    fn empty_error_message_is_ignored() {
        let response: Response<'_> =
            serde_json::from_str(r#"{"result": {"a": 1}, "error": {"message": ""}}"#).unwrap();
        assert_eq!(response.into_result().unwrap(), r#"{"a": 1}"#);

        let response: Response<'_> = serde_json::from_str(r#"{"id": 7}"#).unwrap();
        assert_eq!(response.into_result().unwrap(), "null");
    }

    #[test]
    fn request_envelope() {
        let request = Request::new(42, "hypersdk.network", serde_json::json!({}));
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({ "id": 42, "jsonrpc": "2.0", "method": "hypersdk.network", "params": {} })
        );
    }
}
