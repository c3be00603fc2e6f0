use crate::ErrorKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// One named operation embedded in a transaction payload.
///
/// The data is held as a JSON object so that it is guaranteed to round-trip through the
/// canonical text form consumed by encoders and wallet sandboxes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// The action name as registered in the VM's ABI, e.g. `Transfer`
    #[serde(rename = "actionName")]
    pub name: String,
    /// Field name to value mapping
    #[serde(default)]
    pub data: Map<String, Value>,
}

#[derive(Error, Debug)]
/// Error thrown when a value cannot be used to build an [`Action`]
pub enum ValidationError {
    /// The action data could not be serialized to JSON
    #[error("action `{name}` data is not serializable: {source}")]
    Unserializable {
        /// The action name
        name: String,
        /// Underlying serde error
        #[source]
        source: serde_json::Error,
    },
    /// The action data serialized to something other than a JSON object
    #[error("action `{name}` data must serialize to an object, got {found}")]
    NotAnObject {
        /// The action name
        name: String,
        /// The JSON type that was produced instead
        found: &'static str,
    },
}

impl ValidationError {
    /// Every variant is a validation failure
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}

impl Action {
    /// Builds an action from any serializable value.
    ///
    /// Fails fast if `data` cannot be serialized or is not an object, since a remote signer
    /// would reject it later with a far less useful message.
    pub fn new<S: Serialize>(name: impl Into<String>, data: S) -> Result<Self, ValidationError> {
        let name = name.into();
        let value = match serde_json::to_value(data) {
            Ok(value) => value,
            Err(source) => return Err(ValidationError::Unserializable { name, source }),
        };
        match value {
            Value::Object(data) => Ok(Self { name, data }),
            Value::Null => Ok(Self { name, data: Map::new() }),
            other => Err(ValidationError::NotAnObject { name, found: json_type(&other) }),
        }
    }

    /// Returns the value of a data field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
