use crate::ErrorKind;
use thiserror::Error;

/// Error thrown while encoding a payload or action
#[derive(Error, Debug)]
pub enum EncodeError {
    /// The ABI string is not valid JSON
    #[error("invalid abi: {0}")]
    InvalidAbi(#[source] serde_json::Error),

    /// Error in underlying lib `serde_json`
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    /// Custom error from an external encoder
    #[error("{0}")]
    Custom(String),
}

impl EncodeError {
    /// Encoding failures are always local input problems
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Encoding
    }
}
