use std::fmt;

/// The coarse category of a failure, shared by every error type in the workspace.
///
/// Each crate keeps its own error enum; `kind()` on those enums maps the concrete variant onto
/// one of these so that callers can react to a failure without matching on inner types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad constructor input, unknown signer type, unserializable data
    Validation,
    /// No compatible wallet host, sandbox missing or failed to install
    Connection,
    /// Operation attempted on a client or signer that is not connected
    State,
    /// The signer returned no signature
    Signing,
    /// A request exceeded its deadline
    Timeout,
    /// The remote node reported a structured error
    Rpc,
    /// Any other transport failure (connection refused, bad status, ...)
    Transport,
    /// A value could not be (de)serialized or encoded
    Encoding,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Validation => "validation error",
            ErrorKind::Connection => "connection error",
            ErrorKind::State => "state error",
            ErrorKind::Signing => "signing error",
            ErrorKind::Timeout => "timeout error",
            ErrorKind::Rpc => "rpc error",
            ErrorKind::Transport => "transport error",
            ErrorKind::Encoding => "encoding error",
        };
        f.write_str(s)
    }
}
