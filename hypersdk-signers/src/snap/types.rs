//! Helpers for talking to a HyperSDK snap through the wallet host
use std::fmt;

/// The snap installed when none is configured
pub const DEFAULT_SNAP_ID: &str = "npm:sample-metamask-snap-for-hypersdk";

/// Marker the host's client version must contain to run development snaps
pub(crate) const FLASK_MARKER: &str = "flask";

/// Prefix of snaps served from a local development server. These are always reinstalled.
pub(crate) const LOCAL_SNAP_PREFIX: &str = "local:";

/// Wallet host methods
pub(crate) mod methods {
    pub(crate) const CLIENT_VERSION: &str = "web3_clientVersion";
    pub(crate) const GET_SNAPS: &str = "wallet_getSnaps";
    pub(crate) const REQUEST_SNAPS: &str = "wallet_requestSnaps";
    pub(crate) const INVOKE_SNAP: &str = "wallet_invokeSnap";
}

/// Methods served by the snap itself
pub(crate) mod snap_methods {
    pub(crate) const GET_PUBLIC_KEY: &str = "getPublicKey";
    pub(crate) const SIGN_TRANSACTION: &str = "signTransaction";
}

/// The connection flow of an [`ExternalWalletSigner`](super::ExternalWalletSigner).
///
/// ```text
/// Disconnected -> CheckingHost -> Incompatible | HostOk
/// HostOk -> CheckingSandboxPresence -> Installing | AlreadyInstalled
/// Installing -> Installed | InstallFailed
/// Installed | AlreadyInstalled -> FetchingPublicKey -> Connected | NoPublicKey
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SnapState {
    /// Nothing attempted yet, or the last attempt was interrupted by a host error
    Disconnected,
    /// Reading the host's client version
    CheckingHost,
    /// The host cannot run development snaps. Terminal for the signer's lifetime.
    Incompatible,
    /// The host can run development snaps
    HostOk,
    /// Listing the installed snaps
    CheckingSandboxPresence,
    /// Asking the host to install the snap
    Installing,
    /// The snap was installed by this connection attempt
    Installed,
    /// The snap was already installed
    AlreadyInstalled,
    /// The snap is still missing after installation
    InstallFailed,
    /// Asking the snap for its public key
    FetchingPublicKey,
    /// The snap returned no public key
    NoPublicKey,
    /// The public key is cached and the signer can sign
    Connected,
}

impl SnapState {
    /// Whether the flow stops in this state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SnapState::Connected |
                SnapState::Incompatible |
                SnapState::InstallFailed |
                SnapState::NoPublicKey
        )
    }

    /// Whether this is a terminal failure
    pub fn is_failure(&self) -> bool {
        self.is_terminal() && *self != SnapState::Connected
    }
}

impl fmt::Display for SnapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(SnapState::Connected.is_terminal());
        assert!(!SnapState::Connected.is_failure());
        for state in [SnapState::Incompatible, SnapState::InstallFailed, SnapState::NoPublicKey] {
            assert!(state.is_failure());
        }
        assert!(!SnapState::Installing.is_terminal());
        assert!(!SnapState::Disconnected.is_terminal());
    }
}
