//! Auth capability port and wallet-chain configuration.
//!
//! ARCHITECTURE
//! ============
//! The wallet SDK is an external collaborator. It is modeled as a trait
//! object constructed by the host and injected into the session
//! controller, with init/teardown owned by the caller rather than a
//! module-level singleton, so hosts and tests choose the implementation.

use async_trait::async_trait;
use uuid::Uuid;

use crate::state::Identity;

// =============================================================================
// CHAIN CONFIGURATION
// =============================================================================

/// Chain parameters handed to the wallet provider at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ChainConfig {
    pub chain_id: &'static str,
    pub rpc_target: &'static str,
    pub display_name: &'static str,
    pub block_explorer_url: &'static str,
    pub ticker: &'static str,
    pub ticker_name: &'static str,
    pub logo: &'static str,
}

/// Fixed public-testnet configuration used by the default deployment.
pub const SEPOLIA: ChainConfig = ChainConfig {
    chain_id: "0xaa36a7",
    rpc_target: "https://rpc.ankr.com/eth_sepolia",
    display_name: "Sepolia Testnet",
    block_explorer_url: "https://sepolia.etherscan.io",
    ticker: "ETH",
    ticker_name: "Ethereum",
    logo: "https://assets.web3auth.io/evm-chains/sepolia.png",
};

// =============================================================================
// ERRORS
// =============================================================================

/// Failure categories of the auth capability, one per lifecycle call.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("auth initialization failed: {0}")]
    Init(String),
    #[error("wallet connect failed: {0}")]
    Connect(String),
    #[error("wallet disconnect failed: {0}")]
    Disconnect(String),
    #[error("identity fetch failed: {0}")]
    UserInfo(String),
}

// =============================================================================
// PROVIDER HANDLE
// =============================================================================

/// Opaque handle to the wallet provider returned by a successful connect.
/// The session core never looks inside it; it only hands it back out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderHandle(Uuid);

impl ProviderHandle {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl Default for ProviderHandle {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// CAPABILITY PORT
// =============================================================================

/// Port over the wallet-auth SDK.
///
/// All calls are fallible and may suspend indefinitely; the session
/// controller applies no timeout, so a hung call blocks only its caller.
#[async_trait]
pub trait AuthCapability: Send + Sync {
    /// Acquire the capability and restore any previously connected
    /// session. Called once per controller lifetime.
    async fn init(&self) -> Result<(), AuthError>;

    /// Run the interactive connect flow.
    async fn connect(&self) -> Result<ProviderHandle, AuthError>;

    /// Disconnect the current session.
    async fn disconnect(&self) -> Result<(), AuthError>;

    /// Profile of the currently connected principal.
    async fn user_info(&self) -> Result<Identity, AuthError>;

    /// Whether the capability currently reports a connected session.
    fn connected(&self) -> bool;

    /// Provider handle, if a session is connected.
    fn provider(&self) -> Option<ProviderHandle>;
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
