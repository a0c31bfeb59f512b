//! # ledgerkit
//!
//! A deployment-and-verification harness for smart contracts on networks
//! that speak the Ethereum JSON-RPC dialect.
//!
//! Deploy a compiled contract, call it as any of several identities and
//! keep a durable audit record of every transaction confirmed during a
//! session.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ledgerkit::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> ledgerkit::Result<()> {
//!     let settings = HarnessSettings::load("ledgerkit.toml")?;
//!     let session = Session::connect(settings).await?;
//!
//!     let artifact = ContractArtifact::load("build/Ownable.json")?;
//!     let wrapper = session
//!         .deployer()
//!         .deploy(&artifact, &[], TransactionOverrides::new())
//!         .await?;
//!
//!     let owner = session.deployer().signers()[1].address();
//!     let pending = wrapper
//!         .send("transferOwnership", &[Token::Address(owner)], TransactionOverrides::new())
//!         .await?;
//!     wrapper
//!         .verbose_wait_for_transaction(&pending, Some("Transfer Ownership"))
//!         .await?;
//!
//!     session.finish()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`ledgerkit_core`] - primitives, ABI encoding, artifacts and the
//!   `Provider`/`Signer` traits
//! - [`ledgerkit_config`] - TOML settings
//! - [`ledgerkit_wallets`] - local and node-managed signing identities
//! - [`ledgerkit_harness`] - contract wrapper, deployer and history store
//! - `ledgerkit_rpc_client` - JSON-RPC provider (feature `rpc`)
//! - `ledgerkit_telemetry` - logging setup (feature `telemetry`)

#![warn(rustdoc::missing_crate_level_docs)]

pub use ledgerkit_config as config;
pub use ledgerkit_core as core;
pub use ledgerkit_harness as harness;
pub use ledgerkit_wallets as wallets;

#[cfg(feature = "rpc")]
pub use ledgerkit_rpc_client as rpc_client;

#[cfg(feature = "telemetry")]
pub use ledgerkit_telemetry as telemetry;

#[cfg(feature = "rpc")]
mod session;

#[cfg(feature = "rpc")]
pub use session::Session;

/// Common imports for harness sessions
pub mod prelude {
    pub use crate::config::HarnessSettings;
    pub use crate::core::{
        Address, ContractArtifact, ExecutionStatus, Provider, Signer, Token, TxHash,
    };
    pub use crate::harness::{
        Action, BoundContract, ContractWrapper, Deployer, HarnessError, HistoryStore,
        PendingTransaction, Receipt, TransactionOverrides,
    };
    pub use crate::wallets::{KeyPair, ManagedAccount, Wallet};

    #[cfg(feature = "rpc")]
    pub use crate::rpc_client::RpcClient;

    #[cfg(feature = "rpc")]
    pub use crate::Session;
}

/// Result type for session setup and teardown
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// ledgerkit version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
