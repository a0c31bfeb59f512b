//! # ledgerkit harness
//!
//! Deploys compiled contracts, hands out calling contexts bound to any of
//! several identities, drives submitted transactions to inclusion and keeps
//! an audit trail of everything confirmed during a session.
//!
//! ```no_run
//! # async fn run(
//! #     provider: std::sync::Arc<dyn ledgerkit_core::Provider>,
//! #     artifact: ledgerkit_core::ContractArtifact,
//! # ) -> Result<(), ledgerkit_harness::HarnessError> {
//! use ledgerkit_harness::{Deployer, HistoryStore, TransactionOverrides};
//! use std::sync::Arc;
//!
//! let history = Arc::new(HistoryStore::new());
//! history.init_history_record();
//!
//! let settings = ledgerkit_config::HarnessSettings::default();
//! let deployer = Deployer::from_network_accounts(provider, history.clone(), &settings).await?;
//! let wrapper = deployer.deploy(&artifact, &[], TransactionOverrides::new()).await?;
//!
//! let pending = wrapper.from(1).await?.send("renounceOwnership", &[], Default::default()).await?;
//! wrapper.verbose_wait_for_transaction(&pending, Some("Renounce")).await?;
//! # Ok(())
//! # }
//! ```

mod confirmation;
mod deployer;
mod error;
pub mod history;
mod receipt;
pub mod sender;
mod wrapper;

pub use confirmation::TransactionWatcher;
pub use deployer::Deployer;
pub use error::{DeploymentStage, HarnessError, HarnessResult};
pub use history::{Action, HistoryError, HistoryRecord, HistoryStore};
pub use receipt::{PendingTransaction, Receipt, ReceiptEvent, TransactionOverrides};
pub use sender::{IntoSender, Sender};
pub use wrapper::{BoundContract, ContractWrapper};
