//! # ledgerkit wallets
//!
//! Signing identities implementing [`ledgerkit_core::Signer`]:
//!
//! - [`Wallet`] keeps a secp256k1 key locally and submits raw EIP-155
//!   transactions
//! - [`ManagedAccount`] names an address the node signs for

mod error;
pub mod key_pair;
pub mod legacy;
mod managed;
mod wallet;

pub use error::{WalletError, WalletResult};
pub use key_pair::{KeyPair, Signature};
pub use legacy::LegacyTransaction;
pub use managed::ManagedAccount;
pub use wallet::Wallet;
